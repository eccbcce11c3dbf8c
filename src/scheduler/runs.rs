use super::{RotationList, Scheduler, LOAD_TOLERANCE, MAX_ITERATIONS};
use crate::error::{ScheduleError, ScheduleResult};
use crate::ledger::{Duty, Ledger, RunSlot};
use crate::model::{Faculty, Role, Roster};
use chrono::{Duration, NaiveDate};
use std::cmp::Ordering;

/// Sévérité du jeu de conflits appliqué à un candidat de tournée.
///
/// Le mode souple élargit le vivier du rééquilibrage : il abandonne
/// l'exclusion du jour précédent, mais jamais les exclusions d'un même
/// membre ou d'une même famille sur deux rôles du même jour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Hard,
    Soft,
}

/// Assigne les deux tournées sur leur période d'activation puis rééquilibre
/// chacune.
pub(super) fn assign_runs(sched: &mut Scheduler) -> ScheduleResult<()> {
    let run_dates = sched.ledger.run_dates();
    if run_dates.is_empty() {
        return Ok(());
    }
    let pool_len = sched.roster.run_pool().len();
    if pool_len == 0 {
        return Err(ScheduleError::RosterTooSmall("empty run pool"));
    }
    let fair_share = run_dates.len() as f64 / pool_len as f64;

    // les plus spécialisés d'abord : ils absorbent la tournée en premier
    let mut first_list = priority_list(&sched.roster);
    let mut second_list = first_list.clone();

    for &date in &run_dates {
        let assigned = fill_run_date(sched, &first_list, RunSlot::First, date)?;
        let run1_count = sched.ledger.count_of(Duty::Run(RunSlot::First), &assigned);
        if run1_count as f64 >= fair_share {
            first_list.promote_to_back(&assigned);
        }

        let assigned = fill_run_date(sched, &second_list, RunSlot::Second, date)?;
        let both = sched.ledger.count_of(Duty::Run(RunSlot::First), &assigned)
            + sched.ledger.count_of(Duty::Run(RunSlot::Second), &assigned);
        if both as f64 >= 2.0 * fair_share {
            second_list.promote_to_back(&assigned);
        }
    }

    for slot in RunSlot::ALL {
        rebalance_runs(sched, slot, fair_share)?;
    }
    Ok(())
}

/// Liste de candidats ordonnée par priorité : `Hospital`, puis `Adjunct`,
/// puis `Residential`/`Head`.
fn priority_list(roster: &Roster) -> RotationList {
    let mut list = RotationList::new();
    let tiers: [&[Role]; 3] = [
        &[Role::Hospital],
        &[Role::Adjunct],
        &[Role::Residential, Role::Head],
    ];
    for tier in tiers {
        for member in roster.run_pool() {
            if tier.contains(&member.role) {
                list.push_back(member.name.clone());
            }
        }
    }
    list
}

fn fill_run_date(
    sched: &mut Scheduler,
    list: &RotationList,
    slot: RunSlot,
    date: NaiveDate,
) -> ScheduleResult<String> {
    let mut index = 0;
    loop {
        let Some(candidate) = list.get(index) else {
            return Err(ScheduleError::NoCandidate {
                what: slot.label(),
                date,
            });
        };
        let member = sched.roster.require(candidate)?;
        if run_conflict(&sched.roster, &sched.ledger, member, slot, Mode::Hard, date) {
            index += 1;
            continue;
        }
        let name = member.name.clone();
        sched.ledger.assign(Duty::Run(slot), date, Some(member))?;
        return Ok(name);
    }
}

/// Jeu de conflits d'un candidat pour une tournée un jour donné.
fn run_conflict(
    roster: &Roster,
    ledger: &Ledger,
    member: &Faculty,
    slot: RunSlot,
    mode: Mode,
    date: NaiveDate,
) -> bool {
    if member.is_unavailable(date) {
        return true;
    }
    let dorm_holder = ledger.dorm_on(date);
    if dorm_holder == Some(member.name.as_str()) {
        return true;
    }
    if roster.same_family(member, dorm_holder) {
        return true;
    }
    let other_holder = ledger.run_on(slot.other(), date);
    if other_holder == Some(member.name.as_str()) {
        return true;
    }
    if roster.same_family(member, other_holder) {
        return true;
    }
    if mode == Mode::Hard && slot == RunSlot::First {
        let previous = date - Duration::days(1);
        if ledger.run_on(slot, previous) == Some(member.name.as_str()) {
            return true;
        }
    }
    false
}

/// Rééquilibrage d'une tournée, même squelette que celui des semaines :
/// surcharge = jours de tournée − part équitable, déplacements du plus
/// chargé vers le moins chargé sous le jeu de conflits souple.
fn rebalance_runs(sched: &mut Scheduler, slot: RunSlot, fair_share: f64) -> ScheduleResult<()> {
    for iteration in 0..MAX_ITERATIONS {
        let ranked = ranked_run_overloads(&sched.roster, &sched.ledger, slot, fair_share);
        let (Some(first), Some(last)) = (ranked.first(), ranked.last()) else {
            return Ok(());
        };
        let spread = last.1 - first.1;
        if spread <= LOAD_TOLERANCE {
            #[cfg(feature = "logging")]
            tracing::debug!(iteration, spread, slot = %slot, "run loads converged");
            return Ok(());
        }
        let most_loaded = last.0.clone();

        if !hand_off_run(sched, slot, &most_loaded, &ranked)? {
            return Err(ScheduleError::Unbalanced {
                what: slot.label(),
                iterations: iteration,
                spread,
            });
        }
    }

    let ranked = ranked_run_overloads(&sched.roster, &sched.ledger, slot, fair_share);
    let spread = match (ranked.first(), ranked.last()) {
        (Some(first), Some(last)) => last.1 - first.1,
        _ => 0.0,
    };
    Err(ScheduleError::Unbalanced {
        what: slot.label(),
        iterations: MAX_ITERATIONS,
        spread,
    })
}

fn ranked_run_overloads(
    roster: &Roster,
    ledger: &Ledger,
    slot: RunSlot,
    fair_share: f64,
) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = roster
        .run_pool()
        .iter()
        .map(|member| {
            let count = ledger.count_of(Duty::Run(slot), &member.name);
            (member.name.clone(), count as f64 - fair_share)
        })
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ranked
}

/// Cède un jour de tournée du plus chargé au premier candidat sous-chargé
/// qui passe le jeu de conflits souple.
fn hand_off_run(
    sched: &mut Scheduler,
    slot: RunSlot,
    most_loaded: &str,
    ranked: &[(String, f64)],
) -> ScheduleResult<bool> {
    for (target, _) in ranked.iter().take(ranked.len().saturating_sub(1)) {
        for date in sched.ledger.dates_of(Duty::Run(slot), most_loaded) {
            let member = sched.roster.require(target)?;
            if run_conflict(&sched.roster, &sched.ledger, member, slot, Mode::Soft, date) {
                continue;
            }
            sched.ledger.assign(Duty::Run(slot), date, Some(member))?;
            #[cfg(feature = "logging")]
            tracing::debug!(date = %date, from = most_loaded, to = %target, slot = %slot, "run handed off");
            return Ok(true);
        }
    }
    Ok(false)
}
