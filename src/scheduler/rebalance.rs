use super::{Scheduler, LOAD_TOLERANCE, MAX_ITERATIONS};
use crate::error::{ScheduleError, ScheduleResult};
use crate::ledger::{Duty, Ledger};
use crate::model::{Load, Roster, WeekShape};
use chrono::{Datelike, Duration, NaiveDate};
use std::cmp::Ordering;

/// Parts cibles de jours de permanence par catégorie de charge.
///
/// Formules reprises telles quelles de la feuille de calcul d'origine : un
/// membre à charge partielle compte comme une fraction d'un membre à charge
/// pleine, et l'écart se compare à une tolérance de 1.0 malgré le mélange
/// compte entier / part fractionnaire.
#[derive(Debug, Clone, Copy)]
struct Shares {
    partial: f64,
    full: f64,
}

fn shares(roster: &Roster, ledger: &Ledger, shape: &WeekShape) -> ScheduleResult<Shares> {
    let mut num_partial = 0usize;
    let mut num_full = 0usize;
    for member in roster.dorm_pool() {
        match member.load {
            Some(Load::Partial) => num_partial += 1,
            Some(Load::Full) => num_full += 1,
            None => continue,
        }
    }
    if num_full == 0 {
        return Err(ScheduleError::RosterTooSmall("no full-load member"));
    }

    let mut num_school_nights = 0usize;
    let mut num_fridays = 0usize;
    let mut num_saturdays = 0usize;
    for date in ledger.dates() {
        let dow = date.weekday();
        if shape.is_school_night(dow) {
            num_school_nights += 1;
        } else if dow == shape.friday() {
            num_fridays += 1;
        } else {
            num_saturdays += 1;
        }
    }
    let num_days = num_school_nights + num_fridays + num_saturdays;

    let partial = (num_school_nights + num_saturdays) as f64 / (num_partial + num_full) as f64;
    let full = (num_days as f64 - partial * num_partial as f64) / num_full as f64;
    Ok(Shares { partial, full })
}

/// Surcharges courantes du pool d'internat, triées croissantes (tri stable :
/// à surcharge égale, l'ordre de l'effectif départage).
fn ranked_overloads(
    roster: &Roster,
    ledger: &Ledger,
    shape: &WeekShape,
) -> ScheduleResult<Vec<(String, f64)>> {
    let shares = shares(roster, ledger, shape)?;
    let mut ranked: Vec<(String, f64)> = roster
        .dorm_pool()
        .map(|member| {
            let target = match member.load {
                Some(Load::Partial) => shares.partial,
                _ => shares.full,
            };
            let count = ledger.count_of(Duty::Dorm, &member.name);
            (member.name.clone(), count as f64 - target)
        })
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    Ok(ranked)
}

/// Boucle gloutonne : tant que l'écart de charge dépasse la tolérance, le
/// « pire jour » du membre le plus chargé part chez le moins chargé. Plafond
/// dur d'itérations, l'heuristique pouvant osciller.
pub(super) fn rebalance_weekdays(sched: &mut Scheduler) -> ScheduleResult<()> {
    for iteration in 0..MAX_ITERATIONS {
        let ranked = ranked_overloads(&sched.roster, &sched.ledger, &sched.shape)?;
        let (Some(first), Some(last)) = (ranked.first(), ranked.last()) else {
            return Ok(());
        };
        let spread = last.1 - first.1;
        if spread <= LOAD_TOLERANCE {
            #[cfg(feature = "logging")]
            tracing::debug!(iteration, spread, "weekday loads converged");
            return Ok(());
        }
        let most_loaded = last.0.clone();

        let eligible: Vec<NaiveDate> = sched
            .ledger
            .dates()
            .filter(|d| {
                !sched.head_dates.contains(d) && sched.shape.is_school_night(d.weekday())
            })
            .collect();

        if !hand_off_worst_day(sched, &most_loaded, &ranked, &eligible)? {
            return Err(ScheduleError::Unbalanced {
                what: "dorm duty",
                iterations: iteration,
                spread,
            });
        }
    }

    let ranked = ranked_overloads(&sched.roster, &sched.ledger, &sched.shape)?;
    let spread = match (ranked.first(), ranked.last()) {
        (Some(first), Some(last)) => last.1 - first.1,
        _ => 0.0,
    };
    Err(ScheduleError::Unbalanced {
        what: "dorm duty",
        iterations: MAX_ITERATIONS,
        spread,
    })
}

/// Tente de céder un jour du membre le plus chargé, en escaladant du moins
/// chargé vers le suivant quand aucun jour ne passe.
fn hand_off_worst_day(
    sched: &mut Scheduler,
    most_loaded: &str,
    ranked: &[(String, f64)],
    eligible: &[NaiveDate],
) -> ScheduleResult<bool> {
    for (target, _) in ranked.iter().take(ranked.len().saturating_sub(1)) {
        let mut pool: Vec<NaiveDate> = eligible.to_vec();
        while let Some(worst) = worst_day(&sched.ledger, &sched.shape, most_loaded, &pool) {
            let member = sched.roster.require(target)?;
            match sched.ledger.assign(Duty::Dorm, worst, Some(member)) {
                Ok(()) => {
                    #[cfg(feature = "logging")]
                    tracing::debug!(date = %worst, from = most_loaded, to = %target, "duty handed off");
                    return Ok(true);
                }
                Err(err) if err.is_unavailable() => pool.retain(|d| *d != worst),
                Err(err) => return Err(err),
            }
        }
    }
    Ok(false)
}

/// Le jour éligible de `name` dont la fenêtre de ±3 jours contient le plus de
/// ses autres permanences ; le premier rencontré gagne à égalité.
fn worst_day(
    ledger: &Ledger,
    shape: &WeekShape,
    name: &str,
    eligible: &[NaiveDate],
) -> Option<NaiveDate> {
    let duty_dates = ledger.dates_of(Duty::Dorm, name);
    let mut worst: Option<(usize, NaiveDate)> = None;
    for &date in &duty_dates {
        if !eligible.contains(&date) || shape.is_weekend(date.weekday()) {
            continue;
        }
        let lower = date - Duration::days(3);
        let upper = date + Duration::days(3);
        let count = duty_dates
            .iter()
            .filter(|d| lower <= **d && **d <= upper)
            .count();
        if worst.map_or(true, |(max, _)| count > max) {
            worst = Some((count, date));
        }
    }
    worst.map(|(_, date)| date)
}
