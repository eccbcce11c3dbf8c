use super::{Scheduler, MAX_ITERATIONS, TERMS};
use crate::error::{ScheduleError, ScheduleResult};
use crate::ledger::Duty;
use crate::model::{Roster, WeekShape};
use chrono::{Datelike, Weekday};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Pose les titulaires par défaut de chaque soir de semaine, trimestre par
/// trimestre, puis remplit tous les créneaux de semaine encore libres.
pub(super) fn assign_weekdays(sched: &mut Scheduler) -> ScheduleResult<()> {
    let mut defaults = Vec::with_capacity(TERMS);
    for term in 0..TERMS {
        defaults.push(draw_defaults(
            &sched.roster,
            &sched.shape,
            &sched.presets[term],
            &mut sched.rng,
        )?);
    }

    let open: Vec<_> = sched
        .ledger
        .open_dates(Duty::Dorm)
        .into_iter()
        .filter(|d| sched.shape.is_school_night(d.weekday()))
        .collect();

    for date in open {
        let dow = date.weekday();
        let term = sched.term_of(date);
        let mut candidate = defaults[term][&dow].clone();
        let mut attempts = 0;
        loop {
            let member = sched.roster.require(&candidate)?;
            match sched.ledger.assign(Duty::Dorm, date, Some(member)) {
                Ok(()) => break,
                Err(err) if err.is_unavailable() => {
                    attempts += 1;
                    if attempts >= MAX_ITERATIONS {
                        return Err(ScheduleError::RetriesExhausted {
                            what: "weekday fill-in",
                            attempts,
                        });
                    }
                    // remplaçant tiré uniformément parmi les autres membres
                    let pool: Vec<&str> = sched
                        .roster
                        .dorm_pool()
                        .filter(|m| m.name != candidate)
                        .map(|m| m.name.as_str())
                        .collect();
                    candidate = pool
                        .choose(&mut sched.rng)
                        .ok_or(ScheduleError::RosterTooSmall("empty dorm pool"))?
                        .to_string();
                }
                Err(err) => return Err(err),
            }
        }
    }
    Ok(())
}

/// Tire un titulaire par soir de semaine, sans remise, en partant des
/// titulaires imposés. Le tirage entier est rejoué tant qu'un titulaire tombe
/// sur un de ses jours d'indisponibilité hebdomadaire.
fn draw_defaults(
    roster: &Roster,
    shape: &WeekShape,
    presets: &HashMap<Weekday, String>,
    rng: &mut ChaCha8Rng,
) -> ScheduleResult<HashMap<Weekday, String>> {
    for _ in 0..MAX_ITERATIONS {
        let mut mapping = presets.clone();
        let mut pool: Vec<&str> = roster
            .dorm_pool()
            .filter(|m| !presets.values().any(|preset| *preset == m.name))
            .map(|m| m.name.as_str())
            .collect();

        for &day in &shape.school_nights {
            if mapping.contains_key(&day) {
                continue;
            }
            let pick = *pool
                .choose(rng)
                .ok_or(ScheduleError::RosterTooSmall("fewer members than school nights"))?;
            pool.retain(|name| *name != pick);
            mapping.insert(day, pick.to_string());
        }

        let clear = shape.school_nights.iter().all(|day| {
            roster
                .get(&mapping[day])
                .is_some_and(|m| !m.unavailable_dows.contains(day))
        });
        if clear {
            return Ok(mapping);
        }
    }
    Err(ScheduleError::RetriesExhausted {
        what: "weekday defaults",
        attempts: MAX_ITERATIONS,
    })
}
