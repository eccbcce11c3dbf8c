use super::{RotationList, Scheduler};
use crate::error::{ScheduleError, ScheduleResult};
use crate::ledger::Duty;
use crate::model::Load;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Assigne vendredis et samedis par rotation, puis décharge les membres à
/// charge partielle de leur soir de semaine adjacent.
pub(super) fn assign_weekends(sched: &mut Scheduler) -> ScheduleResult<()> {
    let friday = sched.shape.friday();
    let saturday = sched.shape.saturday();

    // ordre du vendredi = ordre de l'effectif, samedi inversé ; le
    // responsable passe en queue des deux listes pour être servi en dernier
    let names: Vec<String> = sched.roster.dorm_pool().map(|m| m.name.clone()).collect();
    let mut friday_list: RotationList = names.iter().cloned().collect();
    let mut saturday_list: RotationList = names.iter().rev().cloned().collect();
    if let Some(head) = sched.roster.head() {
        friday_list.promote_to_back(&head.name);
        saturday_list.promote_to_back(&head.name);
    }

    let dates: Vec<NaiveDate> = sched.ledger.dates().collect();
    for date in dates {
        let dow = date.weekday();
        if !sched.shape.is_weekend(dow) {
            continue;
        }
        let list = if dow == friday {
            &mut friday_list
        } else {
            &mut saturday_list
        };
        if sched.ledger.dorm_on(date).is_none() {
            fill_weekend_date(sched, list, date, dow, saturday)?;
        }
        // le titulaire du jour (posé ici ou préassigné) repart en queue
        if let Some(holder) = sched.ledger.dorm_on(date) {
            if list.contains(holder) {
                let holder = holder.to_string();
                list.promote_to_back(&holder);
            }
        }
    }

    unload_partials(sched)
}

fn fill_weekend_date(
    sched: &mut Scheduler,
    list: &RotationList,
    date: NaiveDate,
    dow: Weekday,
    saturday: Weekday,
) -> ScheduleResult<()> {
    let mut index = 0;
    loop {
        let Some(candidate) = list.get(index) else {
            return Err(ScheduleError::NoCandidate {
                what: "weekend duty",
                date,
            });
        };
        // pas de vendredi puis samedi pour la même personne
        if dow == saturday {
            let friday_holder = sched.ledger.dorm_on(date - Duration::days(1));
            if friday_holder == Some(candidate) {
                index += 1;
                continue;
            }
        }
        let member = sched.roster.require(candidate)?;
        match sched.ledger.assign(Duty::Dorm, date, Some(member)) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_unavailable() => index += 1,
            Err(err) => return Err(err),
        }
    }
}

/// Second passage : un membre à charge partielle qui tient un vendredi rend
/// son soir de semaine des 5 jours précédents à un membre à charge pleine.
fn unload_partials(sched: &mut Scheduler) -> ScheduleResult<()> {
    let friday = sched.shape.friday();
    let mut replacements: RotationList = sched
        .roster
        .dorm_pool()
        .filter(|m| m.load == Some(Load::Full))
        .map(|m| m.name.clone())
        .collect();
    if replacements.is_empty() {
        // rien pour reprendre la charge, on laisse tel quel
        return Ok(());
    }

    let fridays: Vec<NaiveDate> = sched
        .ledger
        .dates()
        .filter(|d| d.weekday() == friday)
        .collect();
    for date in fridays {
        let Some(holder) = sched.ledger.dorm_on(date) else {
            continue;
        };
        let holder = holder.to_string();
        if sched.roster.get(&holder).and_then(|m| m.load) != Some(Load::Partial) {
            continue;
        }
        let Some(weekday_duty) = nearby_weekday_duty(sched, date, &holder) else {
            continue;
        };

        let saturday_after = date + Duration::days(1);
        let mut index = 0;
        loop {
            let Some(candidate) = replacements.get(index) else {
                // personne ne convient : la permanence reste en place
                break;
            };
            if sched.ledger.dorm_on(saturday_after) == Some(candidate) {
                index += 1;
                continue;
            }
            let member = sched.roster.require(candidate)?;
            match sched.ledger.assign(Duty::Dorm, weekday_duty, Some(member)) {
                Ok(()) => {
                    let name = member.name.clone();
                    replacements.promote_to_back(&name);
                    break;
                }
                Err(err) if err.is_unavailable() => index += 1,
                Err(err) => return Err(err),
            }
        }
    }
    Ok(())
}

/// Le soir de semaine tenu par `name` dans les 5 jours précédant `date`.
fn nearby_weekday_duty(sched: &Scheduler, date: NaiveDate, name: &str) -> Option<NaiveDate> {
    (1..=5)
        .map(|i| date - Duration::days(i))
        .find(|d| sched.ledger.contains(*d) && sched.ledger.dorm_on(*d) == Some(name))
}
