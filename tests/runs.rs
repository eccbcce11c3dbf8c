#![forbid(unsafe_code)]
use chrono::NaiveDate;
use internat::{Calendar, Faculty, Role, RunSlot, Scheduler};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Deux semaines pleines, cinq membres d'internat, deux membres de tournée
/// dont un lié par famille à un résident.
fn scheduler_with_runs(seed: u64) -> Scheduler {
    let calendar = Calendar::build(d(2014, 9, 7), d(2014, 9, 20), &[]);
    let mut sched = Scheduler::new(
        "maison-b",
        &calendar,
        [d(2015, 1, 1), d(2015, 4, 1)],
        vec![d(2014, 9, 7)],
        seed,
    );
    sched.add_member(Faculty::new("Joce", Role::Head)).unwrap();
    sched
        .add_member(Faculty::new("Mara", Role::Residential))
        .unwrap();
    sched
        .add_member(Faculty::new("Noa", Role::Residential).family("li"))
        .unwrap();
    sched.add_member(Faculty::new("Issa", Role::Adjunct)).unwrap();
    sched.add_member(Faculty::new("Rémy", Role::Adjunct)).unwrap();
    sched
        .add_member(Faculty::new("Paule", Role::Hospital))
        .unwrap();
    sched
        .add_member(Faculty::new("Sixtine", Role::Hospital).family("li"))
        .unwrap();
    sched.set_run_period(d(2014, 9, 7), d(2014, 9, 20));
    sched
}

#[test]
fn runs_fill_every_date_without_role_overlap() {
    let mut sched = scheduler_with_runs(11);
    sched.make_schedule().unwrap();

    let run_dates = sched.ledger().run_dates();
    assert_eq!(run_dates.len(), 14);
    for &date in &run_dates {
        let dorm = sched.ledger().dorm_on(date).expect("dorm assigned");
        let run1 = sched.ledger().run_on(RunSlot::First, date).expect("run 1 assigned");
        let run2 = sched.ledger().run_on(RunSlot::Second, date).expect("run 2 assigned");
        assert_ne!(run1, run2, "{date}");
        assert_ne!(run1, dorm, "{date}");
        assert_ne!(run2, dorm, "{date}");
    }
}

#[test]
fn family_members_never_share_a_date_across_roles() {
    let mut sched = scheduler_with_runs(13);
    sched.make_schedule().unwrap();

    for &date in &sched.ledger().run_dates() {
        let holders = [
            sched.ledger().dorm_on(date),
            sched.ledger().run_on(RunSlot::First, date),
            sched.ledger().run_on(RunSlot::Second, date),
        ];
        let noa = holders.iter().filter(|h| **h == Some("Noa")).count();
        let sixtine = holders.iter().filter(|h| **h == Some("Sixtine")).count();
        assert!(
            noa == 0 || sixtine == 0,
            "family pair doubled up on {date}: {holders:?}"
        );
    }
}

#[test]
fn hospital_members_absorb_runs_first() {
    let mut sched = scheduler_with_runs(17);
    sched.make_schedule().unwrap();

    // la tête de liste (tournée) est le premier membre « hospital »
    let first_date = d(2014, 9, 7);
    let run1 = sched.ledger().run_on(RunSlot::First, first_date).unwrap();
    assert_eq!(run1, "Paule");

    // et les membres « hospital » finissent avec leur pleine part
    let fair_share = 14.0 / 7.0;
    for name in ["Paule", "Sixtine"] {
        let counts = sched.counts_for(name).unwrap();
        assert!(
            counts.run1 + counts.run2 >= fair_share as usize,
            "{name} under-used: {counts:?}"
        );
    }
}

#[test]
fn run_loads_stay_within_tolerance() {
    let mut sched = scheduler_with_runs(19);
    sched.make_schedule().unwrap();

    let fair_share = 14.0 / 7.0;
    for slot in RunSlot::ALL {
        let overloads: Vec<f64> = sched
            .roster()
            .members()
            .iter()
            .map(|m| {
                sched
                    .ledger()
                    .dates_of(internat::Duty::Run(slot), &m.name)
                    .len() as f64
                    - fair_share
            })
            .collect();
        let max = overloads.iter().cloned().fold(f64::MIN, f64::max);
        let min = overloads.iter().cloned().fold(f64::MAX, f64::min);
        assert!(
            max - min <= 1.0 + 1e-9,
            "{slot}: spread {} too wide",
            max - min
        );
    }
}

#[test]
fn no_back_to_back_weekend_duty() {
    let mut sched = scheduler_with_runs(23);
    sched.make_schedule().unwrap();

    for saturday in [d(2014, 9, 13), d(2014, 9, 20)] {
        let friday = saturday - chrono::Duration::days(1);
        assert_ne!(
            sched.duty_on(friday),
            sched.duty_on(saturday),
            "back-to-back weekend around {saturday}"
        );
    }
}
