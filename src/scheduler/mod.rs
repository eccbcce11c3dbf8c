mod rebalance;
mod rotation;
mod runs;
mod weekdays;
mod weekends;

pub use rotation::RotationList;

use crate::calendar::Calendar;
use crate::error::ScheduleResult;
use crate::ledger::{Duty, Ledger, RunSlot};
use crate::model::{Faculty, Role, Roster, WeekShape};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Trimestres de l'année scolaire, délimités par deux dates de coupure.
pub const TERMS: usize = 3;

/// Plafond commun des boucles de réessai et de rééquilibrage.
pub(crate) const MAX_ITERATIONS: usize = 100;

/// Écart de charge toléré entre le membre le plus et le moins chargé.
pub(crate) const LOAD_TOLERANCE: f64 = 1.0;

/// Totaux de service d'un membre, pour le reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DutyCounts {
    pub total: usize,
    pub school_nights: usize,
    pub fridays: usize,
    pub saturdays: usize,
    pub run1: usize,
    pub run2: usize,
}

/// Moteur d'assignation : encapsule l'effectif, le grand livre et la source
/// aléatoire injectée (une même graine redonne un planning identique octet
/// pour octet).
#[derive(Debug)]
pub struct Scheduler {
    name: String,
    roster: Roster,
    ledger: Ledger,
    shape: WeekShape,
    term_breaks: [NaiveDate; 2],
    head_dates: Vec<NaiveDate>,
    presets: [HashMap<Weekday, String>; TERMS],
    rng: ChaCha8Rng,
}

impl Scheduler {
    pub fn new<N: Into<String>>(
        name: N,
        calendar: &Calendar,
        term_breaks: [NaiveDate; 2],
        head_dates: Vec<NaiveDate>,
        seed: u64,
    ) -> Self {
        Self {
            name: name.into(),
            roster: Roster::new(),
            ledger: Ledger::new(calendar.dates().iter().copied()),
            shape: WeekShape::default(),
            term_breaks,
            head_dates,
            presets: Default::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn shape(&self) -> &WeekShape {
        &self.shape
    }

    /// Enregistre un membre. Un responsable (`Head`) reçoit immédiatement les
    /// jours charnières ; l'échec (`Unavailable`) abandonne l'ajout.
    pub fn add_member(&mut self, member: Faculty) -> ScheduleResult<()> {
        if member.role == Role::Head {
            for &date in &self.head_dates {
                self.ledger.assign(Duty::Dorm, date, Some(&member))?;
            }
        }
        self.roster.add(member)
    }

    /// Renseigne les titulaires imposés d'un trimestre (jour → nom).
    pub fn set_weekday_presets(
        &mut self,
        term: usize,
        presets: HashMap<Weekday, String>,
    ) -> ScheduleResult<()> {
        if term >= TERMS {
            return Err(anyhow::anyhow!("term index out of range: {term}").into());
        }
        for name in presets.values() {
            self.roster.require(name)?;
        }
        self.presets[term] = presets;
        Ok(())
    }

    /// Active les deux tournées sur `[start, end]`.
    pub fn set_run_period(&mut self, start: NaiveDate, end: NaiveDate) {
        let period = Calendar::build(start, end, &[]);
        self.ledger.set_run_dates(period.dates().iter().copied());
    }

    /// Calcule le planning complet : semaines par défaut, rotation des
    /// week-ends, rééquilibrage, puis les deux tournées.
    pub fn make_schedule(&mut self) -> ScheduleResult<()> {
        weekdays::assign_weekdays(self)?;
        weekends::assign_weekends(self)?;
        rebalance::rebalance_weekdays(self)?;
        runs::assign_runs(self)
    }

    /// Titulaire de la permanence d'internat ce jour-là.
    pub fn duty_on(&self, date: NaiveDate) -> Option<&str> {
        self.ledger.dorm_on(date)
    }

    /// Jours tenus par un membre pour une responsabilité, croissants.
    pub fn dates_for(&self, name: &str, duty: Duty) -> Vec<NaiveDate> {
        self.ledger.dates_of(duty, name)
    }

    /// Totaux d'un membre ; `None` si le nom est inconnu.
    pub fn counts_for(&self, name: &str) -> Option<DutyCounts> {
        self.roster.get(name)?;
        let mut counts = DutyCounts::default();
        for date in self.ledger.dates_of(Duty::Dorm, name) {
            counts.total += 1;
            let dow = date.weekday();
            if self.shape.is_school_night(dow) {
                counts.school_nights += 1;
            } else if dow == self.shape.friday() {
                counts.fridays += 1;
            } else {
                counts.saturdays += 1;
            }
        }
        counts.run1 = self.ledger.count_of(Duty::Run(RunSlot::First), name);
        counts.run2 = self.ledger.count_of(Duty::Run(RunSlot::Second), name);
        Some(counts)
    }

    /// Trimestre (0..TERMS) auquel appartient une date.
    pub(crate) fn term_of(&self, date: NaiveDate) -> usize {
        if date < self.term_breaks[0] {
            0
        } else if date < self.term_breaks[1] {
            1
        } else {
            2
        }
    }
}
