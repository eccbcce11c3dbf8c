use crate::error::{ScheduleError, ScheduleResult};
use crate::model::Faculty;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Les deux tournées quotidiennes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunSlot {
    First,
    Second,
}

impl RunSlot {
    pub const ALL: [RunSlot; 2] = [RunSlot::First, RunSlot::Second];

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::First => "run 1",
            Self::Second => "run 2",
        }
    }
}

impl fmt::Display for RunSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Une des trois responsabilités quotidiennes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Duty {
    /// Permanence d'internat (exactement un titulaire par jour).
    Dorm,
    /// Tournée n°1 ou n°2.
    Run(RunSlot),
}

impl fmt::Display for Duty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dorm => f.write_str("dorm"),
            Self::Run(slot) => slot.fmt(f),
        }
    }
}

type Assignments = BTreeMap<NaiveDate, Option<String>>;

/// État mutable du planning : trois cartes date → titulaire.
///
/// Les créneaux naissent non assignés puis sont remplis ou échangés par les
/// composants d'assignation ; aucune date n'est jamais supprimée. La carte
/// d'internat couvre le calendrier entier (plus les jours charnières insérés
/// pour le responsable) ; les cartes de tournées couvrent la période activée.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    dorm: Assignments,
    runs: [Assignments; 2],
}

impl Ledger {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        let mut ledger = Self::default();
        for date in dates {
            ledger.dorm.insert(date, None);
        }
        ledger
    }

    /// Active les tournées sur `dates` (créneaux non assignés).
    pub fn set_run_dates<I: IntoIterator<Item = NaiveDate>>(&mut self, dates: I) {
        for date in dates {
            for map in self.runs.iter_mut() {
                map.entry(date).or_insert(None);
            }
        }
    }

    fn map(&self, duty: Duty) -> &Assignments {
        match duty {
            Duty::Dorm => &self.dorm,
            Duty::Run(slot) => &self.runs[slot.index()],
        }
    }

    /// Écrit une assignation après contrôle d'indisponibilité.
    ///
    /// L'échec (`Unavailable`) ne modifie rien ; `None` libère le créneau.
    /// Une date absente de la carte est insérée (jours charnières du
    /// responsable), jamais retirée.
    pub fn assign(
        &mut self,
        duty: Duty,
        date: NaiveDate,
        member: Option<&Faculty>,
    ) -> ScheduleResult<()> {
        if let Some(member) = member {
            if member.is_unavailable(date) {
                return Err(ScheduleError::Unavailable {
                    name: member.name.clone(),
                    date,
                });
            }
        }
        let map = match duty {
            Duty::Dorm => &mut self.dorm,
            Duty::Run(slot) => &mut self.runs[slot.index()],
        };
        map.insert(date, member.map(|m| m.name.clone()));
        Ok(())
    }

    /// Titulaire du créneau, `None` si non assigné ou hors carte.
    pub fn on(&self, duty: Duty, date: NaiveDate) -> Option<&str> {
        self.map(duty).get(&date).and_then(|n| n.as_deref())
    }

    pub fn dorm_on(&self, date: NaiveDate) -> Option<&str> {
        self.on(Duty::Dorm, date)
    }

    pub fn run_on(&self, slot: RunSlot, date: NaiveDate) -> Option<&str> {
        self.on(Duty::Run(slot), date)
    }

    /// Vrai si la carte d'internat connaît cette date.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dorm.contains_key(&date)
    }

    /// Dates de la carte d'internat, croissantes.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dorm.keys().copied()
    }

    /// Dates de tournée activées, croissantes.
    pub fn run_dates(&self) -> Vec<NaiveDate> {
        self.runs[0].keys().copied().collect()
    }

    /// Créneaux non assignés pour une responsabilité, croissants.
    pub fn open_dates(&self, duty: Duty) -> Vec<NaiveDate> {
        self.map(duty)
            .iter()
            .filter(|(_, holder)| holder.is_none())
            .map(|(date, _)| *date)
            .collect()
    }

    /// Jours tenus par `name` pour une responsabilité, croissants.
    pub fn dates_of(&self, duty: Duty, name: &str) -> Vec<NaiveDate> {
        self.map(duty)
            .iter()
            .filter(|(_, holder)| holder.as_deref() == Some(name))
            .map(|(date, _)| *date)
            .collect()
    }

    /// Nombre de jours tenus par `name` pour une responsabilité.
    pub fn count_of(&self, duty: Duty, name: &str) -> usize {
        self.map(duty)
            .values()
            .filter(|holder| holder.as_deref() == Some(name))
            .count()
    }
}
