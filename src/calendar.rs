use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Duration, NaiveDate};

/// Format de date attendu partout en entrée (fichiers et CLI).
pub const DATE_FMT: &str = "%m/%d/%Y";

/// Parse une date `mm/dd/yyyy`.
pub fn parse_date(raw: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FMT).map_err(|source| ScheduleError::Format {
        input: raw.trim().to_string(),
        source,
    })
}

/// Fenêtre d'exclusion : un jour isolé ou un intervalle fermé.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Day(NaiveDate),
    Range(NaiveDate, NaiveDate),
}

impl Exclusion {
    /// Parse `mm/dd/yyyy` ou `mm/dd/yyyy - mm/dd/yyyy`.
    pub fn parse(raw: &str) -> ScheduleResult<Self> {
        match raw.split_once('-') {
            Some((start, end)) => Ok(Self::Range(parse_date(start)?, parse_date(end)?)),
            None => Ok(Self::Day(parse_date(raw)?)),
        }
    }

    fn covers(&self, date: NaiveDate) -> bool {
        match *self {
            Self::Day(d) => d == date,
            Self::Range(start, end) => start <= date && date <= end,
        }
    }
}

/// Suite ordonnée des jours actifs d'une année scolaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    dates: Vec<NaiveDate>,
}

impl Calendar {
    /// Construit `[start, end]` moins les jours exclus. Fonction pure :
    /// une exclusion entièrement hors de l'intervalle est sans effet,
    /// `start > end` donne un calendrier vide.
    pub fn build(start: NaiveDate, end: NaiveDate, exclusions: &[Exclusion]) -> Self {
        let mut dates = Vec::new();
        let mut date = start;
        while date <= end {
            if !exclusions.iter().any(|x| x.covers(date)) {
                dates.push(date);
            }
            date += Duration::days(1);
        }
        Self { dates }
    }

    /// Variante sur chaînes `mm/dd/yyyy`, comme les fichiers d'entrée.
    pub fn from_strs(start: &str, end: &str, skips: &[&str]) -> ScheduleResult<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let exclusions = skips
            .iter()
            .map(|raw| Exclusion::parse(raw))
            .collect::<ScheduleResult<Vec<_>>>()?;
        Ok(Self::build(start, end, &exclusions))
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
