use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Rôle d'un membre du personnel d'internat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Vacataire : part de charge réduite en semaine.
    Adjunct,
    /// Résident à l'internat.
    Residential,
    /// Responsable d'internat : reçoit d'office les jours charnières.
    Head,
    /// Ne participe qu'aux tournées (jamais à la permanence d'internat).
    Hospital,
}

impl FromStr for Role {
    type Err = ScheduleError;

    fn from_str(s: &str) -> ScheduleResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adjunct" => Ok(Self::Adjunct),
            "residential" => Ok(Self::Residential),
            "head" => Ok(Self::Head),
            "hospital" => Ok(Self::Hospital),
            other => Err(ScheduleError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Adjunct => "adjunct",
            Self::Residential => "residential",
            Self::Head => "head",
            Self::Hospital => "hospital",
        };
        f.write_str(s)
    }
}

/// Part de charge pour la permanence d'internat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Load {
    Partial,
    Full,
}

impl FromStr for Load {
    type Err = ScheduleError;

    fn from_str(s: &str) -> ScheduleResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" => Ok(Self::Partial),
            "full" => Ok(Self::Full),
            other => Err(ScheduleError::InvalidLoad(other.to_string())),
        }
    }
}

/// Membre du personnel.
///
/// La charge est déduite du rôle quand elle n'est pas donnée : `Hospital` n'en
/// porte aucune, `Adjunct` est partielle, tout le reste est pleine. Deux
/// membres partageant un `family` ne doivent jamais tenir deux rôles le même
/// jour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Faculty {
    pub name: String,
    pub role: Role,
    pub load: Option<Load>,
    pub family: Option<String>,
    pub unavailable_dates: BTreeSet<NaiveDate>,
    pub unavailable_dows: Vec<Weekday>,
}

impl Faculty {
    pub fn new<N: Into<String>>(name: N, role: Role) -> Self {
        let load = match role {
            Role::Hospital => None,
            Role::Adjunct => Some(Load::Partial),
            Role::Residential | Role::Head => Some(Load::Full),
        };
        Self {
            name: name.into(),
            role,
            load,
            family: None,
            unavailable_dates: BTreeSet::new(),
            unavailable_dows: Vec::new(),
        }
    }

    /// Variante avec charge explicite (prioritaire sur l'inférence).
    pub fn with_load<N: Into<String>>(name: N, role: Role, load: Load) -> Self {
        let mut f = Self::new(name, role);
        f.load = Some(load);
        f
    }

    pub fn family<F: Into<String>>(mut self, family: F) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn set_unavailable_date(&mut self, date: NaiveDate) {
        self.unavailable_dates.insert(date);
    }

    pub fn set_unavailable_dow(&mut self, dow: Weekday) {
        if !self.unavailable_dows.contains(&dow) {
            self.unavailable_dows.push(dow);
        }
    }

    pub fn is_unavailable(&self, date: NaiveDate) -> bool {
        self.unavailable_dates.contains(&date) || self.unavailable_dows.contains(&date.weekday())
    }
}

/// Effectif complet d'un internat.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    members: Vec<Faculty>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, member: Faculty) -> ScheduleResult<()> {
        if self.get(&member.name).is_some() {
            return Err(ScheduleError::DuplicateMember(member.name));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Faculty> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Faculty> {
        self.members.iter_mut().find(|m| m.name == name)
    }

    /// Lookup strict, pour les chemins où le nom vient du moteur lui-même.
    pub fn require(&self, name: &str) -> ScheduleResult<&Faculty> {
        self.get(name)
            .ok_or_else(|| ScheduleError::UnknownMember(name.to_string()))
    }

    pub fn members(&self) -> &[Faculty] {
        &self.members
    }

    /// Membres éligibles à la permanence d'internat (tous sauf `Hospital`).
    pub fn dorm_pool(&self) -> impl Iterator<Item = &Faculty> {
        self.members.iter().filter(|m| m.role != Role::Hospital)
    }

    /// Membres éligibles aux tournées (tout le monde).
    pub fn run_pool(&self) -> &[Faculty] {
        &self.members
    }

    pub fn head(&self) -> Option<&Faculty> {
        self.members.iter().find(|m| m.role == Role::Head)
    }

    /// Vrai si `a` et le titulaire `b` (éventuel) partagent une famille.
    pub fn same_family(&self, a: &Faculty, b: Option<&str>) -> bool {
        let (Some(group), Some(b)) = (a.family.as_deref(), b) else {
            return false;
        };
        if a.name == b {
            return false;
        }
        self.get(b)
            .and_then(|other| other.family.as_deref())
            .is_some_and(|other_group| other_group == group)
    }
}

/// Découpage de la semaine d'internat : la « semaine » court du dimanche au
/// jeudi, le « week-end » couvre vendredi et samedi. Valeur de contexte
/// immuable partagée par tous les composants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekShape {
    pub school_nights: [Weekday; 5],
    pub weekend: [Weekday; 2],
}

impl Default for WeekShape {
    fn default() -> Self {
        Self {
            school_nights: [
                Weekday::Sun,
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
            ],
            weekend: [Weekday::Fri, Weekday::Sat],
        }
    }
}

impl WeekShape {
    pub fn is_school_night(&self, dow: Weekday) -> bool {
        self.school_nights.contains(&dow)
    }

    pub fn is_weekend(&self, dow: Weekday) -> bool {
        self.weekend.contains(&dow)
    }

    pub fn friday(&self) -> Weekday {
        self.weekend[0]
    }

    pub fn saturday(&self) -> Weekday {
        self.weekend[1]
    }
}
