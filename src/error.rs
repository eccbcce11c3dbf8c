use chrono::NaiveDate;
use thiserror::Error;

/// Alias de résultat pour toutes les opérations de planification.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Erreurs de la bibliothèque.
///
/// `Unavailable` est récupérable localement (le composant appelant passe au
/// candidat suivant) ; tout le reste est fatal pour le run en cours.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid load: {0}")]
    InvalidLoad(String),

    #[error("duplicate member: {0}")]
    DuplicateMember(String),

    #[error("unknown member: {0}")]
    UnknownMember(String),

    #[error("roster too small: {0}")]
    RosterTooSmall(&'static str),

    #[error("{name} unavailable on {date}")]
    Unavailable { name: String, date: NaiveDate },

    #[error("{what}: gave up after {attempts} attempts")]
    RetriesExhausted { what: &'static str, attempts: usize },

    #[error("no eligible candidate for {what} on {date}")]
    NoCandidate { what: &'static str, date: NaiveDate },

    #[error("{what} rebalancing stuck after {iterations} iterations (load spread {spread:.2})")]
    Unbalanced {
        what: &'static str,
        iterations: usize,
        spread: f64,
    },

    #[error("invalid date {input:?}")]
    Format {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScheduleError {
    /// Vrai pour les échecs d'écriture récupérables (candidat suivant).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
