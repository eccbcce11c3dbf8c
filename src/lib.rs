#![forbid(unsafe_code)]
//! Internat — génération de planning de permanences d'internat (sans BD).
//!
//! - Calendrier d'année scolaire avec fenêtres d'exclusion.
//! - Titulaires par défaut en semaine, rotation round-robin des week-ends.
//! - Rééquilibrage glouton des charges, deux tournées quotidiennes.
//! - Calcul batch, déterministe à graine fixée ; exports CSV/JSON à part.

pub mod calendar;
pub mod error;
#[cfg(feature = "serde")]
pub mod io;
pub mod ledger;
pub mod model;
pub mod scheduler;

pub use calendar::{Calendar, Exclusion};
pub use error::{ScheduleError, ScheduleResult};
pub use ledger::{Duty, Ledger, RunSlot};
pub use model::{Faculty, Load, Role, Roster, WeekShape};
pub use scheduler::{DutyCounts, RotationList, Scheduler, TERMS};
