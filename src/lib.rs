#![forbid(unsafe_code)]
//! Escala: génération mensuelle des escalas d'acólitos (sans BD).
//!
//! - Stockage fichier (JSON), imports/exports CSV.
//! - Calendrier fixe des célébrations, messes votives du 15 et du 19.
//! - Tirage équitable par compteur d'usage, escalas fixes prioritaires.
//! - Binômes indissociables, une seule escala par personne et par jour.

pub mod calendar;
pub mod io;
pub mod model;
pub mod orchestrator;
pub mod scheduler;
pub mod storage;

pub use calendar::{build_slots_for_month, parse_day_ranges, YearMonth};
pub use model::{
    Assignment, Dataset, FixedRule, Gender, Pairing, Pairings, Restriction, Role, Roster, Seat,
    ServiceSlot, SlotKey, Venue, Volunteer, VolunteerId,
};
pub use orchestrator::{clear_month, run, GenerationReport};
pub use scheduler::{
    detect_conflicts, Conflict, ConflictKind, GenError, GenerateOptions, GenerationContext,
    GenerationOutcome, Generator, OutcomeStatus, UsageTracker,
};
pub use storage::{JsonStorage, Storage};
