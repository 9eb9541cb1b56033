use crate::model::{Assignment, SlotKey};
use chrono::NaiveDate;
use thiserror::Error;

/// Options de génération
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Ignore (puis remplace) les escalas déjà persistées du mois.
    pub clear_existing: bool,
    /// Équipe de 4 (avec turíbulo) pour la messe votive du 19.
    pub include_day19_extra_seat: bool,
    /// Un seul acólito le mercredi et le vendredi.
    pub reduce_weekday_team_to_one: bool,
    /// Jours du mois sans célébration.
    pub excluded_days: Vec<u32>,
    /// Pas de génération rétroactive avant cette date ("aujourd'hui").
    pub not_before: Option<NaiveDate>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            clear_existing: false,
            include_day19_extra_seat: true,
            reduce_weekday_team_to_one: false,
            excluded_days: Vec::new(),
            not_before: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictKind {
    DoubleBooking,
    DuplicateSeat,
    MissalSkill,
    ThuribleSkill,
    ThuribleGender,
    Restricted,
    PartnerSplit,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::DoubleBooking => "double",
            ConflictKind::DuplicateSeat => "duplicate",
            ConflictKind::MissalSkill => "missal",
            ConflictKind::ThuribleSkill => "thurible",
            ConflictKind::ThuribleGender => "thurible-gender",
            ConflictKind::Restricted => "restricted",
            ConflictKind::PartnerSplit => "partner",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Conflict {
    pub name: String,
    pub slot: SlotKey,
    pub other: Option<SlotKey>,
    pub kind: ConflictKind,
}

#[derive(Error, Debug)]
pub enum GenError {
    #[error("invalid month: {0} (expected YYYY-MM)")]
    InvalidMonth(String),
    #[error("invalid day range: {0}")]
    InvalidDayRange(String),
    #[error("empty roster: no active volunteer to schedule")]
    EmptyRoster,
    #[error("invalid fixed rule for {name}: day {day}")]
    InvalidFixedRule { name: String, day: u32 },
    #[error("invalid restriction for {0}: end before start")]
    InvalidRestriction(String),
    #[error("unknown volunteer: {0}")]
    UnknownVolunteer(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Résultat d'une génération (avant écriture).
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub assignments: Vec<Assignment>,
    /// Créneaux produits par le calendrier pour le mois.
    pub slots_considered: usize,
    /// Créneaux déjà persistés, non régénérés.
    pub skipped_existing: usize,
    /// Créneaux qu'aucune équipe viable n'a pu couvrir.
    pub unfilled: Vec<SlotKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Generated(usize),
    /// Rien à faire: aucun créneau, ou tous existent déjà.
    NothingToGenerate,
    /// Des créneaux étaient à pourvoir mais aucun n'a pu l'être.
    NothingCouldBeGenerated,
}

impl GenerationOutcome {
    pub fn status(&self) -> OutcomeStatus {
        if !self.assignments.is_empty() {
            OutcomeStatus::Generated(self.assignments.len())
        } else if self.unfilled.is_empty() {
            OutcomeStatus::NothingToGenerate
        } else {
            OutcomeStatus::NothingCouldBeGenerated
        }
    }

    /// Nombre de créneaux à pourvoir qui n'ont pas abouti.
    pub fn shortfall(&self) -> usize {
        self.unfilled.len()
    }
}
