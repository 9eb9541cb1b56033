//! Exécution complète d'une génération: lecture, calcul, écriture en un lot.

use crate::calendar::YearMonth;
use crate::model::{Dataset, SlotKey};
use crate::scheduler::{GenError, GenerateOptions, GenerationContext, Generator, OutcomeStatus};
use crate::storage::Storage;
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

/// Bilan d'une exécution, destiné à l'appelant (CLI, UI).
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub month: YearMonth,
    pub slots_considered: usize,
    pub skipped_existing: usize,
    pub generated: usize,
    pub cleared: usize,
    /// Escalas écartées au moment d'écrire car la clé existait déjà.
    pub dropped_at_write: usize,
    pub unfilled: Vec<SlotKey>,
    pub status: OutcomeStatus,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} slot(s) considered, {} generated, {} already present",
            self.month, self.slots_considered, self.generated, self.skipped_existing
        )?;
        if self.cleared > 0 {
            write!(f, ", {} cleared", self.cleared)?;
        }
        if self.dropped_at_write > 0 {
            write!(f, ", {} dropped at write", self.dropped_at_write)?;
        }
        if !self.unfilled.is_empty() {
            write!(f, ", {} could not be staffed", self.unfilled.len())?;
        }
        match self.status {
            OutcomeStatus::Generated(_) => Ok(()),
            OutcomeStatus::NothingToGenerate => f.write_str(" (nothing to generate)"),
            OutcomeStatus::NothingCouldBeGenerated => f.write_str(" (nothing could be generated)"),
        }
    }
}

/// Charge l'instantané, génère le mois et persiste le lot en une écriture.
///
/// Le jeu de données est relu juste avant l'écriture: toute escala dont la
/// clé (date, lieu, heure) est apparue entre-temps est écartée.
pub fn run<S: Storage + ?Sized>(
    storage: &S,
    month: YearMonth,
    opts: &GenerateOptions,
    seed: Option<u64>,
) -> Result<GenerationReport, GenError> {
    let snapshot = storage.load()?;
    let ctx = GenerationContext::from_dataset(&snapshot);
    let mut generator = match seed {
        Some(seed) => Generator::with_seed(ctx, seed),
        None => Generator::new(ctx),
    };
    let outcome = generator.generate(month, opts)?;

    let mut current = storage.load()?;
    let cleared = if opts.clear_existing {
        remove_month(&mut current, month)
    } else {
        0
    };

    let existing: HashSet<SlotKey> = current.assignments.iter().map(|a| a.key()).collect();
    let mut dropped_at_write = 0usize;
    let mut generated = 0usize;
    for assignment in outcome.assignments.iter().cloned() {
        if existing.contains(&assignment.key()) {
            warn!(slot = %assignment.key(), "already persisted, not written twice");
            dropped_at_write += 1;
            continue;
        }
        current.assignments.push(assignment);
        generated += 1;
    }

    if generated > 0 || cleared > 0 {
        current.assignments.sort_by_key(|a| (a.date, a.time));
        storage.save(&current)?;
    }
    info!(month = %month, generated, cleared, "batch written");

    let status = match (generated, outcome.status()) {
        (0, OutcomeStatus::Generated(_)) => OutcomeStatus::NothingToGenerate,
        (0, other) => other,
        (n, _) => OutcomeStatus::Generated(n),
    };
    Ok(GenerationReport {
        month,
        slots_considered: outcome.slots_considered,
        skipped_existing: outcome.skipped_existing,
        generated,
        cleared,
        dropped_at_write,
        unfilled: outcome.unfilled,
        status,
    })
}

/// Supprime toutes les escalas du mois (destructif).
pub fn clear_month<S: Storage + ?Sized>(storage: &S, month: YearMonth) -> anyhow::Result<usize> {
    let mut data = storage.load()?;
    let removed = remove_month(&mut data, month);
    if removed > 0 {
        storage.save(&data)?;
    }
    info!(month = %month, removed, "month cleared");
    Ok(removed)
}

fn remove_month(data: &mut Dataset, month: YearMonth) -> usize {
    let before = data.assignments.len();
    data.assignments.retain(|a| !month.contains(a.date));
    before - data.assignments.len()
}
