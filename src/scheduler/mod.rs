mod assembler;
mod conflicts;
pub mod eligibility;
pub mod fairness;
mod types;
pub(crate) mod util;

pub use assembler::MAX_DRAW_ATTEMPTS;
pub use conflicts::detect_conflicts;
pub use eligibility::{check_seat, is_eligible, Ineligibility, SeatQuery};
pub use fairness::{UsageTracker, FIXED_RULE_USAGE_PENALTY, HISTORY_WINDOW_MONTHS};
pub use types::{
    Conflict, ConflictKind, GenError, GenerateOptions, GenerationOutcome, OutcomeStatus,
};

use crate::calendar::{self, YearMonth};
use crate::model::{Assignment, Dataset, FixedRule, Restriction, Roster, ServiceSlot, SlotKey};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Instantané immuable consommé par une génération.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub roster: Roster,
    pub restrictions: Vec<Restriction>,
    pub fixed_rules: Vec<FixedRule>,
    /// Escalas déjà persistées (historique et mois cible).
    pub history: Vec<Assignment>,
}

impl GenerationContext {
    pub fn from_dataset(data: &Dataset) -> Self {
        Self {
            roster: data.roster.clone(),
            restrictions: data.restrictions.clone(),
            fixed_rules: data.fixed_rules.clone(),
            history: data.assignments.clone(),
        }
    }

    /// Erreurs structurelles: rien n'est généré si l'une d'elles est présente.
    pub fn validate(&self) -> Result<(), GenError> {
        if self.roster.active().next().is_none() {
            return Err(GenError::EmptyRoster);
        }
        if let Some(rule) = self
            .fixed_rules
            .iter()
            .find(|r| !(1..=31).contains(&r.day_of_month))
        {
            return Err(GenError::InvalidFixedRule {
                name: rule.volunteer_name.clone(),
                day: rule.day_of_month,
            });
        }
        if let Some(r) = self.restrictions.iter().find(|r| r.end < r.start) {
            return Err(GenError::InvalidRestriction(r.volunteer_name.clone()));
        }
        Ok(())
    }
}

/// Générateur d'escalas: encapsule l'instantané et la source d'aléa du tirage.
#[derive(Debug)]
pub struct Generator {
    ctx: GenerationContext,
    rng: SmallRng,
}

impl Generator {
    pub fn new(ctx: GenerationContext) -> Self {
        Self {
            ctx,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Départage reproductible des ex aequo.
    pub fn with_seed(ctx: GenerationContext, seed: u64) -> Self {
        Self {
            ctx,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn build_slots(&self, month: YearMonth, opts: &GenerateOptions) -> Vec<ServiceSlot> {
        calendar::build_slots_for_month(month, opts)
    }

    /// Génère les escalas manquantes du mois, sans aucune écriture.
    pub fn generate(
        &mut self,
        month: YearMonth,
        opts: &GenerateOptions,
    ) -> Result<GenerationOutcome, GenError> {
        self.ctx.validate()?;

        let slots = self.build_slots(month, opts);
        let persisted: Vec<&Assignment> = self
            .ctx
            .history
            .iter()
            .filter(|a| !(opts.clear_existing && month.contains(a.date)))
            .collect();
        let existing: HashSet<SlotKey> = persisted.iter().map(|a| a.key()).collect();

        let mut usage = UsageTracker::seed(&self.ctx.roster, &self.ctx.history, month);
        let mut outcome = GenerationOutcome {
            slots_considered: slots.len(),
            ..GenerationOutcome::default()
        };

        for slot in &slots {
            let key = slot.key();
            if existing.contains(&key) {
                outcome.skipped_existing += 1;
                continue;
            }

            let scheduled_today = util::names_on(
                persisted
                    .iter()
                    .copied()
                    .chain(outcome.assignments.iter()),
                slot.date,
            );

            match assembler::assemble_team(
                &self.ctx,
                slot,
                &scheduled_today,
                &mut usage,
                &mut self.rng,
            ) {
                Some(seats) => {
                    debug!(slot = %key, team = seats.len(), "slot filled");
                    outcome.assignments.push(Assignment {
                        date: slot.date,
                        time: key.time,
                        venue: slot.venue,
                        observation: slot.observation.clone(),
                        color: slot.color.clone(),
                        seats,
                    });
                }
                None => outcome.unfilled.push(key),
            }
        }

        if outcome.shortfall() > 0 {
            warn!(
                month = %month,
                unfilled = outcome.shortfall(),
                "fewer schedules generated than requested"
            );
        }
        info!(
            month = %month,
            considered = outcome.slots_considered,
            generated = outcome.assignments.len(),
            skipped = outcome.skipped_existing,
            "generation finished"
        );
        Ok(outcome)
    }
}
