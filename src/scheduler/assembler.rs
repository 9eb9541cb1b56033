use super::eligibility::{self, SeatQuery};
use super::fairness::{UsageTracker, FIXED_RULE_USAGE_PENALTY, NATURAL_USAGE_INCREMENT};
use super::GenerationContext;
use crate::calendar::VOTIVE_EXTRA_SEAT_TEAM_SIZE;
use crate::model::{Role, Seat, ServiceSlot, Volunteer};
use chrono::Datelike;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Borne du tirage, contre les boucles pathologiques.
pub const MAX_DRAW_ATTEMPTS: usize = 500;

struct Pick<'a> {
    volunteer: &'a Volunteer,
    weight: u32,
}

/// Équipe en cours de constitution; chaque place garde son poids d'usage
/// pour pouvoir être rendue.
struct Draft<'a> {
    picks: Vec<Pick<'a>>,
    names: Vec<String>,
}

impl<'a> Draft<'a> {
    fn new() -> Self {
        Self {
            picks: Vec::new(),
            names: Vec::new(),
        }
    }

    fn len(&self) -> usize {
        self.picks.len()
    }

    fn push(&mut self, volunteer: &'a Volunteer, weight: u32, usage: &mut UsageTracker) {
        usage.bump(&volunteer.id, weight);
        self.names.push(volunteer.full_name());
        self.picks.push(Pick { volunteer, weight });
    }

    fn pop(&mut self, usage: &mut UsageTracker) -> Option<&'a Volunteer> {
        let pick = self.picks.pop()?;
        self.names.pop();
        usage.release(&pick.volunteer.id, pick.weight);
        Some(pick.volunteer)
    }

    fn last(&self) -> Option<&'a Volunteer> {
        self.picks.last().map(|p| p.volunteer)
    }

    fn release_all(&mut self, usage: &mut UsageTracker) {
        while self.pop(usage).is_some() {}
    }

    fn into_seats(self) -> Vec<Seat> {
        self.names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Seat {
                name,
                role: Role::for_seat(i),
            })
            .collect()
    }
}

/// Compose l'équipe d'une célébration: escala fixe, puis tirage équitable,
/// puis correction de parité. `None` si aucune équipe viable.
pub(super) fn assemble_team<R: Rng + ?Sized>(
    ctx: &GenerationContext,
    slot: &ServiceSlot,
    scheduled_today: &HashSet<String>,
    usage: &mut UsageTracker,
    rng: &mut R,
) -> Option<Vec<Seat>> {
    let size = slot.team_size;
    let mut draft = Draft::new();

    let fits = |v: &Volunteer, seat: usize, team: &[String]| {
        eligibility::is_eligible(
            v,
            &SeatQuery {
                date: slot.date,
                seat,
                team,
                scheduled_today,
                restrictions: &ctx.restrictions,
            },
        )
    };

    for rule in ctx
        .fixed_rules
        .iter()
        .filter(|r| r.day_of_month == slot.date.day())
    {
        if draft.len() >= size {
            break;
        }
        let Some(lead) = ctx.roster.find_by_full_name(&rule.volunteer_name) else {
            debug!(name = %rule.volunteer_name, "fixed rule names an unknown volunteer");
            continue;
        };
        if !fits(lead, draft.len(), &draft.names) {
            continue;
        }
        draft.push(lead, FIXED_RULE_USAGE_PENALTY, usage);

        if let Some(partner) = ctx.roster.partner_of(lead) {
            if draft.len() < size && fits(partner, draft.len(), &draft.names) {
                draft.push(partner, FIXED_RULE_USAGE_PENALTY, usage);
            }
        }
    }

    let mut attempts = 0usize;
    while draft.len() < size && attempts < MAX_DRAW_ATTEMPTS {
        let seat = draft.len();
        let remaining = size - seat;

        let mut pool: Vec<&Volunteer> = ctx
            .roster
            .active()
            .filter(|v| fits(v, seat, &draft.names))
            .filter(|v| remaining >= 2 || ctx.roster.partner_of(v).is_none())
            .collect();
        usage.order_by_usage(&mut pool, rng);

        let chosen = pool
            .into_iter()
            .find_map(|candidate| match ctx.roster.partner_of(candidate) {
                None => Some((candidate, None)),
                Some(partner) => {
                    fits(partner, seat + 1, &draft.names).then_some((candidate, Some(partner)))
                }
            });

        let Some((candidate, partner)) = chosen else {
            break;
        };
        draft.push(candidate, NATURAL_USAGE_INCREMENT, usage);
        if let Some(partner) = partner {
            draft.push(partner, NATURAL_USAGE_INCREMENT, usage);
        }
        attempts += 1;
    }

    if size == VOTIVE_EXTRA_SEAT_TEAM_SIZE && draft.len() == size - 1 {
        // un binôme ne se sépare pas: le partenaire du retiré part avec lui
        if let Some(dropped) = draft.pop(usage) {
            let partner = ctx.roster.partner_of(dropped);
            if partner.is_some_and(|p| draft.last().is_some_and(|l| l.id == p.id)) {
                draft.pop(usage);
            }
            debug!(slot = %slot.key(), "odd team trimmed");
        }
    }

    let viable = if size == 1 {
        draft.len() == 1
    } else {
        draft.len() >= 2
    };
    if !viable {
        debug!(slot = %slot.key(), seated = draft.len(), wanted = size, "no viable team");
        draft.release_all(usage);
        return None;
    }

    Some(draft.into_seats())
}
