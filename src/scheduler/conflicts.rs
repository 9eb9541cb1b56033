use super::{util, Conflict, ConflictKind};
use crate::model::{Assignment, Gender, Restriction, Role, Roster};
use std::collections::HashMap;

/// Contrôle un ensemble d'escalas contre les règles dures.
///
/// Les noms absents du roster (saisies manuelles) ne sont contrôlés que pour
/// les doublons et les restrictions.
pub fn detect_conflicts(
    roster: &Roster,
    restrictions: &[Restriction],
    assignments: &[Assignment],
) -> Vec<Conflict> {
    let mut out = Vec::new();

    for a in assignments {
        let key = a.key();
        let mut push = |name: &str, kind: ConflictKind| {
            out.push(Conflict {
                name: name.to_string(),
                slot: key,
                other: None,
                kind,
            })
        };

        for (idx, seat) in a.seats.iter().enumerate() {
            if a.seats[..idx].iter().any(|s| s.name == seat.name) {
                push(&seat.name, ConflictKind::DuplicateSeat);
            }
            if util::restriction_blocks(restrictions, &seat.name, a.date) {
                push(&seat.name, ConflictKind::Restricted);
            }

            let Some(v) = roster.find_by_full_name(&seat.name) else {
                continue;
            };
            if idx == Role::MISSAL_SEAT && !v.handles_missal {
                push(&seat.name, ConflictKind::MissalSkill);
            }
            if idx == Role::THURIBLE_SEAT {
                if !v.handles_thurible {
                    push(&seat.name, ConflictKind::ThuribleSkill);
                }
                if v.gender == Gender::Female {
                    push(&seat.name, ConflictKind::ThuribleGender);
                }
            }
            if let Some(partner) = roster.active_partner_of(v) {
                if !a.contains(&partner.full_name()) {
                    push(&seat.name, ConflictKind::PartnerSplit);
                }
            }
        }
    }

    let mut by_day: HashMap<(chrono::NaiveDate, &str), &Assignment> = HashMap::new();
    let mut ordered: Vec<&Assignment> = assignments.iter().collect();
    ordered.sort_by_key(|a| a.key());
    for a in ordered {
        for name in a.names() {
            if let Some(first) = by_day.get(&(a.date, name)) {
                if first.key() != a.key() {
                    out.push(Conflict {
                        name: name.to_string(),
                        slot: a.key(),
                        other: Some(first.key()),
                        kind: ConflictKind::DoubleBooking,
                    });
                }
            } else {
                by_day.insert((a.date, name), a);
            }
        }
    }

    out
}
