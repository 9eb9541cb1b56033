use crate::calendar::YearMonth;
use crate::model::{Assignment, Roster, Volunteer, VolunteerId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Surcoût d'usage appliqué à une place obtenue par escala fixe: la personne
/// reste tirable si nécessaire, mais passe derrière tout le monde ce mois-ci.
pub const FIXED_RULE_USAGE_PENALTY: u32 = 50;
pub const NATURAL_USAGE_INCREMENT: u32 = 1;
/// Fenêtre d'historique prise en compte, en mois avant le mois cible.
pub const HISTORY_WINDOW_MONTHS: u32 = 3;

/// Compteur d'usage par acólito, base de la justice du tirage.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    counts: HashMap<VolunteerId, u32>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compte les places occupées dans `[mois - 3, mois)`.
    pub fn seed<'a, I>(roster: &Roster, history: I, month: YearMonth) -> Self
    where
        I: IntoIterator<Item = &'a Assignment>,
    {
        let from = month.months_back(HISTORY_WINDOW_MONTHS).first_day();
        let until = month.first_day();
        let by_name: HashMap<String, &VolunteerId> = roster
            .volunteers
            .iter()
            .map(|v| (v.full_name(), &v.id))
            .collect();

        let mut tracker = Self::new();
        for assignment in history
            .into_iter()
            .filter(|a| a.date >= from && a.date < until)
        {
            for name in assignment.names() {
                if let Some(id) = by_name.get(name) {
                    tracker.bump(id, NATURAL_USAGE_INCREMENT);
                }
            }
        }
        tracker
    }

    pub fn count(&self, id: &VolunteerId) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, id: &VolunteerId, by: u32) {
        *self.counts.entry(id.clone()).or_insert(0) += by;
    }

    /// Annule un `bump` (place retirée après coup).
    pub fn release(&mut self, id: &VolunteerId, by: u32) {
        if let Some(c) = self.counts.get_mut(id) {
            *c = c.saturating_sub(by);
        }
    }

    /// Trie par usage croissant; l'ordre entre ex aequo est aléatoire.
    pub fn order_by_usage<R: Rng + ?Sized>(&self, pool: &mut [&Volunteer], rng: &mut R) {
        pool.shuffle(rng);
        pool.sort_by_key(|v| self.count(&v.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, Seat, Venue};
    use chrono::{NaiveDate, NaiveTime};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn served(y: i32, m: u32, d: u32, names: &[&str]) -> Assignment {
        Assignment {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            venue: Venue::SaoJoseOperario,
            observation: None,
            color: String::new(),
            seats: names
                .iter()
                .enumerate()
                .map(|(i, n)| Seat {
                    name: n.to_string(),
                    role: Role::for_seat(i),
                })
                .collect(),
        }
    }

    #[test]
    fn seed_counts_only_the_trailing_window() {
        let ana = Volunteer::new("Ana", "Souza");
        let bruno = Volunteer::new("Bruno", "");
        let roster = Roster {
            volunteers: vec![ana.clone(), bruno.clone()],
            ..Roster::default()
        };
        let history = vec![
            served(2023, 11, 30, &["Ana Souza", "Bruno"]), // trop ancien
            served(2023, 12, 1, &["Ana Souza", "Bruno"]),
            served(2024, 2, 29, &["Ana Souza", "Ghost"]),
            served(2024, 3, 1, &["Bruno"]), // mois cible
        ];
        let month: YearMonth = "2024-03".parse().unwrap();
        let usage = UsageTracker::seed(&roster, &history, month);
        assert_eq!(usage.count(&ana.id), 2);
        assert_eq!(usage.count(&bruno.id), 1);
    }

    #[test]
    fn least_used_first_with_random_ties() {
        let a = Volunteer::new("A", "");
        let b = Volunteer::new("B", "");
        let c = Volunteer::new("C", "");
        let mut usage = UsageTracker::new();
        usage.bump(&a.id, 3);
        usage.bump(&b.id, FIXED_RULE_USAGE_PENALTY);

        let mut rng = SmallRng::seed_from_u64(7);
        let mut pool = vec![&b, &a, &c];
        usage.order_by_usage(&mut pool, &mut rng);
        let order: Vec<_> = pool.iter().map(|v| v.first_name.as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);

        usage.release(&b.id, FIXED_RULE_USAGE_PENALTY);
        assert_eq!(usage.count(&b.id), 0);
    }
}
