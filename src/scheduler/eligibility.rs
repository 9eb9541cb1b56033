use super::util;
use crate::model::{Gender, Restriction, Role, Volunteer};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

/// Première règle qui empêche un acólito d'occuper une place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    AlreadyScheduledToday,
    Inactive,
    AlreadyInTeam,
    Restricted,
    WeekendOnly,
    NoMissalSkill,
    NoThuribleSkill,
    ThuribleMaleOnly,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ineligibility::AlreadyScheduledToday => "already scheduled that day",
            Ineligibility::Inactive => "inactive",
            Ineligibility::AlreadyInTeam => "already in this team",
            Ineligibility::Restricted => "unavailable (restriction)",
            Ineligibility::WeekendOnly => "weekend only",
            Ineligibility::NoMissalSkill => "does not handle the missal",
            Ineligibility::NoThuribleSkill => "does not handle the thurible",
            Ineligibility::ThuribleMaleOnly => "thurible seat is male-only",
        };
        f.write_str(s)
    }
}

/// État partiel d'une célébration au moment d'évaluer une place.
#[derive(Debug, Clone, Copy)]
pub struct SeatQuery<'a> {
    pub date: NaiveDate,
    pub seat: usize,
    pub team: &'a [String],
    pub scheduled_today: &'a HashSet<String>,
    pub restrictions: &'a [Restriction],
}

/// Évalue les règles dans l'ordre et renvoie la première violée.
pub fn check_seat(volunteer: &Volunteer, q: &SeatQuery<'_>) -> Result<(), Ineligibility> {
    let name = volunteer.full_name();

    if q.scheduled_today.contains(&name) {
        return Err(Ineligibility::AlreadyScheduledToday);
    }
    if !volunteer.active {
        return Err(Ineligibility::Inactive);
    }
    if q.team.iter().any(|n| n == &name) {
        return Err(Ineligibility::AlreadyInTeam);
    }
    if util::restriction_blocks(q.restrictions, &name, q.date) {
        return Err(Ineligibility::Restricted);
    }
    if volunteer.weekend_only && !util::is_weekend(q.date) {
        return Err(Ineligibility::WeekendOnly);
    }
    if q.seat == Role::MISSAL_SEAT && !volunteer.handles_missal {
        return Err(Ineligibility::NoMissalSkill);
    }
    if q.seat == Role::THURIBLE_SEAT {
        if !volunteer.handles_thurible {
            return Err(Ineligibility::NoThuribleSkill);
        }
        // règle métier historique, conservée telle quelle
        if volunteer.gender == Gender::Female {
            return Err(Ineligibility::ThuribleMaleOnly);
        }
    }
    Ok(())
}

pub fn is_eligible(volunteer: &Volunteer, q: &SeatQuery<'_>) -> bool {
    check_seat(volunteer, q).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn server(first: &str) -> Volunteer {
        let mut v = Volunteer::new(first, "Lima");
        v.handles_missal = true;
        v.handles_thurible = true;
        v.gender = Gender::Male;
        v
    }

    fn query<'a>(
        seat: usize,
        day: NaiveDate,
        team: &'a [String],
        today: &'a HashSet<String>,
        restrictions: &'a [Restriction],
    ) -> SeatQuery<'a> {
        SeatQuery {
            date: day,
            seat,
            team,
            scheduled_today: today,
            restrictions,
        }
    }

    #[test]
    fn fully_qualified_volunteer_fits_every_seat() {
        let v = server("Caio");
        let today = HashSet::new();
        for seat in 0..5 {
            let q = query(seat, date(2024, 3, 6), &[], &today, &[]);
            assert_eq!(check_seat(&v, &q), Ok(()));
        }
    }

    #[test]
    fn same_day_exclusion_is_checked_first() {
        let mut v = server("Caio");
        v.active = false;
        let today: HashSet<String> = ["Caio Lima".to_string()].into();
        let q = query(1, date(2024, 3, 6), &[], &today, &[]);
        assert_eq!(check_seat(&v, &q), Err(Ineligibility::AlreadyScheduledToday));
    }

    #[test]
    fn inactive_and_team_duplicates_are_rejected() {
        let mut v = server("Caio");
        let today = HashSet::new();
        let team = vec!["Caio Lima".to_string()];
        let q = query(1, date(2024, 3, 6), &team, &today, &[]);
        assert_eq!(check_seat(&v, &q), Err(Ineligibility::AlreadyInTeam));

        v.active = false;
        let q = query(1, date(2024, 3, 6), &[], &today, &[]);
        assert_eq!(check_seat(&v, &q), Err(Ineligibility::Inactive));
    }

    #[test]
    fn any_overlapping_restriction_blocks_inclusively() {
        let v = server("Caio");
        let today = HashSet::new();
        let restrictions = vec![
            Restriction::new("Caio Lima", date(2024, 3, 1), date(2024, 3, 3)).unwrap(),
            Restriction::new("Caio Lima", date(2024, 3, 3), date(2024, 3, 10)).unwrap(),
        ];
        for d in [1, 3, 10] {
            let q = query(1, date(2024, 3, d), &[], &today, &restrictions);
            assert_eq!(check_seat(&v, &q), Err(Ineligibility::Restricted));
        }
        let q = query(1, date(2024, 3, 11), &[], &today, &restrictions);
        assert!(is_eligible(&v, &q));
    }

    #[test]
    fn weekend_only_volunteer_skips_weekdays() {
        let mut v = server("Caio");
        v.weekend_only = true;
        let today = HashSet::new();
        // 2024-03-06 mercredi, 2024-03-09 samedi
        let q = query(1, date(2024, 3, 6), &[], &today, &[]);
        assert_eq!(check_seat(&v, &q), Err(Ineligibility::WeekendOnly));
        let q = query(1, date(2024, 3, 9), &[], &today, &[]);
        assert!(is_eligible(&v, &q));
    }

    #[test]
    fn skill_and_gender_gates() {
        let today = HashSet::new();
        let d = date(2024, 3, 10);

        let mut no_missal = server("Ana");
        no_missal.handles_missal = false;
        assert_eq!(
            check_seat(&no_missal, &query(0, d, &[], &today, &[])),
            Err(Ineligibility::NoMissalSkill)
        );
        assert!(is_eligible(&no_missal, &query(1, d, &[], &today, &[])));

        let mut no_thurible = server("Beto");
        no_thurible.handles_thurible = false;
        assert_eq!(
            check_seat(&no_thurible, &query(2, d, &[], &today, &[])),
            Err(Ineligibility::NoThuribleSkill)
        );

        let mut female = server("Clara");
        female.gender = Gender::Female;
        assert_eq!(
            check_seat(&female, &query(2, d, &[], &today, &[])),
            Err(Ineligibility::ThuribleMaleOnly)
        );
        assert!(is_eligible(&female, &query(3, d, &[], &today, &[])));
    }
}
