//! Calendrier des célébrations: règles de récurrence fixes par jour de semaine,
//! plus les messes votives du 15 et du 19.

use crate::model::{ServiceSlot, SlotKey, Venue};
use crate::scheduler::{GenError, GenerateOptions};
use chrono::{Datelike, Months, NaiveDate, NaiveTime, Weekday};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TEAM_SIZE: usize = 2;
pub const VOTIVE_EXTRA_SEAT_TEAM_SIZE: usize = 4;

const ABADIA_VOTIVE_DAY: u32 = 15;
const SAO_JOSE_VOTIVE_DAY: u32 = 19;
const ABADIA_VOTIVE: &str = "Missa Votiva Nsa. Sra. da Abadia";
const SAO_JOSE_VOTIVE: &str = "Missa Votiva de São José";

/// Mois cible (`YYYY-MM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, GenError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| GenError::InvalidMonth(format!("{year}-{month:02}")))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // validé à la construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn months_back(&self, n: u32) -> Self {
        let date = self
            .first_day()
            .checked_sub_months(Months::new(n))
            .unwrap_or_else(|| self.first_day());
        Self::of(date)
    }
}

impl FromStr for YearMonth {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GenError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.is_empty() || m.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parse une liste de jours `"3,10-12"` (bornes incluses, 1..=31).
pub fn parse_day_ranges(raw: &str) -> Result<Vec<u32>, GenError> {
    let mut days = BTreeSet::new();
    for chunk in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let invalid = || GenError::InvalidDayRange(chunk.to_string());
        let (start, end) = match chunk.split_once('-') {
            Some((a, b)) => (
                a.trim().parse::<u32>().map_err(|_| invalid())?,
                b.trim().parse::<u32>().map_err(|_| invalid())?,
            ),
            None => {
                let d = chunk.parse::<u32>().map_err(|_| invalid())?;
                (d, d)
            }
        };
        if !(1..=31).contains(&start) || !(1..=31).contains(&end) || end < start {
            return Err(invalid());
        }
        days.extend(start..=end);
    }
    Ok(days.into_iter().collect())
}

/// Construit la liste ordonnée (date puis heure) des célébrations du mois.
pub fn build_slots_for_month(month: YearMonth, opts: &GenerateOptions) -> Vec<ServiceSlot> {
    let mut seen: BTreeSet<SlotKey> = BTreeSet::new();
    let mut slots = Vec::new();

    for date in month.days() {
        if opts.not_before.is_some_and(|today| date < today) {
            continue;
        }
        if opts.excluded_days.contains(&date.day()) {
            continue;
        }
        for slot in slots_for_day(date, opts) {
            if seen.insert(slot.key()) {
                slots.push(slot);
            }
        }
    }

    slots.sort_by_key(|s| (s.date, s.time));
    slots
}

fn slots_for_day(date: NaiveDate, opts: &GenerateOptions) -> Vec<ServiceSlot> {
    let day = date.day();
    let weekday = date.weekday();

    let times: Vec<(NaiveTime, Venue)> = if weekday == Weekday::Sun {
        vec![
            (hm(7, 30), Venue::SantaClara),
            (hm(9, 0), Venue::SaoJoseOperario),
            (hm(17, 30), Venue::NossaSenhoraDaAbadia),
            (hm(19, 0), Venue::SaoJoseOperario),
        ]
    } else if day == ABADIA_VOTIVE_DAY {
        vec![(hm(19, 0), Venue::NossaSenhoraDaAbadia)]
    } else if day == SAO_JOSE_VOTIVE_DAY {
        vec![(hm(19, 0), Venue::SaoJoseOperario)]
    } else {
        match weekday {
            Weekday::Mon => vec![(hm(19, 30), Venue::SaoJoseOperario)],
            Weekday::Wed | Weekday::Fri => vec![(hm(19, 0), Venue::SaoJoseOperario)],
            Weekday::Sat => vec![(hm(19, 0), Venue::NossaSenhoraDasGracas)],
            _ => Vec::new(),
        }
    };

    times
        .into_iter()
        .map(|(time, venue)| {
            let mut team_size = DEFAULT_TEAM_SIZE;
            let mut observation = None;

            if day == SAO_JOSE_VOTIVE_DAY && venue == Venue::SaoJoseOperario {
                observation = Some(SAO_JOSE_VOTIVE.to_string());
                if opts.include_day19_extra_seat {
                    team_size = VOTIVE_EXTRA_SEAT_TEAM_SIZE;
                }
            } else if day == ABADIA_VOTIVE_DAY && venue == Venue::NossaSenhoraDaAbadia {
                observation = Some(ABADIA_VOTIVE.to_string());
            } else if opts.reduce_weekday_team_to_one
                && matches!(weekday, Weekday::Wed | Weekday::Fri)
            {
                team_size = 1;
            }

            ServiceSlot {
                date,
                time,
                venue,
                team_size,
                observation,
                color: venue.color().to_string(),
            }
        })
        .collect()
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
