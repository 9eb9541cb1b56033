use crate::model::{Assignment, Restriction};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

pub(crate) fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub(crate) fn restriction_blocks(restrictions: &[Restriction], name: &str, date: NaiveDate) -> bool {
    restrictions
        .iter()
        .any(|r| r.volunteer_name == name && r.covers(date))
}

/// Noms déjà escalados à `date`, toutes célébrations confondues.
pub(super) fn names_on<'a, I>(assignments: I, date: NaiveDate) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    assignments
        .into_iter()
        .filter(|a| a.date == date)
        .flat_map(|a| a.names().map(str::to_owned))
        .collect()
}
