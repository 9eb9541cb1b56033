#![forbid(unsafe_code)]
use chrono::{Datelike, NaiveDate, Weekday};
use escala::{build_slots_for_month, parse_day_ranges, GenError, GenerateOptions, Venue, YearMonth};

fn keep_only(keep: &[u32]) -> Vec<u32> {
    (1..=31).filter(|d| !keep.contains(d)).collect()
}

#[test]
fn mid_march_calendar() {
    let month: YearMonth = "2024-03".parse().unwrap();
    let opts = GenerateOptions {
        excluded_days: keep_only(&[15, 16, 17, 18, 19]),
        ..GenerateOptions::default()
    };
    let rendered = build_slots_for_month(month, &opts)
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(rendered, @r"
    2024-03-15 19:00 NSA x2 [Missa Votiva Nsa. Sra. da Abadia]
    2024-03-16 19:00 NSG x2
    2024-03-17 07:30 SC x2
    2024-03-17 09:00 SJO x2
    2024-03-17 17:30 NSA x2
    2024-03-17 19:00 SJO x2
    2024-03-18 19:30 SJO x2
    2024-03-19 19:00 SJO x4 [Missa Votiva de São José]
    ");
}

#[test]
fn full_month_counts_and_order() {
    // mars 2024: 5 dimanches, 4 lundis, 4 mercredis, 5 vendredis, 5 samedis;
    // le 19 tombe un mardi (votiva ajoutée), le 15 un vendredi (remplace la messe)
    let month: YearMonth = "2024-03".parse().unwrap();
    let slots = build_slots_for_month(month, &GenerateOptions::default());
    assert_eq!(slots.len(), 5 * 4 + 4 + 4 + 5 + 5 + 1);

    for pair in slots.windows(2) {
        assert!((pair[0].date, pair[0].time) < (pair[1].date, pair[1].time));
    }
    assert!(slots
        .iter()
        .all(|s| !matches!(s.date.weekday(), Weekday::Tue | Weekday::Thu) || s.date.day() == 19));
    assert!(slots
        .iter()
        .filter(|s| s.date.weekday() == Weekday::Sat)
        .all(|s| s.venue == Venue::NossaSenhoraDasGracas));
}

#[test]
fn weekday_reduction_and_votive_options() {
    let month: YearMonth = "2024-03".parse().unwrap();
    let opts = GenerateOptions {
        reduce_weekday_team_to_one: true,
        include_day19_extra_seat: false,
        ..GenerateOptions::default()
    };
    let slots = build_slots_for_month(month, &opts);

    for s in &slots {
        let expected = match (s.date.weekday(), s.date.day()) {
            (_, 15) | (_, 19) => 2,
            (Weekday::Wed | Weekday::Fri, _) => 1,
            _ => 2,
        };
        assert_eq!(s.team_size, expected, "{s}");
    }
}

#[test]
fn sunday_the_nineteenth_keeps_sunday_masses() {
    // 2023-03-19 est un dimanche
    let month: YearMonth = "2023-03".parse().unwrap();
    let opts = GenerateOptions {
        excluded_days: keep_only(&[19]),
        ..GenerateOptions::default()
    };
    let slots = build_slots_for_month(month, &opts);
    assert_eq!(slots.len(), 4);
    let votive: Vec<_> = slots.iter().filter(|s| s.observation.is_some()).collect();
    assert_eq!(votive.len(), 2);
    assert!(votive
        .iter()
        .all(|s| s.venue == Venue::SaoJoseOperario && s.team_size == 4));
}

#[test]
fn past_days_and_excluded_days_are_skipped() {
    let month: YearMonth = "2024-03".parse().unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 3, 25).unwrap();
    let opts = GenerateOptions {
        not_before: Some(today),
        excluded_days: parse_day_ranges("27-29").unwrap(),
        ..GenerateOptions::default()
    };
    let slots = build_slots_for_month(month, &opts);
    let days: Vec<u32> = slots.iter().map(|s| s.date.day()).collect();
    // 25 lundi, 30 samedi, 31 dimanche
    assert_eq!(days, [25, 30, 31, 31, 31, 31]);
}

#[test]
fn day_ranges_and_month_parsing() {
    assert_eq!(parse_day_ranges("5, 1-3,3").unwrap(), [1, 2, 3, 5]);
    assert!(parse_day_ranges("").unwrap().is_empty());
    for bad in ["0", "32", "5-2", "x", "1-"] {
        assert!(
            matches!(parse_day_ranges(bad), Err(GenError::InvalidDayRange(_))),
            "{bad}"
        );
    }

    let m: YearMonth = "2024-02".parse().unwrap();
    assert_eq!(m.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(m.months_back(3).to_string(), "2023-11");
    assert_eq!(m.days().count(), 29);
    for bad in ["2024", "2024-00", "24-03", "2024/03", "2024-3x"] {
        assert!(bad.parse::<YearMonth>().is_err(), "{bad}");
    }
}
