use crate::model::{Assignment, FixedRule, Gender, Restriction, Roster, Volunteer, VolunteerId};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::path::Path;

/// Acólitos importés et binômes déclarés par la colonne `partner_id`.
#[derive(Debug, Clone, Default)]
pub struct VolunteerImport {
    pub volunteers: Vec<Volunteer>,
    pub partners: Vec<(VolunteerId, VolunteerId)>,
}

impl VolunteerImport {
    /// Remplace les acólitos de même id, ajoute les autres, puis lie les binômes.
    pub fn merge_into(self, roster: &mut Roster) -> anyhow::Result<()> {
        for v in self.volunteers {
            match roster.find_by_id_mut(&v.id) {
                Some(existing) => *existing = v,
                None => roster.volunteers.push(v),
            }
        }
        for (a, b) in &self.partners {
            roster
                .pair(a, b)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("pairing {} with {}", a.as_str(), b.as_str()))?;
        }
        Ok(())
    }
}

/// Import d'acólitos depuis CSV, header
/// `id,first_name,last_name,active,gender,weekend_only,handles_missal,handles_thurible,partner_id`
/// (seuls `first_name` est obligatoire; un `id` vide est généré).
pub fn import_volunteers_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<VolunteerImport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = VolunteerImport::default();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let row = line + 2;
        let first = field(&rec, 1);
        if first.is_empty() {
            bail!("invalid volunteer row {row}: empty first_name");
        }
        let mut v = Volunteer::new(first, field(&rec, 2));
        let id = field(&rec, 0);
        if !id.is_empty() {
            v.id = VolunteerId::new(id);
        }
        v.active = parse_flag(&rec, 3, true).with_context(|| format!("active, row {row}"))?;
        v.gender = field(&rec, 4)
            .parse::<Gender>()
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("gender, row {row}"))?;
        v.weekend_only =
            parse_flag(&rec, 5, false).with_context(|| format!("weekend_only, row {row}"))?;
        v.handles_missal =
            parse_flag(&rec, 6, false).with_context(|| format!("handles_missal, row {row}"))?;
        v.handles_thurible =
            parse_flag(&rec, 7, false).with_context(|| format!("handles_thurible, row {row}"))?;

        let partner = field(&rec, 8);
        if !partner.is_empty() {
            out.partners.push((v.id.clone(), VolunteerId::new(partner)));
        }
        out.volunteers.push(v);
    }
    Ok(out)
}

/// Import de restrictions: header `volunteer_name,start[,end]` (dates `YYYY-MM-DD`).
pub fn import_restrictions_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Restriction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = field(&rec, 0);
        if name.is_empty() {
            bail!("invalid restriction row (empty name)");
        }
        let start = parse_date(field(&rec, 1))?;
        let end = match field(&rec, 2) {
            "" => start,
            raw => parse_date(raw)?,
        };
        let r = Restriction::new(name, start, end)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("restriction for {name}"))?;
        out.push(r);
    }
    Ok(out)
}

/// Import d'escalas fixes: header `volunteer_name,day`.
pub fn import_fixed_rules_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<FixedRule>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = field(&rec, 0);
        if name.is_empty() {
            bail!("invalid fixed rule row (empty name)");
        }
        let day: u32 = field(&rec, 1)
            .parse()
            .with_context(|| format!("invalid day for {name}"))?;
        out.push(FixedRule::new(name, day).map_err(anyhow::Error::msg)?);
    }
    Ok(out)
}

/// Export JSON des escalas (jolie mise en forme)
pub fn export_assignments_json<P: AsRef<Path>>(
    path: P,
    assignments: &[Assignment],
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(assignments)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des escalas: header `date,time,venue,observation,seats`
pub fn export_assignments_csv<P: AsRef<Path>>(
    path: P,
    assignments: &[Assignment],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "time", "venue", "observation", "seats"])?;
    for a in assignments {
        let date = a.date.to_string();
        let time = a.time.format("%H:%M").to_string();
        w.write_record([
            date.as_str(),
            time.as_str(),
            a.venue.label(),
            a.observation.as_deref().unwrap_or(""),
            format_seats(a).as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// `"Ana Souza (Missal); Bruno (Candle)"`
pub fn format_seats(a: &Assignment) -> String {
    a.seats
        .iter()
        .map(|s| format!("{} ({})", s.name, s.role))
        .collect::<Vec<_>>()
        .join("; ")
}

fn field(rec: &StringRecord, idx: usize) -> &str {
    rec.get(idx).map(str::trim).unwrap_or("")
}

fn parse_flag(rec: &StringRecord, idx: usize, default: bool) -> anyhow::Result<bool> {
    match field(rec, idx) {
        "" => Ok(default),
        raw => parse_bool(raw),
    }
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "sim" | "s" => Ok(true),
        "false" | "0" | "no" | "n" | "não" | "nao" => Ok(false),
        _ => bail!("expected boolean, got {s}"),
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}
