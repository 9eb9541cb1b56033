use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifiant fort pour Volunteer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VolunteerId(String);

impl VolunteerId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "" => Ok(Gender::Unspecified),
            other => Err(format!("unknown gender: {other}")),
        }
    }
}

/// Acólito (membre de l'équipe)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub weekend_only: bool,
    #[serde(default)]
    pub handles_missal: bool,
    #[serde(default)]
    pub handles_thurible: bool,
}

fn default_true() -> bool {
    true
}

impl Volunteer {
    pub fn new<F: Into<String>, L: Into<String>>(first_name: F, last_name: L) -> Self {
        Self {
            id: VolunteerId::random(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            active: true,
            gender: Gender::Unspecified,
            weekend_only: false,
            handles_missal: false,
            handles_thurible: false,
        }
    }

    /// Nom complet, clé utilisée par les restrictions, règles fixes et escalas.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Paire symétrique, stockée une seule fois (`a < b`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pairing {
    a: VolunteerId,
    b: VolunteerId,
}

impl Pairing {
    pub fn new(x: VolunteerId, y: VolunteerId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn contains(&self, id: &VolunteerId) -> bool {
        &self.a == id || &self.b == id
    }

    pub fn other(&self, id: &VolunteerId) -> Option<&VolunteerId> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Relation de binômes: au plus un partenaire par personne.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pairings(BTreeSet<Pairing>);

impl Pairings {
    /// Lie `x` et `y`, en défaisant toute paire existante de l'un ou de l'autre.
    pub fn link(&mut self, x: VolunteerId, y: VolunteerId) -> Result<(), String> {
        let pairing = Pairing::new(x, y).ok_or("a volunteer cannot be paired with itself")?;
        self.0
            .retain(|p| !p.contains(&pairing.a) && !p.contains(&pairing.b));
        self.0.insert(pairing);
        Ok(())
    }

    /// Retire la paire de `id`; renvoie l'ancien partenaire.
    pub fn unlink(&mut self, id: &VolunteerId) -> Option<VolunteerId> {
        let existing = self.0.iter().find(|p| p.contains(id)).cloned()?;
        self.0.remove(&existing);
        existing.other(id).cloned()
    }

    pub fn partner_of(&self, id: &VolunteerId) -> Option<&VolunteerId> {
        self.0.iter().find_map(|p| p.other(id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Indisponibilité d'un acólito, bornes incluses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub volunteer_name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Restriction {
    pub fn new<N: Into<String>>(
        volunteer_name: N,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, String> {
        if end < start {
            return Err("restriction end must not be before start".to_string());
        }
        Ok(Self {
            volunteer_name: volunteer_name.into(),
            start,
            end,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Escala fixe: tel acólito, chaque mois, tel jour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedRule {
    pub volunteer_name: String,
    pub day_of_month: u32,
}

impl FixedRule {
    pub fn new<N: Into<String>>(volunteer_name: N, day_of_month: u32) -> Result<Self, String> {
        if !(1..=31).contains(&day_of_month) {
            return Err(format!("day of month out of range: {day_of_month}"));
        }
        Ok(Self {
            volunteer_name: volunteer_name.into(),
            day_of_month,
        })
    }
}

/// Lieux de célébration desservis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Venue {
    #[serde(rename = "São José Operário")]
    SaoJoseOperario,
    #[serde(rename = "Capela Nsa. Sra. das Graças")]
    NossaSenhoraDasGracas,
    #[serde(rename = "Nsa. Sra. da Abadia")]
    NossaSenhoraDaAbadia,
    #[serde(rename = "Santa Clara")]
    SantaClara,
}

impl Venue {
    pub const ALL: [Venue; 4] = [
        Venue::SaoJoseOperario,
        Venue::NossaSenhoraDasGracas,
        Venue::NossaSenhoraDaAbadia,
        Venue::SantaClara,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Venue::SaoJoseOperario => "São José Operário",
            Venue::NossaSenhoraDasGracas => "Capela Nsa. Sra. das Graças",
            Venue::NossaSenhoraDaAbadia => "Nsa. Sra. da Abadia",
            Venue::SantaClara => "Santa Clara",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Venue::SaoJoseOperario => "SJO",
            Venue::NossaSenhoraDasGracas => "NSG",
            Venue::NossaSenhoraDaAbadia => "NSA",
            Venue::SantaClara => "SC",
        }
    }

    /// Couleur d'affichage (purement cosmétique).
    pub fn color(self) -> &'static str {
        match self {
            Venue::SaoJoseOperario => "#2563eb",
            Venue::NossaSenhoraDasGracas => "#059669",
            Venue::NossaSenhoraDaAbadia => "#d97706",
            Venue::SantaClara => "#7c3aed",
        }
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Venue::ALL
            .into_iter()
            .find(|v| v.label() == s || v.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown venue: {s}"))
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fonctions liturgiques, dans l'ordre des places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Missal,
    Candle,
    Thurible,
    Boat,
    Auxiliary,
}

impl Role {
    pub const MISSAL_SEAT: usize = 0;
    pub const THURIBLE_SEAT: usize = 2;

    const BY_SEAT: [Role; 4] = [Role::Missal, Role::Candle, Role::Thurible, Role::Boat];

    pub fn for_seat(index: usize) -> Role {
        Self::BY_SEAT.get(index).copied().unwrap_or(Role::Auxiliary)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Missal => "Missal",
            Role::Candle => "Candle",
            Role::Thurible => "Thurible",
            Role::Boat => "Boat",
            Role::Auxiliary => "Auxiliary",
        };
        f.write_str(s)
    }
}

/// Clé d'idempotence d'une célébration: (date, lieu, heure à la minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub date: NaiveDate,
    pub venue: Venue,
    pub time: NaiveTime,
}

impl SlotKey {
    pub fn new(date: NaiveDate, venue: Venue, time: NaiveTime) -> Self {
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
        Self { date, venue, time }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date,
            self.time.format("%H:%M"),
            self.venue.code()
        )
    }
}

/// Célébration à pourvoir, dérivée du calendrier; jamais persistée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: Venue,
    pub team_size: usize,
    pub observation: Option<String>,
    pub color: String,
}

impl ServiceSlot {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.venue, self.time)
    }
}

impl fmt::Display for ServiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.key(), self.team_size)?;
        if let Some(obs) = &self.observation {
            write!(f, " [{obs}]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub name: String,
    pub role: Role,
}

/// Escala persistée: une célébration et son équipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: Venue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default)]
    pub color: String,
    pub seats: Vec<Seat>,
}

impl Assignment {
    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.date, self.venue, self.time)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seats.iter().any(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.seats.iter().map(|s| s.name.as_str())
    }
}

/// Équipe d'acólitos et leurs binômes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    pub volunteers: Vec<Volunteer>,
    #[serde(default)]
    pub pairings: Pairings,
}

impl Roster {
    pub fn find_by_id<'a>(&'a self, id: &VolunteerId) -> Option<&'a Volunteer> {
        self.volunteers.iter().find(|v| &v.id == id)
    }
    pub fn find_by_id_mut(&mut self, id: &VolunteerId) -> Option<&mut Volunteer> {
        self.volunteers.iter_mut().find(|v| &v.id == id)
    }
    pub fn find_by_full_name<'a>(&'a self, name: &str) -> Option<&'a Volunteer> {
        self.volunteers.iter().find(|v| v.full_name() == name)
    }
    pub fn active(&self) -> impl Iterator<Item = &Volunteer> {
        self.volunteers.iter().filter(|v| v.active)
    }

    pub fn partner_of<'a>(&'a self, volunteer: &Volunteer) -> Option<&'a Volunteer> {
        self.pairings
            .partner_of(&volunteer.id)
            .and_then(|id| self.find_by_id(id))
    }

    /// Partenaire pris en compte pour l'escala: un partenaire inactif ne lie plus.
    pub fn active_partner_of<'a>(&'a self, volunteer: &Volunteer) -> Option<&'a Volunteer> {
        self.partner_of(volunteer).filter(|p| p.active)
    }

    pub fn pair(&mut self, a: &VolunteerId, b: &VolunteerId) -> Result<(), String> {
        for id in [a, b] {
            if self.find_by_id(id).is_none() {
                return Err(format!("unknown volunteer id: {}", id.as_str()));
            }
        }
        self.pairings.link(a.clone(), b.clone())
    }

    pub fn unpair(&mut self, id: &VolunteerId) -> Option<VolunteerId> {
        self.pairings.unlink(id)
    }
}

/// Instantané complet persisté (remplace la base hébergée).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Dataset {
    #[serde(default)]
    pub roster: Roster,
    #[serde(default)]
    pub restrictions: Vec<Restriction>,
    #[serde(default)]
    pub fixed_rules: Vec<FixedRule>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}
