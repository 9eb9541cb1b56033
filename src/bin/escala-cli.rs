#![forbid(unsafe_code)]
use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use escala::{
    calendar::{build_slots_for_month, parse_day_ranges, YearMonth},
    io,
    model::{Dataset, Volunteer},
    orchestrator,
    scheduler::{detect_conflicts, GenError, GenerateOptions, OutcomeStatus},
    storage::{JsonStorage, Storage},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'escalas d'acólitos (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON des données
    #[arg(long, global = true, default_value = "escala.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

/// Paramètres du calendrier du mois
#[derive(Args, Debug)]
struct CalendarArgs {
    /// Mois cible, YYYY-MM
    #[arg(long)]
    month: String,
    /// Jours sans célébration, ex. "3,10-12"
    #[arg(long, default_value = "")]
    skip: String,
    /// Un seul acólito le mercredi et le vendredi
    #[arg(long)]
    reduce_weekday: bool,
    /// Équipe de 2 (sans turíbulo) pour la votiva du 19
    #[arg(long)]
    no_day19_extra_seat: bool,
    /// Inclut les jours déjà passés du mois
    #[arg(long)]
    include_past: bool,
}

impl CalendarArgs {
    fn resolve(&self, clear_existing: bool) -> Result<(YearMonth, GenerateOptions)> {
        let month: YearMonth = self.month.parse()?;
        let opts = GenerateOptions {
            clear_existing,
            include_day19_extra_seat: !self.no_day19_extra_seat,
            reduce_weekday_team_to_one: self.reduce_weekday,
            excluded_days: parse_day_ranges(&self.skip)?,
            not_before: (!self.include_past).then(|| Local::now().date_naive()),
        };
        Ok((month, opts))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des acólitos depuis un CSV
    ImportVolunteers {
        #[arg(long)]
        csv: String,
    },

    /// Importer des indisponibilités depuis un CSV
    ImportRestrictions {
        #[arg(long)]
        csv: String,
    },

    /// Importer des escalas fixes depuis un CSV
    ImportFixedRules {
        #[arg(long)]
        csv: String,
    },

    /// Former un binôme (nom complet ou id)
    Pair {
        #[arg(long)]
        person: String,
        #[arg(long)]
        with: String,
    },

    /// Défaire le binôme d'une personne
    Unpair {
        #[arg(long)]
        person: String,
    },

    /// Afficher les célébrations du mois sans rien générer
    Slots {
        #[command(flatten)]
        calendar: CalendarArgs,
    },

    /// Générer les escalas du mois
    Generate {
        #[command(flatten)]
        calendar: CalendarArgs,
        /// Efface les escalas du mois avant de générer
        #[arg(long)]
        clear: bool,
        /// Graine du tirage (reproductible)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les conflits
    Check {
        #[arg(long)]
        month: Option<String>,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Effacer toutes les escalas d'un mois
    ClearMonth {
        #[arg(long)]
        month: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data)?;

    let code = match cli.cmd {
        Commands::ImportVolunteers { csv } => {
            let mut data = storage.load()?;
            let import = io::import_volunteers_csv(csv)?;
            let count = import.volunteers.len();
            import.merge_into(&mut data.roster)?;
            storage.save(&data)?;
            println!("{count} volunteer(s) imported");
            if !data.roster.pairings.is_empty() {
                println!("{} pair(s) on file", data.roster.pairings.len());
            }
            0
        }
        Commands::ImportRestrictions { csv } => {
            let mut data = storage.load()?;
            let restrictions = io::import_restrictions_csv(csv)?;
            println!("{} restriction(s) imported", restrictions.len());
            data.restrictions.extend(restrictions);
            storage.save(&data)?;
            0
        }
        Commands::ImportFixedRules { csv } => {
            let mut data = storage.load()?;
            let rules = io::import_fixed_rules_csv(csv)?;
            println!("{} fixed rule(s) imported", rules.len());
            data.fixed_rules.extend(rules);
            storage.save(&data)?;
            0
        }
        Commands::Pair { person, with } => {
            let mut data = storage.load()?;
            let a = lookup(&data, &person)?.id.clone();
            let b = lookup(&data, &with)?.id.clone();
            data.roster.pair(&a, &b).map_err(anyhow::Error::msg)?;
            storage.save(&data)?;
            0
        }
        Commands::Unpair { person } => {
            let mut data = storage.load()?;
            let id = lookup(&data, &person)?.id.clone();
            match data.roster.unpair(&id) {
                Some(_) => {
                    storage.save(&data)?;
                    0
                }
                None => {
                    eprintln!("{person} has no partner");
                    2
                }
            }
        }
        Commands::Slots { calendar } => {
            let (month, opts) = calendar.resolve(false)?;
            for slot in build_slots_for_month(month, &opts) {
                println!("{slot}");
            }
            0
        }
        Commands::Generate {
            calendar,
            clear,
            seed,
        } => {
            let (month, opts) = calendar.resolve(clear)?;
            let report = orchestrator::run(&storage, month, &opts, seed)?;
            println!("{report}");
            for key in &report.unfilled {
                eprintln!("unfilled: {key}");
            }
            match report.status {
                // Code 2 = WARNING/INCOMPLETE
                OutcomeStatus::NothingCouldBeGenerated => 2,
                _ => 0,
            }
        }
        Commands::List {
            month,
            out_json,
            out_csv,
        } => {
            let data = storage.load()?;
            let month = month.map(|m| m.parse::<YearMonth>()).transpose()?;
            let selected: Vec<_> = data
                .assignments
                .iter()
                .filter(|a| month.map_or(true, |m| m.contains(a.date)))
                .cloned()
                .collect();
            if let Some(path) = out_json {
                io::export_assignments_json(path, &selected)?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, &selected)?;
            }
            // impression compacte
            for a in &selected {
                println!("{} | {}", a.key(), io::format_seats(a));
            }
            0
        }
        Commands::Check { month, report } => {
            let data = storage.load()?;
            let month = month.map(|m| m.parse::<YearMonth>()).transpose()?;
            let selected: Vec<_> = data
                .assignments
                .iter()
                .filter(|a| month.map_or(true, |m| m.contains(a.date)))
                .cloned()
                .collect();
            let conflicts = detect_conflicts(&data.roster, &data.restrictions, &selected);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["name", "slot", "other", "kind"])?;
                    for c in &conflicts {
                        let slot = c.slot.to_string();
                        let other = c.other.map(|k| k.to_string()).unwrap_or_default();
                        w.write_record([
                            c.name.as_str(),
                            slot.as_str(),
                            other.as_str(),
                            c.kind.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
        Commands::ClearMonth { month } => {
            let month: YearMonth = month.parse()?;
            let removed = orchestrator::clear_month(&storage, month)?;
            println!("{removed} assignment(s) removed");
            0
        }
    };

    std::process::exit(code);
}

fn lookup<'a>(data: &'a Dataset, who: &str) -> Result<&'a Volunteer> {
    data.roster
        .find_by_full_name(who)
        .or_else(|| data.roster.volunteers.iter().find(|v| v.id.as_str() == who))
        .ok_or_else(|| GenError::UnknownVolunteer(who.to_string()).into())
}
