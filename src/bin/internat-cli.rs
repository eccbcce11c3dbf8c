#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use internat::{
    calendar::{parse_date, Calendar},
    io, Duty, Faculty, Role, RunSlot, Scheduler,
};
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

// Année scolaire câblée en dur (bootstrap batch, pas de persistance).
const YEAR_START: &str = "8/25/2014";
const YEAR_END: &str = "5/29/2015";
const BREAK_WINDOWS: [&str; 4] = [
    "9/5/2014-9/13/2014",
    "11/23/2014-11/30/2014",
    "12/20/2014-1/4/2015",
    "3/1/2015-3/14/2015",
];
const TERM_BREAKS: [&str; 2] = ["11/22/2014", "2/28/2015"];
const HEAD_DATES: [&str; 9] = [
    "8/25/2014",
    "8/26/2014",
    "11/22/2014",
    "12/1/2014",
    "12/19/2014",
    "1/5/2015",
    "2/28/2015",
    "3/15/2015",
    "5/30/2015",
];

/// CLI minimaliste de planning d'internat (calcul batch, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculer le planning de l'année et l'exporter
    Schedule {
        /// Nom de l'internat (préfixe des exports)
        #[arg(long, default_value = "internat")]
        name: String,

        /// Graine de la source aléatoire (même graine, même planning)
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// CSV de membres (défaut : effectif d'exemple intégré)
        #[arg(long)]
        people: Option<String>,

        /// Début de la période de tournées (mm/dd/yyyy)
        #[arg(long, requires = "runs_to")]
        runs_from: Option<String>,

        /// Fin de la période de tournées (mm/dd/yyyy)
        #[arg(long, requires = "runs_from")]
        runs_to: Option<String>,

        /// Répertoire de sortie des exports
        #[arg(long, default_value = "out")]
        out_dir: String,
    },

    /// Écrire un CSV de membres d'exemple (modèle d'entrée)
    SamplePeople {
        #[arg(long, default_value = "people.csv")]
        out: String,
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

    match cli.cmd {
        Commands::Schedule {
            name,
            seed,
            people,
            runs_from,
            runs_to,
            out_dir,
        } => schedule(&name, seed, people.as_deref(), runs_from, runs_to, &out_dir),
        Commands::SamplePeople { out } => sample_people(&out),
    }
}

fn schedule(
    name: &str,
    seed: u64,
    people: Option<&str>,
    runs_from: Option<String>,
    runs_to: Option<String>,
    out_dir: &str,
) -> Result<()> {
    let calendar = Calendar::from_strs(YEAR_START, YEAR_END, &BREAK_WINDOWS)?;
    let term_breaks = [parse_date(TERM_BREAKS[0])?, parse_date(TERM_BREAKS[1])?];
    let head_dates = HEAD_DATES
        .iter()
        .map(|raw| parse_date(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut sched = Scheduler::new(name, &calendar, term_breaks, head_dates, seed);

    let members = match people {
        Some(path) => io::import_members_csv(path)?,
        None => sample_roster(),
    };
    for member in members {
        sched.add_member(member)?;
    }

    if let (Some(from), Some(to)) = (runs_from, runs_to) {
        sched.set_run_period(parse_date(&from)?, parse_date(&to)?);
    }

    sched.make_schedule()?;

    print_counts(&sched);

    let out_dir = PathBuf::from(out_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    io::export_duty_csv(
        out_dir.join(format!("{name}_calendar.csv")),
        &sched,
        Duty::Dorm,
        None,
    )?;
    if !sched.ledger().run_dates().is_empty() {
        for (slot, tag) in [(RunSlot::First, "run1"), (RunSlot::Second, "run2")] {
            io::export_duty_csv(
                out_dir.join(format!("{name}_{tag}_calendar.csv")),
                &sched,
                Duty::Run(slot),
                None,
            )?;
        }
    }
    io::export_counts_csv(out_dir.join(format!("{name}_counts.csv")), &sched)?;
    io::export_schedule_json(out_dir.join(format!("{name}_schedule.json")), &sched)?;

    println!("exports written to {}", out_dir.display());
    Ok(())
}

fn print_counts(sched: &Scheduler) {
    println!(
        "{:<14} {:>5} {:>9} {:>7} {:>9} {:>4} {:>4}",
        "Name", "Total", "Weekdays", "Friday", "Saturday", "R1", "R2"
    );
    for member in sched.roster().members() {
        if let Some(c) = sched.counts_for(&member.name) {
            println!(
                "{:<14} {:>5} {:>9} {:>7} {:>9} {:>4} {:>4}",
                member.name, c.total, c.school_nights, c.fridays, c.saturdays, c.run1, c.run2
            );
        }
    }
}

/// Effectif d'exemple : un responsable, deux résidents, deux vacataires,
/// deux membres dédiés aux tournées.
fn sample_roster() -> Vec<Faculty> {
    vec![
        Faculty::new("Bernard", Role::Head),
        Faculty::new("Camille", Role::Residential),
        Faculty::new("Dominique", Role::Residential),
        Faculty::new("Alex", Role::Adjunct),
        Faculty::new("Fred", Role::Adjunct),
        Faculty::new("Sacha", Role::Hospital),
        Faculty::new("Lou", Role::Hospital),
    ]
}

fn sample_people(out: &str) -> Result<()> {
    let template = "\
name,role,load,family,unavailable_dates,unavailable_weekdays
Bernard,head,,,,
Camille,residential,,garnier,,
Dominique,residential,,,10/3/2014;10/4/2014,
Alex,adjunct,,,,Tuesday
Fred,adjunct,full,,,
Sacha,hospital,,,,
Lou,hospital,,garnier,,
";
    fs::write(Path::new(out), template).with_context(|| format!("writing {out}"))?;
    println!("sample member file written to {out}");
    Ok(())
}
