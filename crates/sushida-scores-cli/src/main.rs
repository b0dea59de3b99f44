use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use sushida_scores::ScoreRepository;
use sushida_scores::ingest::scan_directory;
use sushida_scores::kv::{KvStore, StoreError};
use sushida_scores::model::{
    NewScore, ScoreDetail, ScorePatch, ScoreRecord, TypingDetail, format_signed, parse_date, today,
};
use sushida_scores::ordering::{SortKey, SortOrder};
use sushida_scores::series::{ChartFilter, DateRange};
use sushida_scores::stats::Statistics;

/// CLI-specific errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Library error (wraps all sushida_scores errors)
    #[error(transparent)]
    Library(#[from] sushida_scores::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Score not found
    #[error("Score '{0}' not found")]
    ScoreNotFound(String),

    /// Missing JSON input
    #[error("Either --value or --file must be specified")]
    MissingValueInput,

    /// gain - payed does not fit a result
    #[error("Cannot derive a result from gain {gain} and payed {payed}")]
    ResultOutOfRange { gain: u64, payed: u64 },

    /// Clear without confirmation
    #[error("Refusing to delete every score without --force")]
    ConfirmationRequired,
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::Library(e.into())
    }
}

#[derive(Parser)]
#[command(name = "sushida-scores")]
#[command(about = "Record sushida typing results and summarize them by course")]
struct Cli {
    /// Store path
    #[arg(long, global = true, default_value = ".sushida-scores", env = "SUSHIDA_SCORES_PATH")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new score store
    Init,

    /// Record a game result
    Add {
        /// Play date (YYYY-MM-DD), today if not specified
        #[arg(long)]
        date: Option<String>,

        /// Course label, e.g. お手軽
        #[arg(short, long)]
        course: String,

        /// Net result in yen (defaults to gain - payed)
        #[arg(short, long, allow_hyphen_values = true)]
        result: Option<i64>,

        /// Course price
        #[arg(long, default_value_t = 0)]
        payed: u64,

        /// Value of the sushi eaten
        #[arg(long, default_value_t = 0)]
        gain: u64,

        /// Correct keystrokes
        #[arg(long, default_value_t = 0)]
        correct: u64,

        /// Missed keystrokes
        #[arg(long, default_value_t = 0)]
        miss: u64,

        /// Average keystrokes per second
        #[arg(long, default_value_t = 0.0, value_parser = parse_tps)]
        tps: f64,
    },

    /// Record a game result from its JSON form
    Import {
        /// JSON text of the result
        #[arg(long)]
        value: Option<String>,

        /// File containing the JSON result
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Change fields of a stored result
    Update {
        /// Score id
        id: String,

        #[arg(long)]
        date: Option<String>,

        #[arg(short, long)]
        course: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        result: Option<i64>,

        #[arg(long)]
        payed: Option<u64>,

        #[arg(long)]
        gain: Option<u64>,

        #[arg(long)]
        correct: Option<u64>,

        #[arg(long)]
        miss: Option<u64>,

        #[arg(long, value_parser = parse_tps)]
        tps: Option<f64>,
    },

    /// Delete a stored result
    Delete {
        /// Score id
        id: String,
    },

    /// Delete every stored result
    Clear {
        /// Confirm deletion
        #[arg(long)]
        force: bool,
    },

    /// List results
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort column
        #[arg(long, default_value_t = SortKey::Date)]
        sort: SortKey,

        /// Sort direction
        #[arg(long, default_value_t = SortOrder::Desc)]
        order: SortOrder,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show aggregate statistics
    Stats {
        /// Restrict to one course (all results if the course has none)
        #[arg(short, long)]
        course: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show statistics for every course
    Courses {
        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show chart series per course
    Series {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Merge result files written by the extraction tool
    Ingest {
        /// Directory containing *.json result files
        dir: PathBuf,
    },

    /// Add the built-in sample results
    Seed,

    /// Show or switch demo mode
    Demo {
        #[arg(value_enum, default_value_t = DemoAction::Status)]
        action: DemoAction,
    },
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Only this course
    #[arg(short, long)]
    course: Option<String>,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    from: Option<String>,

    /// Last date to include (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    to: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<ChartFilter, AppError> {
        let mut filter = ChartFilter::default();
        if let Some(course) = &self.course {
            filter = filter.course(course.as_str());
        }
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            filter = filter.range(DateRange::parse(from, to)?);
        }
        Ok(filter)
    }
}

/// Accept only TPS values that can be stored as JSON numbers.
fn parse_tps(input: &str) -> Result<f64, String> {
    let tps: f64 = input.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if !tps.is_finite() || tps < 0.0 {
        return Err(format!("'{input}' is not a finite non-negative number"));
    }
    Ok(tps)
}

/// Net result of a game when `--result` is not given.
fn derive_result(gain: u64, payed: u64) -> Result<i64, AppError> {
    let out_of_range = || AppError::ResultOutOfRange { gain, payed };
    let gain = i64::try_from(gain).map_err(|_| out_of_range())?;
    let payed = i64::try_from(payed).map_err(|_| out_of_range())?;
    gain.checked_sub(payed).ok_or_else(out_of_range)
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoAction {
    On,
    Off,
    Status,
}

/// Format an error for user-friendly display
fn format_error(err: &AppError) -> String {
    use std::io::IsTerminal;

    let use_colors = std::io::stderr().is_terminal();

    let (red, yellow, reset) = if use_colors {
        ("\x1b[0;31m", "\x1b[0;33m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    let mut output = format!("{}Error:{} {}\n", red, reset, err);

    if let Some(hint) = get_error_hint(err) {
        output.push_str(&format!("{}Hint:{} {}\n", yellow, reset, hint));
    }

    output
}

/// Get a helpful hint for common errors
fn get_error_hint(err: &AppError) -> Option<&'static str> {
    match err {
        AppError::Library(sushida_scores::Error::Store(StoreError::NotInitialized(_))) => {
            Some("Run 'sushida-scores init --path <PATH>' to initialize a new store")
        }
        AppError::Library(sushida_scores::Error::Store(StoreError::Corrupted { .. })) => {
            Some("The stored snapshot failed its checksum; restore the store directory from a backup")
        }
        AppError::Library(sushida_scores::Error::DemoModeActive) => {
            Some("Run 'sushida-scores demo off' before changing scores")
        }
        AppError::Library(sushida_scores::Error::InvalidDate { .. }) => {
            Some("Dates are written YYYY-MM-DD, e.g. 2025-01-15")
        }
        AppError::Library(sushida_scores::Error::InvalidJson(_)) => Some(
            "Expected {\"course\", \"result\", \"detail\": {\"payed\", \"gain\"}, \"typing\": {\"correct\", \"avarageTPS\", \"miss\"}}",
        ),
        AppError::Library(sushida_scores::Error::InvalidScore(_)) => {
            Some("avarageTPS must be a finite number of keystrokes per second, 0 or more")
        }
        AppError::ScoreNotFound(_) => Some("Use 'sushida-scores list' to see score ids"),
        AppError::ResultOutOfRange { .. } => Some("Pass the net result directly with --result"),
        AppError::MissingValueInput => {
            Some("Provide JSON with --value '{...}' or from a file with --file result.json")
        }
        _ => None,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SUSHIDA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprint!("{}", format_error(&err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let path = cli.path;

    match cli.command {
        Commands::Init => {
            let store = KvStore::init(&path)?;
            drop(store);
            println!("Initialized score store at {}", path.display());
            Ok(())
        }
        Commands::Add {
            date,
            course,
            result,
            payed,
            gain,
            correct,
            miss,
            tps,
        } => {
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => today(),
            };
            let result = match result {
                Some(result) => result,
                None => derive_result(gain, payed)?,
            };
            let score = NewScore {
                date,
                course,
                result,
                detail: ScoreDetail { payed, gain },
                typing: TypingDetail {
                    correct,
                    average_tps: tps,
                    miss,
                },
            };

            let mut repo = open_repository(&path)?;
            let record = repo.add(score)?;
            println!(
                "Added {} ({} {} {})",
                record.id,
                record.date,
                record.course,
                format_signed(record.result)
            );
            Ok(())
        }
        Commands::Import { value, file } => {
            let text = match (value, file) {
                (Some(v), _) => v,
                (None, Some(f)) => std::fs::read_to_string(&f)?,
                (None, None) => return Err(AppError::MissingValueInput),
            };

            let mut repo = open_repository(&path)?;
            let record = repo.import_json(&text, today())?;
            println!("Imported {} dated {}", record.id, record.date);
            Ok(())
        }
        Commands::Update {
            id,
            date,
            course,
            result,
            payed,
            gain,
            correct,
            miss,
            tps,
        } => {
            let mut repo = open_repository(&path)?;
            let current = repo
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::ScoreNotFound(id.clone()))?;

            let detail = (payed.is_some() || gain.is_some()).then(|| ScoreDetail {
                payed: payed.unwrap_or(current.detail.payed),
                gain: gain.unwrap_or(current.detail.gain),
            });
            let typing = (correct.is_some() || miss.is_some() || tps.is_some()).then(|| TypingDetail {
                correct: correct.unwrap_or(current.typing.correct),
                average_tps: tps.unwrap_or(current.typing.average_tps),
                miss: miss.unwrap_or(current.typing.miss),
            });
            let patch = ScorePatch {
                date: date.as_deref().map(parse_date).transpose()?,
                course,
                result,
                detail,
                typing,
            };

            if patch.is_empty() {
                println!("Nothing to update for {}", id);
                return Ok(());
            }

            let updated = repo
                .update(&id, patch)?
                .ok_or_else(|| AppError::ScoreNotFound(id.clone()))?;
            println!(
                "Updated {} ({} {} {})",
                updated.id,
                updated.date,
                updated.course,
                format_signed(updated.result)
            );
            Ok(())
        }
        Commands::Delete { id } => {
            let mut repo = open_repository(&path)?;
            if !repo.delete(&id)? {
                return Err(AppError::ScoreNotFound(id));
            }
            println!("Deleted {}", id);
            Ok(())
        }
        Commands::Clear { force } => {
            if !force {
                return Err(AppError::ConfirmationRequired);
            }
            let mut repo = open_repository(&path)?;
            let removed = repo.clear()?;
            println!("Deleted {} scores", removed);
            Ok(())
        }
        Commands::List {
            filter,
            sort,
            order,
            json,
        } => {
            let repo = open_repository(&path)?;
            let records = repo.listing(&filter.to_filter()?, sort, order);

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                eprintln!("No scores");
            } else {
                println!("{}", records_table(&records));
                eprintln!("{} scores", records.len());
            }
            Ok(())
        }
        Commands::Stats { course, json } => {
            let repo = open_repository(&path)?;
            let stats = repo.statistics_for(course.as_deref());

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", statistics_table(&stats));
            }
            Ok(())
        }
        Commands::Courses { json } => {
            let repo = open_repository(&path)?;
            let by_course = repo.course_statistics();

            if json {
                println!("{}", serde_json::to_string_pretty(&by_course)?);
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec![
                "Course", "Games", "Average", "Best", "Worst", "Accuracy", "TPS",
            ]);
            for (course, stats) in &by_course {
                table.add_row(vec![
                    course.clone(),
                    stats.total_games.to_string(),
                    format!("{:.0}", stats.average_score),
                    format_signed(stats.best_score),
                    format_signed(stats.worst_score),
                    format!("{:.1}%", stats.average_accuracy),
                    format!("{:.2}", stats.average_tps),
                ]);
            }
            println!("{table}");
            Ok(())
        }
        Commands::Series { filter, json } => {
            let repo = open_repository(&path)?;
            let series = repo.series(&filter.to_filter()?);

            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
                return Ok(());
            }

            for s in &series {
                println!("{} ({} points)", s.id, s.data.len());
                for point in &s.data {
                    println!("  {}  {:>8}", point.x, format_signed(point.y));
                }
            }
            Ok(())
        }
        Commands::Ingest { dir } => {
            let report = scan_directory(&dir)?;
            for skipped in &report.skipped {
                eprintln!("  Skipped '{}': {}", skipped.filename, skipped.reason);
            }

            let mut repo = open_repository(&path)?;
            let merged = repo.ingest(&report.records, today())?;
            println!(
                "Ingested {} files from {}: {} new, {} replaced, {} skipped",
                report.records.len(),
                dir.display(),
                merged.inserted,
                merged.replaced,
                report.skipped.len()
            );
            Ok(())
        }
        Commands::Seed => {
            let mut repo = open_repository(&path)?;
            let added = repo.seed_samples()?;
            println!("Added {} sample scores", added);
            Ok(())
        }
        Commands::Demo { action } => {
            let mut repo = open_repository(&path)?;
            match action {
                DemoAction::On => repo.set_demo_mode(true)?,
                DemoAction::Off => repo.set_demo_mode(false)?,
                DemoAction::Status => {}
            }
            println!(
                "Demo mode is {}",
                if repo.demo_mode() { "on" } else { "off" }
            );
            Ok(())
        }
    }
}

fn open_repository(path: &std::path::Path) -> Result<ScoreRepository<KvStore>, AppError> {
    let store = KvStore::open(path)?;
    Ok(ScoreRepository::open(store)?)
}

fn records_table(records: &[ScoreRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Date", "Course", "Result", "Payed", "Gain", "Correct", "Miss", "Accuracy", "TPS", "ID",
    ]);
    for r in records {
        table.add_row(vec![
            r.date.to_string(),
            r.course.clone(),
            format_signed(r.result),
            r.detail.payed.to_string(),
            r.detail.gain.to_string(),
            r.typing.correct.to_string(),
            r.typing.miss.to_string(),
            format!("{:.1}%", r.typing.accuracy()),
            format!("{:.2}", r.typing.average_tps),
            r.id.clone(),
        ]);
    }
    table
}

fn statistics_table(stats: &Statistics) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.add_row(vec!["Games".to_string(), stats.total_games.to_string()]);
    table.add_row(vec!["Average".to_string(), format!("{:.0}", stats.average_score)]);
    table.add_row(vec!["Best".to_string(), format_signed(stats.best_score)]);
    table.add_row(vec!["Worst".to_string(), format_signed(stats.worst_score)]);
    table.add_row(vec![
        "Accuracy".to_string(),
        format!("{:.1}%", stats.average_accuracy),
    ]);
    table.add_row(vec!["TPS".to_string(), format!("{:.2}", stats.average_tps)]);
    table.add_row(vec![
        "Keystrokes".to_string(),
        format!(
            "{} correct / {} miss",
            stats.total_correct_types, stats.total_miss_types
        ),
    ]);
    table
}
