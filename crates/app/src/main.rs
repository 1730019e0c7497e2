mod play;

use std::fmt;

use quiz_core::model::{DifficultyTier, RoundConfig};
use quiz_core::random::StdRandom;
use quiz_core::source::{QuestionSource, RANDOM_CATEGORY};
use services::{AppServices, Clock, TickSettings};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTier { raw: String },
    InvalidSize { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTier { raw } => {
                write!(f, "invalid --tier value: {raw} (expected easy, normal or hard)")
            }
            ArgsError::InvalidSize { raw } => write!(f, "invalid --size value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz [play] [--category <key>] [--tier <easy|normal|hard>] [--size <n>]");
    eprintln!("              [--seed <u64>] [--quiet] [--db <sqlite_url>] [--verbose]");
    eprintln!("  quiz stats        [--db <sqlite_url>] [--category <key>]");
    eprintln!("  quiz achievements [--db <sqlite_url>]");
    eprintln!("  quiz categories");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --category random --tier normal --size 10");
    eprintln!();
    eprintln!("While playing, answer with 1-4 (or a-d), q quits the round.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_CATEGORY, QUIZ_TIER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
    Achievements,
    Categories,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            "achievements" => Some(Self::Achievements),
            "categories" => Some(Self::Categories),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    category: String,
    tier: DifficultyTier,
    size: u32,
    seed: Option<u64>,
    quiet: bool,
    verbose: bool,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("QUIZ_DB_URL")
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut category = env("QUIZ_CATEGORY").unwrap_or_else(|| RANDOM_CATEGORY.to_owned());
        let mut tier = match env("QUIZ_TIER") {
            Some(raw) => parse_tier(raw)?,
            None => DifficultyTier::normal(),
        };
        let mut size = RoundConfig::DEFAULT_ROUND_SIZE;
        let mut seed = None;
        let mut quiet = false;
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--category" => category = require_value(args, "--category")?,
                "--tier" => tier = parse_tier(require_value(args, "--tier")?)?,
                "--size" => {
                    let value = require_value(args, "--size")?;
                    size = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidSize { raw: value })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed = value
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--quiet" => quiet = true,
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            category,
            tier,
            size,
            seed,
            quiet,
            verbose,
        })
    }

    fn rng(&self) -> StdRandom {
        self.seed.map_or_else(StdRandom::from_entropy, StdRandom::seeded)
    }
}

fn parse_tier(raw: String) -> Result<DifficultyTier, ArgsError> {
    DifficultyTier::by_name(&raw).map_err(|_| ArgsError::InvalidTier { raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        // In-memory and URI-style urls need no file on disk.
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Logs go to stderr so they never interleave with the question text.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Playing a round is the default when no subcommand is given.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter, |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    init_tracing(parsed.verbose);

    let mut rng = parsed.rng();
    if cmd == Command::Categories {
        let services = AppServices::in_memory(Clock::system(), &mut rng)?;
        let catalog = services.catalog();
        for key in catalog.categories() {
            println!("{key}");
        }
        println!("{RANDOM_CATEGORY}  (every category)");
        return Ok(());
    }

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::system(), &mut rng).await?;
    tracing::debug!(db = %parsed.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Play => {
            let config = RoundConfig::new(parsed.category.clone(), parsed.tier.clone(), parsed.size)?;
            let settings = TickSettings {
                sound_enabled: !parsed.quiet,
                ..TickSettings::default()
            };
            play::play_round(&services, config, settings, &mut rng).await
        }
        Command::Stats => {
            let category = (parsed.category != RANDOM_CATEGORY).then_some(parsed.category.as_str());
            play::print_stats(&services, category).await
        }
        Command::Achievements => {
            play::print_achievements(&services).await;
            Ok(())
        }
        Command::Categories => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter, |key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        })
    }

    #[test]
    fn defaults_without_flags_or_env() {
        let args = parse(&[], &[]).unwrap();
        assert_eq!(args.category, RANDOM_CATEGORY);
        assert_eq!(args.tier, DifficultyTier::normal());
        assert_eq!(args.size, RoundConfig::DEFAULT_ROUND_SIZE);
        assert!(args.db_url.starts_with("sqlite://"));
        assert!(args.db_url.ends_with("quiz.sqlite3"));
        assert!(!args.quiet && !args.verbose);
    }

    #[test]
    fn flags_override_environment() {
        let args = parse(
            &["--category", "hex", "--tier", "HARD", "--size", "4", "--seed", "9", "--quiet"],
            &[("QUIZ_CATEGORY", "food"), ("QUIZ_TIER", "easy")],
        )
        .unwrap();
        assert_eq!(args.category, "hex");
        assert_eq!(args.tier, DifficultyTier::hard());
        assert_eq!(args.size, 4);
        assert_eq!(args.seed, Some(9));
        assert!(args.quiet);
    }

    #[test]
    fn environment_fills_unset_flags() {
        let args = parse(&[], &[("QUIZ_CATEGORY", "logic"), ("QUIZ_DB_URL", "sqlite::memory:")])
            .unwrap();
        assert_eq!(args.category, "logic");
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse(&["--size", "0"], &[]),
            Err(ArgsError::InvalidSize { .. })
        ));
        assert!(matches!(
            parse(&["--tier", "nightmare"], &[]),
            Err(ArgsError::InvalidTier { .. })
        ));
        assert!(matches!(
            parse(&["--seed"], &[]),
            Err(ArgsError::MissingValue { flag: "--seed" })
        ));
        assert!(matches!(
            parse(&["--bogus"], &[]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&[], &[("QUIZ_TIER", "???")]),
            Err(ArgsError::InvalidTier { .. })
        ));
    }

    #[test]
    fn sqlite_urls_are_normalized() {
        assert_eq!(normalize_sqlite_url("sqlite://already".into()), "sqlite://already");
        assert_eq!(
            normalize_sqlite_url("sqlite:/tmp/quiz.db".into()),
            "sqlite:///tmp/quiz.db"
        );
        assert!(normalize_sqlite_url("sqlite:file:mem?mode=memory".into()).starts_with("sqlite:file:"));
    }

    #[test]
    fn subcommands_resolve() {
        assert_eq!(Command::from_arg("stats"), Some(Command::Stats));
        assert_eq!(Command::from_arg("categories"), Some(Command::Categories));
        assert_eq!(Command::from_arg("ui"), None);
    }
}
