mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ashr")]
#[command(about = "A-share trading calendar CLI", long_about = None)]
struct Cli {
    /// JSON holiday file merged over the built-in table
    #[arg(long, global = true)]
    holiday_file: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlays)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Trading calendar views
    Calendar {
        #[command(subcommand)]
        cmd: CalendarCmd,
    },

    /// Market session clock
    Market {
        #[command(subcommand)]
        cmd: MarketCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations.
    Migrate,

    /// Persist the synthesized calendar for a year. Refuses to overwrite
    /// stored rows unless --yes is provided.
    SeedCalendar {
        #[arg(long)]
        year: i32,

        /// Acknowledge overwriting rows already stored for the year.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CalendarCmd {
    /// Every day of a month (YYYY-MM; default: current exchange month)
    Month {
        #[arg(long)]
        month: Option<String>,
    },

    /// Classify a single date
    Classify {
        /// YYYY-MM-DD (timestamps accepted; the civil date is used)
        date: String,
    },

    /// Monthly/yearly aggregates and upcoming closures
    Stats {
        #[arg(long)]
        year: Option<i32>,
    },

    /// Resolve the latest trading date against the database
    Latest,
}

#[derive(Subcommand)]
enum MarketCmd {
    /// Session phase, next open/close and poll interval
    Status {
        /// Instant to evaluate (RFC 3339 or exchange-local 'YYYY-MM-DD HH:MM:SS'); default now
        #[arg(long)]
        at: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    // Logs go to stderr so key=value stdout stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let holiday_file = cli.holiday_file.as_deref();

    match cli.cmd {
        Commands::Db { cmd } => match cmd {
            DbCmd::Status => commands::db::db_status().await?,
            DbCmd::Migrate => commands::db::db_migrate().await?,
            DbCmd::SeedCalendar { year, yes } => {
                let holidays = commands::load_holidays(holiday_file)?;
                commands::db::db_seed_calendar(year, yes, &holidays).await?;
            }
        },

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = ashr_config::load_layered_yaml(&path_refs)?;
            // Typed validation; fails on out-of-range values.
            loaded.desk()?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Calendar { cmd } => {
            let holidays = commands::load_holidays(holiday_file)?;
            match cmd {
                CalendarCmd::Month { month } => {
                    commands::calendar::calendar_month(month, &holidays)?
                }
                CalendarCmd::Classify { date } => {
                    commands::calendar::calendar_classify(&date, &holidays)?
                }
                CalendarCmd::Stats { year } => {
                    commands::calendar::calendar_stats_cmd(year, &holidays)?
                }
                CalendarCmd::Latest => {
                    let desk = ashr_config::load_from_env()?.desk()?;
                    commands::calendar::calendar_latest(&desk.resolver).await?
                }
            }
        }

        Commands::Market { cmd } => match cmd {
            MarketCmd::Status { at } => {
                let holidays = commands::load_holidays(holiday_file)?;
                let at = match at {
                    Some(raw) => commands::parse_instant(&raw)?,
                    None => chrono::Utc::now(),
                };
                commands::market::market_status(at, &holidays)?;
            }
        },
    }

    Ok(())
}
