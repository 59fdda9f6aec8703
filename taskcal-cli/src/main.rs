mod client;
mod commands;
mod render;
mod sse;
mod utils;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use taskcal_core::Recurrence;
use taskcal_core::config::TaskcalConfig;
use tracing_subscriber::EnvFilter;

use crate::client::Client;
use crate::commands::config::ConfigUpdate;
use crate::commands::edit::Changes;
use crate::utils::dates::parse_date_arg;

#[derive(Parser)]
#[command(name = "taskcal")]
#[command(about = "Schedule recurring tasks and get reminded when they come due")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show upcoming occurrences, grouped by day
    Calendar {
        /// First day to show (YYYY-MM-DD, today, tomorrow or +N)
        #[arg(long)]
        from: Option<String>,

        /// Last day to show (defaults to a week after --from)
        #[arg(long)]
        to: Option<String>,
    },
    /// List stored tasks
    Tasks,
    /// Add a task; prompts for anything missing
    Add {
        title: Option<String>,

        /// Due date (YYYY-MM-DD, today, tomorrow or +N). Defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Time of day (HH:MM)
        #[arg(short, long)]
        time: Option<String>,

        #[arg(short, long, value_enum, default_value_t = RecurrenceArg::None)]
        recurrence: RecurrenceArg,
    },
    /// Change fields of an existing task
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        time: Option<String>,

        #[arg(long, value_enum)]
        recurrence: Option<RecurrenceArg>,
    },
    /// Delete a task
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Mark a task as done and stop its reminders
    Complete { id: i64 },
    /// Print reminders as they come due
    Watch,
    /// Show or change settings
    Config {
        #[arg(long)]
        server_url: Option<String>,

        #[arg(long)]
        daily_horizon_days: Option<u32>,

        #[arg(long)]
        weekly_horizon_weeks: Option<u32>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecurrenceArg {
    None,
    Daily,
    Weekly,
}

impl From<RecurrenceArg> for Recurrence {
    fn from(arg: RecurrenceArg) -> Self {
        match arg {
            RecurrenceArg::None => Recurrence::None,
            RecurrenceArg::Daily => Recurrence::Daily,
            RecurrenceArg::Weekly => Recurrence::Weekly,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TaskcalConfig::load()?;

    match cli.command {
        Commands::Config {
            server_url,
            daily_horizon_days,
            weekly_horizon_weeks,
        } => {
            let update = ConfigUpdate {
                server_url,
                daily_horizon_days,
                weekly_horizon_weeks,
            };
            commands::config::run(config, update)
        }
        command => run_with_server(command, &config).await,
    }
}

/// Commands that talk to taskcal-server
async fn run_with_server(command: Commands, config: &TaskcalConfig) -> Result<()> {
    let client = Client::connect(&config.server_url).await?;
    let today = Local::now().date_naive();

    match command {
        Commands::Calendar { from, to } => {
            let from = parse_optional_date(from.as_deref(), today)?;
            let to = parse_optional_date(to.as_deref(), today)?;
            commands::calendar::run(&client, &config.horizon(), from, to).await
        }
        Commands::Tasks => commands::tasks::run(&client).await,
        Commands::Add {
            title,
            date,
            time,
            recurrence,
        } => {
            let date = parse_optional_date(date.as_deref(), today)?;
            commands::add::run(&client, title, date, time, recurrence.into()).await
        }
        Commands::Edit {
            id,
            title,
            date,
            time,
            recurrence,
        } => {
            let changes = Changes {
                title,
                date: parse_optional_date(date.as_deref(), today)?,
                time,
                recurrence: recurrence.map(Recurrence::from),
            };
            commands::edit::run(&client, id, changes).await
        }
        Commands::Delete { id, force } => commands::delete::run(&client, id, force).await,
        Commands::Complete { id } => commands::complete::run(&client, id).await,
        Commands::Watch => commands::watch::run(&client).await,
        Commands::Config { .. } => Ok(()),
    }
}

fn parse_optional_date(arg: Option<&str>, today: NaiveDate) -> Result<Option<NaiveDate>> {
    arg.map(|s| parse_date_arg(s, today)).transpose()
}
