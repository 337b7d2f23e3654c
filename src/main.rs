use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use botwatch::config::{DashboardConfig, LogFormat};
use botwatch::dashboard::{assemble, effective_mapping, DashboardQuery, DashboardView};
use botwatch::matrix::Selection;
use botwatch::records::ProjectCache;
use botwatch::render;
use botwatch::source::dates::DateSelection;
use botwatch::source::mapping::FlowMapping;

#[derive(Parser)]
#[command(
    name = "botwatch",
    about = "Hour-by-bot status matrix for scheduled automation flows",
    version,
    long_about = None
)]
struct Cli {
    /// Config file (default: $BOTWATCH_CONFIG, then ./botwatch.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Bind address (overrides server.bind)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print the hourly status matrix for one day
    Matrix {
        /// Day to show (YYYY-MM-DD); latest day in the data by default
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        /// Maximum number of bots (overrides matrix.max_rows)
        #[arg(long)]
        max_rows: Option<usize>,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Print run analytics for one day
    Summary {
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        project: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// List the project, status and owner filter choices for one day
    Filters {
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the project inferred from flow names
    Project {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn init_tracing(config: &DashboardConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn load_view(config: &DashboardConfig, query: &DashboardQuery) -> Result<DashboardView> {
    let source = botwatch::source::from_config(&config.source)?;
    let raw = source
        .fetch()
        .await
        .with_context(|| format!("failed to fetch records from {}", source.describe()))?;
    let mapping = FlowMapping::load_or_empty(&config.mapping.path);
    let mapping = effective_mapping(&mapping, &raw, &config.projects);
    Ok(assemble(&raw, &mapping, config.normalize_options(), query))
}

fn parse_date(raw: Option<&str>) -> Result<DateSelection> {
    DateSelection::parse(raw)
        .with_context(|| format!("invalid --date '{}', expected YYYY-MM-DD", raw.unwrap_or_default()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            tracing::info!(%bind, "Starting botwatch server");
            botwatch::serve(config, &bind).await?;
        }
        Commands::Matrix {
            date,
            project,
            status,
            owner,
            max_rows,
            json,
        } => {
            let query = DashboardQuery {
                date: parse_date(date.as_deref())?,
                project: Selection::project(project.as_deref()),
                status: Selection::status(status.as_deref()),
                owner: Selection::owner(owner.as_deref()),
                max_rows: max_rows.unwrap_or(config.matrix.max_rows),
            };
            let view = load_view(&config, &query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.matrix)?);
            } else {
                if let Some(day) = view.date {
                    println!("Bot status for {}\n", day);
                }
                print!("{}", render::render_matrix(&view.matrix));
            }
        }
        Commands::Summary {
            date,
            project,
            status,
            owner,
            json,
        } => {
            let query = DashboardQuery {
                date: parse_date(date.as_deref())?,
                project: Selection::project(project.as_deref()),
                status: Selection::status(status.as_deref()),
                owner: Selection::owner(owner.as_deref()),
                ..DashboardQuery::default()
            };
            let view = load_view(&config, &query).await?;
            let summary = view.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                if let Some(day) = view.date {
                    println!("Summary for {}\n", day);
                }
                print!("{}", render::render_summary(&summary));
            }
        }
        Commands::Filters { date, json } => {
            let query = DashboardQuery {
                date: parse_date(date.as_deref())?,
                ..DashboardQuery::default()
            };
            let view = load_view(&config, &query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view.options)?);
            } else {
                println!("Projects: {}", view.options.projects.join(", "));
                println!("Statuses: {}", view.options.statuses.join(", "));
                println!("Owners:   {}", view.options.owners.join(", "));
            }
        }
        Commands::Project { names } => {
            let mut cache = ProjectCache::new(config.projects.cache_capacity);
            for name in &names {
                println!("{}\t{}", name, cache.project_for(Some(name.as_str())));
            }
        }
    }

    Ok(())
}
