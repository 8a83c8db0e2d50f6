//! Orgrel CLI - Reporting relationship service
//!
//! Serves the relationship API, manages the database schema, and imports
//! org charts from CSV.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orgrel_api::{ApiServer, ApiServerConfig};
use orgrel_core::{parse_csv, validate_rows, ImportCommitter, ImportError, MembershipStore};
use orgrel_db::SeaOrmMembershipStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use crate::config::OrgrelConfig;

/// Orgrel - Resolve reporting relationships inside a company
#[derive(Parser, Debug)]
#[command(name = "orgrel")]
#[command(about = "Orgrel - Resolve reporting relationships inside a company")]
#[command(version)]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./orgrel.yml when present)
    #[arg(long, global = true, env = "ORGREL_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL, overrides the config file
    #[arg(long, global = true, env = "ORGREL_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (e.g., 0.0.0.0:8080)
        #[arg(long, env = "ORGREL_BIND_ADDR")]
        bind: Option<String>,

        /// Disable CORS for localhost origins
        #[arg(long)]
        no_cors: bool,
    },

    /// Apply database migrations
    Migrate,

    /// Manage companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Classify the relationship between two members by email
    #[command(long_about = r#"
Classify how FROM relates to TO inside a company.

EXAMPLES:
  orgrel classify --company 3f1c... --from ceo@acme.com --to dev@acme.com
    "#)]
    Classify {
        /// Company ID
        #[arg(long)]
        company: Uuid,

        /// Email of the member the relationship is described from
        #[arg(long)]
        from: String,

        /// Email of the other member
        #[arg(long)]
        to: String,
    },

    /// Validate an org-chart CSV without touching the database
    Validate {
        /// CSV file with email and managerEmail columns
        file: PathBuf,
    },

    /// Validate and import an org-chart CSV into a company
    Import {
        /// Company ID
        #[arg(long)]
        company: Uuid,

        /// CSV file with email and managerEmail columns
        file: PathBuf,

        /// Invite manager emails that are not in the file or the company
        #[arg(long, env = "ORGREL_INVITE_UNKNOWN_MANAGERS")]
        invite_unknown_managers: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CompanyCommands {
    /// Create a company and print its ID
    Create {
        /// Company name
        name: String,
    },

    /// List companies
    List,
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Connect to the configured database and bring the schema up to date
async fn open_store(config: &OrgrelConfig) -> Result<SeaOrmMembershipStore> {
    let db = orgrel_db::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    orgrel_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    Ok(SeaOrmMembershipStore::new(db))
}

fn read_csv(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read CSV file: {:?}", path))
}

fn print_import_errors(errors: &[ImportError]) {
    for error in errors {
        println!(
            "  row {:>4}  {:<18} {}  {}",
            error.row,
            error.error_type.as_str(),
            error.email,
            error.message
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = OrgrelConfig::resolve(cli.config.as_deref())?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    match cli.command {
        Commands::Serve { bind, no_cors } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind;
            }
            if no_cors {
                config.server.enable_cors = false;
            }

            let store = open_store(&config).await?;
            let server_config = ApiServerConfig {
                bind_addr: config.bind_addr()?,
                enable_cors: config.server.enable_cors,
            };
            let server = ApiServer::new(server_config, Arc::new(store), config.import.clone());

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, shutting down...");
                }
                result = server.start() => {
                    result?;
                }
            }

            info!("Orgrel stopped");
            Ok(())
        }

        Commands::Migrate => {
            open_store(&config).await?;
            println!("Database is up to date");
            Ok(())
        }

        Commands::Company { command } => {
            let store = open_store(&config).await?;
            match command {
                CompanyCommands::Create { name } => {
                    let company = store.create_company(&name).await?;
                    println!("{}", company.id);
                }
                CompanyCommands::List => {
                    for company in store.list_companies().await? {
                        println!("{}  {}", company.id, company.name);
                    }
                }
            }
            Ok(())
        }

        Commands::Classify { company, from, to } => {
            let store = open_store(&config).await?;
            let graph = store.load_graph(company).await?;
            let result = graph.classify_by_email(&from, &to)?;

            println!("{} (distance {})", result.relationship_type, result.distance);
            println!("{}", result.description);
            Ok(())
        }

        Commands::Validate { file } => {
            let content = read_csv(&file)?;
            let rows = parse_csv(&content)?;
            let errors = validate_rows(&rows);

            if errors.is_empty() {
                println!("{} row(s) OK", rows.len());
                return Ok(());
            }

            println!("{} error(s) in {} row(s):", errors.len(), rows.len());
            print_import_errors(&errors);
            anyhow::bail!("Org chart is not valid")
        }

        Commands::Import {
            company,
            file,
            invite_unknown_managers,
        } => {
            let content = read_csv(&file)?;
            let store = open_store(&config).await?;

            let mut options = config.import.clone();
            options.invite_unknown_managers |= invite_unknown_managers;

            let committer = ImportCommitter::new(Arc::new(store), options);
            let summary = match committer.import_csv(company, &content).await {
                Ok(summary) => summary,
                Err(orgrel_core::ImportFailure::Validation(errors)) => {
                    println!("Import rejected, {} validation error(s):", errors.len());
                    print_import_errors(&errors);
                    anyhow::bail!("Nothing was imported");
                }
                Err(e) => return Err(e.into()),
            };

            println!(
                "Imported: {} user(s) added, {} relationship(s) created",
                summary.users_added, summary.relationships_created
            );
            if !summary.errors.is_empty() {
                warn!("{} row(s) failed during import", summary.errors.len());
                print_import_errors(&summary.errors);
            }
            Ok(())
        }
    }
}
