//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use sweets_core::{config, logging};
use sweets_types::{Category, SweetId};

use crate::app::App;

mod commands;

#[derive(Parser)]
#[command(name = "sweets")]
#[command(version)]
#[command(about = "Sweets inventory client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Record fields shared by create and update. Values are checked and
/// coerced before anything is sent.
#[derive(clap::Args, Debug, Clone)]
struct SweetArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// One of CHOCOLATE, GUMMY, HARD_CANDY, OTHER
    #[arg(long)]
    category: String,

    /// Unit price
    #[arg(long)]
    price: String,

    /// Units in stock
    #[arg(long, allow_hyphen_values = true)]
    quantity: String,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create an account (password and confirmation are read from stdin)
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },

    /// Log in (password is read from stdin)
    Login {
        #[arg(long, env = "SWEETS_USERNAME")]
        username: String,
    },

    /// Log out and forget the stored credential
    Logout,

    /// Show whether a session is active
    Status,

    /// List the inventory
    List,

    /// Search the inventory
    Search {
        /// Case-insensitive name fragment
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_name = "PRICE")]
        min_price: Option<Decimal>,
        #[arg(long, value_name = "PRICE")]
        max_price: Option<Decimal>,
        #[arg(long)]
        category: Option<Category>,
    },

    /// Show one sweet
    Show {
        #[arg(value_name = "ID")]
        id: SweetId,
    },

    /// Add a sweet (admin only)
    Create {
        #[command(flatten)]
        fields: SweetArgs,
    },

    /// Replace a sweet's fields (admin only)
    Update {
        #[arg(value_name = "ID")]
        id: SweetId,
        #[command(flatten)]
        fields: SweetArgs,
    },

    /// Delete a sweet (admin only)
    Delete {
        #[arg(value_name = "ID")]
        id: SweetId,
    },

    /// Download the inventory report as CSV (admin only)
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set the server base URL
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the config file is broken.
    if let Commands::Config { command } = &cli.command {
        return run_config(command);
    }

    let config = config::Config::load().context("load config")?;
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli.command, &config).await })
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    let mut app = App::new(config)?;

    match command {
        Commands::Register { username, email } => {
            commands::auth::register(&mut app, username, email).await
        }
        Commands::Login { username } => commands::auth::login(&mut app, &username).await,
        Commands::Logout => commands::auth::logout(&mut app).await,
        Commands::Status => {
            commands::auth::status(&app);
            Ok(())
        }
        Commands::List => commands::sweets::list(&mut app).await,
        Commands::Search {
            name,
            min_price,
            max_price,
            category,
        } => {
            let filter = sweets_types::SearchFilter {
                name,
                min_price,
                max_price,
                category,
            };
            commands::sweets::search(&mut app, &filter).await
        }
        Commands::Show { id } => commands::sweets::show(&mut app, id).await,
        Commands::Create { fields } => commands::sweets::create(&mut app, &fields.into()).await,
        Commands::Update { id, fields } => {
            commands::sweets::update(&mut app, id, &fields.into()).await
        }
        Commands::Delete { id } => commands::sweets::delete(&mut app, id).await,
        Commands::Export { output } => commands::sweets::export(&mut app, output.as_deref()).await,
        Commands::Config { command } => run_config(&command),
    }
}

fn run_config(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::SetBaseUrl { url } => commands::config::set_base_url(url),
    }
}

impl From<SweetArgs> for sweets_core::SweetDraft {
    fn from(args: SweetArgs) -> Self {
        sweets_core::SweetDraft::new(args.name, args.category, args.price, args.quantity)
    }
}
