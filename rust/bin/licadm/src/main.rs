//! `licadm`: admin CLI for the license-issuance backend.
//!
//! Registers systems, issues license keys bound to them, and caps how
//! many distinct IP addresses a key may be used from. The session token
//! lives in `~/.licadm/config.toml` next to the server URL.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use config::ClientConfig;

/// License backend admin client.
#[derive(Parser, Debug)]
#[command(name = "licadm", about = "License backend admin client")]
struct Cli {
    /// Path to client config file (default: ~/.licadm/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configure the backend connection.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Login to the configured backend.
    Login {
        /// Username.
        #[arg(long)]
        user: Option<String>,
        /// Password (not recommended; use the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Logout: discard the stored credential.
    Logout,

    /// Check backend reachability and session validity.
    Status,

    /// Systems that licenses are issued under.
    Systems {
        #[command(subcommand)]
        action: SystemsAction,
    },

    /// License keys.
    Licenses {
        #[command(subcommand)]
        action: LicensesAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Set the backend base URL.
    SetServer { url: String },
    /// Print the current configuration.
    Show,
}

#[derive(Subcommand, Debug)]
enum SystemsAction {
    /// List registered systems.
    List,
    /// Register a new system.
    Add { name: String },
}

#[derive(Subcommand, Debug)]
enum LicensesAction {
    /// List license keys, filtered and paginated.
    List {
        /// Case-insensitive search over key and system name.
        #[arg(long, default_value = "")]
        search: String,
        /// Page number (10 rows per page).
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Issue a new license key under a system.
    Issue {
        /// Id of the system the key is bound to.
        #[arg(long)]
        system: i64,
    },
    /// Cap how many distinct IPs a key may be used from.
    SetIpLimit {
        /// License key to update.
        key: String,
        /// New limit; omit for unlimited.
        limit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(ClientConfig::default_path);
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::SetServer { url } => {
                commands::server::set_server(&url, &config_path)?;
            }
            ConfigAction::Show => {
                commands::server::show(&config_path)?;
            }
        },

        Commands::Login { user, password } => {
            let username = user.unwrap_or_else(|| {
                eprint!("Username: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s).unwrap();
                s.trim().to_string()
            });
            let password = password.unwrap_or_else(|| {
                rpassword::prompt_password("Password: ").unwrap_or_default()
            });
            commands::login::login(&username, &password, &config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path)?;
        }

        Commands::Status => {
            commands::status::status(&config_path).await?;
        }

        Commands::Systems { action } => match action {
            SystemsAction::List => {
                commands::systems::list(json_output, &config_path).await?;
            }
            SystemsAction::Add { name } => {
                commands::systems::add(&name, &config_path).await?;
            }
        },

        Commands::Licenses { action } => match action {
            LicensesAction::List { search, page } => {
                commands::licenses::list(&search, page, json_output, &config_path).await?;
            }
            LicensesAction::Issue { system } => {
                commands::licenses::issue(system, &config_path).await?;
            }
            LicensesAction::SetIpLimit { key, limit } => {
                commands::licenses::set_ip_limit(
                    &key,
                    limit.as_deref().unwrap_or(""),
                    &config_path,
                )
                .await?;
            }
        },

        Commands::Version => {
            println!("licadm v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
