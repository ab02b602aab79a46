use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use booking_client::BookingClient;
use clap::{Parser, Subcommand};
use dispenser::DispenserController;
use shared::{domain::Beverage, protocol::Registration};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod feedback;
mod render;

use commands::PourRequest;
use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "kiosk", about = "Summa Padel venue kiosk")]
struct Cli {
    /// Config file; defaults to ./kiosk.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pour a drink on the simulated dispenser.
    Pour {
        #[arg(long)]
        beverage: Beverage,
        #[arg(long)]
        ice: bool,
        #[arg(long)]
        lemon: bool,
        /// Emit one JSON snapshot per state change instead of a status line.
        #[arg(long)]
        json: bool,
    },
    /// List courts open for booking.
    Courts,
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        phone: String,
    },
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Profile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        sign_out: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    let mut out = io::stdout();

    match cli.command {
        Command::Pour {
            beverage,
            ice,
            lemon,
            json,
        } => {
            let controller = DispenserController::new(settings.pour_timing()?);
            commands::run_pour(
                &controller,
                PourRequest {
                    beverage,
                    ice,
                    lemon,
                    json,
                },
                &mut out,
            )
            .await?;
        }
        Command::Courts => {
            let backend = connect(&settings)?;
            commands::list_courts(&backend, &mut out).await?;
        }
        Command::SignUp {
            email,
            password,
            full_name,
            phone,
        } => {
            let backend = connect(&settings)?;
            let registration = Registration {
                email,
                password,
                full_name,
                phone,
            };
            commands::sign_up(&backend, &registration, &mut out).await?;
        }
        Command::SignIn { email, password } => {
            let backend = connect(&settings)?;
            commands::sign_in(&backend, &email, &password, &mut out).await?;
        }
        Command::Profile {
            email,
            password,
            sign_out,
        } => {
            let backend = connect(&settings)?;
            commands::show_profile(&backend, &email, &password, sign_out, &mut out).await?;
        }
    }

    Ok(())
}

fn connect(settings: &Settings) -> Result<BookingClient> {
    let service = settings.service_config()?;
    tracing::debug!(url = %service.base_url, "using backend");
    BookingClient::new(service).context("failed to build http client")
}
