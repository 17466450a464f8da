// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! VetDesk - front-desk client for a veterinary clinic.
//!
//! This is the binary entry point. Every subcommand runs against the same
//! runtime core the desktop views use: the authenticated client, the query
//! cache, the status workflow and the real-time dispatcher.

mod board;
mod error;
mod follow;
mod session;
mod shutdown;
mod status;

use std::io::IsTerminal;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::CliError;
use crate::session::Session;

/// VetDesk - front-desk client for a veterinary clinic.
#[derive(Parser, Debug)]
#[command(name = "vetdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the usual search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in with doctor credentials.
    Login {
        /// Account email; prompted for when omitted.
        #[arg(long)]
        email: Option<String>,
    },
    /// Clear stored credentials.
    Logout,
    /// Show the appointment board for a day.
    Board {
        /// Day to show (YYYY-MM-DD). Defaults to every appointment the backend returns.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the waiting-room queue, longest wait first.
    Queue,
    /// Move an appointment to a new status.
    Status {
        /// Appointment id.
        id: i64,
        /// Target status ("Checked In", "waiting") or quick action ("check-in", "start").
        target: String,
    },
    /// List notifications.
    Notifications {
        /// Keep running and print notifications as they arrive.
        #[arg(long)]
        follow: bool,
    },
    /// Send a chat message and print the conversation.
    Chat {
        conversation: String,
        message: String,
    },
    /// Probe the backend health endpoint.
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vetdesk_config::load_and_validate_path(path),
        None => vetdesk_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vetdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let Some(command) = cli.command else {
        println!("vetdesk: use --help for available commands");
        return;
    };

    let use_color = !cli.plain && std::io::stdout().is_terminal();

    let session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("vetdesk: {}", e.user_message());
            std::process::exit(1);
        }
    };

    let result = match command {
        Commands::Login { email } => session::run_login(&session, email).await,
        Commands::Logout => session::run_logout(&session),
        Commands::Board { date } => board::run_board(&session, date, use_color).await,
        Commands::Queue => board::run_queue(&session, use_color).await,
        Commands::Status { id, target } => status::run_status(&session, id, &target, use_color).await,
        Commands::Notifications { follow } => follow::run_notifications(&session, follow, use_color).await,
        Commands::Chat {
            conversation,
            message,
        } => follow::run_chat(&session, &conversation, &message).await,
        Commands::Health => status::run_health(&session, use_color).await,
    };

    if let Err(e) = result {
        report(&session, &e);
        std::process::exit(1);
    }
}

fn report(session: &Session, error: &CliError) {
    eprintln!("vetdesk: {}", error.message());
    if session.login_redirect().is_some() {
        eprintln!("vetdesk: session ended; run `vetdesk login` to sign in again");
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vetdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
