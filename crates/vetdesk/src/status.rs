// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vetdesk status` and `vetdesk health` command implementations.
//!
//! `status` loads one appointment and moves it through the optimistic
//! status workflow; `health` probes the backend's unauthenticated health
//! endpoint and reports the configured real-time endpoints.

use colored::Colorize;
use tracing::debug;
use vetdesk_client::services::health;
use vetdesk_clinic::{column_for, parse_target, ErrorBoundary, QuickAction, StatusWorkflow};
use vetdesk_core::types::HealthReport;
use vetdesk_core::AppointmentId;

use crate::error::CliError;
use crate::session::{load_view, Session};

/// Run the `vetdesk status` command.
pub async fn run_status(session: &Session, id: i64, target: &str, use_color: bool) -> Result<(), CliError> {
    let status = parse_target(target)
        .ok_or_else(|| CliError::Usage(format!("unknown status or action `{target}`")))?;

    let boundary = ErrorBoundary::new("appointment");
    let mut appointment = load_view(&boundary, &mut session.queries.appointment(AppointmentId(id))).await?;
    let previous = appointment.status;
    if previous == status {
        println!("Appointment #{id} is already {status}.");
        return Ok(());
    }
    if !QuickAction::suggested_for(previous).iter().any(|a| a.target() == status) {
        debug!(%previous, %status, "requesting a transition no quick action offers");
    }

    let workflow = StatusWorkflow::new(session.client.clone(), session.queries.cache().clone());
    workflow.transition(&mut appointment, status).await?;

    let moved = format!("{previous} -> {status}");
    if use_color {
        println!("{} Appointment #{id}: {} ({})", "✓".green(), moved.green(), column_for(status));
    } else {
        println!("[OK] Appointment #{id}: {moved} ({})", column_for(status));
    }
    Ok(())
}

/// Run the `vetdesk health` command.
pub async fn run_health(session: &Session, use_color: bool) -> Result<(), CliError> {
    let realtime = &session.config.realtime;
    if let Some(push) = &realtime.push_service_url {
        debug!(push_service_url = %push, "push service configured");
    }

    let report = health::check(&session.client).await;
    println!();
    println!("  vetdesk health");
    println!("  {}", "-".repeat(35));
    match &report {
        Ok(report) => print_healthy(report, use_color),
        Err(e) => print_unreachable(&e.user_message(), use_color),
    }
    println!("    API:      {}", session.client.base_url());
    if realtime.enabled {
        println!("    Socket:   {}", realtime.url);
    } else {
        println!("    Socket:   disabled");
    }
    let signed_in = if session.client.is_authenticated() { "yes" } else { "no" };
    println!("    Signed in: {signed_in}");
    println!();

    report.map(|_| ()).map_err(CliError::from)
}

fn print_healthy(report: &HealthReport, use_color: bool) {
    let version = report
        .version
        .as_deref()
        .map(|v| format!(" (version {v})"))
        .unwrap_or_default();
    if use_color {
        println!("    State:    {} {}{version}", "✓".green(), report.status.green());
    } else {
        println!("    State:    [OK] {}{version}", report.status);
    }
}

fn print_unreachable(message: &str, use_color: bool) {
    if use_color {
        println!("    State:    {} {}", "✗".red(), message.red());
    } else {
        println!("    State:    [FAIL] {message}");
    }
}
