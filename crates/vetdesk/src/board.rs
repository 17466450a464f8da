// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vetdesk board` and `vetdesk queue` command implementations.

use chrono::{NaiveDate, Utc};
use colored::Colorize;
use vetdesk_clinic::{
    build_queue, format_wait, is_flagged, Board, Column, ErrorBoundary, QueueItem, QuickAction,
};
use vetdesk_core::Appointment;

use crate::error::CliError;
use crate::session::{load_view, Session};

/// Run the `vetdesk board` command.
pub async fn run_board(session: &Session, date: Option<NaiveDate>, use_color: bool) -> Result<(), CliError> {
    let boundary = ErrorBoundary::new("board");
    let appointments = load_view(&boundary, &mut session.queries.appointments(date)).await?;
    let board = Board::build(appointments);

    let title = match date {
        Some(day) => format!("vetdesk board ({day})"),
        None => "vetdesk board".to_string(),
    };
    println!();
    println!("  {title}");
    println!("  {}", "-".repeat(35));
    for column in board.columns() {
        print_column(column, use_color);
    }
    println!();
    println!("  {} appointments", board.total());
    println!();
    Ok(())
}

fn print_column(column: &Column, use_color: bool) {
    let header = format!("{} ({})", column.key, column.len());
    if use_color {
        println!("  {}", header.bold());
    } else {
        println!("  {header}");
    }
    for card in &column.cards {
        println!("    {}", card_line(card, use_color));
    }
}

fn card_line(card: &Appointment, use_color: bool) -> String {
    let pet = card.pet_name.as_deref().unwrap_or("-");
    let mut line = format!(
        "#{:<5} {}  {:<12} {}",
        card.id,
        card.scheduled_at.format("%H:%M"),
        pet,
        card.appointment_type
    );

    let actions: Vec<&str> = QuickAction::suggested_for(card.status)
        .into_iter()
        .map(QuickAction::label)
        .collect();
    if !actions.is_empty() {
        line.push_str(&format!("  [{}]", actions.join(" | ")));
    }

    if is_flagged(card) {
        if use_color {
            return format!("{} {line}", "!".red().bold());
        }
        return format!("! {line}");
    }
    format!("  {line}")
}

/// Run the `vetdesk queue` command.
pub async fn run_queue(session: &Session, use_color: bool) -> Result<(), CliError> {
    let boundary = ErrorBoundary::new("queue");
    let appointments = load_view(&boundary, &mut session.queries.queue()).await?;
    let items = build_queue(&appointments);
    let now = Utc::now();

    println!();
    println!("  vetdesk queue");
    println!("  {}", "-".repeat(35));
    if items.is_empty() {
        println!("    Nobody is waiting.");
    }
    for (position, item) in items.iter().enumerate() {
        println!("    {}", queue_line(position + 1, item, now, use_color));
    }
    println!();
    Ok(())
}

fn queue_line(position: usize, item: &QueueItem, now: chrono::DateTime<Utc>, use_color: bool) -> String {
    let wait = format_wait(item.wait_time(now));
    let doctor = item.doctor_name.as_deref().unwrap_or("unassigned");
    let line = format!(
        "{position:>2}. {:<14} {:<12} {:>7}  {doctor}",
        item.pet_name,
        item.status.to_string(),
        wait
    );
    match (item.is_priority(), use_color) {
        (true, true) => format!("{line}  {}", "priority".red()),
        (true, false) => format!("{line}  [priority]"),
        (false, _) => line,
    }
}
