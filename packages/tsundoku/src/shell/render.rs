//! Terminal rendering for records and outcomes.

use colored::Colorize;

use crate::triage::{AddOutcome, Listed};

pub fn banner() -> String {
    [
        "╔════════════════════════════════════════╗".bright_cyan().to_string(),
        "║      📚 Tsundoku Mate: read it later     ║".bright_cyan().to_string(),
        "╚════════════════════════════════════════╝".bright_cyan().to_string(),
    ]
    .join("\n")
}

pub fn celebration(title: &str) -> String {
    format!(
        "\n{}\n{}\n",
        "🎉🎈 Saved! One less thing to worry about. 🎈🎉".bright_green().bold(),
        format!("   「{}」 is on your shelf.", title).green()
    )
}

/// One-line result for an add attempt.
pub fn outcome_line(outcome: &AddOutcome) -> String {
    let message = outcome.message();
    match outcome {
        AddOutcome::Saved(_) => format!("✅ {}", message).bright_green().to_string(),
        AddOutcome::EmptyUrl => format!("⚠️  {}", message).yellow().to_string(),
        _ => format!("❌ {}", message).bright_red().to_string(),
    }
}

/// A record card; `number` is the 1-based display index.
pub fn card(number: usize, listed: &Listed) -> String {
    let record = &listed.record;
    let mut lines = vec![format!(
        "{} {}",
        format!("{:>2}.", number).dimmed(),
        record.title.bold()
    )];

    if !record.summary.is_empty() {
        lines.push(format!("    {}", record.summary));
    }
    if !record.point.is_empty() {
        lines.push(format!("    💡 {}", record.point.bright_yellow()));
    }
    if !record.action.is_empty() {
        lines.push(format!("    🚀 {}", record.action.bright_magenta()));
    }
    if !record.url.is_empty() {
        lines.push(format!("    🔗 {}", record.url.underline().blue()));
    }

    lines.join("\n")
}

pub fn shelf(listed: &[Listed]) -> String {
    if listed.is_empty() {
        return "Your shelf is empty. Add an article to get started!"
            .dimmed()
            .to_string();
    }

    let header = format!("📚 {} article(s) on your shelf, newest first", listed.len())
        .bright_blue()
        .bold()
        .to_string();
    let cards: Vec<String> = listed
        .iter()
        .enumerate()
        .map(|(i, l)| card(i + 1, l))
        .collect();

    format!("{}\n\n{}", header, cards.join("\n\n"))
}

/// Short label for pick lists.
pub fn pick_label(number: usize, listed: &Listed) -> String {
    format!("{}. {}", number, listed.record.title)
}
