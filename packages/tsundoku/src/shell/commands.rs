//! One-shot subcommands. Each returns whether it succeeded so the binary
//! can set its exit code.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::render;
use crate::store::FIRST_RECORD_ROW;
use crate::triage::{AddOutcome, DeleteOutcome, Listed, Triage};

pub async fn add(triage: &Triage, url: &str) -> bool {
    let outcome = triage.add(url).await;
    match &outcome {
        AddOutcome::Saved(record) => {
            println!("{}", render::celebration(&record.title));
            let listed = Listed {
                position: FIRST_RECORD_ROW,
                record: record.clone(),
            };
            println!("{}", render::card(1, &listed));
        }
        _ => eprintln!("{}", render::outcome_line(&outcome)),
    }
    outcome.is_success()
}

pub async fn list(triage: &Triage) -> bool {
    match triage.list().await {
        Ok(listed) => {
            println!("{}", render::shelf(&listed));
            true
        }
        Err(e) => {
            eprintln!("{}", format!("❌ Couldn't read your shelf ({}).", e).bright_red());
            false
        }
    }
}

/// Delete by 1-based display number, as shown by `list`.
pub async fn delete(triage: &Triage, number: usize) -> bool {
    let listed = match triage.list().await {
        Ok(listed) => listed,
        Err(e) => {
            eprintln!("{}", format!("❌ Couldn't read your shelf ({}).", e).bright_red());
            return false;
        }
    };

    let Some(target) = number.checked_sub(1).and_then(|i| listed.get(i)) else {
        eprintln!(
            "{}",
            format!("❌ No article #{} (the shelf has {}).", number, listed.len()).bright_red()
        );
        return false;
    };

    match triage.delete(target).await {
        Ok(DeleteOutcome::Deleted { .. }) => {
            println!("{}", format!("🗑️  Deleted \"{}\".", target.record.title).green());
            true
        }
        Ok(DeleteOutcome::Vanished) => {
            eprintln!("{}", "❌ That article is no longer on the shelf.".bright_red());
            false
        }
        Err(e) => {
            eprintln!("{}", format!("❌ Couldn't delete ({}).", e).bright_red());
            false
        }
    }
}

pub async fn clear(triage: &Triage, yes: bool) -> Result<bool> {
    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Delete every article on your shelf?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Nothing deleted.".dimmed());
            return Ok(true);
        }
    }

    match triage.clear().await {
        Ok(count) => {
            println!("{}", format!("🧹 Cleared {} article(s).", count).green());
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", format!("❌ Couldn't clear ({}).", e).bright_red());
            Ok(false)
        }
    }
}
