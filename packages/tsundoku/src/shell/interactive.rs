//! The menu-driven session: an "add" view and a "shelf" view.
//!
//! Every collaborator failure arrives here as a value and is printed; the
//! session stays up for a manual retry.

use anyhow::Result;
use colored::Colorize;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use super::render;
use crate::triage::{AddOutcome, DeleteOutcome, Listed, Triage};

pub struct Shell {
    triage: Triage,
    term: Term,
    theme: ColorfulTheme,
}

impl Shell {
    pub fn new(triage: Triage) -> Self {
        Self {
            triage,
            term: Term::stdout(),
            theme: ColorfulTheme::default(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.term.clear_screen()?;
        println!("{}", render::banner());
        println!(
            "{}",
            format!("   shelf: {}", self.triage.store_name()).dimmed()
        );

        loop {
            println!();
            let options = ["📥 Add an article", "📚 My shelf", "👋 Exit"];

            let selection = Select::with_theme(&self.theme)
                .with_prompt("What would you like to do?")
                .items(&options)
                .default(0)
                .interact_on(&self.term)?;

            match selection {
                0 => self.add_view().await?,
                1 => self.shelf_view().await?,
                _ => {
                    println!("{}", "👋 See you next time. Happy reading!".bright_blue());
                    break;
                }
            }
        }

        Ok(())
    }

    /// Prompt for URLs until the user is done. A failed URL stays in the
    /// input for another try; a saved one is cleared.
    async fn add_view(&self) -> Result<()> {
        let mut prefill = String::new();

        loop {
            let url: String = Input::with_theme(&self.theme)
                .with_prompt("Article URL")
                .with_initial_text(prefill.clone())
                .allow_empty(true)
                .interact_text_on(&self.term)?;

            println!("{}", "📖 Reading and summarizing...".dimmed());
            let outcome = self.triage.add(&url).await;

            let again = match &outcome {
                AddOutcome::Saved(record) => {
                    println!("{}", render::celebration(&record.title));
                    prefill.clear();
                    "Add another article?"
                }
                _ => {
                    println!("{}", render::outcome_line(&outcome));
                    prefill = url.trim().to_string();
                    "Try again?"
                }
            };

            let more = Confirm::with_theme(&self.theme)
                .with_prompt(again)
                .default(!outcome.is_success())
                .interact_on(&self.term)?;
            if !more {
                return Ok(());
            }
        }
    }

    /// Render the shelf from a fresh read after every action.
    async fn shelf_view(&self) -> Result<()> {
        loop {
            let listed = match self.triage.list().await {
                Ok(listed) => {
                    println!("\n{}\n", render::shelf(&listed));
                    listed
                }
                Err(e) => {
                    println!(
                        "{}",
                        format!("❌ Couldn't read your shelf ({}).", e).bright_red()
                    );
                    Vec::new()
                }
            };

            let options = ["🔄 Refresh", "🗑️  Delete one", "🧹 Clear all", "⬅️  Back"];
            let selection = Select::with_theme(&self.theme)
                .with_prompt("Shelf")
                .items(&options)
                .default(0)
                .interact_on(&self.term)?;

            match selection {
                0 => continue,
                1 => self.delete_one(&listed).await?,
                2 => self.clear_all(&listed).await?,
                _ => return Ok(()),
            }
        }
    }

    async fn delete_one(&self, listed: &[Listed]) -> Result<()> {
        if listed.is_empty() {
            println!("{}", "Nothing to delete.".dimmed());
            return Ok(());
        }

        let mut labels: Vec<String> = listed
            .iter()
            .enumerate()
            .map(|(i, l)| render::pick_label(i + 1, l))
            .collect();
        labels.push("Cancel".to_string());

        let choice = Select::with_theme(&self.theme)
            .with_prompt("Which article?")
            .items(&labels)
            .default(0)
            .interact_on(&self.term)?;

        let Some(target) = listed.get(choice) else {
            return Ok(());
        };

        match self.triage.delete(target).await {
            Ok(DeleteOutcome::Deleted { .. }) => {
                println!("{}", format!("🗑️  Deleted \"{}\".", target.record.title).green())
            }
            Ok(DeleteOutcome::Vanished) => println!(
                "{}",
                "That article was already gone; showing the current shelf.".yellow()
            ),
            Err(e) => println!("{}", format!("❌ Couldn't delete ({}).", e).bright_red()),
        }
        Ok(())
    }

    async fn clear_all(&self, listed: &[Listed]) -> Result<()> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(format!("Delete all {} article(s)?", listed.len()))
            .default(false)
            .interact_on(&self.term)?;
        if !confirmed {
            return Ok(());
        }

        match self.triage.clear().await {
            Ok(count) => println!("{}", format!("🧹 Cleared {} article(s).", count).green()),
            Err(e) => println!("{}", format!("❌ Couldn't clear ({}).", e).bright_red()),
        }
        Ok(())
    }
}
