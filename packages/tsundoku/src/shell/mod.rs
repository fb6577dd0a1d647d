//! Terminal front end: the interactive session plus one-shot commands.

pub mod commands;
mod interactive;
pub mod render;

pub use interactive::Shell;
