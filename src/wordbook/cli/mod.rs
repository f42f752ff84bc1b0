//! # CLI Layer
//!
//! One UI client for the wordbook library. This is the only place that:
//! - parses arguments
//! - reads from and writes to the terminal
//! - turns errors into exit codes (in `main.rs`)
//!
//! ## Flow
//!
//! `run()` parses arguments, starts logging, loads the settings, opens an
//! [`wordbook::app::App`] on the configured storage directory, dispatches to
//! a `handle_*` function and finally writes the settings back. Each run is
//! one "session" of the application: the last selection and search text
//! survive between runs through the settings file, so `wordbook show` with
//! no word shows what was looked at last.
//!
//! ## Structure
//!
//! - `setup.rs`: clap definitions
//! - `commands.rs`: context setup and per-command handlers
//! - `render.rs`: list and entry formatting
//! - `styles.rs`: the color theme
//! - `dialog.rs`: terminal confirmation prompts

mod commands;
mod dialog;
mod render;
mod setup;
mod styles;

pub use commands::run;
