//! # Wordbook Architecture
//!
//! Wordbook is a **personal dictionary library**: entries made of a word, a
//! definition, tags and synonyms, stored one JSON file per word. The CLI in
//! `cli/` is one client of it; nothing below `app.rs` knows about terminals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prints entries, asks for confirmation  │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  App Layer (app.rs)                                         │
//! │  - Owns schema, store, session and search text              │
//! │  - Startup/shutdown against the settings service            │
//! │  - Change notifications for UIs                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Session Layer (session.rs)                                 │
//! │  - View/edit state machine, working copy, confirmations     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - EntryStore: sorted collection, word uniqueness           │
//! │  - StorageBackend: FsBackend (production), MemBackend (tests)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`schema`] and [`search`] are pure leaves used across the layers.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `app.rs` inward, code takes Rust values and returns `Result`s. It
//! never prints, never exits, and asks the user only through the
//! [`app::ConfirmationDialog`] trait.
//!
//! ## Module Overview
//!
//! - [`app`]: application state and the operations a UI triggers
//! - [`session`]: the edit session state machine
//! - [`store`]: entry collection and storage backends
//! - [`schema`]: field modules and the NullEntry template
//! - [`search`]: query parsing and filtering
//! - [`model`]: `Entry` and `FieldValue`
//! - [`settings`]: the key-value settings file
//! - [`logging`]: logger bootstrap for binaries
//! - [`error`]: error types

pub mod app;
pub mod error;
pub mod logging;
pub mod model;
pub mod schema;
pub mod search;
pub mod session;
pub mod settings;
pub mod store;
