//! Core library for the study organizer: subjects with ordered document,
//! video, and live-class lists, persisted in a local SQLite file.
//!
//! The `bin` target only wires configuration, logging, and the terminal UI
//! around these modules, so tests and other tooling can drive the store
//! directly.
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod models;
pub mod ordering;
pub mod ui;

pub use config::{Config, SchemaMode};
pub use db::Store;
pub use export::{Snapshot, SubjectSnapshot};
pub use models::{Category, ContentItem, ContentTarget, Subject, SubjectStatus, TargetKind};
pub use ui::{run_app, App};
