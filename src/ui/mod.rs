//! Ratatui front-end. It owns no business logic: every change goes through the
//! store or the ordering module and the affected lists are reloaded afterwards.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
