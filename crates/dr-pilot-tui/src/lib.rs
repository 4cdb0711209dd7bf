//! dr-pilot-tui: Terminal UI for dr-pilot
//!
//! The presentation layer: the application loop, the component system, and
//! the manage-policies view, plus the terminal plumbing and audit log.

pub mod action;
pub mod app;
pub mod audit;
pub mod components;
pub mod tui;

pub use app::App;
