//! Catalog orchestration.
//!
//! This module owns the search session, input debouncing, view derivation and
//! the query coordinator, plus the controller loop the TUI talks to. CLI and
//! TUI layers call into this module instead of the data source directly.

mod controller;
mod coordinator;
mod debounce;
mod search;
pub mod view;

pub(crate) use controller::{run_controller, UiCommand};
pub use coordinator::Coordinator;
