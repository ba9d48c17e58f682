//! `tco` library crate.
//!
//! The binary (`tco`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., future GUI/daemon, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod calc;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod finance;
pub mod io;
pub mod plot;
pub mod report;
pub mod sweep;
