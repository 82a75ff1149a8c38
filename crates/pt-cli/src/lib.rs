//! # pt-cli
//!
//! Front end for polytune. The `polytune` binary wires a dataset, a split and
//! the search driver together; [`shell`] holds the prompt loop plus the input
//! parsing and report formatting it relies on.

pub mod shell;

pub use shell::{format_report, parse_restart_count, render_report, wants_another_round, Shell};
