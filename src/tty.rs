//! Terminal I/O utilities for the CLI.

use std::io::{self, IsTerminal};

pub fn is_stderr_tty() -> bool {
    io::stderr().is_terminal()
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if is_stderr_tty() {
        eprintln!("{}", message);
    }
}

// log_status! macro is defined in the library crate (#[macro_export]).
