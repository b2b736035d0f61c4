//! Terminal output formatting.
//!
//! Status lines go to stderr so resolved launch lists on stdout stay clean
//! for piping. Colors respect NO_COLOR and are dropped when stderr is not a
//! terminal.

use std::env;
use std::io::{self, IsTerminal};

const RED: &str = "31";
const GREEN: &str = "32";
const YELLOW: &str = "33";
const DIM: &str = "2";

/// Output handler for consistent terminal formatting
pub struct OutputHandler {
    colored: bool,
}

impl OutputHandler {
    /// Create a handler with automatic color detection
    pub fn new() -> Self {
        let colored = env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal();
        Self { colored }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.colored {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        eprintln!("{}", self.paint(DIM, message));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.paint(GREEN, "✓"), message);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", self.paint(YELLOW, "⚠"), message);
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.paint(RED, "✗"), message);
    }
}

impl Default for OutputHandler {
    fn default() -> Self {
        Self::new()
    }
}
