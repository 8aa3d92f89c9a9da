//! Terminal confirmation prompt

use std::io::{self, BufRead, Write};
use stride_engine::{Decide, Decision};

/// Asks the user on stderr and reads one-letter answers from stdin.
///
/// `y` proceeds, `n` skips the item, `s` stops asking. EOF counts as stop so
/// piped input never hangs a run.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Decide for TerminalPrompt {
    fn confirm(&mut self, prompt: &str) -> Decision {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            eprint!("{prompt} [y/n/s] ");
            let _ = io::stderr().flush();

            line.clear();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return Decision::Stop,
                Ok(_) => {}
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Decision::Yes,
                "n" | "no" => return Decision::No,
                "s" | "stop" | "q" => return Decision::Stop,
                other => eprintln!("unrecognized answer '{other}'"),
            }
        }
    }
}
