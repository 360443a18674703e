use std::io::{self, BufRead, Write};

use crate::sync::actions::Confirm;

/// Asks on stderr and reads the answer from a line-oriented reader
/// (stdin in the binary). Anything but `y`/`yes` declines, including EOF.
pub struct PromptConfirm<R> {
    input: R,
}

impl PromptConfirm<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        PromptConfirm {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> PromptConfirm<R> {
    pub fn new(input: R) -> Self {
        PromptConfirm { input }
    }
}

impl<R: BufRead> Confirm for PromptConfirm<R> {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
