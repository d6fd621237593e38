//! Operator console: plain messages during human-in-the-loop waits and the
//! blocking "press Enter" prompt before teardown.

use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Clone, Copy)]
pub struct OutputHandlers {
    pub out: fn(&str),
    pub err: fn(&str),
}

impl OutputHandlers {
    pub fn console() -> Self {
        Self {
            out: |msg| println!("{}", msg),
            err: |msg| eprintln!("{}", msg),
        }
    }

    /// Discard everything; the log stream still records each step.
    pub fn silent() -> Self {
        Self {
            out: |_| {},
            err: |_| {},
        }
    }

    pub fn say(&self, msg: &str) {
        (self.out)(msg)
    }

    pub fn warn(&self, msg: &str) {
        (self.err)(msg)
    }
}

impl std::fmt::Debug for OutputHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputHandlers").finish_non_exhaustive()
    }
}

/// Possible outcomes of the Enter prompt.
#[derive(Debug)]
pub enum PromptResult {
    /// The operator pressed Enter.
    Confirmed,
    /// Ctrl+C while waiting.
    Interrupted,
    /// Stdin closed (EOF), e.g. when not attached to a terminal.
    Closed,
    Error(io::Error),
}

/// Print `prompt` and wait for a line on stdin.
pub async fn wait_for_enter(prompt: &str, output: OutputHandlers, handle_ctrl_c: bool) -> PromptResult {
    (output.out)(prompt);
    if let Err(e) = io::stdout().flush() {
        return PromptResult::Error(e);
    }

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();

    if handle_ctrl_c {
        tokio::select! {
            line = reader.next_line() => classify_line(line),
            _ = tokio::signal::ctrl_c() => PromptResult::Interrupted,
        }
    } else {
        classify_line(reader.next_line().await)
    }
}

fn classify_line(result: Result<Option<String>, io::Error>) -> PromptResult {
    match result {
        Ok(Some(_)) => PromptResult::Confirmed,
        Ok(None) => PromptResult::Closed,
        Err(e) => PromptResult::Error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_line() {
        assert!(matches!(
            classify_line(Ok(Some(String::new()))),
            PromptResult::Confirmed
        ));
        assert!(matches!(classify_line(Ok(None)), PromptResult::Closed));
        assert!(matches!(
            classify_line(Err(io::Error::other("boom"))),
            PromptResult::Error(_)
        ));
    }
}
