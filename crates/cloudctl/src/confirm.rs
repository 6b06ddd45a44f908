//! Interactive confirmation for destructive commands

use std::fmt::Display;
use std::io::{BufReader, IsTerminal, Stderr, Stdin};

use cloudctl_core::{Confirmer, CoreError, LineConfirmer, is_affirmative};
use dialoguer::Input;

/// Prompts with dialoguer on a terminal, otherwise reads answers line by line from stdin
///
/// Both paths read a whole line and accept the same answers.
pub struct TerminalConfirmer {
    lines: LineConfirmer<BufReader<Stdin>, Stderr>,
}

impl TerminalConfirmer {
    pub fn new() -> Self {
        Self {
            lines: LineConfirmer::stdio(),
        }
    }
}

impl Default for TerminalConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> cloudctl_core::Result<bool> {
        if std::io::stdin().is_terminal() {
            let answer = Input::<String>::new()
                .with_prompt(format!("{} [y/N]", prompt))
                .allow_empty(true)
                .interact_text();
            accept(answer)
        } else {
            self.lines.confirm(prompt)
        }
    }
}

fn accept<E: Display>(answer: Result<String, E>) -> cloudctl_core::Result<bool> {
    answer
        .map(|line| is_affirmative(&line))
        .map_err(|e| CoreError::Confirmation(format!("Failed to get user confirmation: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(answer: &str) -> Result<String, std::io::Error> {
        Ok(answer.to_string())
    }

    #[test]
    fn test_terminal_answers_follow_line_rules() {
        for answer in ["y", "Y", "yes", "YES"] {
            assert!(accept(typed(answer)).unwrap(), "{answer}");
        }
        for answer in ["Yes", "yEs", "yes please", "", "n"] {
            assert!(!accept(typed(answer)).unwrap(), "{answer}");
        }
    }

    #[test]
    fn test_terminal_read_error_is_a_confirmation_error() {
        let err = accept::<std::io::Error>(Err(std::io::Error::other("not a tty"))).unwrap_err();
        assert!(matches!(err, CoreError::Confirmation(ref m) if m.contains("not a tty")));
    }
}
