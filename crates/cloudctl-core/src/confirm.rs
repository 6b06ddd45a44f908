//! Confirmation of destructive operations
//!
//! Every mutation issued by a command is gated behind a [`Confirmer`]. Passing
//! `forced` (the `--force` flag) answers "yes" without reading any input.

use std::io::{BufRead, BufReader, Stderr, Stdin, Write};
use std::sync::Mutex;

use crate::error::{CoreError, Result};

/// Answers considered affirmative by [`LineConfirmer`], matched exactly
pub const AFFIRMATIVE_ANSWERS: &[&str] = &["y", "Y", "yes", "YES"];

/// Whether a typed answer means yes; surrounding whitespace is ignored
pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE_ANSWERS.contains(&answer.trim())
}

/// Gate for destructive operations
pub trait Confirmer: Send + Sync {
    /// Ask the user; `true` means go ahead
    fn confirm(&self, prompt: &str) -> Result<bool>;

    /// Ask unless `forced`, in which case nothing is read
    fn ask(&self, prompt: &str, forced: bool) -> Result<bool> {
        if forced {
            return Ok(true);
        }
        self.confirm(prompt)
    }
}

/// Always says yes
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Prompts on a writer and reads one line per question from a reader
///
/// The answer is accepted iff the trimmed line is one of [`AFFIRMATIVE_ANSWERS`].
/// End of input counts as "no".
pub struct LineConfirmer<R, W> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead + Send, W: Write + Send> LineConfirmer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Give back the reader and writer
    pub fn into_inner(self) -> (R, W) {
        match self.io.into_inner() {
            Ok(io) => io,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LineConfirmer<BufReader<Stdin>, Stderr> {
    /// Read answers from stdin, prompting on stderr
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> Confirmer for LineConfirmer<R, W> {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| CoreError::Confirmation("prompt state poisoned".to_string()))?;
        let (reader, writer) = &mut *guard;

        write!(writer, "{} [y/N]: ", prompt)
            .and_then(|_| writer.flush())
            .map_err(|e| CoreError::Confirmation(e.to_string()))?;

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| CoreError::Confirmation(e.to_string()))?;

        Ok(is_affirmative(&line))
    }
}
