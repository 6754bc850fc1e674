/*============================================================
  Modreg Project: modreg
  Module: modreg_core::prompt
  Etiquette: Modreg Source Etiquette, Rust Profile v1.0
  ------------------------------------------------------------
  Purpose:
    Ask the operator for input with a bounded number of
    attempts.

  Security / Safety Notes:
    Answers are returned to the caller only; nothing is logged.

  Dependencies:
    None beyond std.

  Operational Scope:
    Used by interactive commands such as `mod init`.

  Revision History:
    2026-03-02 MRG  Added bounded prompting.
  ------------------------------------------------------------
  Principles Observed:
    - Never loop forever on closed input
============================================================*/

use std::io::{BufRead, Write};

use crate::cli_error::CliError;
use crate::error::BoxError;

pub struct Prompter<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W, max_attempts: usize) -> Self {
        Self {
            input,
            output,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Ask `question` until a non-blank answer arrives or attempts run out.
    ///
    /// Blank lines and end of input both count as empty answers.
    pub fn ask(&mut self, question: &str) -> Result<String, BoxError> {
        for _ in 0..self.max_attempts {
            write!(self.output, "{question}: ")?;
            self.output.flush()?;

            let mut line = String::new();
            self.input.read_line(&mut line)?;
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            writeln!(self.output, "An answer was not provided.")?;
        }
        Err(Box::new(CliError::too_many_empty_answers(self.max_attempts)))
    }
}
