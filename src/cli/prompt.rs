//! Interactive confirmation prompts.

use std::io::Write;

use crate::error::Result;
use crate::sync::Prompter;

/// Prompter that asks yes/no questions on stderr and reads stdin.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&self, message: &str) -> Result<bool> {
        eprint!("{message} [y/N]: ");
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}
