//! Format instruction inspection.

use anyhow::Result;
use clap::Parser;

use crate::data::schema::format_instructions;

/// Prints the format instructions embedded in every system prompt.
#[derive(Parser)]
pub struct SchemaCommand {}

impl SchemaCommand {
    /// Executes the schema command.
    pub fn execute(self) -> Result<()> {
        println!("{}", format_instructions()?);
        Ok(())
    }
}
