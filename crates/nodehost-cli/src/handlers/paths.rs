//! Paths command handler.
//!
//! Prints every path the CLI would use for this service, in `key = value`
//! form, so launch and connection problems can be traced to a location.

use anyhow::Result;

use crate::bootstrap::CliContext;

pub fn execute(ctx: &CliContext) -> Result<()> {
    println!("{}", ctx.paths);
    Ok(())
}
