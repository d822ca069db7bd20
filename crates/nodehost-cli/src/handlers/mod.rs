//! Command handlers, one module per subcommand.

pub mod paths;
pub mod run;
pub mod send;
pub mod status;
