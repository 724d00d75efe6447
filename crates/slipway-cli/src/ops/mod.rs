//! Operation flows behind the CLI commands.

pub mod publish;
