//! Subcommands of the `chopsticks` binary

pub mod play;
pub mod query;
pub mod solve;
