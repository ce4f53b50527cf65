//! CLI command implementations.

pub mod init;
pub mod priority;
pub mod run;
pub mod shards;
pub mod survival;
