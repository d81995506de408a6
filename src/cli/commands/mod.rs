//! CLI command implementations.

pub mod incident;
pub mod init;
pub mod metadata;
