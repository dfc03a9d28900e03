//! Database schema and entry persistence

pub mod entries;
pub mod init;

pub use init::*;
