//! Command implementations

pub mod config;
pub mod login;
pub mod scan;
pub mod version;
