//! Command handlers.

pub mod config;
pub mod diagnose;
pub mod interactive;
pub mod scan;
