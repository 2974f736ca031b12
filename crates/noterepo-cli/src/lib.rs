//! CLI host for the repository plugin layer.
//!
//! The binary plays the role a web host would: it owns the OAuth
//! callback endpoint (a loopback listener during `login`), the session
//! token directory, and the presentation of listings and downloads.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
