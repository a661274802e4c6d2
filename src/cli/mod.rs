//! CLI module for member-link
//!
//! - `serve`: run the HTTP API
//! - `keygen`: print a fresh invitation key

pub mod keygen;
pub mod serve;

use clap::{Parser, Subcommand};

/// member-link - invitation-based linking of accounts to member records
#[derive(Parser)]
#[command(name = "member-link")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Generate a base64 invitation key for INVITATION_KEY or a secrets store
    Keygen,
}
