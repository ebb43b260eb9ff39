//! Command-line interface for the inventory server.

mod commands;

use clap::{Parser, Subcommand};

/// Inventario - IT inventory for public administrations
#[derive(Parser)]
#[command(name = "inventario")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage site accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    Add {
        username: String,
        password: String,
    },
    /// List accounts
    #[command(alias = "ls")]
    List,
    /// Delete an account (the last one cannot be deleted)
    #[command(alias = "rm")]
    Delete { username: String },
    /// Set a new password
    Passwd {
        username: String,
        password: String,
    },
}

pub use commands::*;
