//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// noterepo - browse and fetch OneNote sections
#[derive(Debug, Parser)]
#[command(name = "noterepo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "NOTEREPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Session name; separate sessions keep separate logins
    #[arg(long, default_value = "default", env = "NOTEREPO_SESSION")]
    pub session: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the notebook account
    Login {
        /// OAuth client ID (overrides config.toml)
        #[arg(long, env = "NOTEREPO_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (overrides config.toml)
        #[arg(long, env = "NOTEREPO_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Re-authenticate even if already logged in
        #[arg(long)]
        force: bool,
    },

    /// List entries at a path ("" for notebooks, "NB" for its sections,
    /// "NB/SEC" for its pages)
    List {
        /// Slash-delimited folder path
        #[arg(default_value = "")]
        path: String,
    },

    /// Download a section to a local file
    Fetch {
        /// Section identifier (from `list`)
        id: String,

        /// Output file path (defaults to <ID>.one in the current directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Log out and invalidate the remote session
    Logout,

    /// Show login state for the current session
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_default_path() {
        let cli = Cli::try_parse_from(["noterepo", "list"]).unwrap();
        match cli.command {
            Command::List { path } => assert_eq!(path, ""),
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn parses_fetch_with_output() {
        let cli =
            Cli::try_parse_from(["noterepo", "fetch", "sec-1", "--output", "notes.one"]).unwrap();
        match cli.command {
            Command::Fetch { id, output } => {
                assert_eq!(id, "sec-1");
                assert_eq!(output, Some(PathBuf::from("notes.one")));
            }
            _ => panic!("expected fetch command"),
        }
    }

    #[test]
    fn session_defaults_to_default() {
        let cli = Cli::try_parse_from(["noterepo", "status"]).unwrap();
        assert_eq!(cli.session, "default");
    }
}
