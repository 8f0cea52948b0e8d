use clap::{Parser, Subcommand};
use lkcore::requests::SortColumn;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lkps")]
#[command(author, version, about = "Terminal front-end for the POS service personal cabinet", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Telegram user given on the command line
#[derive(clap::Args, Debug, Clone, Default)]
pub struct UserArgs {
    /// Raw `Telegram.WebApp.initData` string; overrides the other user flags
    #[arg(long)]
    pub init_data: Option<String>,

    #[arg(long)]
    pub user_id: Option<i64>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Phone already known to Telegram
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the authorization sequence and show the profile
    Auth {
        #[command(flatten)]
        user: UserArgs,

        /// Skip the pause before completion
        #[arg(long)]
        no_pacing: bool,
    },

    /// Scan a QR code and submit it to the webhook
    Qr {
        #[command(flatten)]
        user: UserArgs,

        /// Code returned by the native scanner; without it codes are read from stdin
        #[arg(long)]
        code: Option<String>,
    },

    /// Share a contact and update the cached profile
    Contact {
        #[command(flatten)]
        user: UserArgs,

        /// Contact as delivered by the client (query string or JSON)
        #[arg(long, conflicts_with_all = ["granted", "declined"])]
        raw: Option<String>,

        /// Client only reports that access was granted
        #[arg(long)]
        granted: bool,

        /// User refuses to share the contact
        #[arg(long)]
        declined: bool,
    },

    /// Filter and sort a requests table read from HTML markup
    Table {
        /// HTML file containing the requests table
        file: PathBuf,

        /// Creation date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long, default_value = "")]
        date_created: String,

        /// Completion date (YYYY-MM-DD or DD.MM.YYYY)
        #[arg(long, default_value = "")]
        date_completed: String,

        #[arg(long, default_value = "")]
        establishment: String,

        /// Sort column: number, date-created, date-completed, establishment
        #[arg(short, long)]
        sort: Option<SortColumn>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Format a phone number with the Russian mask
    Phone {
        /// Phone number; the placeholder is printed when omitted
        value: Option<String>,
    },

    /// Unwrap a webhook response envelope (reads stdin when no input is given)
    Unwrap { input: Option<String> },

    /// Inspect the cached profile
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Print the greeting or edit the cached profile name
    Profile {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Pick the invoice establishment among the cached restaurants
        #[arg(long, conflicts_with_all = ["first_name", "last_name"])]
        establishment: Option<String>,
    },
}

#[derive(Subcommand, Clone, Copy)]
pub enum CacheAction {
    /// Print the cached profile if it is still fresh
    Show,
    /// Remove the cached profile
    Clear,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_table_sort_column_parses() {
        let cli = Cli::try_parse_from(["lkps", "table", "requests.html", "--sort", "date-completed", "--desc"]).unwrap();
        match cli.command {
            Commands::Table { sort, desc, .. } => {
                assert_eq!(sort, Some(SortColumn::DateCompleted));
                assert!(desc);
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn test_desc_requires_sort() {
        assert!(Cli::try_parse_from(["lkps", "table", "requests.html", "--desc"]).is_err());
    }

    #[test]
    fn test_raw_conflicts_with_granted() {
        assert!(Cli::try_parse_from(["lkps", "contact", "--raw", "{}", "--granted"]).is_err());
    }

    #[test]
    fn test_establishment_conflicts_with_name_edit() {
        assert!(Cli::try_parse_from(["lkps", "profile", "--establishment", "Cafe A", "--first-name", "Ivan"]).is_err());
        assert!(Cli::try_parse_from(["lkps", "profile", "--establishment", "Cafe A"]).is_ok());
    }
}
