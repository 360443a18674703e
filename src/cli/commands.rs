use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "council", about = concat!("council v", env!("CARGO_PKG_VERSION"), " - ideas, literature and reviews from the terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override `[api] base_url`
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override `[storage] dir`
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    /// Keep drafts and preferences in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List generation runs
    Runs,
    /// List ideas
    Ideas(IdeasArgs),
    /// List literature queries
    Queries,
    /// List reviews
    Reviews,
    /// List LLM providers and their default models
    Providers,
    /// Show an idea with its gates, dossier and council memos
    Idea(ShowArgs),
    /// Show a literature query with its works and synthesis
    Query(ShowArgs),
    /// Show a review with its sections and grouped output
    Review(ShowArgs),
    /// Delete a literature query and all its works
    DeleteQuery(DestructiveArgs),
    /// Remove works of a literature query that have no PDF
    CleanupQuery(DestructiveArgs),
}

#[derive(Args)]
pub struct IdeasArgs {
    /// Status filter: all, resubmitted, none, other
    #[arg(long, default_value = "all")]
    pub filter: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Entity id
    pub id: i64,
}

#[derive(Args)]
pub struct DestructiveArgs {
    /// Literature query id
    pub id: i64,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["council"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "council",
            "ideas",
            "--filter",
            "resubmitted",
            "--json",
            "--api-url",
            "http://example.test",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test"));
        match cli.command {
            Some(Commands::Ideas(args)) => assert_eq!(args.filter, "resubmitted"),
            _ => panic!("expected ideas"),
        }
    }

    #[test]
    fn delete_query_takes_yes() {
        let cli = Cli::try_parse_from(["council", "delete-query", "4", "-y"]).unwrap();
        match cli.command {
            Some(Commands::DeleteQuery(args)) => {
                assert_eq!(args.id, 4);
                assert!(args.yes);
            }
            _ => panic!("expected delete-query"),
        }
    }

    #[test]
    fn ids_must_be_numbers() {
        assert!(Cli::try_parse_from(["council", "idea", "abc"]).is_err());
    }
}
