//! CLI argument definitions

use clap::{Args, Parser, Subcommand};

/// Installer for AGP project workspaces
#[derive(Parser, Debug)]
#[command(name = "agp", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never ask interactive questions
    #[arg(short = 'n', long, global = true)]
    pub no_interaction: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new AGP workspace in the current directory
    #[command(visible_aliases = ["make", "create"])]
    New(NewArgs),
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Name of the directory to create
    pub name: String,

    /// Branch to check out instead of the default
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Check out one of the organization's project repositories
    #[arg(short, long)]
    pub project: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_new_with_branch_and_project() {
        let cli = Cli::parse_from(["agp", "new", "my-app", "-b", "release", "--project"]);

        let Commands::New(args) = cli.command;
        assert_eq!(args.name, "my-app");
        assert_eq!(args.branch.as_deref(), Some("release"));
        assert!(args.project);
    }

    #[test]
    fn subcommand_aliases_resolve_to_new() {
        for alias in ["make", "create"] {
            let cli = Cli::parse_from(["agp", alias, "my-app"]);
            let Commands::New(args) = cli.command;
            assert_eq!(args.name, "my-app");
        }
    }

    #[test]
    fn global_flags_parse_after_the_subcommand() {
        let cli = Cli::parse_from(["agp", "new", "my-app", "-n", "-vv"]);

        assert!(cli.no_interaction);
        assert_eq!(cli.verbose, 2);
    }
}
