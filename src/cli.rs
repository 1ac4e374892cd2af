use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pkgcenter")]
#[command(about = "Search, install, remove and clean Arch/AUR packages through yay or paru")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the official repositories and the AUR
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install a package
    Install {
        /// Package name
        package: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove a package together with dependencies nothing else needs
    Remove {
        /// Package name
        package: String,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove orphaned packages
    Clean {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_collects_terms() {
        let cli =
            Cli::try_parse_from(["pkgcenter", "search", "rust", "analyzer", "--json"]).unwrap();
        match cli.command {
            Commands::Search { query, json } => {
                assert_eq!(query, vec!["rust", "analyzer"]);
                assert!(json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["pkgcenter", "search"]).is_err());
    }

    #[test]
    fn test_remove_with_yes() {
        let cli = Cli::try_parse_from(["pkgcenter", "remove", "-y", "ripgrep"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Remove { ref package, yes: true } if package == "ripgrep"
        ));
    }

    #[test]
    fn test_clean_defaults_to_confirmation() {
        let cli = Cli::try_parse_from(["pkgcenter", "clean"]).unwrap();
        assert!(matches!(cli.command, Commands::Clean { yes: false }));
    }
}
