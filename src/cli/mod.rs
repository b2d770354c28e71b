//! Command-line interface for rg-provision.

use clap::Parser;

/// Provision a sample resource group, tag it, add a Key Vault, export its
/// template and delete it again.
///
/// Credentials are read from AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_SECRET
/// and AZURE_SUBSCRIPTION_ID.
#[derive(Parser, Debug, Clone)]
#[command(name = "rg-provision")]
#[command(version)]
#[command(about = "Resource group provisioning walkthrough", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Delete the resource group if a later step fails
    #[arg(long)]
    pub cleanup_on_failure: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["rg-provision"]).unwrap();
        assert_eq!(cli.verbosity(), 0);
        assert!(!cli.no_color);
        assert!(!cli.cleanup_on_failure);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "rg-provision",
            "-vvvv",
            "--no-color",
            "--cleanup-on-failure",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 3);
        assert!(cli.no_color);
        assert!(cli.cleanup_on_failure);
    }

    #[test]
    fn test_rejects_config_option() {
        assert!(Cli::try_parse_from(["rg-provision", "--config", "custom.toml"]).is_err());
    }

    #[test]
    fn test_rejects_subcommands() {
        assert!(Cli::try_parse_from(["rg-provision", "run"]).is_err());
    }
}
