use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Folio command line.
#[derive(Debug, Parser)]
#[command(name = "folio", about = "Portfolio site and HQ back-office server")]
pub struct Cli {
    /// Command to run; `serve` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the public site and HQ until interrupted.
    Serve,
    /// Write the public site as static JSON documents.
    Export(ExportArgs),
    /// Print an argon2 hash suitable for `FOLIO_ADMIN_PASSWORD_HASH`.
    HashPassword(HashPasswordArgs),
}

/// Arguments for [`Command::Export`].
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory the snapshot is written to; created when missing.
    #[arg(long, short, default_value = "dist")]
    pub out_dir: PathBuf,
}

/// Arguments for [`Command::HashPassword`].
#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    /// Plain-text password to hash.
    #[arg(long, env = "FOLIO_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_implied_without_a_subcommand() {
        let cli = Cli::try_parse_from(["folio"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn export_defaults_to_dist() {
        let cli = Cli::try_parse_from(["folio", "export"]).expect("parse");
        match cli.command {
            Some(Command::Export(args)) => assert_eq!(args.out_dir, PathBuf::from("dist")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn hash_password_takes_the_password_flag() {
        let cli =
            Cli::try_parse_from(["folio", "hash-password", "--password", "s3cret"]).expect("parse");
        match cli.command {
            Some(Command::HashPassword(args)) => assert_eq!(args.password, "s3cret"),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
