//! # CLI Interface
//!
//! Defines the command-line arguments for `remit` using `clap` derive.

use clap::Parser;
use std::path::PathBuf;

use remit_protocol::config::{DEFAULT_CONFIG_FILE, DEFAULT_OUT_FILE};
use remit_protocol::transaction::types::Lovelace;

use crate::logging::LogFormat;

/// Sign a single lovelace transfer from the configured sender.
///
/// The signed transaction is written to `--out-file`, or broadcast through
/// the configured Blockfrost project when `--submit` is given.
#[derive(Parser, Debug)]
#[command(name = "remit", about = "Sign and send a single lovelace transfer", version)]
pub struct RemitCli {
    /// Bech32 address of the recipient.
    #[arg(long, short = 'r')]
    pub recipient: String,

    /// Amount to send, in lovelace (1 ada = 1000000 lovelace).
    #[arg(long, short = 'l')]
    pub lovelace: Lovelace,

    /// Where to write the signed transaction when not submitting.
    #[arg(long, short = 'o', default_value = DEFAULT_OUT_FILE)]
    pub out_file: PathBuf,

    /// Submit the transaction instead of writing it to disk.
    #[arg(long, short = 's')]
    pub submit: bool,

    /// Path to the signer configuration file (TOML).
    #[arg(long, short = 'c', env = "REMIT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Log output format.
    #[arg(long, env = "REMIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        RemitCli::command().debug_assert();
    }

    #[test]
    fn defaults_to_writing_tx_signed() {
        let cli = RemitCli::try_parse_from(["remit", "-r", "addr_test1xyz", "-l", "5000000"]).unwrap();
        assert_eq!(cli.lovelace, Lovelace::new(5_000_000));
        assert_eq!(cli.out_file, PathBuf::from("./tx.signed"));
        assert!(!cli.submit);
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn submit_and_json_logging() {
        let cli = RemitCli::try_parse_from([
            "remit",
            "--recipient",
            "addr_test1xyz",
            "--lovelace",
            "1",
            "--submit",
            "--log-format",
            "json",
            "-c",
            "/etc/remit.toml",
        ])
        .unwrap();
        assert!(cli.submit);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.config, PathBuf::from("/etc/remit.toml"));
    }

    #[test]
    fn rejects_fractional_lovelace() {
        assert!(RemitCli::try_parse_from(["remit", "-r", "addr_test1xyz", "-l", "1.5"]).is_err());
    }

    #[test]
    fn recipient_is_required() {
        assert!(RemitCli::try_parse_from(["remit", "-l", "1"]).is_err());
    }
}
