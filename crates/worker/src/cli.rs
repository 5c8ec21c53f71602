//! Command-line interface of the `kwiki-settlement` binary.

use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use kwiki_core::settlement::RetryPolicy;

#[derive(Debug, Parser)]
#[command(name = "kwiki-settlement")]
#[command(about = "Settlement payout maintenance commands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Execute pending transfers whose due date has arrived.
    #[command(name = "process-due-transfers", alias = "settlement:process-due-transfers")]
    ProcessDueTransfers(ProcessDueTransfersArgs),
}

#[derive(Debug, Args)]
pub struct ProcessDueTransfersArgs {
    /// Process transfers due on or before this date (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// List the due transfers without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Attempts per transfer, including the first
    #[arg(long, env = "SETTLEMENT_MAX_TRIES", default_value_t = 3)]
    pub max_tries: u32,

    /// Seconds to wait between attempts
    #[arg(long, env = "SETTLEMENT_RETRY_BACKOFF_SECS", default_value_t = 60)]
    pub retry_backoff_secs: u64,
}

impl ProcessDueTransfersArgs {
    /// The processing date, falling back to `today`.
    pub fn date_or(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(today)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_tries: self.max_tries.max(1),
            backoff: Duration::from_secs(self.retry_backoff_secs),
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected a date as YYYY-MM-DD: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("kwiki-settlement").chain(args.iter().copied()))
    }

    #[test]
    fn parses_date_and_dry_run() {
        let cli = parse(&["process-due-transfers", "--date", "2024-03-15", "--dry-run"]).unwrap();
        let Command::ProcessDueTransfers(args) = cli.command;
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert!(args.dry_run);
    }

    #[test]
    fn legacy_command_name_is_accepted() {
        let cli = parse(&["settlement:process-due-transfers"]).unwrap();
        let Command::ProcessDueTransfers(args) = cli.command;
        assert!(args.date.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn date_defaults_to_today() {
        let cli = parse(&["process-due-transfers"]).unwrap();
        let Command::ProcessDueTransfers(args) = cli.command;
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(args.date_or(today), today);
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert!(parse(&["process-due-transfers", "--date", "15/03/2024"]).is_err());
    }

    #[test]
    fn retry_policy_from_flags() {
        let cli = parse(&[
            "process-due-transfers",
            "--max-tries",
            "5",
            "--retry-backoff-secs",
            "0",
        ])
        .unwrap();
        let Command::ProcessDueTransfers(args) = cli.command;
        let policy = args.retry_policy();
        assert_eq!(policy.max_tries, 5);
        assert_eq!(policy.backoff, Duration::ZERO);
    }
}
