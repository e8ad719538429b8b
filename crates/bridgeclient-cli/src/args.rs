use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about = "Command line client for the Bridge research platform")]
pub struct Cli {
    /// Account email; falls back to ~/.bridgeConfig, then a prompt
    #[arg(long, env = "BRIDGE_EMAIL", global = true)]
    pub email: Option<String>,

    #[arg(long, env = "BRIDGE_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    #[arg(long, env = "BRIDGE_STUDY", default_value = "parkinson", global = true)]
    pub study: String,

    #[arg(long, default_value = "researcher", global = true)]
    pub account_type: String,

    /// Save the password in the OS keychain after signing in
    #[arg(long, global = true)]
    pub remember_me: bool,

    #[arg(long, env = "BRIDGE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// INI file with an [authentication] section (default: ~/.bridgeConfig)
    #[arg(long, env = "BRIDGE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (default: none)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List participants who enrolled in a date range
    Participants {
        #[arg(long, value_parser = parse_date)]
        start_date: Option<DateTime<Utc>>,

        #[arg(long, value_parser = parse_date)]
        end_date: Option<DateTime<Utc>>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Consent history, health code and other metadata for one participant
    Metadata { user_id: String },
    /// Last uploads and sign-ons for one participant
    RequestInfo { user_id: String },
    /// GET any path or URL with the session header
    Get { uri: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Tsv,
}

/// RFC 3339 timestamp, or a plain date taken as midnight UTC
fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2015-03-09").unwrap(),
            Utc.with_ymd_and_hms(2015, 3, 9, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2015-03-09T17:30:00-05:00").unwrap(),
            Utc.with_ymd_and_hms(2015, 3, 9, 22, 30, 0).unwrap()
        );
        assert!(parse_date("09/03/2015").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "bridge",
            "participants",
            "--start-date",
            "2015-03-01",
            "--format",
            "tsv",
            "--study",
            "other",
        ])
        .unwrap();

        assert_eq!(cli.study, "other");
        assert_eq!(cli.account_type, "researcher");
        match cli.command {
            Command::Participants {
                start_date,
                end_date,
                format,
            } => {
                assert!(start_date.is_some());
                assert!(end_date.is_none());
                assert_eq!(format, OutputFormat::Tsv);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
