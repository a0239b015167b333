//! apiutil command-line client
//!
//! Loads the configuration file (with environment overrides), initializes
//! logging from its `[logging]` section and runs one operation:
//! - `status`: is the service up
//! - `token`: request a new token and print it
//! - `get`: GET a path and pretty-print the JSON body

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use apiutil_client::{ApiClient, AuthenticatedClient};
use apiutil_common::logging::init_logging;
use apiutil_common::query::Query;
use apiutil_config::ConfigLoader;

/// apiutil command-line client
#[derive(Parser, Debug)]
#[command(name = "apiutil")]
#[command(about = "Talk to the remote API using the configured credentials")]
struct Args {
    /// Configuration file (searched in standard locations when omitted)
    #[arg(long, env = "APIUTIL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the service is up
    Status,

    /// Request a new API token and print it
    Token,

    /// GET a resource path and print the JSON response
    Get {
        /// Path below `<base_url>/<api>/v2.0/`
        path: String,

        /// Query parameter, repeatable
        #[arg(long = "query", short = 'q', value_parser = parse_key_val)]
        query: Vec<(String, String)>,
    },
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    config.validate()?;

    info!(
        base_url = %config.api.base_url,
        api = %config.api.name,
        "Starting apiutil"
    );

    let auth = Arc::new(AuthenticatedClient::from_config(&config)?);
    let mut client = ApiClient::new(auth.clone(), &config.api.base_url, &config.api.name);

    let code = match args.command {
        Command::Status => {
            let up = client.status_check()?;
            println!("{}", if up { "up" } else { "down" });
            if up {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Token => {
            client.set_new_api_token()?;
            println!("{}", auth.auth_token());
            ExitCode::SUCCESS
        }
        Command::Get { path, query } => {
            let add_pairs = move |q: &mut Query| {
                for (key, value) in &query {
                    q.add(key.as_str(), value.as_str());
                }
            };
            let body: serde_json::Value = client.get(path.as_str(), &[&add_pairs])?;
            println!("{}", serde_json::to_string_pretty(&body)?);
            ExitCode::SUCCESS
        }
    };

    debug!(response_codes = ?client.response_codes(), "Done");
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("limit=0,10").unwrap(),
            ("limit".to_string(), "0,10".to_string())
        );
        assert_eq!(
            parse_key_val("title=a=b").unwrap(),
            ("title".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("nokey").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["apiutil", "get", "books", "-q", "limit=0,5", "--query", "with=authors"]);
        match args.command {
            Command::Get { path, query } => {
                assert_eq!(path, "books");
                assert_eq!(query.len(), 2);
                assert_eq!(query[1].0, "with");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
