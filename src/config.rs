use crate::error::{config_error, env_error, ForwarderResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

/// Region used when `AWS_REGION` is not set
pub const DEFAULT_REGION: &str = "us-west-2";
/// Calendar queried when `GOOGLE_CALENDAR_ID` is not set
pub const DEFAULT_CALENDAR_ID: &str = "primary";
/// Base URL of the Google Calendar v3 REST API
pub const DEFAULT_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";
/// Hours between now and the start of the query window
pub const DEFAULT_LOOKAHEAD_HOURS: i64 = 24;
/// Longest accepted window, one leap year of minutes
pub const MAX_INTERVAL_MINUTES: i64 = 366 * 24 * 60;
/// Furthest accepted window start, one leap year of hours
pub const MAX_LOOKAHEAD_HOURS: i64 = 366 * 24;

/// Configuration for one deployment of the forwarder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name or ARN of the downstream task-creation function
    pub downstream_function: String,
    /// Parameter holding the Google OAuth client secret JSON
    pub client_secret_parameter: String,
    /// Parameter holding the cached OAuth token
    pub token_parameter: String,
    /// Length of the query window in minutes
    pub interval_minutes: i64,
    /// Offset of the query window from now, in hours
    pub lookahead_hours: i64,
    /// Google Calendar ID to query
    pub calendar_id: String,
    /// Calendar API base URL
    pub calendar_api_base: String,
    /// AWS region for the parameter store and downstream function
    pub region: String,
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> ForwarderResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_env()
    }

    /// Build the configuration from the process environment only
    pub fn from_env() -> ForwarderResult<Self> {
        let downstream_function = required(&["TRELLO_FUNCTION", "arntrello"])?;
        let client_secret_parameter = required(&["CLIENT_SECRET_PARAMETER", "cspointer"])?;
        let token_parameter = required(&["TOKEN_PARAMETER", "tokenpointer"])?;

        let interval_minutes = parse_bounded(
            "INTERVAL_MINUTES",
            &required(&["INTERVAL_MINUTES", "interval"])?,
            MAX_INTERVAL_MINUTES,
        )?;

        let lookahead_hours = match optional(&["LOOKAHEAD_HOURS"]) {
            Some(value) => parse_bounded("LOOKAHEAD_HOURS", &value, MAX_LOOKAHEAD_HOURS)?,
            None => DEFAULT_LOOKAHEAD_HOURS,
        };

        let calendar_id =
            optional(&["GOOGLE_CALENDAR_ID"]).unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string());
        let calendar_api_base = optional(&["GOOGLE_CALENDAR_API"])
            .unwrap_or_else(|| DEFAULT_CALENDAR_API.to_string());
        let region = optional(&["AWS_REGION"]).unwrap_or_else(|| DEFAULT_REGION.to_string());

        Ok(Config {
            downstream_function,
            client_secret_parameter,
            token_parameter,
            interval_minutes,
            lookahead_hours,
            calendar_id,
            calendar_api_base,
            region,
        })
    }
}

/// First non-empty value among the given variable names
fn optional(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn required(names: &[&str]) -> ForwarderResult<String> {
    optional(names).ok_or_else(|| env_error(names[0]))
}

/// Parse a window value in `1..=max`
fn parse_bounded(name: &str, value: &str, max: i64) -> ForwarderResult<i64> {
    match value.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 && parsed <= max => Ok(parsed),
        _ => Err(config_error(&format!(
            "Invalid {} value '{}': expected an integer between 1 and {}",
            name, value, max
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    // Tests below share the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARIABLES: &[&str] = &[
        "TRELLO_FUNCTION",
        "arntrello",
        "CLIENT_SECRET_PARAMETER",
        "cspointer",
        "TOKEN_PARAMETER",
        "tokenpointer",
        "INTERVAL_MINUTES",
        "interval",
        "LOOKAHEAD_HOURS",
        "GOOGLE_CALENDAR_ID",
        "GOOGLE_CALENDAR_API",
        "AWS_REGION",
    ];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for name in VARIABLES {
            env::remove_var(name);
        }
        for (name, value) in vars {
            env::set_var(name, value);
        }
        let result = f();
        for name in VARIABLES {
            env::remove_var(name);
        }
        result
    }

    const LEGACY: &[(&str, &str)] = &[
        ("arntrello", "arn:aws:lambda:us-west-2:123456789012:function:trello"),
        ("cspointer", "/gocal/client-secret"),
        ("tokenpointer", "/gocal/token"),
        ("interval", "60"),
    ];

    #[test]
    fn parses_bounded_interval() {
        assert_eq!(parse_bounded("INTERVAL_MINUTES", " 60 ", MAX_INTERVAL_MINUTES).unwrap(), 60);
        assert_eq!(
            parse_bounded("INTERVAL_MINUTES", "527040", MAX_INTERVAL_MINUTES).unwrap(),
            MAX_INTERVAL_MINUTES
        );
    }

    #[test]
    fn rejects_zero_garbage_and_oversized() {
        assert!(matches!(
            parse_bounded("INTERVAL_MINUTES", "0", MAX_INTERVAL_MINUTES),
            Err(Error::Configuration(_))
        ));
        assert!(parse_bounded("INTERVAL_MINUTES", "sixty", MAX_INTERVAL_MINUTES).is_err());
        assert!(parse_bounded("INTERVAL_MINUTES", "-5", MAX_INTERVAL_MINUTES).is_err());
        assert!(parse_bounded("INTERVAL_MINUTES", "527041", MAX_INTERVAL_MINUTES).is_err());
    }

    #[test]
    fn legacy_names_and_defaults() {
        let config = with_env(LEGACY, Config::from_env).unwrap();

        assert_eq!(
            config.downstream_function,
            "arn:aws:lambda:us-west-2:123456789012:function:trello"
        );
        assert_eq!(config.client_secret_parameter, "/gocal/client-secret");
        assert_eq!(config.token_parameter, "/gocal/token");
        assert_eq!(config.interval_minutes, 60);
        assert_eq!(config.lookahead_hours, DEFAULT_LOOKAHEAD_HOURS);
        assert_eq!(config.calendar_id, DEFAULT_CALENDAR_ID);
        assert_eq!(config.calendar_api_base, DEFAULT_CALENDAR_API);
        assert_eq!(config.region, DEFAULT_REGION);
    }

    #[test]
    fn canonical_names_win_and_empty_values_are_skipped() {
        let mut vars = LEGACY.to_vec();
        vars.extend([
            ("TRELLO_FUNCTION", "trello-cards"),
            ("INTERVAL_MINUTES", "  "),
            ("GOOGLE_CALENDAR_ID", ""),
            ("LOOKAHEAD_HOURS", "48"),
            ("AWS_REGION", "eu-north-1"),
        ]);
        let config = with_env(&vars, Config::from_env).unwrap();

        assert_eq!(config.downstream_function, "trello-cards");
        assert_eq!(config.interval_minutes, 60);
        assert_eq!(config.calendar_id, DEFAULT_CALENDAR_ID);
        assert_eq!(config.lookahead_hours, 48);
        assert_eq!(config.region, "eu-north-1");
    }

    #[test]
    fn missing_required_variable_is_a_configuration_error() {
        let vars: Vec<_> = LEGACY
            .iter()
            .copied()
            .filter(|(name, _)| *name != "tokenpointer")
            .collect();

        match with_env(&vars, Config::from_env) {
            Err(Error::Configuration(message)) => assert!(message.contains("TOKEN_PARAMETER")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn oversized_window_is_rejected_at_load() {
        let mut vars = LEGACY.to_vec();
        vars.push(("INTERVAL_MINUTES", "200000000000"));
        assert!(matches!(
            with_env(&vars, Config::from_env),
            Err(Error::Configuration(_))
        ));

        let mut vars = LEGACY.to_vec();
        vars.push(("LOOKAHEAD_HOURS", "9999999"));
        assert!(matches!(
            with_env(&vars, Config::from_env),
            Err(Error::Configuration(_))
        ));
    }
}
