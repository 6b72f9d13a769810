use super::settings::*;

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.fetch.timeout_seconds, 30);
    assert_eq!(config.fetch.max_retries, 3);
    assert!(config.fetch.user_agent.contains("sitekit-mcp"));
}

#[test]
fn zero_timeout_is_rejected() {
    let config = Config {
        fetch: FetchConfig {
            timeout_seconds: 0,
            ..FetchConfig::default()
        },
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTimeout(0))
    ));
}

#[test]
fn oversized_timeout_is_rejected() {
    let fetch = FetchConfig {
        timeout_seconds: 301,
        ..FetchConfig::default()
    };
    assert!(matches!(
        fetch.validate(),
        Err(ConfigError::InvalidTimeout(301))
    ));
}

#[test]
fn excessive_retries_are_rejected() {
    let fetch = FetchConfig {
        max_retries: 11,
        ..FetchConfig::default()
    };
    assert!(matches!(
        fetch.validate(),
        Err(ConfigError::InvalidRetries(11))
    ));
}

#[test]
fn empty_user_agent_is_rejected() {
    let fetch = FetchConfig {
        user_agent: "   ".to_string(),
        ..FetchConfig::default()
    };
    assert!(matches!(
        fetch.validate(),
        Err(ConfigError::InvalidUserAgent)
    ));
}

#[test]
fn config_round_trips_through_toml() {
    let config = Config {
        fetch: FetchConfig {
            timeout_seconds: 10,
            user_agent: "test-agent/1.0".to_string(),
            max_retries: 1,
            retry_delay_seconds: 5,
        },
    };

    let serialized = toml::to_string_pretty(&config).expect("serializes");
    let parsed: Config = toml::from_str(&serialized).expect("parses");

    assert_eq!(parsed, config);
}

#[test]
fn partial_toml_rejects_missing_fields() {
    // FetchConfig fields are required once the [fetch] table is present.
    let result: Result<Config, _> = toml::from_str("[fetch]\ntimeout_seconds = 10\n");
    assert!(result.is_err());
}
