mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or fall back to defaults plus
/// environment overrides
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./plexherald.toml",
        "./config.toml",
        "~/.config/plexherald/config.toml",
        "/etc/plexherald/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // No file found; the environment alone can carry a full configuration
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Environment variables win over whatever the file said
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(value) = std::env::var("PLEX_BASE_URL") {
        config.plex.base_url = value;
    }
    if let Ok(value) = std::env::var("PLEX_TOKEN") {
        config.plex.token = value;
    }
    if let Ok(value) = std::env::var("PLEX_LIBRARY_IDS") {
        config.plex.library_ids = value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect();
    }
    if let Ok(value) = std::env::var("PLEX_FETCH_LIMIT") {
        config.plex.fetch_limit = value
            .parse()
            .context("PLEX_FETCH_LIMIT must be a positive integer")?;
    }
    if let Ok(value) = std::env::var("POLL_INTERVAL_MINUTES") {
        config.poller.interval_minutes = value
            .parse()
            .context("POLL_INTERVAL_MINUTES must be a positive integer")?;
    }
    if let Ok(value) = std::env::var("MAX_ANNOUNCED_IDS") {
        config.poller.max_announced_ids = value
            .parse()
            .context("MAX_ANNOUNCED_IDS must be a positive integer")?;
    }
    if let Ok(value) = std::env::var("STATE_PATH") {
        config.poller.state_path = value.into();
    }
    if let Ok(value) = std::env::var("TMDB_API_KEY") {
        config.tmdb.api_key = Some(value);
    }
    if let Ok(value) = std::env::var("SLACK_WEBHOOK_URL") {
        config.slack.webhook_url = Some(value);
    }
    Ok(())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.plex.token.is_empty() {
        anyhow::bail!("Plex token is not set (plex.token or PLEX_TOKEN)");
    }

    if config.poller.interval_minutes == 0 {
        anyhow::bail!("Poll interval cannot be 0");
    }

    if config.plex.library_ids.is_empty() {
        tracing::warn!("No library ids configured; polling is disabled");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "PLEX_BASE_URL",
        "PLEX_TOKEN",
        "PLEX_LIBRARY_IDS",
        "PLEX_FETCH_LIMIT",
        "POLL_INTERVAL_MINUTES",
        "MAX_ANNOUNCED_IDS",
        "STATE_PATH",
        "TMDB_API_KEY",
        "SLACK_WEBHOOK_URL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("plexherald.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    #[serial]
    fn config_file_parsing() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
[plex]
base_url = "http://plex.local:32400"
token = "abc123"
library_ids = ["1", "3"]
fetch_limit = 20

[poller]
interval_minutes = 5
max_announced_ids = 10
state_path = "/tmp/state.json"

[tmdb]
api_key = "tmdb-key"

[slack]
webhook_url = "https://hooks.slack.com/services/T/B/X"
"#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.plex.base_url, "http://plex.local:32400");
        assert_eq!(config.plex.token, "abc123");
        assert_eq!(config.plex.library_ids, vec!["1", "3"]);
        assert_eq!(config.plex.fetch_limit, 20);
        assert_eq!(config.poller.interval_minutes, 5);
        assert_eq!(config.poller.max_announced_ids, 10);
        assert_eq!(config.tmdb.api_key.as_deref(), Some("tmdb-key"));
        assert_eq!(
            config.slack.webhook_url.as_deref(),
            Some("https://hooks.slack.com/services/T/B/X")
        );
    }

    #[test]
    #[serial]
    fn defaults_fill_missing_sections() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
[plex]
token = "abc123"
"#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.plex.base_url, "http://localhost:32400");
        assert_eq!(config.plex.fetch_limit, 50);
        assert!(config.plex.library_ids.is_empty());
        assert_eq!(config.poller.interval_minutes, 15);
        assert_eq!(config.poller.max_announced_ids, 50);
        assert_eq!(
            config.poller.state_path,
            std::path::PathBuf::from("data/poller-state.json")
        );
        assert!(config.tmdb.api_key.is_none());
        assert!(config.slack.webhook_url.is_none());
    }

    #[test]
    #[serial]
    fn env_overrides_win_over_file() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
[plex]
token = "from-file"
library_ids = ["9"]
"#,
        );

        std::env::set_var("PLEX_TOKEN", "from-env");
        std::env::set_var("PLEX_LIBRARY_IDS", "1, 2 ,3,");
        std::env::set_var("POLL_INTERVAL_MINUTES", "30");

        let config = load_config(&path).unwrap();
        clear_env();

        assert_eq!(config.plex.token, "from-env");
        assert_eq!(config.plex.library_ids, vec!["1", "2", "3"]);
        assert_eq!(config.poller.interval_minutes, 30);
    }

    #[test]
    #[serial]
    fn env_alone_is_a_full_configuration() {
        clear_env();
        std::env::set_var("PLEX_TOKEN", "tok");
        std::env::set_var("PLEX_LIBRARY_IDS", "1");
        std::env::set_var("SLACK_WEBHOOK_URL", "https://hooks.slack.com/x");

        let config = load_config_or_default(None).unwrap();
        clear_env();

        assert_eq!(config.plex.token, "tok");
        assert_eq!(config.plex.library_ids, vec!["1"]);
        assert_eq!(
            config.slack.webhook_url.as_deref(),
            Some("https://hooks.slack.com/x")
        );
    }

    #[test]
    #[serial]
    fn missing_token_is_rejected() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "[plex]\nlibrary_ids = [\"1\"]\n");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Plex token"));
    }

    #[test]
    #[serial]
    fn zero_interval_is_rejected() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
[plex]
token = "abc"

[poller]
interval_minutes = 0
"#,
        );

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    #[serial]
    fn bad_numeric_env_is_rejected() {
        clear_env();
        std::env::set_var("PLEX_TOKEN", "tok");
        std::env::set_var("PLEX_FETCH_LIMIT", "lots");

        let result = load_config_or_default(None);
        clear_env();

        assert!(result.is_err());
    }
}
