//! Configuration loading and environment parsing.

use super::validation::validate_config;
use super::Config;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "SUNNY_SAYS__";

/// Load configuration with the following precedence (highest first):
/// 1) `SUNNY_SAYS_CONFIG_JSON` env var containing raw JSON
/// 2) File pointed by `SUNNY_SAYS_CONFIG_PATH`
/// 3) config.json in the current working directory
/// 4) Defaults compiled into the binary
///
/// The flat variables `PORT`, `ALLOWED_ORIGIN` and `JWT_SECRET` are then
/// applied, followed by per-field overrides using the `SUNNY_SAYS` prefix and
/// `__` as the nested separator, e.g. `SUNNY_SAYS__MATCHMAKING__STALE_ROOM_SECS=600`.
///
/// Read and parse errors are printed to stderr and the offending source is
/// skipped. Validation problems are reported but not propagated; callers that
/// need a hard failure call [`validate_config`] themselves.
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    // Lowest file layer first so higher-precedence sources overwrite it.
    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    if let Ok(path) = env::var("SUNNY_SAYS_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    if let Ok(json) = env::var("SUNNY_SAYS_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "SUNNY_SAYS_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    apply_legacy_env(&mut merged);
    apply_env_overrides(&mut merged);

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    };

    if let Err(e) = validate_config(&config) {
        eprintln!("Configuration validation error: {e}");
    }

    config
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

/// Variables understood by earlier deployments of the game backend.
fn apply_legacy_env(root: &mut Value) {
    if let Ok(port) = env::var("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => set_nested_value(root, &["server", "port"], Value::from(port)),
            Err(err) => eprintln!("Ignoring PORT={port}: {err}"),
        }
    }
    if let Ok(origin) = env::var("ALLOWED_ORIGIN") {
        if !origin.trim().is_empty() {
            set_nested_value(root, &["server", "cors_origins"], Value::String(origin));
        }
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        if !secret.is_empty() {
            set_nested_value(root, &["security", "jwt_secret"], Value::String(secret));
        }
    }
}

fn apply_env_overrides(root: &mut Value) {
    for (key, raw_value) in env::vars() {
        let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.is_empty() {
            continue;
        }

        set_nested_value(root, &segments, parse_scalar(raw_value.trim()));
    }
}

fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }

    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value<S: AsRef<str>>(target: &mut Value, segments: &[S], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    if !target.is_object() {
        *target = Value::Object(serde_json::Map::new());
    }
    let Value::Object(map) = target else {
        return;
    };

    if rest.is_empty() {
        map.insert(head.as_ref().to_string(), value);
        return;
    }

    let entry = map
        .entry(head.as_ref().to_string())
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    set_nested_value(entry, rest, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::io::Write;

    const MANAGED_VARS: &[&str] = &[
        "SUNNY_SAYS_CONFIG_JSON",
        "SUNNY_SAYS_CONFIG_PATH",
        "SUNNY_SAYS__SERVER__PORT",
        "SUNNY_SAYS__MATCHMAKING__STALE_ROOM_SECS",
        "SUNNY_SAYS__LOGGING__LEVEL",
        "PORT",
        "ALLOWED_ORIGIN",
        "JWT_SECRET",
    ];

    fn clear_env() {
        for var in MANAGED_VARS {
            env::remove_var(var);
        }
    }

    fn set_env(key: &str, value: &str) {
        env::set_var(key, value);
    }

    #[test]
    #[serial]
    fn defaults_without_any_source() {
        clear_env();
        let config = load();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.cors_origins, "*");
        assert_eq!(config.matchmaking.waiting_timeout_secs, 10);
        assert_eq!(config.matchmaking.cleanup_interval_secs, 30);
        assert_eq!(config.matchmaking.stale_room_secs, 300);
        assert_eq!(config.security.jwt_secret, "dev-secret-change-me");
    }

    #[test]
    #[serial]
    fn legacy_variables_are_honoured() {
        clear_env();
        set_env("PORT", "9001");
        set_env("ALLOWED_ORIGIN", "https://sunny.example");
        set_env("JWT_SECRET", "a-much-longer-production-secret");

        let config = load();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.cors_origins, "https://sunny.example");
        assert_eq!(config.security.jwt_secret, "a-much-longer-production-secret");
        clear_env();
    }

    #[test]
    #[serial]
    fn invalid_legacy_port_is_ignored() {
        clear_env();
        set_env("PORT", "not-a-port");
        assert_eq!(load().server.port, 8080);
        clear_env();
    }

    #[test]
    #[serial]
    fn prefixed_overrides_beat_every_other_source() {
        clear_env();
        set_env("SUNNY_SAYS_CONFIG_JSON", r#"{"server":{"port":7000}}"#);
        set_env("PORT", "7100");
        set_env("SUNNY_SAYS__SERVER__PORT", "7200");
        set_env("SUNNY_SAYS__MATCHMAKING__STALE_ROOM_SECS", "42");
        set_env("SUNNY_SAYS__LOGGING__LEVEL", "debug");

        let config = load();
        assert_eq!(config.server.port, 7200);
        assert_eq!(config.matchmaking.stale_room_secs, 42);
        assert_eq!(
            config.logging.level,
            Some(crate::config::LogLevel::Debug)
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn inline_json_beats_config_file() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({
                "server": {"port": 6000, "cors_origins": "https://file.example"},
                "matchmaking": {"waiting_timeout_secs": 20}
            })
        )
        .unwrap();
        set_env("SUNNY_SAYS_CONFIG_PATH", file.path().to_str().unwrap());
        set_env("SUNNY_SAYS_CONFIG_JSON", r#"{"server":{"port":6100}}"#);

        let config = load();
        assert_eq!(config.server.port, 6100);
        assert_eq!(config.server.cors_origins, "https://file.example");
        assert_eq!(config.matchmaking.waiting_timeout_secs, 20);
        clear_env();
    }

    #[test]
    #[serial]
    fn unreadable_sources_fall_back_to_defaults() {
        clear_env();
        set_env("SUNNY_SAYS_CONFIG_PATH", "/definitely/not/here.json");
        set_env("SUNNY_SAYS_CONFIG_JSON", "{ not json");
        let config = load();
        assert_eq!(config.server.port, 8080);
        clear_env();
    }

    #[test]
    fn nested_values_merge_field_by_field() {
        let mut base = json!({"a": {"b": 1, "c": 2}});
        merge_values(&mut base, json!({"a": {"c": 3}, "d": 4}));
        assert_eq!(base, json!({"a": {"b": 1, "c": 3}, "d": 4}));

        set_nested_value(&mut base, &["a", "e", "f"], json!(true));
        assert_eq!(base["a"]["e"]["f"], json!(true));
    }
}
