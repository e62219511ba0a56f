use crate::types::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    env,
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const CONFIG_PATH_ENV: &str = "BRACKET_CONFIG_PATH";
pub const LAYOUT_ENV: &str = "BRACKET_LAYOUT";
pub const GRAND_FINALS_RESET_ENV: &str = "BRACKET_GRAND_FINALS_RESET";
pub const NUMBER_TO_WIN_ENV: &str = "BRACKET_NUMBER_TO_WIN";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketConfig {
  #[serde(default)]
  pub layout: Layout,
  #[serde(default = "default_grand_finals_reset")]
  pub grand_finals_reset: bool,
  #[serde(default = "default_number_to_win")]
  pub number_to_win: u32,
}

impl Default for BracketConfig {
  fn default() -> Self {
    Self {
      layout: Layout::default(),
      grand_finals_reset: default_grand_finals_reset(),
      number_to_win: default_number_to_win(),
    }
  }
}

impl BracketConfig {
  pub fn with_layout(layout: Layout) -> Self {
    Self {
      layout,
      ..Self::default()
    }
  }
}

fn default_grand_finals_reset() -> bool {
  true
}

fn default_number_to_win() -> u32 {
  DEFAULT_NUMBER_TO_WIN
}

pub fn config_path() -> PathBuf {
  env_default(CONFIG_PATH_ENV)
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("bracket.json"))
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn flag_true(raw: &str) -> bool {
  let value = raw.trim().to_ascii_lowercase();
  matches!(value.as_str(), "1" | "true" | "yes" | "on")
}

/// Fill every setting the config file left out from the environment.
pub fn apply_env_defaults(config: BracketConfig, raw: &Value) -> BracketConfig {
  apply_defaults_from(config, raw, env_default)
}

fn apply_defaults_from(
  mut config: BracketConfig,
  raw: &Value,
  lookup: impl Fn(&str) -> Option<String>,
) -> BracketConfig {
  let explicit = |key: &str| raw.get(key).is_some();
  if !explicit("layout") {
    if let Some(value) = lookup(LAYOUT_ENV) {
      match value.parse::<Layout>() {
        Ok(layout) => config.layout = layout,
        Err(e) => warn!("{LAYOUT_ENV}: {e}"),
      }
    }
  }
  if !explicit("grandFinalsReset") {
    if let Some(value) = lookup(GRAND_FINALS_RESET_ENV) {
      config.grand_finals_reset = flag_true(&value);
    }
  }
  if !explicit("numberToWin") {
    if let Some(value) = lookup(NUMBER_TO_WIN_ENV) {
      match value.parse::<u32>() {
        Ok(wins) if wins > 0 => config.number_to_win = wins,
        _ => warn!("{NUMBER_TO_WIN_ENV}: expected a positive number, got {value}"),
      }
    }
  }
  if config.number_to_win == 0 {
    warn!("numberToWin must be positive, using {DEFAULT_NUMBER_TO_WIN}");
    config.number_to_win = DEFAULT_NUMBER_TO_WIN;
  }
  config
}

pub fn load_config(path: &Path) -> Result<BracketConfig, String> {
  if !path.is_file() {
    return Ok(apply_env_defaults(BracketConfig::default(), &Value::Null));
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let raw = serde_json::from_str::<Value>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  let config = serde_json::from_value::<BracketConfig>(raw.clone())
    .map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config, &raw))
}

pub fn save_config(path: &Path, config: BracketConfig) -> Result<BracketConfig, String> {
  let payload = serde_json::to_string_pretty(&config).map_err(|e| e.to_string())?;
  fs::write(path, payload).map_err(|e| format!("write config {}: {e}", path.display()))?;
  Ok(config)
}

/// Load `KEY=value` lines from a `.env` file. Variables already set in the
/// environment win.
pub fn load_env_file(path: &Path) {
  if !path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| vars.get(key).cloned()
  }

  #[test]
  fn test_defaults() {
    let config = BracketConfig::default();
    assert_eq!(config.layout, Layout::SingleElimination);
    assert!(config.grand_finals_reset);
    assert_eq!(config.number_to_win, 3);

    let parsed: BracketConfig = serde_json::from_str(r#"{ "layout": "double-elim" }"#).unwrap();
    assert_eq!(parsed.layout, Layout::DoubleElimination);
    assert!(parsed.grand_finals_reset);
  }

  #[test]
  fn test_env_fills_only_missing_keys() {
    let raw = json!({ "layout": "round-robin" });
    let config = serde_json::from_value::<BracketConfig>(raw.clone()).unwrap();
    let vars = lookup(&[
      (LAYOUT_ENV, "double-elim"),
      (GRAND_FINALS_RESET_ENV, "no"),
      (NUMBER_TO_WIN_ENV, "2"),
    ]);
    let config = apply_defaults_from(config, &raw, vars);

    assert_eq!(config.layout, Layout::RoundRobin);
    assert!(!config.grand_finals_reset);
    assert_eq!(config.number_to_win, 2);
  }

  #[test]
  fn test_bad_env_values_are_ignored() {
    let vars = lookup(&[(LAYOUT_ENV, "swiss"), (NUMBER_TO_WIN_ENV, "0")]);
    let config = apply_defaults_from(BracketConfig::default(), &Value::Null, vars);
    assert_eq!(config, BracketConfig::default());
  }

  #[test]
  fn test_zero_wins_in_file_falls_back() {
    let raw = json!({ "numberToWin": 0 });
    let config = serde_json::from_value::<BracketConfig>(raw.clone()).unwrap();
    let config = apply_defaults_from(config, &raw, lookup(&[]));
    assert_eq!(config.number_to_win, DEFAULT_NUMBER_TO_WIN);
  }

  #[test]
  fn test_save_and_load_config() {
    let dir = env::temp_dir().join(format!("bracketgen-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bracket.json");
    let config = BracketConfig {
      layout: Layout::DoubleElimination,
      grand_finals_reset: false,
      number_to_win: 2,
    };
    save_config(&path, config.clone()).unwrap();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"grandFinalsReset\": false"));
    // Every key is present in the file, so the environment cannot interfere.
    assert_eq!(load_config(&path).unwrap(), config);

    fs::write(&path, "{ not json").unwrap();
    assert!(load_config(&path).unwrap_err().starts_with("parse config"));
    fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn test_parse_env_line() {
    assert_eq!(
      parse_env_line("export BRACKET_LAYOUT=\"double-elim\""),
      Some(("BRACKET_LAYOUT".to_string(), "double-elim".to_string()))
    );
    assert_eq!(
      parse_env_line("BRACKET_NUMBER_TO_WIN=2 # best of three"),
      Some(("BRACKET_NUMBER_TO_WIN".to_string(), "2".to_string()))
    );
    assert_eq!(parse_env_line("# comment"), None);
    assert_eq!(parse_env_line("=value"), None);
    assert_eq!(parse_env_line("no equals sign"), None);
  }
}
