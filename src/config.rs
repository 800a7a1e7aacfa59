//! Config module.
//! Loads flat `KEY=value` settings from a text file (config.txt by default).
//! Values that look like numbers are coerced to int or float; `#` comments,
//! blank lines and lines without `=` are skipped.
//! Loaded once at startup and passed by reference everywhere, never mutated.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::fs;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read settings file: {0}")]
    Io(#[from] io::Error),
}

/// One parsed setting, after numeric coercion.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Ints count as floats here, so `WAIT_BETWEEN_TABS = 1` still works.
    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Typed settings with defaults for anything the file leaves out.
#[derive(Clone, Debug)]
pub struct Config {
    pub csv_path: PathBuf,
    pub num_to_open: usize,
    pub wait_between_tabs: f64,
    pub browser: String,
    pub country: String,
    pub country_url: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            csv_path: PathBuf::from("urls.csv"),
            num_to_open: 20,
            wait_between_tabs: 0.1,
            browser: "firefox".to_string(),
            country: "de".to_string(),
            country_url: "die-staemme.de".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Config::from_map(&parse_map(&text)))
    }

    fn from_map(map: &HashMap<String, Value>) -> Config {
        let defaults = Config::default();
        Config {
            csv_path: map
                .get("CSV_PATH")
                .and_then(Value::as_text)
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),
            num_to_open: map
                .get("NUM_TO_OPEN")
                .and_then(Value::as_int)
                .map(|n| n.max(0) as usize)
                .unwrap_or(defaults.num_to_open),
            wait_between_tabs: map
                .get("WAIT_BETWEEN_TABS")
                .and_then(Value::as_float)
                .unwrap_or(defaults.wait_between_tabs),
            browser: map
                .get("BROWSER")
                .and_then(Value::as_text)
                .map(str::to_string)
                .unwrap_or(defaults.browser),
            country: map
                .get("COUNTRY")
                .and_then(Value::as_text)
                .map(str::to_string)
                .unwrap_or(defaults.country),
            country_url: map
                .get("COUNTRY_URL")
                .and_then(Value::as_text)
                .map(str::to_string)
                .unwrap_or(defaults.country_url),
        }
    }
}

/// Parses the raw file text. Lines without `=` are tolerated and skipped,
/// not reported; the file format has always been this permissive.
fn parse_map(text: &str) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        map.insert(key.trim().to_string(), coerce(value.trim()));
    }
    map
}

/// All decimal digits -> int; digits with at most one `.` -> float;
/// everything else stays text. `-5` is text, same as upstream.
fn coerce(raw: &str) -> Value {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
    }
    let without_dot = raw.replacen('.', "", 1);
    if !without_dot.is_empty() && without_dot.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(f) = raw.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::Text(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce("20"), Value::Int(20));
        assert_eq!(coerce("0"), Value::Int(0));
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(coerce("0.1"), Value::Float(0.1));
        assert_eq!(coerce(".5"), Value::Float(0.5));
        assert_eq!(coerce("5."), Value::Float(5.0));
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce("firefox"), Value::Text("firefox".to_string()));
        assert_eq!(coerce("-5"), Value::Text("-5".to_string()));
        assert_eq!(coerce("1.2.3"), Value::Text("1.2.3".to_string()));
        assert_eq!(coerce(""), Value::Text(String::new()));
    }

    #[test]
    fn test_parse_map_skips_comments_blanks_and_lines_without_equals() {
        let text = "# a comment\n\nBROWSER = chrome\njust some words\nNUM_TO_OPEN=5\n";
        let map = parse_map(text);
        assert_eq!(map.len(), 2);
        assert_eq!(map["BROWSER"], Value::Text("chrome".to_string()));
        assert_eq!(map["NUM_TO_OPEN"], Value::Int(5));
    }

    #[test]
    fn test_parse_map_splits_on_first_equals_and_trims() {
        let map = parse_map("COUNTRY_URL =  die-staemme.de\nODD = a=b\n");
        assert_eq!(map["COUNTRY_URL"], Value::Text("die-staemme.de".to_string()));
        assert_eq!(map["ODD"], Value::Text("a=b".to_string()));
    }

    #[test]
    fn test_defaults_apply_for_missing_keys() {
        let config = Config::from_map(&parse_map("NUM_TO_OPEN = 3\n"));
        assert_eq!(config.num_to_open, 3);
        assert_eq!(config.csv_path, PathBuf::from("urls.csv"));
        assert_eq!(config.wait_between_tabs, 0.1);
        assert_eq!(config.browser, "firefox");
        assert_eq!(config.country, "de");
        assert_eq!(config.country_url, "die-staemme.de");
    }

    #[test]
    fn test_wait_accepts_whole_seconds() {
        let config = Config::from_map(&parse_map("WAIT_BETWEEN_TABS = 1\n"));
        assert_eq!(config.wait_between_tabs, 1.0);
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = Config::load(Path::new("definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# spy tool settings").unwrap();
        writeln!(file, "CSV_PATH = targets.csv").unwrap();
        writeln!(file, "NUM_TO_OPEN = 10").unwrap();
        writeln!(file, "WAIT_BETWEEN_TABS = 0.25").unwrap();
        writeln!(file, "BROWSER = chromium").unwrap();
        writeln!(file, "COUNTRY = en").unwrap();
        writeln!(file, "COUNTRY_URL = tribalwars.net").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.csv_path, PathBuf::from("targets.csv"));
        assert_eq!(config.num_to_open, 10);
        assert_eq!(config.wait_between_tabs, 0.25);
        assert_eq!(config.browser, "chromium");
        assert_eq!(config.country, "en");
        assert_eq!(config.country_url, "tribalwars.net");
    }
}
