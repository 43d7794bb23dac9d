use crate::{DataSourceError, Delimiter, TableName};
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/Rosemary-0624/feifei/main/data";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL (`http://`, `https://`) or a local directory.
    pub source: String,
    pub delimiter: Delimiter,
    pub extension: String,
    pub sleep_object: String,
    pub feeding_object: String,
    pub api_token: Option<SecretString>,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.into(),
            delimiter: Delimiter::Whitespace,
            extension: "csv".into(),
            sleep_object: TableName::Sleep.default_object().into(),
            feeding_object: TableName::Feeding.default_object().into(),
            api_token: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, DataSourceError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, DataSourceError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(source) = get("BABYLOG_SOURCE").filter(|s| !s.trim().is_empty()) {
            cfg.source = source.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = get("BABYLOG_DELIMITER") {
            cfg.delimiter = raw.parse().map_err(DataSourceError::Config)?;
        }
        if let Some(ext) = get("BABYLOG_EXTENSION") {
            cfg.extension = ext.trim().trim_start_matches('.').to_string();
        }
        if let Some(obj) = get("BABYLOG_SLEEP_OBJECT") {
            cfg.sleep_object = obj;
        }
        if let Some(obj) = get("BABYLOG_FEEDING_OBJECT") {
            cfg.feeding_object = obj;
        }
        cfg.api_token = get("BABYLOG_API_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::new(t.into()));
        if let Some(raw) = get("BABYLOG_FETCH_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                DataSourceError::Config(format!("BABYLOG_FETCH_TIMEOUT_SECS is not a number: {raw}"))
            })?;
            if secs == 0 {
                return Err(DataSourceError::Config(
                    "BABYLOG_FETCH_TIMEOUT_SECS must be positive".into(),
                ));
            }
            cfg.fetch_timeout = Duration::from_secs(secs);
        }
        Ok(cfg)
    }

    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    /// `{object}.{extension}` for the given table.
    pub fn object_name(&self, table: TableName) -> String {
        let object = match table {
            TableName::Sleep => &self.sleep_object,
            TableName::Feeding => &self.feeding_object,
        };
        if self.extension.is_empty() {
            object.clone()
        } else {
            format!("{}.{}", object, self.extension)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn from_env_uses_defaults() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg.source, DEFAULT_SOURCE);
        assert_eq!(cfg.delimiter, Delimiter::Whitespace);
        assert!(cfg.is_remote());
        assert_eq!(cfg.object_name(TableName::Sleep), "sleep_data.csv");
        assert!(cfg.api_token.is_none());
        assert_eq!(cfg.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "BABYLOG_SOURCE" => Some("https://store.example/bucket/".into()),
            "BABYLOG_DELIMITER" => Some("comma".into()),
            "BABYLOG_EXTENSION" => Some(".txt".into()),
            "BABYLOG_FEEDING_OBJECT" => Some("logs/feeds".into()),
            "BABYLOG_API_TOKEN" => Some("sekrit".into()),
            "BABYLOG_FETCH_TIMEOUT_SECS" => Some("3".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.source, "https://store.example/bucket");
        assert_eq!(cfg.delimiter, Delimiter::Comma);
        assert_eq!(cfg.object_name(TableName::Feeding), "logs/feeds.txt");
        assert_eq!(cfg.object_name(TableName::Sleep), "sleep_data.txt");
        assert_eq!(cfg.api_token.unwrap().expose_secret(), "sekrit");
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn from_env_rejects_bad_delimiter_and_timeout() {
        let bad_delim = Config::from_env_with(|k| {
            (k == "BABYLOG_DELIMITER").then(|| "pipe-ish".to_string())
        });
        assert!(matches!(bad_delim, Err(DataSourceError::Config(_))));

        let zero = Config::from_env_with(|k| {
            (k == "BABYLOG_FETCH_TIMEOUT_SECS").then(|| "0".to_string())
        });
        assert!(zero.is_err());

        let nan = Config::from_env_with(|k| {
            (k == "BABYLOG_FETCH_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(nan.is_err());
    }

    #[test]
    fn local_paths_are_not_remote() {
        let cfg = Config::from_env_with(|k| (k == "BABYLOG_SOURCE").then(|| "./data".to_string()))
            .expect("cfg");
        assert!(!cfg.is_remote());
    }
}
