use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Header constants written at the top of every MME file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MmeHeader {
    pub edition: String,
    pub laboratory: String,
    pub customer: String,
    pub title_prefix: String,
    pub region: String,
    pub data_source: String,
}

impl Default for MmeHeader {
    fn default() -> Self {
        Self {
            edition: "1.6".into(),
            laboratory: "CSI S.p.A.".into(),
            customer: "Euro NCAP".into(),
            title_prefix: "Euro NCAP".into(),
            region: "EU".into(),
            data_source: "Physical_Test".into(),
        }
    }
}

/// What a batch does when one test fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Record the failure and keep going with the next test.
    #[default]
    ContinueOnError,
    /// Stop at the first failure; folders already created stay on disk.
    AbortOnFirstError,
}

/// Shared configuration for folder naming and MME emission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Substituted for every character outside `[A-Za-z0-9_-]`.
    pub replacement: String,
    /// Used when a display value sanitizes to nothing.
    pub empty_segment: String,
    pub channel_dir: String,
    pub movie_dir: String,
    pub header: MmeHeader,
    pub policy: BatchPolicy,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            replacement: String::new(),
            empty_segment: "blank".into(),
            channel_dir: "Channel".into(),
            movie_dir: "Movie".into(),
            header: MmeHeader::default(),
            policy: BatchPolicy::default(),
        }
    }
}

impl EmitterConfig {
    pub fn validate(&self) -> EmitResult<()> {
        if !self.replacement.chars().all(is_segment_char) {
            return Err(EmitError::InvalidConfig(format!(
                "replacement {:?} contains characters outside [A-Za-z0-9_-]",
                self.replacement
            )));
        }
        for (label, value) in [
            ("empty_segment", &self.empty_segment),
            ("channel_dir", &self.channel_dir),
            ("movie_dir", &self.movie_dir),
        ] {
            if value.is_empty() || !value.chars().all(is_segment_char) {
                return Err(EmitError::InvalidConfig(format!(
                    "{} must be a non-empty [A-Za-z0-9_-] name, got {:?}",
                    label, value
                )));
            }
        }
        if self.channel_dir == self.movie_dir {
            return Err(EmitError::InvalidConfig(
                "channel_dir and movie_dir must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Characters allowed to survive sanitization.
pub fn is_segment_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Common error type for folder creation and MME emission.
#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("filesystem error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl EmitError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        EmitError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type EmitResult<T> = Result<T, EmitError>;

/// Source of the generation timestamp stamped into each MME file.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EmitterConfig::default().validate().is_ok());
    }

    #[test]
    fn replacement_with_unsafe_chars_is_rejected() {
        let config = EmitterConfig {
            replacement: "/".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EmitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_section_fills_missing_fields_with_defaults() {
        let config: EmitterConfig =
            serde_json::from_str(r#"{"replacement": "_", "policy": "abort_on_first_error"}"#)
                .unwrap();
        assert_eq!(config.replacement, "_");
        assert_eq!(config.policy, BatchPolicy::AbortOnFirstError);
        assert_eq!(config.channel_dir, "Channel");
        assert_eq!(config.header.region, "EU");
    }
}
