use crate::error::ConfigError;

const DEFAULT_INCOMING_PREFIX: &str = "incoming/";
const DEFAULT_ARCHIVE_PREFIX: &str = "archive/";
const DEFAULT_SOURCE_EXTENSION: &str = ".csv";
const DEFAULT_TARGET_EXTENSION: &str = ".parquet";

/// Where the handler looks for uploads and where it archives conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HandlerConfig {
    /// Fixed bucket; when `None` the bucket named in the S3 event is used.
    pub bucket: Option<String>,
    pub incoming_prefix: String,
    pub archive_prefix: String,
    pub source_extension: String,
    pub target_extension: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            incoming_prefix: DEFAULT_INCOMING_PREFIX.to_string(),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
        }
    }
}

impl HandlerConfig {
    /// Reads the configuration from the Lambda environment.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values are treated as unset so a blank env var falls back to the default.
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let defaults = Self::default();

        let config = Self {
            bucket: var("BUCKET_NAME"),
            incoming_prefix: var("INCOMING_PREFIX").unwrap_or(defaults.incoming_prefix),
            archive_prefix: var("ARCHIVE_PREFIX").unwrap_or(defaults.archive_prefix),
            source_extension: var("SOURCE_EXTENSION").unwrap_or(defaults.source_extension),
            target_extension: var("TARGET_EXTENSION").unwrap_or(defaults.target_extension),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.source_extension == self.target_extension {
            return Err(ConfigError::SameExtension(self.source_extension.clone()));
        }
        if self.incoming_prefix == self.archive_prefix {
            return Err(ConfigError::SamePrefix(self.incoming_prefix.clone()));
        }
        if self.archive_prefix.starts_with(&self.incoming_prefix) {
            return Err(ConfigError::ArchiveInsideIncoming {
                incoming: self.incoming_prefix.clone(),
                archive: self.archive_prefix.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = HandlerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HandlerConfig::default());
        assert_eq!(config.incoming_prefix, "incoming/");
        assert_eq!(config.archive_prefix, "archive/");
        assert_eq!(config.source_extension, ".csv");
        assert_eq!(config.target_extension, ".parquet");
        assert!(config.bucket.is_none());
    }

    #[test]
    fn test_overrides_from_env() {
        let config = HandlerConfig::from_lookup(lookup(&[
            ("BUCKET_NAME", "aws-lambda-pet-project-bucket"),
            ("INCOMING_PREFIX", "landing/"),
            ("ARCHIVE_PREFIX", "processed/"),
            ("SOURCE_EXTENSION", ".tsv"),
        ]))
        .unwrap();
        assert_eq!(config.bucket.as_deref(), Some("aws-lambda-pet-project-bucket"));
        assert_eq!(config.incoming_prefix, "landing/");
        assert_eq!(config.archive_prefix, "processed/");
        assert_eq!(config.source_extension, ".tsv");
        assert_eq!(config.target_extension, ".parquet");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config =
            HandlerConfig::from_lookup(lookup(&[("BUCKET_NAME", ""), ("INCOMING_PREFIX", "")]))
                .unwrap();
        assert!(config.bucket.is_none());
        assert_eq!(config.incoming_prefix, "incoming/");
    }

    #[test]
    fn test_rejects_identical_extensions() {
        let err = HandlerConfig::from_lookup(lookup(&[("TARGET_EXTENSION", ".csv")])).unwrap_err();
        assert!(matches!(err, ConfigError::SameExtension(ext) if ext == ".csv"));
    }

    #[test]
    fn test_rejects_identical_prefixes() {
        let err = HandlerConfig::from_lookup(lookup(&[("ARCHIVE_PREFIX", "incoming/")])).unwrap_err();
        assert!(matches!(err, ConfigError::SamePrefix(prefix) if prefix == "incoming/"));
    }

    #[test]
    fn test_rejects_archive_inside_incoming() {
        let err = HandlerConfig::from_lookup(lookup(&[("ARCHIVE_PREFIX", "incoming/archive/")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ArchiveInsideIncoming { ref archive, .. } if archive == "incoming/archive/"
        ));
    }

    #[test]
    fn test_accepts_incoming_inside_archive() {
        let config =
            HandlerConfig::from_lookup(lookup(&[("INCOMING_PREFIX", "archive/incoming/")])).unwrap();
        assert_eq!(config.incoming_prefix, "archive/incoming/");
    }
}
