// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

pub const LOG_LEVEL_ENV: &str = "OPENSHIFT_PYTHON_WRAPPER_LOG_LEVEL";
pub const LOG_FILE_ENV: &str = "OPENSHIFT_PYTHON_WRAPPER_LOG_FILE";
pub const REUSE_IF_RESOURCE_EXISTS_ENV: &str = "REUSE_IF_RESOURCE_EXISTS";
pub const SKIP_RESOURCE_TEARDOWN_ENV: &str = "SKIP_RESOURCE_TEARDOWN";

/// Wrapper configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Level name: DEBUG, INFO, WARNING, ERROR or CRITICAL
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    /// Resources whose creation is skipped when they already exist
    pub reuse_if_resource_exists: Option<ResourceMatcher>,
    /// Resources whose deletion is skipped on clean up
    pub skip_resource_teardown: Option<ResourceMatcher>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let log_level = lookup(LOG_LEVEL_ENV).filter(|v| !v.is_empty());
        let log_file = lookup(LOG_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let reuse_if_resource_exists =
            parse_matcher(REUSE_IF_RESOURCE_EXISTS_ENV, lookup(REUSE_IF_RESOURCE_EXISTS_ENV))?;
        let skip_resource_teardown =
            parse_matcher(SKIP_RESOURCE_TEARDOWN_ENV, lookup(SKIP_RESOURCE_TEARDOWN_ENV))?;

        Ok(Config {
            log_level,
            log_file,
            reuse_if_resource_exists,
            skip_resource_teardown,
        })
    }
}

fn parse_matcher(var: &str, raw: Option<String>) -> Result<Option<ResourceMatcher>> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => ResourceMatcher::parse(var, &raw)
            .with_context(|| format!("{var} is not a valid YAML mapping"))
            .map(Some),
        _ => Ok(None),
    }
}

/// Matches resources against a `{Kind: {name: namespace}}` YAML document.
///
/// A kind with a null or empty value matches every resource of that kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMatcher {
    source: String,
    raw: String,
    kinds: BTreeMap<String, Option<BTreeMap<String, Option<String>>>>,
}

impl ResourceMatcher {
    pub fn parse(source: &str, raw: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let kinds = serde_yaml::from_str(raw)?;
        Ok(Self {
            source: source.to_string(),
            raw: raw.to_string(),
            kinds,
        })
    }

    /// Where this matcher came from, rendered as `VAR=value` for log lines
    pub fn describe(&self) -> String {
        format!("{}={}", self.source, self.raw)
    }

    pub fn matches(&self, kind: &str, name: &str, namespace: Option<&str>) -> bool {
        let Some(entry) = self.kinds.get(kind) else {
            return false;
        };

        match entry {
            None => true,
            Some(names) if names.is_empty() => true,
            Some(names) => names.iter().any(|(wanted_name, wanted_namespace)| {
                if wanted_name != name {
                    return false;
                }
                match (namespace, wanted_namespace.as_deref()) {
                    (Some(actual), Some(wanted)) if !actual.is_empty() && !wanted.is_empty() => {
                        actual == wanted
                    }
                    _ => true,
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_only_matches_everything_of_that_kind() {
        let matcher = ResourceMatcher::parse("REUSE_IF_RESOURCE_EXISTS", "{Pod: }").unwrap();

        assert!(matcher.matches("Pod", "anything", Some("ns")));
        assert!(matcher.matches("Pod", "other", None));
        assert!(!matcher.matches("Secret", "anything", Some("ns")));
    }

    #[test]
    fn test_empty_mapping_matches_kind() {
        let matcher = ResourceMatcher::parse("SKIP_RESOURCE_TEARDOWN", "{Namespace: {}}").unwrap();
        assert!(matcher.matches("Namespace", "my-ns", None));
    }

    #[test]
    fn test_name_and_namespace_must_match() {
        let matcher =
            ResourceMatcher::parse("REUSE_IF_RESOURCE_EXISTS", "{Pod: {web: default}}").unwrap();

        assert!(matcher.matches("Pod", "web", Some("default")));
        assert!(!matcher.matches("Pod", "web", Some("other")));
        assert!(!matcher.matches("Pod", "db", Some("default")));
    }

    #[test]
    fn test_missing_namespace_on_either_side_matches() {
        let matcher = ResourceMatcher::parse(
            "SKIP_RESOURCE_TEARDOWN",
            "{StorageClass: {fast: }, Pod: {web: default}}",
        )
        .unwrap();

        assert!(matcher.matches("StorageClass", "fast", None));
        assert!(matcher.matches("StorageClass", "fast", Some("ignored")));
        assert!(matcher.matches("Pod", "web", None));
    }

    #[test]
    fn test_multiline_yaml() {
        let raw = "Deployment:\n  api: apps\n  worker: apps\nSecret:\n";
        let matcher = ResourceMatcher::parse("REUSE_IF_RESOURCE_EXISTS", raw).unwrap();

        assert!(matcher.matches("Deployment", "worker", Some("apps")));
        assert!(matcher.matches("Secret", "token", Some("apps")));
        assert!(!matcher.matches("Deployment", "cron", Some("apps")));
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(ResourceMatcher::parse("REUSE_IF_RESOURCE_EXISTS", "[Pod, Secret]").is_err());
    }

    #[test]
    fn test_describe() {
        let matcher = ResourceMatcher::parse("SKIP_RESOURCE_TEARDOWN", "{Pod: }").unwrap();
        assert_eq!(matcher.describe(), "SKIP_RESOURCE_TEARDOWN={Pod: }");
    }

    fn lookup_from<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let vars = [
            (LOG_LEVEL_ENV, "DEBUG"),
            (LOG_FILE_ENV, "/tmp/wrapper.log"),
            (REUSE_IF_RESOURCE_EXISTS_ENV, "{Pod: {web: apps}}"),
            (SKIP_RESOURCE_TEARDOWN_ENV, "{Namespace: }"),
        ];

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("DEBUG"));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/wrapper.log")));
        let reuse = config.reuse_if_resource_exists.unwrap();
        assert!(reuse.matches("Pod", "web", Some("apps")));
        assert_eq!(reuse.describe(), "REUSE_IF_RESOURCE_EXISTS={Pod: {web: apps}}");
        assert!(config.skip_resource_teardown.unwrap().matches("Namespace", "any", None));
    }

    #[test]
    fn test_from_lookup_ignores_empty_values() {
        let vars = [
            (LOG_LEVEL_ENV, ""),
            (LOG_FILE_ENV, ""),
            (SKIP_RESOURCE_TEARDOWN_ENV, "  "),
        ];

        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert!(config.log_level.is_none());
        assert!(config.log_file.is_none());
        assert!(config.reuse_if_resource_exists.is_none());
        assert!(config.skip_resource_teardown.is_none());
    }

    #[test]
    fn test_from_lookup_rejects_bad_matcher_yaml() {
        let vars = [(SKIP_RESOURCE_TEARDOWN_ENV, "[Pod, Secret]")];

        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();

        assert!(format!("{err:#}").contains("SKIP_RESOURCE_TEARDOWN is not a valid YAML mapping"));
    }

    #[test]
    fn test_from_env() {
        // The only test that touches these variables
        env::set_var(LOG_LEVEL_ENV, "WARNING");
        env::set_var(REUSE_IF_RESOURCE_EXISTS_ENV, "{Secret: }");
        let config = Config::from_env();
        env::remove_var(LOG_LEVEL_ENV);
        env::remove_var(REUSE_IF_RESOURCE_EXISTS_ENV);

        let config = config.unwrap();
        assert_eq!(config.log_level.as_deref(), Some("WARNING"));
        assert!(config.reuse_if_resource_exists.unwrap().matches("Secret", "token", Some("apps")));
    }
}
