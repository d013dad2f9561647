//! Instance registry parsed from configuration

use serde::Serialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Invalid instance URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Instance URL {0:?} has no host")]
    MissingHost(String),
}

/// One mock-server instance the dashboard can target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    /// Position in the configured list, as a string
    pub id: String,

    /// Host (and port) of `url`
    pub label: String,

    /// Base URL as configured
    pub url: String,
}

/// Parse a comma-separated list of base URLs
///
/// Blank entries are skipped; every other entry must be an absolute URL
/// with a host.
pub fn parse_instances(raw: &str) -> Result<Vec<Instance>, InstanceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(index, entry)| {
            let parsed = Url::parse(entry).map_err(|source| InstanceError::InvalidUrl {
                url: entry.to_string(),
                source,
            })?;
            let host = parsed
                .host_str()
                .ok_or_else(|| InstanceError::MissingHost(entry.to_string()))?;
            let label = match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            Ok(Instance {
                id: index.to_string(),
                label,
                url: entry.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instances() {
        let instances =
            parse_instances(" http://localhost:8080 ,, https://mocks.internal/ ,http://10.0.0.5:9999/wm")
                .unwrap();

        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].id, "0");
        assert_eq!(instances[0].label, "localhost:8080");
        assert_eq!(instances[0].url, "http://localhost:8080");
        assert_eq!(instances[1].id, "1");
        assert_eq!(instances[1].label, "mocks.internal");
        assert_eq!(instances[2].label, "10.0.0.5:9999");
        assert_eq!(instances[2].url, "http://10.0.0.5:9999/wm");
    }

    #[test]
    fn test_default_port_is_not_part_of_label() {
        let instances = parse_instances("https://mocks.example.com:443").unwrap();
        assert_eq!(instances[0].label, "mocks.example.com");
    }

    #[test]
    fn test_empty_configuration() {
        assert!(parse_instances("").unwrap().is_empty());
        assert!(parse_instances(" , ,").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_entry_is_an_error() {
        let err = parse_instances("http://ok:1,localhost:8080/x y").unwrap_err();
        assert!(err.to_string().contains("localhost:8080/x y"));

        assert!(matches!(
            parse_instances("not a url"),
            Err(InstanceError::InvalidUrl { .. })
        ));
    }
}
