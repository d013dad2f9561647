//! CLI command implementations

pub mod instances;
pub mod mappings;
pub mod requests;
pub mod ui;

use crate::admin::AdminClient;
use anyhow::{Context, Result};
use stubdeck_common::Instance;

/// Client for the instance picked with `--instance`
pub fn client_for(instances: &[Instance], index: usize) -> Result<AdminClient> {
    if instances.is_empty() {
        anyhow::bail!(
            "No instances configured. Set {} or pass --urls.",
            crate::config::URLS_ENV
        );
    }
    let instance = instances.get(index).with_context(|| {
        format!(
            "Instance {} does not exist ({} configured)",
            index,
            instances.len()
        )
    })?;
    tracing::debug!(instance = %instance.url, "Selected instance");
    Ok(AdminClient::new(&instance.url)?)
}

/// Truncate a string for table output
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stubdeck_common::parse_instances;

    #[test]
    fn test_client_for() {
        let instances = parse_instances("http://a:1").unwrap();
        assert_eq!(client_for(&instances, 0).unwrap().base_url(), "http://a:1");
        assert!(client_for(&instances, 1).is_err());
        assert!(client_for(&[], 0).is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("/short", 10), "/short");
        assert_eq!(truncate("/a/very/long/path", 10), "/a/very...");
    }
}
