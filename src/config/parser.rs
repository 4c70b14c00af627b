use std::path::Path;

use tracing::warn;

use crate::errors::WebscanError;

use super::types::WebscanConfig;

pub async fn parse_config(path: &Path) -> Result<WebscanConfig, WebscanError> {
    if !path.exists() {
        return Err(WebscanError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(WebscanError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: WebscanConfig = serde_yaml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

/// Semantic checks the type system can't express.
fn validate(config: &WebscanConfig) -> Result<(), WebscanError> {
    if let Some(api) = &config.api {
        if let Some(base) = &api.base_url {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(WebscanError::Config(format!(
                    "api.base_url must be an http(s) URL, got '{}'",
                    base
                )));
            }
        }
        if api.poll_interval_secs == Some(0) {
            return Err(WebscanError::Config(
                "api.poll_interval_secs must be at least 1".into(),
            ));
        }
    }

    if let Some(scan) = &config.scan {
        if scan.max_urls == Some(0) {
            return Err(WebscanError::Config("scan.max_urls must be at least 1".into()));
        }
        if scan.depth_limit == Some(0) {
            return Err(WebscanError::Config("scan.depth_limit must be at least 1".into()));
        }
        if scan.timeout == Some(0) {
            return Err(WebscanError::Config("scan.timeout must be at least 1".into()));
        }
        if scan.sqli == Some(false) && scan.xss == Some(false) && scan.csrf == Some(false) {
            return Err(WebscanError::Config(
                "All detection modules are disabled; nothing to scan".into(),
            ));
        }
        if let Some(max_urls) = scan.max_urls {
            if max_urls > 1000 {
                warn!(max_urls, "scan.max_urls is unusually high; scans may take a long time");
            }
        }
    }

    Ok(())
}
