use crate::client::models::{CustomConfig, ScanRequest};

use super::types::{Profile, ProfileLimits};

/// Fully resolved scan parameters: a profile plus whatever the user
/// overrode on the command line or in the config file. This is the single
/// place the wire request is assembled from.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub target: String,
    pub profile: Profile,
    pub max_urls: Option<u32>,
    pub depth_limit: Option<u32>,
    pub timeout: Option<u32>,
    pub sqli: bool,
    pub xss: bool,
    pub csrf: bool,
    pub verbose: bool,
}

impl ScanOptions {
    pub fn new(target: impl Into<String>, profile: Profile) -> Self {
        let limits = profile.limits();
        Self {
            target: target.into(),
            profile,
            max_urls: None,
            depth_limit: None,
            timeout: None,
            sqli: limits.sqli,
            xss: limits.xss,
            csrf: limits.csrf,
            verbose: false,
        }
    }

    /// Profile limits with per-field overrides applied.
    pub fn effective_limits(&self) -> ProfileLimits {
        let base = self.profile.limits();
        ProfileLimits {
            max_urls: self.max_urls.unwrap_or(base.max_urls),
            depth_limit: self.depth_limit.unwrap_or(base.depth_limit),
            timeout: self.timeout.unwrap_or(base.timeout),
            sqli: self.sqli,
            xss: self.xss,
            csrf: self.csrf,
        }
    }

    /// Progress denominator used until the service reports its own totals.
    pub fn total_unit(&self) -> u32 {
        self.effective_limits().max_urls
    }

    fn has_overrides(&self) -> bool {
        let base = self.profile.limits();
        self.max_urls.is_some()
            || self.depth_limit.is_some()
            || self.timeout.is_some()
            || self.sqli != base.sqli
            || self.xss != base.xss
            || self.csrf != base.csrf
            || self.verbose
    }

    pub fn to_request(&self) -> ScanRequest {
        let custom_config = if self.has_overrides() {
            let limits = self.effective_limits();
            let mut modules = Vec::new();
            if limits.sqli {
                modules.push("sqli".to_string());
            }
            if limits.xss {
                modules.push("xss".to_string());
            }
            if limits.csrf {
                modules.push("csrf".to_string());
            }
            Some(CustomConfig {
                max_urls: limits.max_urls,
                depth_limit: limits.depth_limit,
                timeout: limits.timeout,
                verbose: self.verbose,
                modules: Some(modules),
            })
        } else {
            None
        };

        ScanRequest {
            url: self.target.clone(),
            profile: self.profile.as_str().to_string(),
            custom_config,
            check_sqli: self.sqli,
            check_xss: self.xss,
            check_csrf: self.csrf,
        }
    }
}
