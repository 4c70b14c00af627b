use serde::{Deserialize, Serialize};

/// Scanner intensity presets mirrored from the backend service. `Custom`
/// is implied whenever per-flag overrides are present; it is never named
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Quick,
    #[default]
    Standard,
    Full,
    Aggressive,
}

/// Crawl and detection limits a profile expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileLimits {
    pub max_urls: u32,
    pub depth_limit: u32,
    pub timeout: u32,
    pub sqli: bool,
    pub xss: bool,
    pub csrf: bool,
}

impl Profile {
    pub const ALL: [Profile; 4] = [
        Profile::Quick,
        Profile::Standard,
        Profile::Full,
        Profile::Aggressive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Full => "full",
            Self::Aggressive => "aggressive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Quick => "Fast surface pass over the most reachable pages",
            Self::Standard => "Balanced crawl depth and detection coverage",
            Self::Full => "Deep crawl with every detection module enabled",
            Self::Aggressive => "Maximum crawl limits for exhaustive testing",
        }
    }

    pub fn limits(&self) -> ProfileLimits {
        match self {
            Self::Quick => ProfileLimits {
                max_urls: 10,
                depth_limit: 1,
                timeout: 5,
                sqli: true,
                xss: true,
                csrf: false,
            },
            Self::Standard => ProfileLimits {
                max_urls: 30,
                depth_limit: 2,
                timeout: 8,
                sqli: true,
                xss: true,
                csrf: true,
            },
            Self::Full => ProfileLimits {
                max_urls: 100,
                depth_limit: 3,
                timeout: 15,
                sqli: true,
                xss: true,
                csrf: true,
            },
            Self::Aggressive => ProfileLimits {
                max_urls: 200,
                depth_limit: 5,
                timeout: 20,
                sqli: true,
                xss: true,
                csrf: true,
            },
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "standard" => Ok(Self::Standard),
            "full" => Ok(Self::Full),
            "aggressive" => Ok(Self::Aggressive),
            other => Err(format!(
                "unknown profile '{}' (expected quick, standard, full or aggressive)",
                other
            )),
        }
    }
}

/// Optional YAML config file. Every section is optional; command-line
/// flags override anything set here.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WebscanConfig {
    pub api: Option<ApiConfig>,
    pub scan: Option<ScanFileConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanFileConfig {
    pub profile: Option<Profile>,
    pub max_urls: Option<u32>,
    pub depth_limit: Option<u32>,
    pub timeout: Option<u32>,
    pub sqli: Option<bool>,
    pub xss: Option<bool>,
    pub csrf: Option<bool>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<String>,
}
