pub mod options;
pub mod parser;
pub mod types;

pub use options::ScanOptions;
pub use parser::parse_config;
pub use types::{Profile, ProfileLimits, WebscanConfig};
