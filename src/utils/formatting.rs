use chrono::{DateTime, FixedOffset};

/// Parse an RFC 3339 timestamp, tolerating a missing offset.
fn parse_timestamp(iso: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(&format!("{}Z", iso)).ok())
}

pub fn format_date(iso: Option<&str>) -> String {
    iso.and_then(parse_timestamp)
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_time(iso: Option<&str>) -> String {
    iso.and_then(parse_timestamp)
        .map(|d| d.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Duration as `hh:mm:ss`, or `-` when unknown or negative.
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s >= 0.0 => {
            let total = s as u64;
            format!(
                "{:02}:{:02}:{:02}",
                total / 3600,
                (total % 3600) / 60,
                total % 60
            )
        }
        _ => "-".to_string(),
    }
}

/// Hostname portion of a URL-ish target string. Falls back to the input
/// when there is nothing recognizable to extract.
pub fn hostname(target: &str) -> String {
    let after_scheme = target
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(target);
    let host_port = after_scheme.split('/').next().unwrap_or(after_scheme);
    let host = host_port.split(':').next().unwrap_or(host_port);
    if host.is_empty() {
        target.to_string()
    } else {
        host.to_string()
    }
}
