use console::style;

use crate::config::Profile;
use crate::errors::WebscanError;

pub async fn handle_profiles() -> Result<(), WebscanError> {
    println!(
        "{:<12} {:>8} {:>6} {:>9}  {:<16} {}",
        style("PROFILE").bold(),
        "MAX URLS",
        "DEPTH",
        "TIMEOUT",
        "MODULES",
        "DESCRIPTION"
    );
    for profile in Profile::ALL {
        let limits = profile.limits();
        let mut modules = Vec::new();
        if limits.sqli {
            modules.push("sqli");
        }
        if limits.xss {
            modules.push("xss");
        }
        if limits.csrf {
            modules.push("csrf");
        }
        println!(
            "{:<12} {:>8} {:>6} {:>8}s  {:<16} {}",
            profile.as_str(),
            limits.max_urls,
            limits.depth_limit,
            limits.timeout,
            modules.join(","),
            profile.description()
        );
    }
    Ok(())
}
