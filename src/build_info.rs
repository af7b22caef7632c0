//! Compile-time build metadata, set by build.rs

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local build counter, "dev" when build.rs did not run
pub const BUILD_NUMBER: &str = match option_env!("NUTRILOG_BUILD_NUMBER") {
    Some(s) => s,
    None => "dev",
};

/// ISO 8601 UTC
pub const BUILD_TIMESTAMP: &str = match option_env!("NUTRILOG_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// "0.1.0+build.12"
pub fn version_label() -> String {
    format!("{}+build.{}", VERSION, BUILD_NUMBER)
}

/// Stderr only; stdout belongs to the MCP transport
pub fn print_startup_banner() {
    eprintln!("nutrilog {} compiled {}", version_label(), BUILD_TIMESTAMP);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_label() {
        let label = version_label();
        assert!(label.starts_with(VERSION));
        assert!(label.ends_with(BUILD_NUMBER));
    }
}
