//! Build information module
//!
//! Compile-time constants stamped in by `build.rs`, reported by the status
//! tool and printed in the startup banner.

use std::fmt;

use serde::Serialize;

/// Build number, incremented on each recompilation
pub const BUILD_NUMBER: u64 = match option_env!("HABITUAL_BUILD_NUMBER") {
    Some(s) => match parse_u64(s) {
        Some(n) => n,
        None => 0,
    },
    None => 0,
};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("HABITUAL_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Package description from Cargo.toml
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Const function to parse u64 at compile time.
///
/// `None` for empty input, any non-digit, or overflow.
const fn parse_u64(s: &str) -> Option<u64> {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut result: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return None;
        }
        result = match result.checked_mul(10) {
            Some(r) => match r.checked_add((b - b'0') as u64) {
                Some(r) => r,
                None => return None,
            },
            None => return None,
        };
        i += 1;
    }
    Some(result)
}

/// Build information structure for serialization
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    /// Get the current build info
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            description: DESCRIPTION,
        }
    }

    /// Builds compiled without `build.rs` metadata (e.g. by an IDE checker)
    pub fn is_stamped(&self) -> bool {
        self.build_number > 0 && self.build_timestamp != "unknown"
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// `habitual 1.0.0 (build 42, 2026-10-19T08:00:00Z)`
impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)?;
        if self.is_stamped() {
            write!(f, " (build {}, {})", self.build_number, self.build_timestamp)?;
        } else {
            write!(f, " (unstamped build)")?;
        }
        Ok(())
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("===============================================");
    eprintln!("  Habitual - habit tracking and statistics");
    eprintln!("  {}", info);
    eprintln!("===============================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("42"), Some(42));
        assert_eq!(parse_u64("0"), Some(0));
        assert_eq!(parse_u64(""), None);
        assert_eq!(parse_u64("12a"), None);
        assert_eq!(parse_u64("99999999999999999999999"), None);
    }

    #[test]
    fn test_display() {
        let mut info = BuildInfo {
            name: "habitual",
            version: "1.2.3",
            build_number: 7,
            build_timestamp: "2026-01-01T00:00:00Z",
            description: "",
        };
        assert_eq!(info.to_string(), "habitual 1.2.3 (build 7, 2026-01-01T00:00:00Z)");

        info.build_number = 0;
        assert!(!info.is_stamped());
        assert_eq!(info.to_string(), "habitual 1.2.3 (unstamped build)");
    }
}
