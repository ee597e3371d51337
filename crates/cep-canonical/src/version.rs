//! Schema version constants for protocol records.

/// Current schema version (major.minor.patch). Records carrying any other
/// version fail validation.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Major version number.
pub fn major_version() -> u32 {
    SCHEMA_VERSION
        .split('.')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}

/// Minor version number.
pub fn minor_version() -> u32 {
    SCHEMA_VERSION
        .split('.')
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

/// Patch version number.
pub fn patch_version() -> u32 {
    SCHEMA_VERSION
        .split('.')
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_components_parse() {
        assert_eq!(major_version(), 1);
        assert_eq!(minor_version(), 0);
        assert_eq!(patch_version(), 0);
    }
}
