//! Target triple representation
//!
//! A target is identified by four fields: architecture, vendor, platform,
//! and ABI. The string form is hyphenated; when the platform is `darwin`
//! and the ABI is `system`, the ABI is omitted from the rendering so the
//! canonical string matches what the host toolchain expects.

use std::fmt;

/// Vendors recognized when disambiguating 3-part triple strings
const KNOWN_VENDORS: &[&str] = &["pc", "unknown", "apple", "none"];

/// Type-safe representation of a code-generation target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetTriple {
    pub arch: String,
    pub vendor: String,
    pub platform: String,
    pub abi: String,
}

impl TargetTriple {
    /// Create a new triple from its four fields
    pub fn new(arch: &str, vendor: &str, platform: &str, abi: &str) -> Self {
        Self {
            arch: arch.to_string(),
            vendor: vendor.to_string(),
            platform: platform.to_string(),
            abi: abi.to_string(),
        }
    }

    /// Canonical triple of the process host
    ///
    /// Maps the host OS to its conventional platform/ABI pair:
    /// windows/msvc, linux/gnu, darwin/system.
    pub fn host() -> Self {
        let arch = match std::env::consts::ARCH {
            "x86" => "i686",
            "arm" => "armv7",
            other => other,
        };

        match std::env::consts::OS {
            "windows" => Self::new(arch, "pc", "windows", "msvc"),
            "macos" => Self::new(arch, "apple", "darwin", "system"),
            os => Self::new(arch, "unknown", os, default_abi(os)),
        }
    }

    /// Parse a 2-, 3-, or 4-part hyphenated triple string
    ///
    /// 2-part forms are `arch-platform` with the vendor defaulting to
    /// `unknown` and the ABI inferred from the platform. 3-part forms are
    /// `arch-vendor-platform` when the middle part is a recognized vendor,
    /// `arch-platform-abi` otherwise. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        match parts.as_slice() {
            &[arch, platform] => Some(Self::new(
                arch,
                "unknown",
                platform,
                default_abi(platform),
            )),
            &[arch, vendor, platform] if KNOWN_VENDORS.contains(&vendor) => {
                Some(Self::new(arch, vendor, platform, default_abi(platform)))
            }
            &[arch, platform, abi] => Some(Self::new(arch, "unknown", platform, abi)),
            &[arch, vendor, platform, abi] => Some(Self::new(arch, vendor, platform, abi)),
            _ => None,
        }
    }

    /// Whether the target produces Windows executables (`.exe` suffix)
    pub fn is_windows(&self) -> bool {
        self.platform == "windows"
    }
}

/// Default ABI for a platform: windows uses msvc, linux uses gnu,
/// everything else defers to the host driver
pub fn default_abi(platform: &str) -> &'static str {
    match platform {
        "windows" => "msvc",
        "linux" => "gnu",
        _ => "system",
    }
}

impl fmt::Display for TargetTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.platform == "darwin" && self.abi == "system" {
            write!(f, "{}-{}-{}", self.arch, self.vendor, self.platform)
        } else {
            write!(
                f,
                "{}-{}-{}-{}",
                self.arch, self.vendor, self.platform, self.abi
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::generators;
    use proptest::prelude::*;

    #[test]
    fn test_parse_two_parts_infers_defaults() {
        let t = TargetTriple::parse("aarch64-darwin").unwrap();
        assert_eq!(t, TargetTriple::new("aarch64", "unknown", "darwin", "system"));

        let t = TargetTriple::parse("x86_64-windows").unwrap();
        assert_eq!(t.abi, "msvc");

        let t = TargetTriple::parse("x86_64-linux").unwrap();
        assert_eq!(t.abi, "gnu");
    }

    #[test]
    fn test_parse_three_parts_vendor_or_abi() {
        // Middle part is a known vendor
        let t = TargetTriple::parse("aarch64-unknown-darwin").unwrap();
        assert_eq!(t, TargetTriple::new("aarch64", "unknown", "darwin", "system"));

        // Middle part is a platform, so the last part is the ABI
        let t = TargetTriple::parse("x86_64-linux-musl").unwrap();
        assert_eq!(t, TargetTriple::new("x86_64", "unknown", "linux", "musl"));
    }

    #[test]
    fn test_parse_four_parts() {
        let t = TargetTriple::parse("x86_64-pc-windows-msvc").unwrap();
        assert_eq!(t, TargetTriple::new("x86_64", "pc", "windows", "msvc"));
    }

    #[test]
    fn test_parse_rejects_one_part_and_empty() {
        assert!(TargetTriple::parse("x86_64").is_none());
        assert!(TargetTriple::parse("").is_none());
        assert!(TargetTriple::parse("x86_64--linux").is_none());
        assert!(TargetTriple::parse("a-b-c-d-e").is_none());
    }

    #[test]
    fn test_render_darwin_system_omits_abi() {
        let t = TargetTriple::new("aarch64", "unknown", "darwin", "system");
        assert_eq!(t.to_string(), "aarch64-unknown-darwin");
    }

    #[test]
    fn test_render_full_form() {
        let t = TargetTriple::new("x86_64", "unknown", "linux", "gnu");
        assert_eq!(t.to_string(), "x86_64-unknown-linux-gnu");
    }

    #[test]
    fn test_host_produces_parseable_triple() {
        let host = TargetTriple::host();
        let reparsed = TargetTriple::parse(&host.to_string()).unwrap();
        assert_eq!(host, reparsed);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(crate::config::defaults::MIN_PROPTEST_ITERATIONS))]

        /// Rendering then parsing recovers the triple exactly
        #[test]
        fn prop_render_parse_round_trip(t in generators::target_triple()) {
            let reparsed = TargetTriple::parse(&t.to_string()).unwrap();
            prop_assert_eq!(reparsed, t);
        }
    }
}
