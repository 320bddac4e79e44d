//! Platform description for build-graph variants.
//!
//! The operating system is the platform *family*: targets that differ only
//! in device/simulator variant, architecture or minimum OS version belong to
//! the same family and may be consolidated.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Operating system a target is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    #[serde(alias = "darwin")]
    Macos,
    Ios,
    Tvos,
    Watchos,
    Visionos,
}

impl Os {
    /// Name shown to users, also used as the platform qualifier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Os::Macos => "macOS",
            Os::Ios => "iOS",
            Os::Tvos => "tvOS",
            Os::Watchos => "watchOS",
            Os::Visionos => "visionOS",
        }
    }

    /// The build setting holding the minimum OS version.
    pub fn deployment_target_setting(&self) -> &'static str {
        match self {
            Os::Macos => "MACOSX_DEPLOYMENT_TARGET",
            Os::Ios => "IPHONEOS_DEPLOYMENT_TARGET",
            Os::Tvos => "TVOS_DEPLOYMENT_TARGET",
            Os::Watchos => "WATCHOS_DEPLOYMENT_TARGET",
            Os::Visionos => "XROS_DEPLOYMENT_TARGET",
        }
    }

    /// SDK name for a variant of this OS.
    pub fn sdk(&self, variant: PlatformVariant) -> &'static str {
        match (self, variant) {
            (Os::Macos, _) => "macosx",
            (Os::Ios, PlatformVariant::Device) => "iphoneos",
            (Os::Ios, PlatformVariant::Simulator) => "iphonesimulator",
            (Os::Tvos, PlatformVariant::Device) => "appletvos",
            (Os::Tvos, PlatformVariant::Simulator) => "appletvsimulator",
            (Os::Watchos, PlatformVariant::Device) => "watchos",
            (Os::Watchos, PlatformVariant::Simulator) => "watchsimulator",
            (Os::Visionos, PlatformVariant::Device) => "xros",
            (Os::Visionos, PlatformVariant::Simulator) => "xrsimulator",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Device or simulator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PlatformVariant {
    #[default]
    Device,
    Simulator,
}

/// Platform + architecture + OS version triple of a BuildTarget.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub os: Os,
    #[serde(default)]
    pub variant: PlatformVariant,
    pub arch: String,
    #[serde(
        serialize_with = "serialize_version",
        deserialize_with = "deserialize_lenient_version"
    )]
    pub minimum_os_version: Version,
}

impl Platform {
    /// The SDK this platform builds against.
    pub fn sdk(&self) -> &'static str {
        self.os.sdk(self.variant)
    }
}

/// Parse a version that may omit its minor or patch component.
///
/// Build systems and Xcode both write versions like `15` or `16.4`,
/// which strict semver rejects.
pub fn parse_lenient_version(s: &str) -> Result<Version, semver::Error> {
    let s = s.trim();
    let parts = s.split('.').count();
    match parts {
        1 => Version::from_str(&format!("{}.0.0", s)),
        2 => Version::from_str(&format!("{}.0", s)),
        _ => Version::from_str(s),
    }
}

/// Format a version the way Xcode expects it (`16.4`, not `16.4.0`).
pub fn short_version(version: &Version) -> String {
    if version.patch == 0 {
        format!("{}.{}", version.major, version.minor)
    } else {
        version.to_string()
    }
}

pub(crate) fn serialize_version<S: Serializer>(v: &Version, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&short_version(v))
}

pub(crate) fn deserialize_lenient_version<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Version, D::Error> {
    let raw = String::deserialize(d)?;
    parse_lenient_version(&raw).map_err(serde::de::Error::custom)
}
