//! Target architecture selection
//!
//! Three targets are modeled: two 64-bit ones that share a type table and a
//! 32-bit one with 4-byte machine words.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchError {
    #[error("unsupported architecture `{0}` (expected one of: amd64, arm64, 386)")]
    Unsupported(String),
}

/// Target architecture a layout is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Architecture {
    /// x86-64, 8-byte words
    #[default]
    #[serde(rename = "amd64")]
    Amd64,
    /// AArch64, 8-byte words
    #[serde(rename = "arm64")]
    Arm64,
    /// 32-bit x86, 4-byte words
    #[serde(rename = "386")]
    I386,
}

impl Architecture {
    pub const ALL: [Self; 3] = [Self::Amd64, Self::Arm64, Self::I386];

    /// Parse an architecture identifier, accepting common aliases
    pub fn parse(name: &str) -> Result<Self, ArchError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "amd64" | "x86_64" | "x86-64" => Ok(Self::Amd64),
            // Normalize aarch64 to the short name
            "arm64" | "aarch64" => Ok(Self::Arm64),
            "386" | "i386" | "i686" | "x86" => Ok(Self::I386),
            _ => Err(ArchError::Unsupported(name.to_string())),
        }
    }

    /// Short identifier (`amd64`, `arm64`, `386`)
    pub const fn name(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::I386 => "386",
        }
    }

    /// Native integer / pointer size in bytes
    pub const fn word_size(self) -> u32 {
        match self {
            Self::Amd64 | Self::Arm64 => 8,
            Self::I386 => 4,
        }
    }

    pub const fn is_64_bit(self) -> bool {
        self.word_size() == 8
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture {
    type Err = ArchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
