//! Driver capability strings

use std::collections::BTreeSet;
use std::fmt;

/// Set of advertised extension tokens
///
/// Membership is exact-token: "GL_EXT_texture" does not match "GL_EXT_texture3D".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    tokens: BTreeSet<String>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a space-separated token list
    pub fn parse(s: &str) -> Self {
        Self {
            tokens: s.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn insert(&mut self, token: impl Into<String>) {
        self.tokens.insert(token.into());
    }

    pub fn remove(&mut self, token: &str) -> bool {
        self.tokens.remove(token)
    }

    pub fn merge(&mut self, other: &ExtensionSet) {
        self.tokens.extend(other.tokens.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// OpenGL version
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
}

impl GlVersion {
    /// Baseline every driver provides
    pub const BASELINE: GlVersion = GlVersion { major: 1, minor: 1 };

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse from a GL_VERSION string
    ///
    /// Accepts "2.1 Mesa 23.0.0", "4.6.0 NVIDIA 550.54", "OpenGL ES 3.2 Mesa".
    /// Falls back to 1.1 when no "X.Y" is found.
    pub fn parse(version_str: &str) -> Self {
        let Some(start) = version_str.find(|c: char| c.is_ascii_digit()) else {
            return Self::BASELINE;
        };

        let version_part: String = version_str[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let parts: Vec<&str> = version_part.split('.').collect();
        if parts.len() >= 2 {
            if let (Ok(major), Ok(minor)) = (parts[0].parse(), parts[1].parse()) {
                return Self { major, minor };
            }
        }

        Self::BASELINE
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        *self >= Self::new(major, minor)
    }
}

impl Default for GlVersion {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What the driver reports once a context is current
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverInfo {
    pub version: GlVersion,
    pub extensions: ExtensionSet,
}

impl DriverInfo {
    pub fn new(version: GlVersion, extensions: ExtensionSet) -> Self {
        Self {
            version,
            extensions,
        }
    }
}
