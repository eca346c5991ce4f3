// ABOUTME: Image tag validation and construction.
// ABOUTME: Enforces registry tag rules on the service-prefix + version tags gantry pushes.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageTagError {
    #[error("image tag cannot be empty")]
    Empty,

    #[error("image tag exceeds maximum length of 128 characters: {0}")]
    TooLong(usize),

    #[error("image tag cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in image tag: '{0}'")]
    InvalidChar(char),
}

/// A validated registry tag.
///
/// Registries accept up to 128 characters of `[A-Za-z0-9_.-]`, not starting
/// with a period or hyphen. Release tags are assembled as
/// `<service_prefix>-<version>`, so a `v2.1.0` tag push on run 42 yields
/// tags like `api-v2.1.0.42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn new(value: &str) -> Result<Self, ImageTagError> {
        if value.is_empty() {
            return Err(ImageTagError::Empty);
        }

        if value.len() > 128 {
            return Err(ImageTagError::TooLong(value.len()));
        }

        if let Some(first) = value.chars().next()
            && (first == '.' || first == '-')
        {
            return Err(ImageTagError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '.' && c != '-' && c != '_' {
                return Err(ImageTagError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Assemble the release tag for a service: `<prefix>-<version_value>`.
    pub fn prefixed(prefix: &str, version_value: &str) -> Result<Self, ImageTagError> {
        Self::new(&format!("{prefix}-{version_value}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
