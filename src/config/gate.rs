// ABOUTME: Preflight gate configuration - ordered checks and excluded paths.
// ABOUTME: Checks run in listed order; formatting checks may declare a fix command.

use nonempty::NonEmpty;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

/// The preflight section of the manifest. Absent means no checks, and the
/// gate passes trivially.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GateManifest {
    /// Path prefixes excluded from every check, relative to the manifest.
    /// `.git` is always excluded and does not need listing.
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

/// One gate check. The command receives the candidate file paths as trailing
/// arguments and signals failure through its exit code.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub name: String,
    #[serde(deserialize_with = "deserialize_command")]
    pub command: NonEmpty<String>,
    /// Optional fixer, run before the check so formatting fixes land in the
    /// tree. The check command alone decides pass or fail.
    #[serde(default, deserialize_with = "deserialize_fix_command")]
    pub fix_command: Option<NonEmpty<String>>,
    /// File extensions this check applies to, without the leading dot.
    /// Absent means the check sees every non-excluded file.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default = "default_check_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_check_timeout() -> Duration {
    Duration::from_secs(300)
}

fn deserialize_command<'de, D>(deserializer: D) -> Result<NonEmpty<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<String>::deserialize(deserializer)?;
    NonEmpty::from_vec(items)
        .ok_or_else(|| serde::de::Error::custom("command must have at least one element"))
}

fn deserialize_fix_command<'de, D>(deserializer: D) -> Result<Option<NonEmpty<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<String>>::deserialize(deserializer)?;
    match items {
        Some(items) => NonEmpty::from_vec(items)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("fix_command must have at least one element")),
        None => Ok(None),
    }
}
