// ABOUTME: Release version resolution from CI trigger inputs.
// ABOUTME: Tag pushes get versioned tags, everything else gets "latest".

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseInputError {
    #[error("ref name is required for a tag-push release")]
    MissingRefName,

    #[error("unknown ref type: {0} (expected \"tag\" or \"branch\")")]
    UnknownRefType(String),
}

/// What fired the release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// Started by hand, outside any ref event.
    Manual,
    /// A tag was pushed; the tag name versions the release.
    TagPush,
    /// A branch was pushed; the release is unversioned.
    BranchPush,
}

impl TriggerKind {
    /// Derive the trigger from the CI-provided ref type. An absent ref type
    /// means the run was started manually.
    pub fn from_ref_type(ref_type: Option<&str>) -> Result<Self, ReleaseInputError> {
        match ref_type {
            None => Ok(TriggerKind::Manual),
            Some("tag") => Ok(TriggerKind::TagPush),
            Some("branch") => Ok(TriggerKind::BranchPush),
            Some(other) => Err(ReleaseInputError::UnknownRefType(other.to_string())),
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Manual => write!(f, "manual"),
            TriggerKind::TagPush => write!(f, "tag-push"),
            TriggerKind::BranchPush => write!(f, "branch-push"),
        }
    }
}

/// The trigger inputs of one release run.
///
/// Construction validates that a tag push carries a ref name; once a run
/// exists, version resolution cannot fail.
#[derive(Debug, Clone)]
pub struct ReleaseRun {
    trigger: TriggerKind,
    ref_name: Option<String>,
    run_number: u64,
}

impl ReleaseRun {
    pub fn new(
        trigger: TriggerKind,
        ref_name: Option<String>,
        run_number: u64,
    ) -> Result<Self, ReleaseInputError> {
        if trigger == TriggerKind::TagPush && ref_name.as_deref().is_none_or(str::is_empty) {
            return Err(ReleaseInputError::MissingRefName);
        }

        Ok(Self {
            trigger,
            ref_name,
            run_number,
        })
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn ref_name(&self) -> Option<&str> {
        self.ref_name.as_deref()
    }

    pub fn run_number(&self) -> u64 {
        self.run_number
    }

    /// Resolve the single version shared by every service in this run.
    ///
    /// A tag push of `v2.1.0` on run 42 yields `v2.1.0.42`; any other
    /// trigger yields `latest` regardless of the ref name. Deterministic:
    /// the same inputs always resolve the same version.
    pub fn version(&self) -> Version {
        let value = match (self.trigger, self.ref_name.as_deref()) {
            (TriggerKind::TagPush, Some(tag)) => format!("{}.{}", tag, self.run_number),
            _ => "latest".to_string(),
        };

        Version {
            value,
            build_num: self.run_number,
        }
    }
}

/// A resolved release version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    /// Tag component of every pushed image (`v2.1.0.42` or `latest`).
    pub value: String,
    /// Sequence number of the run, threaded into images as `BUILD_NUM`.
    pub build_num: u64,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
