//! Deployment events that trigger a notification.

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::ApplyId;

/// Title shown for a successful deployment.
pub const SUCCESS_TITLE: &str = "Deploy succeeded";
/// Title shown for a failed deployment.
pub const FAILURE_TITLE: &str = "Deploy failed";

/// Outcome of a deployment.
///
/// Raw status codes follow the deployment database: `1` is success, `0` is failure. Any other
/// code is rejected, so a notification title is always one of the two known labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployStatus {
    Success,
    Failure,
}

impl DeployStatus {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Success => SUCCESS_TITLE,
            Self::Failure => FAILURE_TITLE,
        }
    }
}

impl std::fmt::Display for DeployStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

impl TryFrom<i32> for DeployStatus {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Success),
            0 => Ok(Self::Failure),
            other => Err(Error::InvalidEvent {
                message: format!("unknown deploy status code {other}"),
            }),
        }
    }
}

impl std::str::FromStr for DeployStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" | "1" => Ok(Self::Success),
            "failure" | "0" => Ok(Self::Failure),
            _ => Err(format!("Unknown deploy status: {}", s)),
        }
    }
}

/// How the deployed revision was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployMode {
    /// Deploy the head of a branch
    Branch,
    /// Deploy a tag
    Tag,
}

impl std::fmt::Display for DeployMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Branch => write!(f, "branch"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

impl TryFrom<i32> for DeployMode {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Branch),
            2 => Ok(Self::Tag),
            other => Err(Error::InvalidEvent {
                message: format!("unknown deploy mode {other}"),
            }),
        }
    }
}

impl std::str::FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "branch" | "1" => Ok(Self::Branch),
            "tag" | "2" => Ok(Self::Tag),
            _ => Err(format!("Unknown deploy mode: {}", s)),
        }
    }
}

/// A finished deployment that should be announced. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentEvent {
    pub apply_id: ApplyId,
    pub mode: DeployMode,
    pub status: DeployStatus,
    #[serde(default)]
    pub title: String,
}

impl DeploymentEvent {
    pub fn new(apply_id: ApplyId, mode: DeployMode, status: DeployStatus, title: impl Into<String>) -> Self {
        Self {
            apply_id,
            mode,
            status,
            title: title.into(),
        }
    }

    /// Build an event from the integer codes stored by the deployment workflow.
    pub fn from_codes(apply_id: ApplyId, mode: i32, status: i32, title: impl Into<String>) -> Result<Self, Error> {
        Ok(Self::new(apply_id, mode.try_into()?, status.try_into()?, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_titles() {
        assert_eq!(DeployStatus::Success.title(), SUCCESS_TITLE);
        assert_eq!(DeployStatus::Failure.title(), FAILURE_TITLE);
        assert_ne!(SUCCESS_TITLE, FAILURE_TITLE);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DeployStatus::try_from(1).unwrap(), DeployStatus::Success);
        assert_eq!(DeployStatus::try_from(0).unwrap(), DeployStatus::Failure);
        assert!(matches!(DeployStatus::try_from(2), Err(Error::InvalidEvent { .. })));
        assert!(matches!(DeployStatus::try_from(-1), Err(Error::InvalidEvent { .. })));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("success".parse::<DeployStatus>().unwrap(), DeployStatus::Success);
        assert_eq!("0".parse::<DeployStatus>().unwrap(), DeployStatus::Failure);
        assert!("succeeded".parse::<DeployStatus>().is_err());
    }

    #[test]
    fn test_from_codes_rejects_unknown_status() {
        let event = DeploymentEvent::from_codes(42, 1, 1, "release").unwrap();
        assert_eq!(event.status, DeployStatus::Success);
        assert_eq!(event.mode, DeployMode::Branch);

        assert!(DeploymentEvent::from_codes(42, 1, 7, "release").is_err());
        assert!(DeploymentEvent::from_codes(42, 9, 1, "release").is_err());
    }

    #[test]
    fn test_event_json() {
        let event: DeploymentEvent = serde_json::from_str(r#"{"apply_id": 42, "mode": "tag", "status": "failure"}"#).unwrap();
        assert_eq!(event, DeploymentEvent::new(42, DeployMode::Tag, DeployStatus::Failure, ""));

        assert!(serde_json::from_str::<DeploymentEvent>(r#"{"apply_id": 42, "mode": "tag", "status": "pending"}"#).is_err());
    }
}
