//! Instance domain types

use serde::{Deserialize, Serialize};

/// Opaque identifier of a remote compute instance (e.g. `i-0abc123def4567890`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceRef(String);

impl InstanceRef {
    /// Creates an instance reference, rejecting empty or blank input
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state reported by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,

    /// Any state name this version does not know about
    #[serde(untagged)]
    Other(String),
}

impl InstanceState {
    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Running)
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceState::Pending => write!(f, "pending"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::Stopping => write!(f, "stopping"),
            InstanceState::Stopped => write!(f, "stopped"),
            InstanceState::ShuttingDown => write!(f, "shutting-down"),
            InstanceState::Terminated => write!(f, "terminated"),
            InstanceState::Other(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_ref_rejects_blank() {
        assert!(InstanceRef::new("").is_none());
        assert!(InstanceRef::new("   ").is_none());
    }

    #[test]
    fn test_instance_ref_trims() {
        let instance = InstanceRef::new(" i-0123456789abcdef0 ").unwrap();
        assert_eq!(instance.as_str(), "i-0123456789abcdef0");
        assert_eq!(instance.to_string(), "i-0123456789abcdef0");
    }

    #[test]
    fn test_state_parses_provider_names() {
        let state: InstanceState = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(state, InstanceState::Running);

        let state: InstanceState = serde_json::from_str("\"shutting-down\"").unwrap();
        assert_eq!(state, InstanceState::ShuttingDown);

        let state: InstanceState = serde_json::from_str("\"hibernating\"").unwrap();
        assert_eq!(state, InstanceState::Other("hibernating".to_string()));
        assert!(!state.is_running());
    }
}
