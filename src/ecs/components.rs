//! Navigation ECS components
//!
//! `AgentPose` and `NavAgent` from the `ai` module are components too.

use hecs::Entity;

/// Makes a navigating agent chase another entity's pose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTarget(pub Entity);

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
