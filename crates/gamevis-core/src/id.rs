//! Entity identity types
//!
//! Entities are addressed by the string id their owner chose. Ids are unique
//! within one mapping (environments or players), not across both.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity identity - a caller-chosen name
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Topic name for one of this entity's output channels: `{id}{suffix}`
    pub fn topic(&self, suffix: &str) -> String {
        let mut topic = String::with_capacity(self.0.len() + suffix.len());
        topic.push_str(&self.0);
        topic.push_str(suffix);
        topic
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which registry mapping an entity lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Environment,
    Player,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Environment => "environment",
            EntityKind::Player => "player",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
