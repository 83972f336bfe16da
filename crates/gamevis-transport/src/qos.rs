//! Quality of service for output channels

/// How many past messages a topic keeps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum History {
    KeepLast(usize),
    KeepAll,
}

/// Whether retained messages are delivered to late subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Durability {
    /// Late joiners receive the retained history
    TransientLocal,
    /// Late joiners only see messages sent after they joined
    Volatile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QosProfile {
    pub history: History,
    pub durability: Durability,
}

impl QosProfile {
    /// Keep the last `depth` messages and replay them to late joiners
    pub fn latched(depth: usize) -> Self {
        QosProfile {
            history: History::KeepLast(depth),
            durability: Durability::TransientLocal,
        }
    }

    pub fn volatile(depth: usize) -> Self {
        QosProfile {
            history: History::KeepLast(depth),
            durability: Durability::Volatile,
        }
    }

    /// Messages a topic with this profile retains (`None` = unbounded)
    pub fn retained(&self) -> Option<usize> {
        match (self.durability, self.history) {
            (Durability::Volatile, _) => Some(0),
            (Durability::TransientLocal, History::KeepLast(n)) => Some(n),
            (Durability::TransientLocal, History::KeepAll) => None,
        }
    }
}

impl Default for QosProfile {
    fn default() -> Self {
        QosProfile::volatile(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retained() {
        assert_eq!(QosProfile::latched(10).retained(), Some(10));
        assert_eq!(QosProfile::volatile(10).retained(), Some(0));
        let all = QosProfile {
            history: History::KeepAll,
            durability: Durability::TransientLocal,
        };
        assert_eq!(all.retained(), None);
    }
}
