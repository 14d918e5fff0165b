//! Votes point at either a question or an answer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SchemaError;

/// What a vote is cast on. Stored as a `(target_type, target_id)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteTarget {
    Question(i32),
    Answer(i32),
}

impl VoteTarget {
    pub fn from_parts(target_type: &str, target_id: i32) -> Result<Self, SchemaError> {
        match target_type {
            "question" => Ok(VoteTarget::Question(target_id)),
            "answer" => Ok(VoteTarget::Answer(target_id)),
            other => Err(SchemaError::InvalidVoteTarget(other.to_string())),
        }
    }

    pub fn target_type(self) -> &'static str {
        match self {
            VoteTarget::Question(_) => "question",
            VoteTarget::Answer(_) => "answer",
        }
    }

    pub fn id(self) -> i32 {
        match self {
            VoteTarget::Question(id) | VoteTarget::Answer(id) => id,
        }
    }

    /// Table holding the target row and its `votes` counter.
    pub fn table(self) -> &'static str {
        match self {
            VoteTarget::Question(_) => "questions",
            VoteTarget::Answer(_) => "answers",
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target_type(), self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }

    /// Contribution of one vote to the target's score.
    pub fn delta(self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

impl FromStr for VoteDirection {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(VoteDirection::Up),
            "down" => Ok(VoteDirection::Down),
            other => Err(SchemaError::InvalidVoteDirection(other.to_string())),
        }
    }
}

/// Wire shape of a vote target: `{"targetType": "...", "targetId": n}`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetParts {
    target_type: String,
    target_id: i32,
}

impl Serialize for VoteTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TargetParts {
            target_type: self.target_type().to_string(),
            target_id: self.id(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VoteTarget {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = TargetParts::deserialize(deserializer)?;
        VoteTarget::from_parts(&parts.target_type, parts.target_id).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn target_round_trips_through_parts() {
        let t = VoteTarget::from_parts("answer", 7).unwrap();
        assert_eq!(t, VoteTarget::Answer(7));
        assert_eq!((t.target_type(), t.id(), t.table()), ("answer", 7, "answers"));
        assert!(matches!(
            VoteTarget::from_parts("comment", 1),
            Err(SchemaError::InvalidVoteTarget(s)) if s == "comment"
        ));
    }

    #[test]
    fn target_serde_uses_flat_pair() {
        let v = serde_json::to_value(VoteTarget::Question(3)).unwrap();
        assert_eq!(v, json!({ "targetType": "question", "targetId": 3 }));
        let bad: Result<VoteTarget, _> =
            serde_json::from_value(json!({ "targetType": "user", "targetId": 3 }));
        assert!(bad.is_err());
    }

    #[test]
    fn direction_delta() {
        assert_eq!("up".parse::<VoteDirection>().unwrap().delta(), 1);
        assert_eq!(VoteDirection::Down.delta(), -1);
        assert!("sideways".parse::<VoteDirection>().is_err());
    }
}
