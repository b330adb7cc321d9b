//! Task priority shared by the task board and the relational store.
//!
//! The task board speaks a numeric scale, the store keeps a descriptive label.
//! Priority is advisory, so every conversion into `TaskPriority` is total:
//! anything unrecognized becomes `Medium`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PriorityRepr", into = "String")]
pub enum TaskPriority {
    Urgent,
    Important,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    /// Numeric priority on the task board's 0-10 scale.
    pub fn to_external(self) -> i32 {
        match self {
            TaskPriority::Urgent => 1,
            TaskPriority::Important => 3,
            TaskPriority::Medium => 5,
            TaskPriority::Low => 9,
        }
    }

    /// Descriptive label stored on task rows.
    pub fn to_internal_label(self) -> &'static str {
        match self {
            TaskPriority::Urgent => "urgent",
            TaskPriority::Important => "important",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }

    pub fn from_external(code: i64) -> Self {
        match code {
            1 => TaskPriority::Urgent,
            3 => TaskPriority::Important,
            5 => TaskPriority::Medium,
            9 => TaskPriority::Low,
            _ => TaskPriority::Medium,
        }
    }

    /// Parses a numeric code or a label, case-insensitively.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if let Ok(code) = value.parse::<i64>() {
            return Self::from_external(code);
        }

        match value.to_ascii_lowercase().as_str() {
            "urgent" => TaskPriority::Urgent,
            "important" => TaskPriority::Important,
            "low" => TaskPriority::Low,
            _ => TaskPriority::Medium,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_internal_label())
    }
}

impl From<TaskPriority> for String {
    fn from(priority: TaskPriority) -> Self {
        priority.to_external().to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityRepr {
    Code(i64),
    Text(String),
    Other(serde_json::Value),
}

impl From<PriorityRepr> for TaskPriority {
    fn from(repr: PriorityRepr) -> Self {
        match repr {
            PriorityRepr::Code(code) => TaskPriority::from_external(code),
            PriorityRepr::Text(text) => TaskPriority::parse(&text),
            PriorityRepr::Other(_) => TaskPriority::Medium,
        }
    }
}
