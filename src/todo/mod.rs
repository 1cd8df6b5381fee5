//! Todo data model.
//!
//! This module defines the todo record shared by every component, together
//! with its enumerated attributes, the mutable field set used as the
//! create/update payload, and the attachment and validation rules enforced
//! before any request is issued.

pub mod attachment;
mod error;
mod fields;

pub use attachment::AttachmentFile;
pub use error::ValidationError;
pub use fields::{parse_deadline, TodoFields};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Server-assigned todo identifier.
pub type TodoId = u64;

/// Defines todo data structure.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    #[serde(default, with = "blank")]
    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "blank")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, with = "blank")]
    pub attachment: Option<String>,
    #[serde(default, with = "blank")]
    pub todoist_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_base: Option<TodoFields>,
}

impl Todo {
    /// Return a new open todo with the given id and fields.
    ///
    pub fn new(id: TodoId, fields: TodoFields) -> Self {
        Todo {
            id,
            text: fields.text,
            category: fields.category,
            priority: fields.priority,
            deadline: fields.deadline,
            done: false,
            attachment: None,
            todoist_id: None,
            sync_base: None,
        }
    }

    /// Return the mutable field set.
    ///
    pub fn fields(&self) -> TodoFields {
        TodoFields {
            text: self.text.clone(),
            category: self.category,
            priority: self.priority,
            deadline: self.deadline,
        }
    }

    /// Replace the mutable field set.
    ///
    pub fn set_fields(&mut self, fields: TodoFields) -> &mut Self {
        self.text = fields.text;
        self.category = fields.category;
        self.priority = fields.priority;
        self.deadline = fields.deadline;
        self
    }
}

/// Fixed set of todo categories. Wire names are Danish.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Work,
    Personal,
    Shopping,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Shopping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Arbejde",
            Category::Personal => "Privat",
            Category::Shopping => "Indkøb",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Work => "⚒",
            Category::Personal => "⌂",
            Category::Shopping => "☷",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arbejde" | "work" => Ok(Category::Work),
            "privat" | "personal" => Ok(Category::Personal),
            "indkøb" | "shopping" => Ok(Category::Shopping),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Todo priority. Ordering follows urgency: `High < Medium < Low`.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "Høj",
            Priority::Medium => "Medium",
            Priority::Low => "Lav",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "høj" | "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "lav" | "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// Unknown or blank values rank as Medium.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

/// Serde adapter for optional values stored as `""` when absent.
///
pub(crate) mod blank {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => s
                .trim()
                .parse()
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_legacy_record() {
        let todo: Todo = serde_json::from_value(json!({
            "id": 3, "text": "Køb mælk", "done": false
        }))
        .unwrap();
        assert_eq!(todo.id, 3);
        assert_eq!(todo.priority, Priority::Medium);
        assert_eq!(todo.category, None);
        assert_eq!(todo.deadline, None);
        assert_eq!(todo.attachment, None);
        assert_eq!(todo.todoist_id, None);
    }

    #[test]
    fn deserializes_full_record() {
        let todo: Todo = serde_json::from_value(json!({
            "id": 1,
            "text": "Call dentist",
            "category": "Privat",
            "priority": "Høj",
            "deadline": "2020-01-01",
            "done": true,
            "attachment": "0a1b2c3d_x.pdf",
            "todoist_id": "8812"
        }))
        .unwrap();
        assert_eq!(todo.category, Some(Category::Personal));
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(todo.deadline, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(todo.done);
        assert_eq!(todo.attachment.as_deref(), Some("0a1b2c3d_x.pdf"));
        assert_eq!(todo.todoist_id.as_deref(), Some("8812"));
    }

    #[test]
    fn serializes_absent_values_as_blank_strings() {
        let todo = Todo::new(7, TodoFields::new("Buy milk"));
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["category"], "");
        assert_eq!(json["deadline"], "");
        assert_eq!(json["attachment"], "");
        assert_eq!(json["todoist_id"], "");
        assert!(json.get("sync_base").is_none());
    }

    #[test]
    fn unknown_priority_falls_back_to_medium() {
        let todo: Todo =
            serde_json::from_value(json!({"id": 1, "text": "x", "priority": "Urgent"})).unwrap();
        assert_eq!(todo.priority, Priority::Medium);
    }

    #[test]
    fn priority_orders_by_urgency() {
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn category_parses_danish_and_english_names() {
        assert_eq!("Indkøb".parse::<Category>(), Ok(Category::Shopping));
        assert_eq!("work".parse::<Category>(), Ok(Category::Work));
        assert!("Hobby".parse::<Category>().is_err());
    }

    #[test]
    fn set_fields_leaves_done_and_attachment_alone() {
        let mut todo = Todo::new(1, TodoFields::new("a"));
        todo.done = true;
        todo.attachment = Some("f.txt".to_string());
        todo.set_fields(TodoFields::new("b").with_priority(Priority::Low));
        assert_eq!(todo.text, "b");
        assert_eq!(todo.priority, Priority::Low);
        assert!(todo.done);
        assert_eq!(todo.attachment.as_deref(), Some("f.txt"));
    }
}
