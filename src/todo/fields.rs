use super::{blank, Category, Priority, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The mutable part of a todo. Doubles as the create/update payload and as
/// the merge base recorded by the reconciler.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFields {
    pub text: String,
    #[serde(default, with = "blank")]
    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, with = "blank")]
    pub deadline: Option<NaiveDate>,
}

impl TodoFields {
    /// Return fields with the given text and defaults elsewhere.
    ///
    pub fn new(text: impl Into<String>) -> Self {
        TodoFields {
            text: text.into(),
            category: None,
            priority: Priority::default(),
            deadline: None,
        }
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Return a copy with trimmed text, or an error if the text is empty.
    ///
    pub fn validated(&self) -> Result<TodoFields, ValidationError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(TodoFields {
            text: text.to_owned(),
            ..self.clone()
        })
    }
}

/// Parse a typed deadline. Blank input means no deadline.
///
pub fn parse_deadline(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDeadline(input.to_owned()))
}
