//! Edit form state.
//!
//! The form holds raw user input; it only becomes `TodoFields` once it
//! passes validation on submit.

use crate::todo::{parse_deadline, Category, Priority, Todo, TodoFields, ValidationError};

/// Specifying the form fields in focus order.
///
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FormField {
    Text,
    Category,
    Priority,
    Deadline,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Text,
        FormField::Category,
        FormField::Priority,
        FormField::Deadline,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Text => "Text",
            FormField::Category => "Category",
            FormField::Priority => "Priority",
            FormField::Deadline => "Deadline (YYYY-MM-DD)",
        }
    }

    fn index(&self) -> usize {
        FormField::ALL
            .iter()
            .position(|field| field == self)
            .unwrap_or(0)
    }

    pub fn next(&self) -> FormField {
        FormField::ALL[(self.index() + 1) % FormField::ALL.len()]
    }

    pub fn previous(&self) -> FormField {
        let len = FormField::ALL.len();
        FormField::ALL[(self.index() + len - 1) % len]
    }
}

/// Raw input of the create/edit form.
///
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TodoForm {
    pub text: String,
    pub category: Option<Category>,
    pub priority: Priority,
    pub deadline: String,
    pub focus: FormField,
}

impl Default for TodoForm {
    fn default() -> Self {
        TodoForm {
            text: String::new(),
            category: None,
            priority: Priority::default(),
            deadline: String::new(),
            focus: FormField::Text,
        }
    }
}

impl TodoForm {
    /// Return a form prefilled from an existing todo.
    ///
    pub fn from_todo(todo: &Todo) -> Self {
        TodoForm {
            text: todo.text.clone(),
            category: todo.category,
            priority: todo.priority,
            deadline: todo
                .deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            focus: FormField::Text,
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Type a character into the focused text field.
    ///
    pub fn input(&mut self, c: char) {
        match self.focus {
            FormField::Text => self.text.push(c),
            FormField::Deadline if c.is_ascii_digit() || c == '-' => self.deadline.push(c),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            FormField::Text => {
                self.text.pop();
            }
            FormField::Deadline => {
                self.deadline.pop();
            }
            _ => {}
        }
    }

    /// Step through the options of the focused choice field.
    ///
    pub fn cycle_option(&mut self, forward: bool) {
        match self.focus {
            FormField::Category => {
                // None sits between the last and the first category.
                let mut options: Vec<Option<Category>> = vec![None];
                options.extend(Category::ALL.iter().copied().map(Some));
                self.category = step(&options, &self.category, forward);
            }
            FormField::Priority => {
                self.priority = step(&Priority::ALL, &self.priority, forward);
            }
            _ => {}
        }
    }

    /// Validate the input and return the field set to submit.
    ///
    pub fn to_fields(&self) -> Result<TodoFields, ValidationError> {
        TodoFields {
            text: self.text.clone(),
            category: self.category,
            priority: self.priority,
            deadline: parse_deadline(&self.deadline)?,
        }
        .validated()
    }
}

fn step<T: PartialEq + Clone>(options: &[T], current: &T, forward: bool) -> T {
    let index = options.iter().position(|o| o == current).unwrap_or(0);
    let len = options.len();
    let next = if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    };
    options[next].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn focus_wraps_around() {
        assert_eq!(FormField::Deadline.next(), FormField::Text);
        assert_eq!(FormField::Text.previous(), FormField::Deadline);
    }

    #[test]
    fn input_goes_to_focused_field() {
        let mut form = TodoForm::default();
        form.input('K');
        form.input('ø');
        form.focus = FormField::Deadline;
        for c in "2025-x01-02".chars() {
            form.input(c);
        }
        assert_eq!(form.text, "Kø");
        assert_eq!(form.deadline, "2025-01-02");
        form.backspace();
        assert_eq!(form.deadline, "2025-01-0");
    }

    #[test]
    fn category_cycles_through_none() {
        let mut form = TodoForm {
            focus: FormField::Category,
            ..TodoForm::default()
        };
        form.cycle_option(true);
        assert_eq!(form.category, Some(Category::Work));
        form.cycle_option(false);
        form.cycle_option(false);
        assert_eq!(form.category, Some(Category::Shopping));
    }

    #[test]
    fn to_fields_validates() {
        let mut form = TodoForm::default();
        assert_eq!(form.to_fields(), Err(ValidationError::EmptyText));
        form.text = " Tandlæge ".into();
        form.deadline = "2025-13-01".into();
        assert!(matches!(
            form.to_fields(),
            Err(ValidationError::InvalidDeadline(_))
        ));
        form.deadline = "2025-12-01".into();
        let fields = form.to_fields().unwrap();
        assert_eq!(fields.text, "Tandlæge");
        assert_eq!(fields.deadline, NaiveDate::from_ymd_opt(2025, 12, 1));
    }

    #[test]
    fn from_todo_round_trips_fields() {
        let fields = TodoFields::new("Møde")
            .with_category(Some(Category::Work))
            .with_deadline(NaiveDate::from_ymd_opt(2025, 3, 4));
        let todo = Todo::new(1, fields.clone());
        assert_eq!(TodoForm::from_todo(&todo).to_fields().unwrap(), fields);
    }
}
