//! Projection of the state onto what the screen shows.
//!
//! `State::view` is pure: the same state and date always give the same
//! `ViewModel`. Render modules only draw it.

use crate::filter::{is_overdue, CategoryFilter, SortMode, StatusFilter};
use crate::state::{Notice, State};
use crate::todo::{attachment, Priority, Todo, TodoId};
use chrono::NaiveDate;

/// Display format for dates.
const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub sidebar: Vec<SidebarEntry>,
    pub status_filter: StatusFilter,
    pub sort: SortMode,
    pub search: String,
    pub rows: Vec<TodoRow>,
    pub detail: Option<DetailPanel>,
    pub status_bar: StatusBar,
    pub sync: SyncIndicator,
    pub notice: Option<Notice>,
    pub loading: bool,
}

/// One category button with its count.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub filter: CategoryFilter,
    pub label: &'static str,
    pub icon: &'static str,
    pub count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: TodoId,
    pub text: String,
    pub done: bool,
    pub overdue: bool,
    pub priority: Priority,
    pub category: Option<String>,
    pub deadline: Option<String>,
    pub has_attachment: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoStatus {
    Overdue,
    Done,
    Active,
}

impl TodoStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TodoStatus::Overdue => "⚠ Overdue",
            TodoStatus::Done => "✓ Done",
            TodoStatus::Active => "○ Active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentView {
    pub stored: String,
    pub display_name: String,
    pub is_image: bool,
}

/// Everything shown for the selected todo.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub id: TodoId,
    pub text: String,
    pub category: String,
    pub priority: Priority,
    pub deadline: String,
    pub status: TodoStatus,
    pub attachment: Option<AttachmentView>,
    pub toggle_label: &'static str,
    pub linked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusBar {
    pub total: usize,
    pub done: usize,
    pub active: usize,
    pub overdue: usize,
}

impl StatusBar {
    /// The overdue part only appears when something is overdue.
    ///
    pub fn text(&self) -> String {
        let mut text = format!(
            "≡  {} todos · ✓ {} done · ○ {} active",
            self.total, self.done, self.active
        );
        if self.overdue > 0 {
            text.push_str(&format!(" · ⚠ {} overdue", self.overdue));
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncIndicator {
    pub in_progress: bool,
    pub configured: Option<bool>,
    pub last_sync: Option<String>,
}

impl SyncIndicator {
    pub fn label(&self) -> String {
        if self.in_progress {
            return "Syncing...".to_string();
        }
        match (self.configured, &self.last_sync) {
            (Some(false), _) => "Todoist: not configured".to_string(),
            (_, Some(at)) => format!("Todoist: last sync {}", at.replace('T', " ")),
            (Some(true), None) => "Todoist: never synced".to_string(),
            (None, None) => String::new(),
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn status_of(todo: &Todo, today: NaiveDate) -> TodoStatus {
    if is_overdue(todo, today) {
        TodoStatus::Overdue
    } else if todo.done {
        TodoStatus::Done
    } else {
        TodoStatus::Active
    }
}

fn deadline_text(todo: &Todo, today: NaiveDate) -> Option<String> {
    todo.deadline.map(|deadline| {
        if is_overdue(todo, today) {
            format!("{} (overdue!)", format_date(deadline))
        } else {
            format_date(deadline)
        }
    })
}

fn detail(todo: &Todo, today: NaiveDate) -> DetailPanel {
    DetailPanel {
        id: todo.id,
        text: todo.text.clone(),
        category: todo
            .category
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| "(none)".to_string()),
        priority: todo.priority,
        deadline: deadline_text(todo, today).unwrap_or_else(|| "(none)".to_string()),
        status: status_of(todo, today),
        attachment: todo.attachment.as_ref().map(|stored| AttachmentView {
            stored: stored.clone(),
            display_name: attachment::display_name(stored).to_string(),
            is_image: attachment::is_image(stored),
        }),
        toggle_label: if todo.done { "Reopen" } else { "Complete" },
        linked: todo.todoist_id.is_some(),
    }
}

impl State {
    /// Project the state for rendering on `today`.
    ///
    pub fn view(&self, today: NaiveDate) -> ViewModel {
        let todos = self.todos();
        let query = self.query();
        let visible = crate::filter::filter_and_sort(todos, query, today);

        let sidebar = CategoryFilter::ALL
            .iter()
            .map(|filter| SidebarEntry {
                filter: *filter,
                label: filter.label(),
                icon: filter.icon(),
                count: todos.iter().filter(|todo| filter.matches(todo)).count(),
                active: *filter == query.category,
            })
            .collect();

        let rows = visible
            .iter()
            .map(|todo| TodoRow {
                id: todo.id,
                text: todo.text.clone(),
                done: todo.done,
                overdue: is_overdue(todo, today),
                priority: todo.priority,
                category: todo.category.map(|c| format!("{} {}", c.icon(), c.as_str())),
                deadline: deadline_text(todo, today),
                has_attachment: todo.attachment.is_some(),
                selected: Some(todo.id) == self.selected(),
            })
            .collect();

        let done = todos.iter().filter(|todo| todo.done).count();
        let status_bar = StatusBar {
            total: todos.len(),
            done,
            active: todos.len() - done,
            overdue: todos.iter().filter(|todo| is_overdue(todo, today)).count(),
        };

        ViewModel {
            sidebar,
            status_filter: query.status,
            sort: query.sort,
            search: query.search.clone(),
            rows,
            detail: self.selected_todo().map(|todo| detail(todo, today)),
            status_bar,
            sync: SyncIndicator {
                in_progress: self.is_sync_in_progress(),
                configured: self.sync_configured(),
                last_sync: self.last_sync().map(str::to_string),
            },
            notice: self.notice().cloned(),
            loading: self.is_loading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{FetchTicket, Snapshot};
    use crate::state::Action;
    use crate::todo::{Category, TodoFields};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_with(todos: Vec<Todo>) -> State {
        let mut state = State::default();
        state.set_today(date(2025, 6, 15));
        state.apply_fetch(Ok(Snapshot {
            ticket: FetchTicket(1),
            todos,
        }));
        state
    }

    fn sample() -> Vec<Todo> {
        let mut done = Todo::new(1, TodoFields::new("Betal husleje"));
        done.done = true;
        done.deadline = Some(date(2025, 6, 1));
        let overdue = Todo::new(
            2,
            TodoFields::new("Forny pas")
                .with_category(Some(Category::Personal))
                .with_deadline(Some(date(2025, 6, 10))),
        );
        let mut attached = Todo::new(
            3,
            TodoFields::new("Kvittering").with_category(Some(Category::Work)),
        );
        attached.attachment = Some("0a1b2c3d_kvittering.png".into());
        vec![done, overdue, attached]
    }

    #[test]
    fn status_bar_counts_and_hides_zero_overdue() {
        let view = state_with(sample()).view(date(2025, 6, 15));
        assert_eq!(
            view.status_bar.text(),
            "≡  3 todos · ✓ 1 done · ○ 2 active · ⚠ 1 overdue"
        );
        let view = state_with(vec![]).view(date(2025, 6, 15));
        assert_eq!(view.status_bar.text(), "≡  0 todos · ✓ 0 done · ○ 0 active");
    }

    #[test]
    fn done_todo_with_past_deadline_is_not_overdue() {
        let view = state_with(sample()).view(date(2025, 6, 15));
        let row = view.rows.iter().find(|row| row.id == 1).unwrap();
        assert!(!row.overdue);
        assert_eq!(row.deadline.as_deref(), Some("01-06-2025"));
        let row = view.rows.iter().find(|row| row.id == 2).unwrap();
        assert_eq!(row.deadline.as_deref(), Some("10-06-2025 (overdue!)"));
    }

    #[test]
    fn sidebar_counts_all_todos_per_category() {
        let mut state = state_with(sample());
        state.apply(Action::NextCategory);
        let view = state.view(date(2025, 6, 15));
        let counts: Vec<usize> = view.sidebar.iter().map(|entry| entry.count).collect();
        assert_eq!(counts, vec![3, 1, 1, 0]);
        assert!(view.sidebar[1].active);
        assert_eq!(view.rows.len(), 1);
    }

    #[test]
    fn detail_panel_describes_selection() {
        let mut state = state_with(sample());
        assert_eq!(state.view(date(2025, 6, 15)).detail, None);

        state.select(Some(3));
        let detail = state.view(date(2025, 6, 15)).detail.unwrap();
        assert_eq!(detail.category, "Arbejde");
        assert_eq!(detail.deadline, "(none)");
        assert_eq!(detail.status, TodoStatus::Active);
        assert_eq!(detail.toggle_label, "Complete");
        let attachment = detail.attachment.unwrap();
        assert_eq!(attachment.display_name, "kvittering.png");
        assert!(attachment.is_image);

        state.select(Some(2));
        let detail = state.view(date(2025, 6, 15)).detail.unwrap();
        assert_eq!(detail.status.label(), "⚠ Overdue");
        assert_eq!(detail.category, "Privat");
    }

    #[test]
    fn projection_is_pure() {
        let state = state_with(sample());
        assert_eq!(state.view(date(2025, 6, 15)), state.view(date(2025, 6, 15)));
    }

    #[test]
    fn sync_indicator_labels() {
        let mut indicator = SyncIndicator::default();
        assert_eq!(indicator.label(), "");
        indicator.configured = Some(false);
        assert_eq!(indicator.label(), "Todoist: not configured");
        indicator.configured = Some(true);
        indicator.last_sync = Some("2025-06-15T10:30:00".into());
        assert_eq!(indicator.label(), "Todoist: last sync 2025-06-15 10:30:00");
        indicator.in_progress = true;
        assert_eq!(indicator.label(), "Syncing...");
    }
}
