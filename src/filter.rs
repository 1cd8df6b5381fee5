//! Filtering and sorting of the todo set.
//!
//! The pipeline is fixed: category, then status, then free text, then sort.
//! Only the sort stage reorders; every other stage preserves input order.

use crate::todo::{Category, Todo};
use chrono::NaiveDate;
use log::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Category filter, with `All` as the no-op sentinel.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Sidebar order: the sentinel first, then every category.
    pub const ALL: [CategoryFilter; 4] = [
        CategoryFilter::All,
        CategoryFilter::Only(Category::Work),
        CategoryFilter::Only(Category::Personal),
        CategoryFilter::Only(Category::Shopping),
    ];

    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => todo.category == Some(*category),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Alle",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            CategoryFilter::All => "☰",
            CategoryFilter::Only(category) => category.icon(),
        }
    }

    pub fn next(&self) -> CategoryFilter {
        let index = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> CategoryFilter {
        let index = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alle" | "all" => Ok(CategoryFilter::All),
            other => other.parse().map(CategoryFilter::Only),
        }
    }
}

/// Completion status filter.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Done,
    Active,
    Overdue,
}

impl StatusFilter {
    pub fn matches(&self, todo: &Todo, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Done => todo.done,
            StatusFilter::Active => !todo.done,
            StatusFilter::Overdue => is_overdue(todo, today),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "alle" => Ok(StatusFilter::All),
            "done" => Ok(StatusFilter::Done),
            "active" => Ok(StatusFilter::Active),
            "overdue" => Ok(StatusFilter::Overdue),
            other => Err(format!("unknown status filter '{}'", other)),
        }
    }
}

/// Ordering applied as the last pipeline stage.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Priority,
    Alphabetical,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Newest,
        SortMode::Oldest,
        SortMode::Priority,
        SortMode::Alphabetical,
    ];

    pub fn next(&self) -> SortMode {
        let index = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::Priority => "priority",
            SortMode::Alphabetical => "alpha",
        };
        f.write_str(label)
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortMode::Newest),
            "oldest" => Ok(SortMode::Oldest),
            "priority" => Ok(SortMode::Priority),
            "alpha" | "alphabetical" => Ok(SortMode::Alphabetical),
            other => Err(format!("unknown sort mode '{}'", other)),
        }
    }
}

/// Everything that shapes the visible list.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub category: CategoryFilter,
    pub status: StatusFilter,
    pub search: String,
    pub sort: SortMode,
}

/// A todo is overdue when it is open and its deadline is strictly before
/// `today`.
///
pub fn is_overdue(todo: &Todo, today: NaiveDate) -> bool {
    !todo.done && todo.deadline.map(|deadline| deadline < today).unwrap_or(false)
}

/// Return the todos matching `query`, in the requested order.
///
pub fn filter_and_sort(todos: &[Todo], query: &Query, today: NaiveDate) -> Vec<Todo> {
    let needle = query.search.trim().to_lowercase();
    let mut list: Vec<Todo> = todos
        .iter()
        .filter(|todo| query.category.matches(todo))
        .filter(|todo| query.status.matches(todo, today))
        .filter(|todo| needle.is_empty() || todo.text.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    // `sort_by` is stable, which the priority and alphabetical modes rely on.
    match query.sort {
        SortMode::Newest => list.sort_by(|a, b| b.id.cmp(&a.id)),
        SortMode::Oldest => list.sort_by(|a, b| a.id.cmp(&b.id)),
        SortMode::Priority => list.sort_by(|a, b| a.priority.cmp(&b.priority)),
        SortMode::Alphabetical => list.sort_by(|a, b| collate(&a.text, &b.text)),
    }
    trace!(
        "Filtered {} of {} todos with {:?}",
        list.len(),
        todos.len(),
        query
    );
    list
}

/// Compare two strings the way a Danish reader expects: case-insensitive,
/// with `æ`, `ø` and `å` sorted after `z`.
///
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .map(collation_weight)
        .cmp(b.chars().flat_map(char::to_lowercase).map(collation_weight))
}

fn collation_weight(c: char) -> (u32, u32) {
    match c {
        'æ' | 'ä' => ('z' as u32, 1),
        'ø' | 'ö' => ('z' as u32, 2),
        'å' => ('z' as u32, 3),
        'é' | 'è' | 'ê' => ('e' as u32, 1),
        'á' | 'à' => ('a' as u32, 1),
        'ü' => ('y' as u32, 1),
        _ => (c as u32, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::{Priority, TodoFields};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn todo(id: u64, text: &str) -> Todo {
        Todo::new(id, TodoFields::new(text))
    }

    fn ids(list: &[Todo]) -> Vec<u64> {
        list.iter().map(|t| t.id).collect()
    }

    fn sample() -> Vec<Todo> {
        let mut a = todo(1, "Call dentist");
        a.category = Some(Category::Personal);
        a.priority = Priority::Low;
        let mut b = todo(2, "Buy milk");
        b.category = Some(Category::Shopping);
        b.done = true;
        let mut c = todo(3, "Write report");
        c.category = Some(Category::Work);
        c.priority = Priority::High;
        c.deadline = NaiveDate::from_ymd_opt(2024, 6, 14);
        let mut d = todo(4, "Buy bread");
        d.category = Some(Category::Shopping);
        vec![a, b, c, d]
    }

    #[test]
    fn default_query_sorts_newest_first() {
        let list = filter_and_sort(&sample(), &Query::default(), today());
        assert_eq!(ids(&list), vec![4, 3, 2, 1]);
    }

    #[test]
    fn category_filter_is_exact_match() {
        let query = Query {
            category: CategoryFilter::Only(Category::Shopping),
            ..Query::default()
        };
        let list = filter_and_sort(&sample(), &query, today());
        assert_eq!(ids(&list), vec![4, 2]);
    }

    #[test]
    fn status_filters_split_done_and_active() {
        let done = Query {
            status: StatusFilter::Done,
            ..Query::default()
        };
        let active = Query {
            status: StatusFilter::Active,
            ..Query::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &done, today())), vec![2]);
        assert_eq!(
            ids(&filter_and_sort(&sample(), &active, today())),
            vec![4, 3, 1]
        );
    }

    #[test]
    fn overdue_requires_deadline_strictly_before_today() {
        let mut due_today = todo(1, "x");
        due_today.deadline = Some(today());
        assert!(!is_overdue(&due_today, today()));

        let mut due_yesterday = todo(2, "y");
        due_yesterday.deadline = today().pred_opt();
        assert!(is_overdue(&due_yesterday, today()));

        assert!(!is_overdue(&todo(3, "no deadline"), today()));
    }

    #[test]
    fn done_todos_are_never_overdue() {
        for days_ago in [1, 30, 3650] {
            let mut t = todo(1, "old");
            t.deadline = today().checked_sub_days(chrono::Days::new(days_ago));
            t.done = true;
            assert!(!is_overdue(&t, today()));
        }
    }

    #[test]
    fn overdue_scenario_follows_done_flag() {
        let mut dentist = todo(1, "Call dentist");
        dentist.deadline = NaiveDate::from_ymd_opt(2020, 1, 1);
        let query = Query {
            status: StatusFilter::Overdue,
            ..Query::default()
        };

        let list = filter_and_sort(&[dentist.clone()], &query, today());
        assert_eq!(ids(&list), vec![1]);

        dentist.done = true;
        assert!(filter_and_sort(&[dentist], &query, today()).is_empty());
    }

    #[test]
    fn search_is_trimmed_and_case_insensitive() {
        let query = Query {
            search: "  BUY ".to_string(),
            ..Query::default()
        };
        assert_eq!(ids(&filter_and_sort(&sample(), &query, today())), vec![4, 2]);
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let todos = vec![todo(1, "KØB MÆLK"), todo(2, "Ring til Åse")];
        let query = Query {
            search: "køb".to_string(),
            ..Query::default()
        };
        assert_eq!(ids(&filter_and_sort(&todos, &query, today())), vec![1]);
    }

    #[test]
    fn blank_search_is_a_no_op() {
        let query = Query {
            search: "   ".to_string(),
            ..Query::default()
        };
        assert_eq!(filter_and_sort(&sample(), &query, today()).len(), 4);
    }

    #[test]
    fn empty_result_is_valid() {
        let query = Query {
            search: "nothing matches this".to_string(),
            ..Query::default()
        };
        assert!(filter_and_sort(&sample(), &query, today()).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let query = Query {
            category: CategoryFilter::Only(Category::Shopping),
            status: StatusFilter::Active,
            search: "buy".to_string(),
            sort: SortMode::Oldest,
        };
        let once = filter_and_sort(&sample(), &query, today());
        let twice = filter_and_sort(&once, &query, today());
        assert_eq!(once, twice);
    }

    #[test]
    fn priority_sort_is_stable() {
        let mut todos = vec![todo(5, "e"), todo(2, "b"), todo(9, "i"), todo(1, "a")];
        todos[1].priority = Priority::High;
        todos[3].priority = Priority::Low;
        let query = Query {
            sort: SortMode::Oldest,
            ..Query::default()
        };
        // Oldest sort first so the tie order is known, then priority.
        let by_id = filter_and_sort(&todos, &query, today());
        let query = Query {
            sort: SortMode::Priority,
            ..Query::default()
        };
        let list = filter_and_sort(&by_id, &query, today());
        assert_eq!(ids(&list), vec![2, 5, 9, 1]);
    }

    #[test]
    fn alphabetical_sort_puts_danish_letters_last() {
        let todos = vec![
            todo(1, "Øl"),
            todo(2, "zebra"),
            todo(3, "Æble"),
            todo(4, "Ål"),
            todo(5, "abe"),
        ];
        let query = Query {
            sort: SortMode::Alphabetical,
            ..Query::default()
        };
        let texts: Vec<String> = filter_and_sort(&todos, &query, today())
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["abe", "zebra", "Æble", "Øl", "Ål"]);
    }

    #[test]
    fn category_filter_cycles_through_sentinel() {
        let mut filter = CategoryFilter::All;
        for _ in 0..CategoryFilter::ALL.len() {
            filter = filter.next();
        }
        assert_eq!(filter, CategoryFilter::All);
        assert_eq!(
            CategoryFilter::All.previous(),
            CategoryFilter::Only(Category::Shopping)
        );
    }
}
