//! Todoist REST integration.
//!
//! `Todoist` talks to the service and translates between Todoist tasks and
//! local todo fields: priorities, projects as categories, due dates as
//! deadlines and the attachment note appended to task content.

mod client;
mod error;
mod resource;

pub use error::TodoistError;
pub use resource::*;

use crate::sync::{RemoteTask, RemoteTasks};
use crate::todo::{attachment, Category, Priority, TodoFields};
use async_trait::async_trait;
use chrono::NaiveDate;
use client::Client;
use log::*;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.todoist.com/rest/v2";

/// Marker placed before the file name when a todo with an attachment is pushed.
const ATTACHMENT_MARKER: &str = "📎 Local file:";

/// Responsible for asynchronous interaction with the Todoist API including
/// transformation of response data into local todo fields.
///
pub struct Todoist {
    client: Client,
    project_ids: HashMap<String, String>,
    project_names: HashMap<String, String>,
    inbox_id: Option<String>,
}

impl Todoist {
    /// Returns a new instance for the given access token.
    ///
    pub fn new(access_token: &str, base_url: &str, timeout: Duration) -> Result<Self, TodoistError> {
        if access_token.trim().is_empty() {
            return Err(TodoistError::NotConfigured);
        }
        debug!("Initializing Todoist client for {}...", base_url);
        Ok(Todoist {
            client: Client::new(access_token, base_url, timeout)?,
            project_ids: HashMap::new(),
            project_names: HashMap::new(),
            inbox_id: None,
        })
    }

    /// Returns a vector of projects and refreshes the project cache.
    ///
    pub async fn projects(&mut self) -> Result<Vec<Project>, TodoistError> {
        debug!("Requesting Todoist projects...");
        let projects: Vec<Project> = self.client.get("/projects").await?;
        self.project_ids.clear();
        self.project_names.clear();
        self.inbox_id = None;
        for project in &projects {
            self.remember(project);
        }
        debug!("Retrieved {} projects", projects.len());
        Ok(projects)
    }

    /// Returns a vector of all open tasks.
    ///
    pub async fn tasks(&self) -> Result<Vec<ApiTask>, TodoistError> {
        debug!("Requesting active Todoist tasks...");
        let tasks: Vec<ApiTask> = self.client.get("/tasks").await?;
        debug!("Retrieved {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Map an API task to local fields using the cached projects.
    ///
    pub fn to_remote_task(&self, task: ApiTask) -> RemoteTask {
        let category = task
            .project_id
            .as_deref()
            .and_then(|id| self.project_names.get(id))
            .and_then(|name| category_from_project(name));
        RemoteTask {
            id: task.id,
            fields: TodoFields {
                text: strip_attachment_note(&task.content),
                category,
                priority: priority_from_api(task.priority),
                deadline: deadline_from_due(task.due.as_ref()),
            },
            note: attachment_note(&task.content),
        }
    }

    /// Return the project id for a category, creating the project if needed.
    ///
    async fn ensure_project(&mut self, category: Category) -> Result<String, TodoistError> {
        let name = category.as_str();
        if let Some(id) = self.project_ids.get(name) {
            return Ok(id.clone());
        }
        info!("Creating Todoist project {}", name);
        let project: Project = self
            .client
            .post("/projects", &serde_json::json!({ "name": name }))
            .await?;
        self.remember(&project);
        Ok(project.id)
    }

    async fn payload(
        &mut self,
        fields: &TodoFields,
        attachment: Option<&str>,
        clear_missing: bool,
    ) -> Result<TaskPayload, TodoistError> {
        let project_id = match fields.category {
            Some(category) => Some(self.ensure_project(category).await?),
            // An uncategorized task moves back to the inbox.
            None if clear_missing => self.inbox_id.clone(),
            None => None,
        };
        let due_date = fields.deadline.map(|d| d.format("%Y-%m-%d").to_string());
        let due_string = match due_date {
            None if clear_missing => Some("no date".to_string()),
            _ => None,
        };
        Ok(TaskPayload {
            content: with_attachment_note(&fields.text, attachment),
            priority: priority_to_api(fields.priority),
            project_id,
            due_date,
            due_string,
        })
    }

    fn remember(&mut self, project: &Project) {
        if project.is_inbox_project || project.name.eq_ignore_ascii_case("inbox") {
            self.inbox_id = Some(project.id.clone());
        }
        self.project_ids
            .insert(project.name.clone(), project.id.clone());
        self.project_names
            .insert(project.id.clone(), project.name.clone());
    }
}

#[async_trait]
impl RemoteTasks for Todoist {
    async fn prepare(&mut self) -> Result<(), TodoistError> {
        self.projects().await.map(|_| ())
    }

    async fn active_tasks(&mut self) -> Result<Vec<RemoteTask>, TodoistError> {
        let tasks = self.tasks().await?;
        Ok(tasks
            .into_iter()
            .map(|task| self.to_remote_task(task))
            .collect())
    }

    async fn create_task(
        &mut self,
        fields: &TodoFields,
        attachment: Option<&str>,
    ) -> Result<String, TodoistError> {
        let payload = self.payload(fields, attachment, false).await?;
        let created: ApiTask = self.client.post("/tasks", &payload).await?;
        debug!("Created Todoist task {}", created.id);
        Ok(created.id)
    }

    async fn update_task(
        &mut self,
        id: &str,
        fields: &TodoFields,
        attachment: Option<&str>,
    ) -> Result<TodoFields, TodoistError> {
        let payload = self.payload(fields, attachment, true).await?;
        let updated: ApiTask = self
            .client
            .post(&format!("/tasks/{}", id), &payload)
            .await?;
        debug!("Updated Todoist task {}", updated.id);
        Ok(self.to_remote_task(updated).fields)
    }

    async fn close_task(&mut self, id: &str) -> Result<(), TodoistError> {
        self.client
            .post_discarding::<serde_json::Value>(&format!("/tasks/{}/close", id), None)
            .await
    }
}

/// Local priority to API priority (4 is the most urgent).
///
pub fn priority_to_api(priority: Priority) -> u8 {
    match priority {
        Priority::High => 4,
        Priority::Medium => 2,
        Priority::Low => 1,
    }
}

pub fn priority_from_api(priority: u8) -> Priority {
    match priority {
        4 | 3 => Priority::High,
        2 => Priority::Medium,
        1 => Priority::Low,
        _ => Priority::Medium,
    }
}

/// Category for a project name. The inbox and unknown projects have none.
///
pub fn category_from_project(name: &str) -> Option<Category> {
    match name.to_lowercase().as_str() {
        "inbox" => None,
        "work" | "arbejde" => Some(Category::Work),
        "personal" | "privat" => Some(Category::Personal),
        "shopping" | "indkøb" | "groceries" => Some(Category::Shopping),
        _ => Category::ALL.iter().copied().find(|c| c.as_str() == name),
    }
}

/// Only deliberately set due dates count as deadlines; a bare date without
/// a human string, time or recurrence is ignored.
///
pub fn deadline_from_due(due: Option<&Due>) -> Option<NaiveDate> {
    let due = due?;
    if due.string.is_empty() && due.datetime.is_none() && !due.is_recurring {
        return None;
    }
    let date = due.date.get(..10).unwrap_or(&due.date);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn with_attachment_note(text: &str, stored_file: Option<&str>) -> String {
    match stored_file {
        Some(stored) if !text.contains(ATTACHMENT_MARKER) => format!(
            "{} {} {}",
            text,
            ATTACHMENT_MARKER,
            attachment::display_name(stored)
        ),
        _ => text.to_string(),
    }
}

/// File name of the attachment note in `content`, if there is one.
///
pub fn attachment_note(content: &str) -> Option<String> {
    let (_, name) = content.split_once(ATTACHMENT_MARKER)?;
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Remove the attachment note so it does not accumulate across syncs.
///
pub fn strip_attachment_note(content: &str) -> String {
    let pattern = format!(r"\s*{}.*$", regex::escape(ATTACHMENT_MARKER));
    match Regex::new(&pattern) {
        Ok(re) => re.replace(content, "").trim().to_string(),
        Err(e) => {
            warn!("Failed to compile attachment note pattern: {}", e);
            content.trim().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};
    use httpmock::MockServer;
    use serde_json::json;

    fn todoist(server: &MockServer) -> Todoist {
        Todoist::new("token", &server.base_url(), Duration::from_secs(5)).unwrap()
    }

    fn todoist_offline() -> Todoist {
        Todoist::new("token", DEFAULT_API_BASE, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn empty_token_is_not_configured() {
        assert!(matches!(
            Todoist::new("  ", DEFAULT_API_BASE, Duration::from_secs(1)),
            Err(TodoistError::NotConfigured)
        ));
    }

    #[test]
    fn priority_mapping() {
        assert_eq!(priority_to_api(Priority::High), 4);
        assert_eq!(priority_to_api(Priority::Medium), 2);
        assert_eq!(priority_to_api(Priority::Low), 1);
        assert_eq!(priority_from_api(3), Priority::High);
        assert_eq!(priority_from_api(1), Priority::Low);
        assert_eq!(priority_from_api(9), Priority::Medium);
    }

    #[test]
    fn project_names_map_to_categories() {
        assert_eq!(category_from_project("Inbox"), None);
        assert_eq!(category_from_project("Work"), Some(Category::Work));
        assert_eq!(category_from_project("Groceries"), Some(Category::Shopping));
        assert_eq!(category_from_project("Indkøb"), Some(Category::Shopping));
        assert_eq!(category_from_project("Hobby"), None);
    }

    #[test]
    fn only_deliberate_due_dates_become_deadlines() {
        let bare = Due {
            date: "2025-03-01".into(),
            ..Due::default()
        };
        assert_eq!(deadline_from_due(Some(&bare)), None);

        let spoken = Due {
            string: "tomorrow".into(),
            ..bare.clone()
        };
        assert_eq!(
            deadline_from_due(Some(&spoken)),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );

        let recurring = Due {
            is_recurring: true,
            ..bare
        };
        assert!(deadline_from_due(Some(&recurring)).is_some());
        assert_eq!(deadline_from_due(None), None);
    }

    #[test]
    fn attachment_note_is_added_once_and_stripped() {
        let content = with_attachment_note("Rapport", Some("a1b2c3d4_rapport.pdf"));
        assert_eq!(content, "Rapport 📎 Local file: rapport.pdf");
        assert_eq!(with_attachment_note(&content, Some("a1b2c3d4_rapport.pdf")), content);
        assert_eq!(strip_attachment_note(&content), "Rapport");
        assert_eq!(with_attachment_note("Rapport", None), "Rapport");
    }

    #[tokio::test]
    async fn active_tasks_map_projects_to_categories() {
        let work = Project {
            name: "Work".into(),
            ..Faker.fake::<Project>()
        };
        let task_id: String = Faker.fake();

        let server = MockServer::start();
        let projects = server
            .mock_async(|when, then| {
                when.method("GET")
                    .path("/projects")
                    .header("Authorization", "Bearer token");
                then.status(200).json_body(json!([
                    {"id": work.id, "name": work.name},
                    {"id": "inbox-id", "name": "Inbox"}
                ]));
            })
            .await;
        let tasks = server
            .mock_async(|when, then| {
                when.method("GET").path("/tasks");
                then.status(200).json_body(json!([
                    {
                        "id": task_id,
                        "content": "Skriv rapport 📎 Local file: rapport.pdf",
                        "priority": 4,
                        "project_id": work.id,
                        "due": {"date": "2025-01-10", "string": "jan 10", "is_recurring": false}
                    },
                    {"id": 42, "content": "Ring til mor", "priority": 1, "project_id": "inbox-id"}
                ]));
            })
            .await;

        let mut todoist = todoist(&server);
        todoist.prepare().await.unwrap();
        let remote = todoist.active_tasks().await.unwrap();
        projects.assert_async().await;
        tasks.assert_async().await;

        assert_eq!(remote.len(), 2);
        assert_eq!(remote[0].id, task_id);
        assert_eq!(remote[0].fields.text, "Skriv rapport");
        assert_eq!(remote[0].fields.category, Some(Category::Work));
        assert_eq!(remote[0].fields.priority, Priority::High);
        assert_eq!(remote[0].fields.deadline, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(remote[1].id, "42");
        assert_eq!(remote[1].fields.category, None);
        assert_eq!(remote[1].fields.priority, Priority::Low);
    }

    #[tokio::test]
    async fn create_task_creates_missing_project() {
        let server = MockServer::start();
        let project = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/projects")
                    .json_body(json!({"name": "Indkøb"}));
                then.status(200).json_body(json!({"id": "p1", "name": "Indkøb"}));
            })
            .await;
        let task = server
            .mock_async(|when, then| {
                when.method("POST").path("/tasks").json_body(json!({
                    "content": "Mælk",
                    "priority": 2,
                    "project_id": "p1",
                    "due_date": "2025-02-03"
                }));
                then.status(200).json_body(json!({"id": "t9", "content": "Mælk"}));
            })
            .await;

        let mut todoist = todoist(&server);
        let fields = TodoFields::new("Mælk")
            .with_category(Some(Category::Shopping))
            .with_deadline(NaiveDate::from_ymd_opt(2025, 2, 3));
        let id = todoist.create_task(&fields, None).await.unwrap();
        assert_eq!(id, "t9");
        project.assert_async().await;
        task.assert_async().await;

        // the project is cached now
        todoist.create_task(&fields, None).await.unwrap();
        project.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn update_without_deadline_clears_due_date() {
        let server = MockServer::start();
        let mock = server
            .mock_async(|when, then| {
                when.method("POST").path("/tasks/55").json_body(json!({
                    "content": "Opdateret",
                    "priority": 1,
                    "due_string": "no date"
                }));
                then.status(200)
                    .json_body(json!({"id": "55", "content": "Opdateret", "priority": 1}));
            })
            .await;
        let mut todoist = todoist(&server);
        let fields = TodoFields::new("Opdateret").with_priority(Priority::Low);
        let held = todoist.update_task("55", &fields, None).await.unwrap();
        mock.assert_async().await;
        assert_eq!(held, fields);
    }

    #[tokio::test]
    async fn cleared_category_moves_task_to_inbox() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/projects");
            then.status(200).json_body(json!([
                {"id": "w1", "name": "Arbejde"},
                {"id": "in1", "name": "Indbakke", "is_inbox_project": true}
            ]));
        });
        let update = server
            .mock_async(|when, then| {
                when.method("POST").path("/tasks/8").json_body(json!({
                    "content": "Rapport 📎 Local file: rapport.pdf",
                    "priority": 2,
                    "project_id": "in1",
                    "due_string": "no date"
                }));
                then.status(200).json_body(json!({
                    "id": "8",
                    "content": "Rapport 📎 Local file: rapport.pdf",
                    "priority": 2,
                    "project_id": "in1"
                }));
            })
            .await;

        let mut todoist = todoist(&server);
        todoist.prepare().await.unwrap();
        let fields = TodoFields::new("Rapport");
        let held = todoist
            .update_task("8", &fields, Some("a1b2c3d4_rapport.pdf"))
            .await
            .unwrap();
        update.assert_async().await;
        assert_eq!(held, fields);
    }

    #[test]
    fn attachment_note_is_read_back_from_content() {
        let task = ApiTask {
            id: "3".into(),
            content: "Kontrakt 📎 Local file: kontrakt.pdf".into(),
            priority: 1,
            project_id: None,
            due: None,
        };
        let remote = todoist_offline().to_remote_task(task);
        assert_eq!(remote.fields.text, "Kontrakt");
        assert_eq!(remote.note.as_deref(), Some("kontrakt.pdf"));
        assert_eq!(attachment_note("Kontrakt"), None);
        assert_eq!(attachment_note("📎 Local file:  "), None);
    }

    #[tokio::test]
    async fn close_of_missing_task_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("POST").path("/tasks/404/close");
            then.status(404);
        });
        let mut todoist = todoist(&server);
        let err = todoist.close_task("404").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
