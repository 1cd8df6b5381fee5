//! Command line surface.
//!
//! Without a subcommand the terminal UI starts. Every headless subcommand
//! goes through the same `Gateway` the UI uses and prints a plain-text
//! result.

use crate::filter::{filter_and_sort, is_overdue, CategoryFilter, Query, SortMode, StatusFilter};
use crate::gateway::{Gateway, Pending, SyncOutcome};
use crate::todo::{parse_deadline, Category, Priority, Todo, TodoFields, TodoId};
use crate::ui::projection::format_date;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::*;
use std::io::Write;
use std::path::PathBuf;

/// Build the argument parser.
///
pub fn build_cli() -> App<'static, 'static> {
    let id = || {
        Arg::with_name("id")
            .help("Id of the todo")
            .required(true)
            .index(1)
    };
    let yes = || {
        Arg::with_name("yes")
            .long("yes")
            .short("y")
            .help("Confirm the destructive request")
    };
    let field_args = || {
        vec![
            Arg::with_name("category")
                .long("category")
                .takes_value(true)
                .help("Arbejde, Privat, Indkøb or none"),
            Arg::with_name("priority")
                .long("priority")
                .takes_value(true)
                .help("Høj, Medium or Lav"),
            Arg::with_name("deadline")
                .long("deadline")
                .takes_value(true)
                .help("Deadline as YYYY-MM-DD, or none"),
        ]
    };

    App::new("todo-tui")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .setting(AppSettings::VersionlessSubcommands)
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("DIR")
                .takes_value(true)
                .global(true)
                .help("Directory holding config.yml"),
        )
        .arg(
            Arg::with_name("api")
                .long("api")
                .value_name("URL")
                .takes_value(true)
                .global(true)
                .conflicts_with("local")
                .help("Base URL of a todo backend"),
        )
        .arg(
            Arg::with_name("local")
                .long("local")
                .value_name("DIR")
                .takes_value(true)
                .global(true)
                .help("Run standalone on the given data directory"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Increase log verbosity"),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("List todos")
                .arg(
                    Arg::with_name("category")
                        .long("category")
                        .takes_value(true)
                        .help("Alle, Arbejde, Privat or Indkøb"),
                )
                .arg(
                    Arg::with_name("status")
                        .long("status")
                        .takes_value(true)
                        .help("all, done, active or overdue"),
                )
                .arg(
                    Arg::with_name("search")
                        .long("search")
                        .takes_value(true)
                        .help("Case-insensitive text filter"),
                )
                .arg(
                    Arg::with_name("sort")
                        .long("sort")
                        .takes_value(true)
                        .help("newest, oldest, priority or alpha"),
                ),
        )
        .subcommand(
            SubCommand::with_name("add")
                .about("Add a todo")
                .arg(Arg::with_name("text").required(true).index(1))
                .args(&field_args()),
        )
        .subcommand(
            SubCommand::with_name("edit")
                .about("Change fields of a todo")
                .arg(id())
                .arg(Arg::with_name("text").long("text").takes_value(true))
                .args(&field_args()),
        )
        .subcommand(
            SubCommand::with_name("toggle")
                .about("Complete or reopen a todo")
                .arg(id()),
        )
        .subcommand(
            SubCommand::with_name("delete")
                .about("Delete a todo")
                .arg(id())
                .arg(yes()),
        )
        .subcommand(
            SubCommand::with_name("attach")
                .about("Attach a file to a todo")
                .arg(id())
                .arg(Arg::with_name("path").required(true).index(2)),
        )
        .subcommand(
            SubCommand::with_name("detach")
                .about("Remove the attachment of a todo")
                .arg(id())
                .arg(yes()),
        )
        .subcommand(SubCommand::with_name("sync").about("Synchronize with Todoist"))
        .subcommand(SubCommand::with_name("status").about("Show the Todoist sync status"))
        .subcommand(
            SubCommand::with_name("token")
                .about("Store the Todoist API token in config.yml")
                .arg(
                    Arg::with_name("token")
                        .required(true)
                        .index(1)
                        .help("API token, or an empty string to remove it"),
                ),
        )
}

/// Optional field changes given on the command line.
///
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldChanges {
    pub text: Option<String>,
    pub category: Option<Option<Category>>,
    pub priority: Option<Priority>,
    pub deadline: Option<Option<NaiveDate>>,
}

impl FieldChanges {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let category = match matches.value_of("category") {
            Some(value) if is_none(value) => Some(None),
            Some(value) => Some(Some(value.parse::<Category>().map_err(|e| anyhow!(e))?)),
            None => None,
        };
        let deadline = match matches.value_of("deadline") {
            Some(value) if is_none(value) => Some(None),
            Some(value) => Some(parse_deadline(value)?),
            None => None,
        };
        Ok(FieldChanges {
            text: matches.value_of("text").map(str::to_string),
            category,
            priority: matches
                .value_of("priority")
                .map(|value| value.parse::<Priority>().map_err(|e| anyhow!(e)))
                .transpose()?,
            deadline,
        })
    }

    /// Apply the changes on top of existing fields.
    ///
    pub fn apply_to(&self, mut fields: TodoFields) -> TodoFields {
        if let Some(text) = &self.text {
            fields.text = text.clone();
        }
        if let Some(category) = self.category {
            fields.category = category;
        }
        if let Some(priority) = self.priority {
            fields.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            fields.deadline = deadline;
        }
        fields
    }
}

fn is_none(value: &str) -> bool {
    value.trim().is_empty() || value.trim().eq_ignore_ascii_case("none")
}

/// Specify the headless commands.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Query),
    Add(FieldChanges),
    Edit { id: TodoId, changes: FieldChanges },
    Toggle { id: TodoId },
    Delete { id: TodoId, confirmed: bool },
    Attach { id: TodoId, path: PathBuf },
    Detach { id: TodoId, confirmed: bool },
    Sync,
    Status,
}

impl Command {
    /// Return the requested headless command, or `None` for the UI.
    ///
    pub fn from_matches(matches: &ArgMatches) -> Result<Option<Command>> {
        let command = match matches.subcommand() {
            ("list", Some(sub)) => {
                let mut query = Query::default();
                if let Some(value) = sub.value_of("category") {
                    query.category = value.parse::<CategoryFilter>().map_err(|e| anyhow!(e))?;
                }
                if let Some(value) = sub.value_of("status") {
                    query.status = value.parse::<StatusFilter>().map_err(|e| anyhow!(e))?;
                }
                if let Some(value) = sub.value_of("sort") {
                    query.sort = value.parse::<SortMode>().map_err(|e| anyhow!(e))?;
                }
                query.search = sub.value_of("search").unwrap_or_default().to_string();
                Command::List(query)
            }
            ("add", Some(sub)) => Command::Add(FieldChanges::from_matches(sub)?),
            ("edit", Some(sub)) => Command::Edit {
                id: parse_id(sub)?,
                changes: FieldChanges::from_matches(sub)?,
            },
            ("toggle", Some(sub)) => Command::Toggle { id: parse_id(sub)? },
            ("delete", Some(sub)) => Command::Delete {
                id: parse_id(sub)?,
                confirmed: sub.is_present("yes"),
            },
            ("attach", Some(sub)) => Command::Attach {
                id: parse_id(sub)?,
                path: PathBuf::from(sub.value_of("path").unwrap_or_default()),
            },
            ("detach", Some(sub)) => Command::Detach {
                id: parse_id(sub)?,
                confirmed: sub.is_present("yes"),
            },
            ("sync", _) => Command::Sync,
            ("status", _) => Command::Status,
            _ => return Ok(None),
        };
        Ok(Some(command))
    }

    /// Run the command through the gateway and print the result to `out`.
    ///
    pub async fn execute(self, gateway: &Gateway, out: &mut dyn Write) -> Result<()> {
        debug!("Executing headless command {:?}", self);
        let today = Local::now().date_naive();
        match self {
            Command::List(query) => {
                let snapshot = gateway.fetch().await?;
                let visible = filter_and_sort(&snapshot.todos, &query, today);
                if visible.is_empty() {
                    writeln!(out, "No todos found")?;
                }
                for todo in &visible {
                    writeln!(out, "{}", format_line(todo, today))?;
                }
            }
            Command::Add(changes) => {
                let fields = changes.apply_to(TodoFields::new(""));
                let before = gateway.fetch().await?;
                let snapshot = gateway.create(&fields).await?;
                let created = snapshot
                    .todos
                    .iter()
                    .filter(|todo| !before.todos.iter().any(|old| old.id == todo.id))
                    .max_by_key(|todo| todo.id);
                match created {
                    Some(todo) => writeln!(out, "Added {}", format_line(todo, today))?,
                    None => writeln!(out, "Todo added")?,
                }
            }
            Command::Edit { id, changes } => {
                let current = find(&gateway.fetch().await?.todos, id)?.fields();
                let snapshot = gateway.update(id, &changes.apply_to(current)).await?;
                writeln!(out, "Saved {}", format_line(find(&snapshot.todos, id)?, today))?;
            }
            Command::Toggle { id } => {
                let snapshot = gateway.toggle(id).await?;
                writeln!(out, "{}", format_line(find(&snapshot.todos, id)?, today))?;
            }
            Command::Delete { id, confirmed } => {
                let pending = Pending::new(id);
                if !confirmed {
                    bail!("Refusing to delete todo {} without --yes", pending.get());
                }
                gateway.delete(pending.acknowledge()).await?;
                writeln!(out, "Deleted todo {}", id)?;
            }
            Command::Attach { id, path } => {
                let snapshot = gateway.attach(Some(id), &path).await?;
                writeln!(out, "{}", format_line(find(&snapshot.todos, id)?, today))?;
            }
            Command::Detach { id, confirmed } => {
                let pending = Pending::new(id);
                if !confirmed {
                    bail!(
                        "Refusing to remove the attachment of todo {} without --yes",
                        pending.get()
                    );
                }
                gateway.remove_attachment(pending.acknowledge()).await?;
                writeln!(out, "Attachment removed from todo {}", id)?;
            }
            Command::Sync => match gateway.sync().await {
                SyncOutcome::Skipped => writeln!(out, "A sync is already running")?,
                SyncOutcome::Finished { report, .. } => {
                    writeln!(out, "Sync OK: {}", report.summary())?;
                    for error in &report.errors {
                        writeln!(out, "  error: {}", error)?;
                    }
                }
                SyncOutcome::Failed(e) => bail!("Sync failed: {}", e.user_message()),
            },
            Command::Status => {
                let status = gateway.sync_status().await?;
                if !status.configured {
                    writeln!(out, "Todoist: not configured")?;
                } else {
                    let last = status.last_sync.unwrap_or_else(|| "never".to_string());
                    writeln!(out, "Todoist: configured, last sync {}", last)?;
                }
            }
        }
        Ok(())
    }
}

fn parse_id(matches: &ArgMatches) -> Result<TodoId> {
    let value = matches.value_of("id").unwrap_or_default();
    value
        .parse()
        .with_context(|| format!("'{}' is not a todo id", value))
}

fn find(todos: &[Todo], id: TodoId) -> Result<&Todo> {
    todos
        .iter()
        .find(|todo| todo.id == id)
        .ok_or_else(|| anyhow!("Todo {} no longer exists", id))
}

/// One line per todo: checkbox, id, text and the set fields.
///
pub fn format_line(todo: &Todo, today: NaiveDate) -> String {
    let mut details = vec![todo.priority.to_string()];
    if let Some(category) = todo.category {
        details.push(category.to_string());
    }
    if let Some(deadline) = todo.deadline {
        details.push(format_date(deadline));
    }
    if is_overdue(todo, today) {
        details.push("overdue!".to_string());
    }
    if todo.attachment.is_some() {
        details.push("📎".to_string());
    }
    format!(
        "[{}] {:>4}  {}  ({})",
        if todo.done { "x" } else { " " },
        todo.id,
        todo.text,
        details.join(", ")
    )
}
