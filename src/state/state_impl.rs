use super::action::Action;
use super::view::{Confirmation, EditModal, FormTarget, InputContext, Notice, NoticeKind, Prompt};
use crate::app::NetworkEventSender;
use crate::events::network::Event as NetworkEvent;
use crate::filter::{filter_and_sort, CategoryFilter, Query, StatusFilter};
use crate::gateway::{FetchTicket, GatewayError, Pending, Snapshot, SyncOutcome};
use crate::logger::LogBuffer;
use crate::sync::SyncStatus;
use crate::todo::{Todo, TodoId};
use crate::ui::SPINNER_FRAME_COUNT;
use chrono::{Local, NaiveDate};
use log::*;
use ratatui::layout::Rect;
use std::path::PathBuf;

/// Houses data representative of application state.
///
pub struct State {
    net_sender: Option<NetworkEventSender>,
    todos: Vec<Todo>,
    selected: Option<TodoId>,
    query: Query,
    modal: Option<EditModal>,
    prompt: Option<Prompt>,
    confirmation: Option<Confirmation>,
    notice: Option<Notice>,
    sync_in_progress: bool,
    sync_configured: Option<bool>,
    last_sync: Option<String>,
    last_applied: Option<FetchTicket>,
    in_flight: usize,
    show_log: bool,
    log_buffer: Option<LogBuffer>,
    today: NaiveDate,
    terminal_size: Rect,
    spinner_index: usize,
    running: bool,
}

/// Defines default application state.
///
impl Default for State {
    fn default() -> State {
        State {
            net_sender: None,
            todos: vec![],
            selected: None,
            query: Query::default(),
            modal: None,
            prompt: None,
            confirmation: None,
            notice: None,
            sync_in_progress: false,
            sync_configured: None,
            last_sync: None,
            last_applied: None,
            in_flight: 0,
            show_log: false,
            log_buffer: None,
            today: Local::now().date_naive(),
            terminal_size: Rect::default(),
            spinner_index: 0,
            running: true,
        }
    }
}

impl State {
    /// Return new state wired to the network thread and the log panel.
    ///
    pub fn new(net_sender: NetworkEventSender, log_buffer: LogBuffer) -> Self {
        State {
            net_sender: Some(net_sender),
            log_buffer: Some(log_buffer),
            ..State::default()
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn selected(&self) -> Option<TodoId> {
        self.selected
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.selected
            .and_then(|id| self.todos.iter().find(|todo| todo.id == id))
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn modal(&self) -> Option<&EditModal> {
        self.modal.as_ref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_sync_in_progress(&self) -> bool {
        self.sync_in_progress
    }

    /// Whether the backend reported Todoist credentials; `None` until the
    /// first status answer arrives.
    ///
    pub fn sync_configured(&self) -> Option<bool> {
        self.sync_configured
    }

    pub fn last_sync(&self) -> Option<&str> {
        self.last_sync.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn show_log(&self) -> bool {
        self.show_log
    }

    pub fn log_lines(&self, limit: usize) -> Vec<String> {
        self.log_buffer
            .as_ref()
            .map(|buffer| buffer.tail(limit))
            .unwrap_or_default()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) -> &mut Self {
        if self.today != today {
            self.today = today;
            self.ensure_selection_visible();
        }
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the application from any input context.
    ///
    pub fn quit(&mut self) -> &mut Self {
        self.running = false;
        self
    }

    /// Return the todos passing the active query, in display order.
    ///
    pub fn visible_todos(&self) -> Vec<Todo> {
        filter_and_sort(&self.todos, &self.query, self.today)
    }

    /// Which key bindings apply right now. Confirmations take precedence
    /// over prompts, prompts over the modal.
    ///
    pub fn input_context(&self) -> InputContext {
        if self.confirmation.is_some() {
            InputContext::Confirm
        } else if self.prompt.is_some() {
            InputContext::Prompt
        } else if self.modal.is_some() {
            InputContext::Modal
        } else {
            InputContext::List
        }
    }

    /// Apply a named action. This is the only entry point for user-driven
    /// transitions.
    ///
    pub fn apply(&mut self, action: Action) -> &mut Self {
        debug!("Applying action '{}' in {:?}", action.label(), self.input_context());
        match (self.input_context(), action) {
            (InputContext::Confirm, Action::Confirm) => self.confirm(),
            (InputContext::Confirm, Action::Cancel) => {
                self.confirmation = None;
            }
            (InputContext::Prompt, Action::Submit) => self.submit_prompt(),
            (InputContext::Prompt, Action::Cancel) => self.cancel_prompt(),
            (InputContext::Modal, Action::Submit) => self.submit_modal(),
            (InputContext::Modal, Action::Cancel) | (InputContext::Modal, Action::CloseModal) => {
                self.close_modal();
            }
            (InputContext::Modal, Action::NextField) => self.with_form(|form| form.focus_next()),
            (InputContext::Modal, Action::PreviousField) => {
                self.with_form(|form| form.focus_previous())
            }
            (InputContext::Modal, Action::NextOption) => {
                self.with_form(|form| form.cycle_option(true))
            }
            (InputContext::Modal, Action::PreviousOption) => {
                self.with_form(|form| form.cycle_option(false))
            }
            (InputContext::List, action) => self.apply_list(action),
            (context, action) => {
                debug!("Ignoring action '{}' in {:?}", action.label(), context);
            }
        }
        self
    }

    fn apply_list(&mut self, action: Action) {
        match action {
            Action::SelectNext => self.move_selection(1),
            Action::SelectPrevious => self.move_selection(-1),
            Action::NextCategory => {
                self.query.category = self.query.category.next();
                self.ensure_selection_visible();
            }
            Action::PreviousCategory => {
                self.query.category = self.query.category.previous();
                self.ensure_selection_visible();
            }
            Action::FilterDone => self.toggle_status(StatusFilter::Done),
            Action::FilterActive => self.toggle_status(StatusFilter::Active),
            Action::FilterOverdue => self.toggle_status(StatusFilter::Overdue),
            Action::CycleSort => {
                self.query.sort = self.query.sort.next();
            }
            Action::Search => {
                self.prompt = Some(Prompt::Search {
                    previous: self.query.search.clone(),
                });
            }
            Action::Create => {
                self.modal = Some(EditModal::new_todo());
            }
            Action::Edit => match self.selected_todo() {
                Some(todo) => self.modal = Some(EditModal::edit(todo)),
                None => self.notify(NoticeKind::Warning, "Select a todo first"),
            },
            Action::ToggleDone => match self.selected {
                Some(id) => self.dispatch(NetworkEvent::Toggle { id }),
                None => self.notify(NoticeKind::Warning, "Select a todo first"),
            },
            Action::Delete => match self.selected {
                Some(id) => self.confirmation = Some(Confirmation::DeleteTodo(id)),
                None => self.notify(NoticeKind::Warning, "Select a todo first"),
            },
            Action::Attach => match self.selected {
                Some(id) => {
                    self.prompt = Some(Prompt::AttachPath {
                        id,
                        path: String::new(),
                    })
                }
                None => self.notify(NoticeKind::Warning, "Select a todo first"),
            },
            Action::RemoveAttachment => match self.selected_todo() {
                Some(todo) if todo.attachment.is_some() => {
                    self.confirmation = Some(Confirmation::RemoveAttachment(todo.id))
                }
                Some(_) => self.notify(NoticeKind::Warning, "The todo has no attachment"),
                None => self.notify(NoticeKind::Warning, "Select a todo first"),
            },
            Action::Sync => {
                self.request_sync();
            }
            Action::Refresh => self.dispatch(NetworkEvent::Refresh),
            Action::ToggleLog => {
                self.show_log = !self.show_log;
            }
            Action::Quit => {
                self.running = false;
            }
            Action::Cancel => {
                if self.query.search.is_empty() {
                    self.notice = None;
                } else {
                    self.query.search.clear();
                    self.ensure_selection_visible();
                }
            }
            other => debug!("Ignoring action '{}' in list", other.label()),
        }
    }

    /// Type a character into the open prompt or the focused modal field.
    ///
    pub fn type_char(&mut self, c: char) -> &mut Self {
        match &mut self.prompt {
            Some(Prompt::Search { .. }) => {
                self.query.search.push(c);
                self.ensure_selection_visible();
            }
            Some(Prompt::AttachPath { path, .. }) => path.push(c),
            None => self.with_form(|form| form.input(c)),
        }
        self
    }

    pub fn backspace(&mut self) -> &mut Self {
        match &mut self.prompt {
            Some(Prompt::Search { .. }) => {
                self.query.search.pop();
                self.ensure_selection_visible();
            }
            Some(Prompt::AttachPath { path, .. }) => {
                path.pop();
            }
            None => self.with_form(|form| form.backspace()),
        }
        self
    }

    /// Select the todo directly, e.g. from a mouse click on its row.
    ///
    pub fn select(&mut self, id: Option<TodoId>) -> &mut Self {
        self.selected = id.filter(|id| self.todos.iter().any(|todo| todo.id == *id));
        self
    }

    /// Close the edit modal. Every way of leaving the modal ends here.
    ///
    pub fn close_modal(&mut self) -> &mut Self {
        if self.modal.take().is_some() {
            debug!("Closed edit modal");
        }
        self
    }

    fn with_form(&mut self, f: impl FnOnce(&mut super::form::TodoForm)) {
        if let Some(modal) = self.modal.as_mut() {
            f(&mut modal.form);
        }
    }

    fn submit_modal(&mut self) {
        let Some(modal) = &self.modal else {
            return;
        };
        let target = modal.target;
        match modal.form.to_fields() {
            Err(e) => self.notify(NoticeKind::Error, e.to_string()),
            Ok(fields) => {
                self.close_modal();
                match target {
                    FormTarget::New => self.dispatch(NetworkEvent::Create { fields }),
                    FormTarget::Existing(id) => self.dispatch(NetworkEvent::Update { id, fields }),
                }
            }
        }
    }

    fn submit_prompt(&mut self) {
        match self.prompt.take() {
            Some(Prompt::AttachPath { id, path }) => {
                let path = path.trim();
                if path.is_empty() {
                    self.notify(NoticeKind::Warning, "No file given");
                } else {
                    self.notify(NoticeKind::Info, "Uploading...");
                    self.dispatch(NetworkEvent::Attach {
                        id,
                        path: PathBuf::from(path),
                    });
                }
            }
            Some(Prompt::Search { .. }) | None => {}
        }
    }

    fn cancel_prompt(&mut self) {
        if let Some(Prompt::Search { previous }) = self.prompt.take() {
            self.query.search = previous;
            self.ensure_selection_visible();
        }
    }

    fn confirm(&mut self) {
        match self.confirmation.take() {
            Some(Confirmation::DeleteTodo(id)) => self.dispatch(NetworkEvent::Delete {
                id: Pending::new(id).acknowledge(),
            }),
            Some(Confirmation::RemoveAttachment(id)) => {
                self.dispatch(NetworkEvent::RemoveAttachment {
                    id: Pending::new(id).acknowledge(),
                })
            }
            None => {}
        }
    }

    /// Selecting the active status filter again resets it to all.
    ///
    fn toggle_status(&mut self, status: StatusFilter) {
        self.query.status = if self.query.status == status {
            StatusFilter::All
        } else {
            status
        };
        self.ensure_selection_visible();
    }

    pub fn set_category(&mut self, category: CategoryFilter) -> &mut Self {
        self.query.category = category;
        self.ensure_selection_visible();
        self
    }

    fn move_selection(&mut self, step: isize) {
        let visible = self.visible_todos();
        if visible.is_empty() {
            self.selected = None;
            return;
        }
        let position = self
            .selected
            .and_then(|id| visible.iter().position(|todo| todo.id == id));
        let index = match position {
            None => 0,
            Some(index) => {
                let last = visible.len() as isize - 1;
                (index as isize + step).clamp(0, last) as usize
            }
        };
        self.selected = Some(visible[index].id);
    }

    /// A selection hidden by the query moves to the first visible todo.
    fn ensure_selection_visible(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        let visible = self.visible_todos();
        if !visible.iter().any(|todo| todo.id == id) {
            self.selected = visible.first().map(|todo| todo.id);
        }
    }

    /// Apply a refetched todo set. Returns true when the snapshot was
    /// applied; stale snapshots and failures leave the todo set untouched.
    ///
    pub fn apply_fetch(&mut self, result: Result<Snapshot, GatewayError>) -> bool {
        match result {
            Err(e) => {
                warn!("Request failed: {}", e);
                self.notify(NoticeKind::Error, e.user_message());
                false
            }
            Ok(snapshot) => {
                if self.last_applied.map_or(false, |last| snapshot.ticket < last) {
                    debug!("Dropping stale fetch {:?}", snapshot.ticket);
                    return false;
                }
                self.last_applied = Some(snapshot.ticket);
                self.set_todos(snapshot.todos);
                true
            }
        }
    }

    /// Replace the todo set and drop references to todos that vanished.
    ///
    fn set_todos(&mut self, todos: Vec<Todo>) {
        self.todos = todos;
        let exists = |id: TodoId, todos: &[Todo]| todos.iter().any(|todo| todo.id == id);
        if let Some(id) = self.selected {
            if !exists(id, &self.todos) {
                self.selected = None;
            }
        }
        if let Some(FormTarget::Existing(id)) = self.modal.as_ref().map(|modal| modal.target) {
            if !exists(id, &self.todos) {
                self.close_modal();
            }
        }
        if let Some(confirmation) = self.confirmation {
            if !exists(confirmation.todo_id(), &self.todos) {
                self.confirmation = None;
            }
        }
        if let Some(Prompt::AttachPath { id, .. }) = self.prompt {
            if !exists(id, &self.todos) {
                self.prompt = None;
            }
        }
    }

    /// Start a sync unless one is already running.
    ///
    pub fn request_sync(&mut self) -> &mut Self {
        if self.sync_in_progress {
            debug!("Sync already in progress");
            return self;
        }
        self.sync_in_progress = true;
        self.notify(NoticeKind::Info, "Syncing with Todoist...");
        self.dispatch(NetworkEvent::Sync);
        self
    }

    /// Record the end of a sync and its notice.
    ///
    pub fn finish_sync(&mut self, outcome: SyncOutcome) -> &mut Self {
        match outcome {
            SyncOutcome::Skipped => {
                debug!("Sync request skipped");
                return self;
            }
            SyncOutcome::Finished { report, snapshot } => {
                self.sync_in_progress = false;
                let refetched = snapshot.is_ok();
                self.apply_fetch(snapshot);
                let mut text = format!("Sync OK: {}", report.summary());
                if !report.errors.is_empty() {
                    text.push_str(&format!(" ({} errors)", report.errors.len()));
                }
                for error in &report.errors {
                    warn!("Sync error: {}", error);
                }
                if refetched {
                    let kind = if report.is_partial() {
                        NoticeKind::Warning
                    } else {
                        NoticeKind::Success
                    };
                    self.notify(kind, text);
                }
                self.dispatch(NetworkEvent::SyncStatus);
            }
            SyncOutcome::Failed(e) => {
                self.sync_in_progress = false;
                self.notify(NoticeKind::Error, format!("Sync failed: {}", e.user_message()));
                self.dispatch(NetworkEvent::SyncStatus);
            }
        }
        self
    }

    pub fn set_sync_status(&mut self, status: SyncStatus) -> &mut Self {
        self.sync_configured = Some(status.configured);
        self.last_sync = status.last_sync;
        self
    }

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice::new(kind, text));
    }

    /// Mark one dispatched network event as handled.
    ///
    pub fn settle_request(&mut self) -> &mut Self {
        self.in_flight = self.in_flight.saturating_sub(1);
        self
    }

    /// Update the current terminal size.
    ///
    pub fn set_terminal_size(&mut self, size: Rect) -> &mut Self {
        self.terminal_size = size;
        self
    }

    pub fn terminal_size(&self) -> Rect {
        self.terminal_size
    }

    /// Advance the spinner index.
    ///
    pub fn advance_spinner_index(&mut self) -> &mut Self {
        self.spinner_index += 1;
        if self.spinner_index >= SPINNER_FRAME_COUNT {
            self.spinner_index = 0;
        }
        self
    }

    /// Return the current spinner index.
    ///
    pub fn spinner_index(&self) -> usize {
        self.spinner_index
    }

    /// Dispatch an event to the network thread.
    ///
    pub fn dispatch(&mut self, event: NetworkEvent) {
        if let Some(net_sender) = &self.net_sender {
            match net_sender.send(event) {
                Ok(()) => self.in_flight += 1,
                Err(err) => error!("Recieved error from network dispatch: {}", err),
            }
        }
    }
}
