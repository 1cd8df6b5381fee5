use crate::gateway::{Confirmed, Gateway, GatewayError, Snapshot};
use crate::state::{NoticeKind, State};
use crate::todo::{TodoFields, TodoId};
use anyhow::Result;
use log::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Specify different network event types.
///
#[derive(Debug)]
pub enum Event {
    Refresh,
    Create { fields: TodoFields },
    Update { id: TodoId, fields: TodoFields },
    Toggle { id: TodoId },
    Delete { id: Confirmed<TodoId> },
    Attach { id: TodoId, path: PathBuf },
    RemoveAttachment { id: Confirmed<TodoId> },
    Sync,
    SyncStatus,
}

/// Specify struct for managing state with network events.
///
pub struct Handler<'a> {
    state: &'a Arc<Mutex<State>>,
    gateway: &'a Gateway,
}

impl<'a> Handler<'a> {
    /// Return new instance with reference to state.
    ///
    pub fn new(state: &'a Arc<Mutex<State>>, gateway: &'a Gateway) -> Self {
        Handler { state, gateway }
    }

    /// Handle network events by type.
    ///
    pub async fn handle(&mut self, event: Event) -> Result<()> {
        debug!("Processing network event '{:?}'...", event);
        match event {
            Event::Refresh => {
                let result = self.gateway.fetch().await;
                self.apply(result, None).await;
            }
            Event::Create { fields } => {
                let result = self.gateway.create(&fields).await;
                self.apply(result, Some("Todo added")).await;
            }
            Event::Update { id, fields } => {
                let result = self.gateway.update(id, &fields).await;
                self.apply(result, Some("Todo saved")).await;
            }
            Event::Toggle { id } => {
                let result = self.gateway.toggle(id).await;
                self.apply(result, None).await;
            }
            Event::Delete { id } => {
                let result = self.gateway.delete(id).await;
                self.apply(result, Some("Todo deleted")).await;
            }
            Event::Attach { id, path } => {
                let result = self.gateway.attach(Some(id), &path).await;
                self.apply(result, Some("File attached")).await;
            }
            Event::RemoveAttachment { id } => {
                let result = self.gateway.remove_attachment(id).await;
                self.apply(result, Some("Attachment removed")).await;
            }
            Event::Sync => {
                let outcome = self.gateway.sync().await;
                let mut state = self.state.lock().await;
                state.finish_sync(outcome);
                state.settle_request();
            }
            Event::SyncStatus => {
                let result = self.gateway.sync_status().await;
                let mut state = self.state.lock().await;
                match result {
                    Ok(status) => {
                        state.set_sync_status(status);
                    }
                    Err(e) => warn!("Could not read sync status: {}", e),
                }
                state.settle_request();
            }
        }
        Ok(())
    }

    /// Apply the refetched todo set, or report the failure.
    ///
    async fn apply(&self, result: Result<Snapshot, GatewayError>, success: Option<&str>) {
        let mut state = self.state.lock().await;
        if state.apply_fetch(result) {
            if let Some(text) = success {
                state.notify(NoticeKind::Success, text);
            }
        }
        state.settle_request();
    }
}
