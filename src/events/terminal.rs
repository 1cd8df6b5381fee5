use crate::config::Keymap;
use crate::state::{InputContext, State};
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event,
    event::{
        Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
};
use log::*;
use std::{sync::mpsc, thread, time::Duration};

/// Specify terminal event poll rate in milliseconds.
///
const TICK_RATE_IN_MS: u64 = 60;

/// Specify different terminal event types.
///
#[derive(Debug)]
pub enum Event {
    Input(KeyEvent),
    Mouse(MouseEvent),
    Tick,
}

/// Specify struct for managing terminal events channel.
///
pub struct Handler {
    rx: mpsc::Receiver<Event>,
    _tx: mpsc::Sender<Event>,
}

impl Default for Handler {
    fn default() -> Self {
        Handler::new()
    }
}

impl Handler {
    /// Return new instance after spawning new input polling thread.
    ///
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let tx_clone = tx.clone();
        thread::spawn(move || {
            let tick_rate = Duration::from_millis(TICK_RATE_IN_MS);
            loop {
                match poll_next(tick_rate) {
                    Ok(Some(event)) => {
                        if tx_clone.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!("Failed to read terminal event: {}", e);
                        break;
                    }
                }
                if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });
        Handler { rx, _tx: tx }
    }

    /// Receive next terminal event and handle it accordingly. Returns result
    /// with value true if should continue or false if exit was requested.
    ///
    pub fn handle_next(&self, state: &mut State, keymap: &Keymap) -> Result<bool> {
        let event = self.rx.recv()?;
        Ok(handle_event(event, state, keymap))
    }
}

fn poll_next(tick_rate: Duration) -> std::io::Result<Option<Event>> {
    if !event::poll(tick_rate)? {
        return Ok(None);
    }
    Ok(match event::read()? {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Some(Event::Input(key)),
        CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
        _ => None,
    })
}

/// Apply one terminal event to the state. Returns false once the
/// application should exit.
///
pub fn handle_event(event: Event, state: &mut State, keymap: &Keymap) -> bool {
    match event {
        Event::Input(key) => handle_key(key, state, keymap),
        Event::Mouse(mouse) => handle_mouse(mouse, state),
        Event::Tick => {
            state
                .advance_spinner_index()
                .set_today(Local::now().date_naive());
        }
    }
    state.is_running()
}

fn handle_key(key: KeyEvent, state: &mut State, keymap: &Keymap) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        debug!("Processing exit terminal event '{:?}'...", key);
        state.quit();
        return;
    }

    let context = state.input_context();
    if let Some(action) = keymap.action_for(&key, context) {
        state.apply(action);
        return;
    }

    // Unbound keys are text input in the modal and the prompts
    if matches!(context, InputContext::Modal | InputContext::Prompt) {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                state.type_char(c);
            }
            KeyCode::Backspace => {
                state.backspace();
            }
            _ => trace!("Ignoring key {:?} in {:?}", key.code, context),
        }
    }
}

fn handle_mouse(mouse: MouseEvent, state: &mut State) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) || state.modal().is_none() {
        return;
    }
    let area = crate::ui::modal_area(state.terminal_size());
    let inside = mouse.column >= area.x
        && mouse.column < area.x + area.width
        && mouse.row >= area.y
        && mouse.row < area.y + area.height;
    if !inside {
        debug!("Click outside the modal at ({}, {})", mouse.column, mouse.row);
        state.close_modal();
    }
}
