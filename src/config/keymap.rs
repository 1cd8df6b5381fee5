//! Key bindings.
//!
//! Each input context has its own map from `Action` to `Hotkey`. The
//! configuration file may override single entries; everything else keeps
//! the default binding.

use crate::state::{Action, InputContext};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Represents a key combination (KeyCode + modifiers).
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Hotkey {
    pub fn plain(code: KeyCode) -> Self {
        Hotkey {
            code,
            modifiers: KeyModifiers::empty(),
        }
    }

    pub fn char(c: char) -> Self {
        Hotkey::plain(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Hotkey {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// Custom serialization for Hotkey.
///
impl Serialize for Hotkey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Hotkey", 3)?;
        state.serialize_field("code", &KeyCodeSerde::from(self.code))?;
        if let KeyCode::Char(c) = self.code {
            state.serialize_field("char", &c)?;
        }
        state.serialize_field("modifiers", &KeyModifiersSerde::from(self.modifiers))?;
        state.end()
    }
}

/// Custom deserialization for Hotkey.
///
impl<'de> Deserialize<'de> for Hotkey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct HotkeyHelper {
            code: KeyCodeSerde,
            #[serde(default)]
            char: Option<char>,
            #[serde(default)]
            modifiers: KeyModifiersSerde,
        }

        let helper = HotkeyHelper::deserialize(deserializer)?;
        let code = match helper.code {
            KeyCodeSerde::Char => match helper.char {
                Some(c) => KeyCode::Char(c),
                None => {
                    return Err(serde::de::Error::custom(
                        "Char key code requires 'char' field",
                    ))
                }
            },
            KeyCodeSerde::Esc => KeyCode::Esc,
            KeyCodeSerde::Enter => KeyCode::Enter,
            KeyCodeSerde::Backspace => KeyCode::Backspace,
            KeyCodeSerde::Tab => KeyCode::Tab,
            KeyCodeSerde::BackTab => KeyCode::BackTab,
            KeyCodeSerde::Delete => KeyCode::Delete,
            KeyCodeSerde::Up => KeyCode::Up,
            KeyCodeSerde::Down => KeyCode::Down,
            KeyCodeSerde::Left => KeyCode::Left,
            KeyCodeSerde::Right => KeyCode::Right,
        };
        Ok(Hotkey {
            code,
            modifiers: helper.modifiers.into(),
        })
    }
}

/// Helper enum for serializing KeyCode.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
enum KeyCodeSerde {
    Char,
    Esc,
    Enter,
    Backspace,
    Tab,
    BackTab,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

impl From<KeyCode> for KeyCodeSerde {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Esc => KeyCodeSerde::Esc,
            KeyCode::Enter => KeyCodeSerde::Enter,
            KeyCode::Backspace => KeyCodeSerde::Backspace,
            KeyCode::Tab => KeyCodeSerde::Tab,
            KeyCode::BackTab => KeyCodeSerde::BackTab,
            KeyCode::Delete => KeyCodeSerde::Delete,
            KeyCode::Up => KeyCodeSerde::Up,
            KeyCode::Down => KeyCodeSerde::Down,
            KeyCode::Left => KeyCodeSerde::Left,
            KeyCode::Right => KeyCodeSerde::Right,
            _ => KeyCodeSerde::Char,
        }
    }
}

/// Helper struct for serializing KeyModifiers.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct KeyModifiersSerde {
    #[serde(default)]
    control: bool,
    #[serde(default)]
    alt: bool,
}

impl From<KeyModifiers> for KeyModifiersSerde {
    fn from(modifiers: KeyModifiers) -> Self {
        KeyModifiersSerde {
            control: modifiers.contains(KeyModifiers::CONTROL),
            alt: modifiers.contains(KeyModifiers::ALT),
        }
    }
}

impl From<KeyModifiersSerde> for KeyModifiers {
    fn from(serde: KeyModifiersSerde) -> Self {
        let mut result = KeyModifiers::empty();
        if serde.control {
            result |= KeyModifiers::CONTROL;
        }
        if serde.alt {
            result |= KeyModifiers::ALT;
        }
        result
    }
}

/// Maps actions to their key bindings per input context.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap {
    #[serde(default)]
    pub list: HashMap<Action, Hotkey>,
    #[serde(default)]
    pub modal: HashMap<Action, Hotkey>,
    #[serde(default)]
    pub prompt: HashMap<Action, Hotkey>,
    #[serde(default)]
    pub confirm: HashMap<Action, Hotkey>,
}

impl Default for Keymap {
    fn default() -> Self {
        default_keymap()
    }
}

impl Keymap {
    /// Return the default keymap with the given entries replacing the
    /// defaults of their actions.
    ///
    pub fn with_overrides(overrides: &Keymap) -> Keymap {
        let mut keymap = Keymap::default();
        for (target, source) in [
            (&mut keymap.list, &overrides.list),
            (&mut keymap.modal, &overrides.modal),
            (&mut keymap.prompt, &overrides.prompt),
            (&mut keymap.confirm, &overrides.confirm),
        ] {
            target.extend(source.iter().map(|(action, hotkey)| (*action, *hotkey)));
        }
        keymap
    }

    pub fn bindings(&self, context: InputContext) -> &HashMap<Action, Hotkey> {
        match context {
            InputContext::List => &self.list,
            InputContext::Modal => &self.modal,
            InputContext::Prompt => &self.prompt,
            InputContext::Confirm => &self.confirm,
        }
    }

    /// Gets the action bound to a KeyEvent in the given context.
    ///
    pub fn action_for(&self, event: &KeyEvent, context: InputContext) -> Option<Action> {
        self.bindings(context)
            .iter()
            .find(|(_, hotkey)| matches_hotkey(event, hotkey))
            .map(|(action, _)| *action)
    }

    /// Builds the footer hint for the given context.
    ///
    pub fn footer_text(&self, context: InputContext) -> String {
        let actions: &[Action] = match context {
            InputContext::List => &[
                Action::Create,
                Action::Edit,
                Action::ToggleDone,
                Action::Delete,
                Action::Attach,
                Action::Search,
                Action::CycleSort,
                Action::Sync,
                Action::Quit,
            ],
            InputContext::Modal => &[
                Action::NextField,
                Action::NextOption,
                Action::Submit,
                Action::Cancel,
            ],
            InputContext::Prompt => &[Action::Submit, Action::Cancel],
            InputContext::Confirm => &[Action::Confirm, Action::Cancel],
        };
        build_footer_text(self.bindings(context), actions)
    }
}

/// Returns the default bindings for every context.
///
pub fn default_keymap() -> Keymap {
    let list = HashMap::from([
        (Action::SelectNext, Hotkey::char('j')),
        (Action::SelectPrevious, Hotkey::char('k')),
        (Action::NextCategory, Hotkey::char('l')),
        (Action::PreviousCategory, Hotkey::char('h')),
        (Action::FilterDone, Hotkey::char('1')),
        (Action::FilterActive, Hotkey::char('2')),
        (Action::FilterOverdue, Hotkey::char('3')),
        (Action::CycleSort, Hotkey::char('s')),
        (Action::Search, Hotkey::char('/')),
        (Action::Create, Hotkey::char('a')),
        (Action::Edit, Hotkey::char('e')),
        (Action::ToggleDone, Hotkey::char(' ')),
        (Action::Delete, Hotkey::char('d')),
        (Action::Attach, Hotkey::char('u')),
        (Action::RemoveAttachment, Hotkey::char('r')),
        (Action::Sync, Hotkey::char('S')),
        (Action::Refresh, Hotkey::char('R')),
        (Action::ToggleLog, Hotkey::char('L')),
        (Action::Cancel, Hotkey::plain(KeyCode::Esc)),
        (Action::Quit, Hotkey::char('q')),
    ]);
    let modal = HashMap::from([
        (Action::NextField, Hotkey::plain(KeyCode::Tab)),
        (Action::PreviousField, Hotkey::plain(KeyCode::BackTab)),
        (Action::NextOption, Hotkey::plain(KeyCode::Right)),
        (Action::PreviousOption, Hotkey::plain(KeyCode::Left)),
        (Action::Submit, Hotkey::plain(KeyCode::Enter)),
        (Action::Cancel, Hotkey::plain(KeyCode::Esc)),
        (Action::CloseModal, Hotkey::ctrl('w')),
    ]);
    let prompt = HashMap::from([
        (Action::Submit, Hotkey::plain(KeyCode::Enter)),
        (Action::Cancel, Hotkey::plain(KeyCode::Esc)),
    ]);
    let confirm = HashMap::from([
        (Action::Confirm, Hotkey::char('y')),
        (Action::Cancel, Hotkey::char('n')),
    ]);
    Keymap {
        list,
        modal,
        prompt,
        confirm,
    }
}

/// Compares a key event with a hotkey. Shift is ignored because terminals
/// report it inconsistently for upper-case characters and back-tab.
///
pub fn matches_hotkey(event: &KeyEvent, hotkey: &Hotkey) -> bool {
    let mut modifiers = event.modifiers;
    modifiers.remove(KeyModifiers::SHIFT);
    event.code == hotkey.code && modifiers == hotkey.modifiers
}

/// Builds a footer text string for the given actions, skipping unbound ones.
///
pub fn build_footer_text(hotkeys: &HashMap<Action, Hotkey>, actions: &[Action]) -> String {
    actions
        .iter()
        .filter_map(|action| {
            hotkeys
                .get(action)
                .map(|hotkey| format!(" {}: {}", format_hotkey_display(hotkey), action.label()))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Formats a hotkey for display in the footer.
///
pub fn format_hotkey_display(hotkey: &Hotkey) -> String {
    let mut parts = Vec::new();
    if hotkey.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl");
    }
    if hotkey.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt");
    }

    let key_str = match &hotkey.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Delete => "Del".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        _ => "Unknown".to_string(),
    };

    if parts.is_empty() {
        key_str
    } else {
        format!("{}+{}", parts.join("+"), key_str)
    }
}
