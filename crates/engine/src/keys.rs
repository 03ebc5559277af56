//! Keyboard dispatch.
//!
//! A key event is looked up in one of five tables. The table is picked by
//! mode first, then by modifiers: edit mode, shift+meta, shift, meta, base.
//! A key with no handler returns `None` so the embedder can let the
//! platform default run.

use std::fmt;

use rustc_hash::FxHashMap;

use gridstate_config::Keybinding;
use gridstate_core::Field;

use crate::actions;
use crate::cell::CellBase;
use crate::state::{Mode, State, StatePatch};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Tab,
    Enter,
    Backspace,
    Escape,
    Char(char),
    Other(String),
}

impl Key {
    /// Parse a key name, case-insensitively. Single characters become
    /// [`Key::Char`], unknown names [`Key::Other`].
    pub fn parse(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            "tab" => Key::Tab,
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "escape" | "esc" => Key::Escape,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => Key::Other(lower),
                }
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::ArrowUp => f.write_str("ArrowUp"),
            Key::ArrowDown => f.write_str("ArrowDown"),
            Key::ArrowLeft => f.write_str("ArrowLeft"),
            Key::ArrowRight => f.write_str("ArrowRight"),
            Key::Tab => f.write_str("Tab"),
            Key::Enter => f.write_str("Enter"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Escape => f.write_str("Escape"),
            Key::Char(c) => write!(f, "{}", c),
            Key::Other(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            meta: false,
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Go { row: isize, column: isize },
    ModifyEdge { field: Field, delta: isize },
    Edit,
    View,
    Clear,
    Blur,
}

impl KeyCommand {
    pub fn apply<C: CellBase>(self, state: &State<C>) -> Option<StatePatch<C>> {
        match self {
            KeyCommand::Go { row, column } => actions::go(state, row, column),
            KeyCommand::ModifyEdge { field, delta } => actions::modify_edge(state, field, delta),
            KeyCommand::Edit => actions::edit(state),
            KeyCommand::View => actions::view(state),
            KeyCommand::Clear => actions::clear(state),
            KeyCommand::Blur => actions::blur(state),
        }
    }

    /// Look up a command by its keybindings.json id.
    pub fn from_id(id: &str) -> Option<Self> {
        let command = match id {
            "cell.moveUp" => KeyCommand::Go { row: -1, column: 0 },
            "cell.moveDown" => KeyCommand::Go { row: 1, column: 0 },
            "cell.moveLeft" => KeyCommand::Go { row: 0, column: -1 },
            "cell.moveRight" => KeyCommand::Go { row: 0, column: 1 },
            "cell.edit" => KeyCommand::Edit,
            "cell.view" => KeyCommand::View,
            "cell.clear" => KeyCommand::Clear,
            "cell.blur" => KeyCommand::Blur,
            "selection.extendUp" => KeyCommand::ModifyEdge { field: Field::Row, delta: -1 },
            "selection.extendDown" => KeyCommand::ModifyEdge { field: Field::Row, delta: 1 },
            "selection.extendLeft" => KeyCommand::ModifyEdge { field: Field::Column, delta: -1 },
            "selection.extendRight" => KeyCommand::ModifyEdge { field: Field::Column, delta: 1 },
            _ => return None,
        };
        Some(command)
    }

    /// The keybindings.json id, for the unit moves and edges that have one.
    pub fn id(&self) -> Option<&'static str> {
        let id = match *self {
            KeyCommand::Go { row: -1, column: 0 } => "cell.moveUp",
            KeyCommand::Go { row: 1, column: 0 } => "cell.moveDown",
            KeyCommand::Go { row: 0, column: -1 } => "cell.moveLeft",
            KeyCommand::Go { row: 0, column: 1 } => "cell.moveRight",
            KeyCommand::Go { .. } => return None,
            KeyCommand::Edit => "cell.edit",
            KeyCommand::View => "cell.view",
            KeyCommand::Clear => "cell.clear",
            KeyCommand::Blur => "cell.blur",
            KeyCommand::ModifyEdge { field: Field::Row, delta: -1 } => "selection.extendUp",
            KeyCommand::ModifyEdge { field: Field::Row, delta: 1 } => "selection.extendDown",
            KeyCommand::ModifyEdge { field: Field::Column, delta: -1 } => "selection.extendLeft",
            KeyCommand::ModifyEdge { field: Field::Column, delta: 1 } => "selection.extendRight",
            KeyCommand::ModifyEdge { .. } => return None,
        };
        Some(id)
    }
}

impl fmt::Display for KeyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.id(), self) {
            (Some(id), _) => f.write_str(id),
            (None, KeyCommand::Go { row, column }) => write!(f, "go({}, {})", row, column),
            (None, KeyCommand::ModifyEdge { field, delta }) => {
                write!(f, "modifyEdge({:?}, {})", field, delta)
            }
            (None, other) => write!(f, "{:?}", other),
        }
    }
}

/// Which table a key event is resolved in, in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyContext {
    Editing,
    ShiftMeta,
    Shift,
    Meta,
    Base,
}

impl KeyContext {
    pub fn for_event(mode: Mode, event: &KeyEvent) -> Self {
        if mode.is_editing() {
            KeyContext::Editing
        } else if event.shift && event.meta {
            KeyContext::ShiftMeta
        } else if event.shift {
            KeyContext::Shift
        } else if event.meta {
            KeyContext::Meta
        } else {
            KeyContext::Base
        }
    }

    /// Prefix a normalized keybinding string carries for this context.
    fn prefix(self) -> &'static str {
        match self {
            KeyContext::Editing | KeyContext::Base => "",
            KeyContext::ShiftMeta => "meta+shift+",
            KeyContext::Shift => "shift+",
            KeyContext::Meta => "meta+",
        }
    }
}

impl fmt::Display for KeyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyContext::Editing => "editing",
            KeyContext::ShiftMeta => "shift+meta",
            KeyContext::Shift => "shift",
            KeyContext::Meta => "meta",
            KeyContext::Base => "base",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Keymap {
    editing: FxHashMap<Key, KeyCommand>,
    shift_meta: FxHashMap<Key, KeyCommand>,
    shift: FxHashMap<Key, KeyCommand>,
    meta: FxHashMap<Key, KeyCommand>,
    base: FxHashMap<Key, KeyCommand>,
}

impl Default for Keymap {
    fn default() -> Self {
        let go = |row, column| KeyCommand::Go { row, column };
        let edge = |field, delta| KeyCommand::ModifyEdge { field, delta };

        let base: FxHashMap<Key, KeyCommand> = [
            (Key::ArrowUp, go(-1, 0)),
            (Key::ArrowDown, go(1, 0)),
            (Key::ArrowLeft, go(0, -1)),
            (Key::ArrowRight, go(0, 1)),
            (Key::Tab, go(0, 1)),
            (Key::Enter, KeyCommand::Edit),
            (Key::Backspace, KeyCommand::Clear),
            (Key::Escape, KeyCommand::Blur),
        ]
        .into_iter()
        .collect();

        let editing = [
            (Key::Escape, KeyCommand::View),
            (Key::Tab, go(0, 1)),
            (Key::Enter, go(1, 0)),
        ]
        .into_iter()
        .collect();

        let shift = [
            (Key::ArrowUp, edge(Field::Row, -1)),
            (Key::ArrowDown, edge(Field::Row, 1)),
            (Key::ArrowLeft, edge(Field::Column, -1)),
            (Key::ArrowRight, edge(Field::Column, 1)),
        ]
        .into_iter()
        .collect();

        Self {
            editing,
            shift_meta: FxHashMap::default(),
            shift,
            meta: FxHashMap::default(),
            base,
        }
    }
}

impl Keymap {
    fn table(&self, context: KeyContext) -> &FxHashMap<Key, KeyCommand> {
        match context {
            KeyContext::Editing => &self.editing,
            KeyContext::ShiftMeta => &self.shift_meta,
            KeyContext::Shift => &self.shift,
            KeyContext::Meta => &self.meta,
            KeyContext::Base => &self.base,
        }
    }

    fn table_mut(&mut self, context: KeyContext) -> &mut FxHashMap<Key, KeyCommand> {
        match context {
            KeyContext::Editing => &mut self.editing,
            KeyContext::ShiftMeta => &mut self.shift_meta,
            KeyContext::Shift => &mut self.shift,
            KeyContext::Meta => &mut self.meta,
            KeyContext::Base => &mut self.base,
        }
    }

    /// The command bound for `event` in `mode`, if any.
    pub fn handler(&self, mode: Mode, event: &KeyEvent) -> Option<KeyCommand> {
        self.table(KeyContext::for_event(mode, event))
            .get(&event.key)
            .copied()
    }

    pub fn bind(&mut self, context: KeyContext, key: Key, command: KeyCommand) {
        self.table_mut(context).insert(key, command);
    }

    pub fn unbind(&mut self, context: KeyContext, key: &Key) -> Option<KeyCommand> {
        self.table_mut(context).remove(key)
    }

    /// Layer user overrides on top of this keymap. Entries naming an
    /// unknown command or an unsupported modifier are skipped.
    pub fn with_overrides(mut self, overrides: &[Keybinding]) -> Self {
        for binding in overrides {
            let Some((context, key)) = parse_binding_key(&binding.key, binding.when.as_deref())
            else {
                log::warn!("unsupported key '{}' in keybinding, skipping", binding.key);
                continue;
            };

            if let Some(id) = binding.command.strip_prefix('-') {
                if self.unbind(context, &key).is_none() {
                    log::debug!("'{}' was not bound, nothing to remove for {}", binding.key, id);
                }
                continue;
            }

            match KeyCommand::from_id(&binding.command) {
                Some(command) => self.bind(context, key, command),
                None => log::warn!("unknown command '{}' in keybinding, skipping", binding.command),
            }
        }
        self
    }

    /// Every binding, ordered by context priority and then key.
    pub fn bindings(&self) -> Vec<(KeyContext, &Key, KeyCommand)> {
        let contexts = [
            KeyContext::Editing,
            KeyContext::ShiftMeta,
            KeyContext::Shift,
            KeyContext::Meta,
            KeyContext::Base,
        ];
        let mut all: Vec<_> = contexts
            .into_iter()
            .flat_map(|context| {
                self.table(context)
                    .iter()
                    .map(move |(key, command)| (context, key, *command))
            })
            .collect();
        all.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        all
    }

    /// Normalized key string for a binding, e.g. `shift+ArrowDown`.
    pub fn describe(context: KeyContext, key: &Key) -> String {
        format!("{}{}", context.prefix(), key)
    }
}

/// Split a normalized key string (`meta+shift+arrowdown`) into the table it
/// belongs to and the key. `when: "editing"` selects the edit-mode table,
/// which ignores modifiers.
fn parse_binding_key(normalized: &str, when: Option<&str>) -> Option<(KeyContext, Key)> {
    let mut meta = false;
    let mut shift = false;
    let mut name = None;
    for part in normalized.split('+') {
        match part {
            "meta" => meta = true,
            "shift" => shift = true,
            "alt" => return None,
            "" => {}
            other => name = Some(other),
        }
    }
    let key = Key::parse(name?);

    let context = match when {
        Some("editing") => KeyContext::Editing,
        Some(other) => {
            log::warn!("unknown keybinding context '{}'", other);
            return None;
        }
        None => KeyContext::for_event(
            Mode::View,
            &KeyEvent {
                key: key.clone(),
                shift,
                meta,
            },
        ),
    };
    Some((context, key))
}

/// Run the handler bound to `event`, if there is one.
pub fn key_down<C: CellBase>(
    state: &State<C>,
    event: &KeyEvent,
    keymap: &Keymap,
) -> Option<StatePatch<C>> {
    keymap.handler(state.mode, event)?.apply(state)
}
