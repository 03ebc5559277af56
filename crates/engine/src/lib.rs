pub mod actions;
pub mod bindings;
pub mod cell;
pub mod clipboard;
pub mod events;
pub mod hooks;
pub mod keys;
pub mod state;
pub mod store;

pub use bindings::{extract_references, BindingExtractor, FormulaReferences};
pub use cell::{Cell, CellBase, CellValue, RendererOverride};
pub use clipboard::{clip, ClipboardTracker, PasteSource};
pub use events::{diff_states, EventCollector, SheetEvent};
pub use hooks::{AccessError, CellDescriptor, DefaultAccessor, FormulaHooks, Value, ValueAccessor};
pub use keys::{key_down, Key, KeyCommand, KeyContext, KeyEvent, Keymap};
pub use state::{CellChange, Commit, Dimensions, Mode, State, StatePatch};
pub use store::{Store, SubscriptionId};
