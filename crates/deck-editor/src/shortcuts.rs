//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `EditorAction`s. What a key does
//! depends on whether a text element is being edited: while editing, Enter
//! and Escape drive the edit session and Delete/Backspace belong to the
//! text input.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    // ── Text editing ──
    CommitText,
    /// Shift+Enter.
    InsertNewline,
    RevertText,

    // ── Selection ──
    DeleteSelected,
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Enter"`, `"Delete"`).
    /// Returns `None` if the key has no binding in the current mode.
    pub fn resolve(key: &str, modifiers: Modifiers, editing: bool) -> Option<EditorAction> {
        if editing {
            return match key {
                "Enter" if modifiers.shift => Some(EditorAction::InsertNewline),
                "Enter" => Some(EditorAction::CommitText),
                "Escape" => Some(EditorAction::RevertText),
                _ => None,
            };
        }

        let cmd = modifiers.ctrl || modifiers.meta;
        match key {
            "Delete" | "Backspace" if !cmd => Some(EditorAction::DeleteSelected),
            "Escape" => Some(EditorAction::Deselect),
            _ => None,
        }
    }
}
