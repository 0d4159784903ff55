//! Host field abstraction.
//!
//! The host is the text widget the user types into. It reports edits as
//! [`FieldEvent`]s and accepts the reformatted text and cursor back through
//! [`FieldHost`]. [`MemoryField`] is a plain in-memory host used by tests
//! and the CLI.

use smol_str::SmolStr;

use crate::types::EditDelta;

/// Edit notification raised by a host field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldEvent {
    /// An edit is about to be applied.
    BeforeEdit(EditDelta),
    /// An edit was applied; carries the full current text.
    AfterEdit(SmolStr),
}

/// Operations the controller needs from the host text widget.
///
/// All offsets are in chars.
pub trait FieldHost {
    /// Current text of the field.
    fn text(&self) -> SmolStr;

    /// Overwrite the field's text.
    fn set_text(&mut self, text: &str);

    /// Move the cursor.
    fn set_cursor(&mut self, offset: usize);

    /// Notifications the host raised while handling `set_text`/`set_cursor`.
    ///
    /// Hosts that fire change notifications for programmatic writes queue
    /// them here; the controller drains and ignores them while its own
    /// write is in progress.
    fn take_echoes(&mut self) -> Vec<FieldEvent> {
        Vec::new()
    }
}

/// In-memory single-line field.
///
/// Editing methods apply the edit and return the notifications a real
/// widget would fire, in order, for the caller to dispatch.
#[derive(Clone, Debug, Default)]
pub struct MemoryField {
    text: String,
    cursor: usize,
    echo_writes: bool,
    echoes: Vec<FieldEvent>,
}

impl MemoryField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field holding `text` with the cursor at the end.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
            ..Self::default()
        }
    }

    /// Make programmatic writes raise notifications like user edits do.
    pub fn echoing(mut self) -> Self {
        self.echo_writes = true;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// Move the cursor, clamped to the text.
    pub fn move_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.len_chars());
    }

    /// Type one character at the cursor.
    pub fn type_char(&mut self, c: char) -> Vec<FieldEvent> {
        let before = EditDelta::insert(self.text.as_str(), self.cursor);
        let byte = self.byte_offset(self.cursor);
        self.text.insert(byte, c);
        self.cursor += 1;
        vec![
            FieldEvent::BeforeEdit(before),
            FieldEvent::AfterEdit(self.text.as_str().into()),
        ]
    }

    /// Delete the character before the cursor. No-op at the start.
    pub fn backspace(&mut self) -> Vec<FieldEvent> {
        if self.cursor == 0 {
            return Vec::new();
        }
        self.cursor -= 1;
        self.remove_at_cursor()
    }

    /// Delete the character after the cursor. No-op at the end.
    pub fn delete_forward(&mut self) -> Vec<FieldEvent> {
        if self.cursor >= self.len_chars() {
            return Vec::new();
        }
        self.remove_at_cursor()
    }

    /// Remove all text in one edit.
    pub fn clear(&mut self) -> Vec<FieldEvent> {
        let before = EditDelta::from_parts(self.text.as_str(), 0, self.len_chars(), 0);
        self.text.clear();
        self.cursor = 0;
        vec![
            FieldEvent::BeforeEdit(before),
            FieldEvent::AfterEdit(SmolStr::default()),
        ]
    }

    fn remove_at_cursor(&mut self) -> Vec<FieldEvent> {
        let before = EditDelta::delete(self.text.as_str(), self.cursor);
        let byte = self.byte_offset(self.cursor);
        self.text.remove(byte);
        vec![
            FieldEvent::BeforeEdit(before),
            FieldEvent::AfterEdit(self.text.as_str().into()),
        ]
    }

    fn byte_offset(&self, char_offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_offset)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

impl FieldHost for MemoryField {
    fn text(&self) -> SmolStr {
        self.text.as_str().into()
    }

    fn set_text(&mut self, text: &str) {
        if self.echo_writes {
            let old_len = self.len_chars();
            let new_len = text.chars().count();
            self.echoes.push(FieldEvent::BeforeEdit(EditDelta::from_parts(
                self.text.as_str(),
                0,
                old_len,
                new_len,
            )));
            self.echoes.push(FieldEvent::AfterEdit(text.into()));
        }
        self.text = text.to_string();
        // Widgets reset the cursor on a programmatic write.
        self.cursor = 0;
    }

    fn set_cursor(&mut self, offset: usize) {
        self.move_cursor(offset);
    }

    fn take_echoes(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.echoes)
    }
}
