//! Keystroke replay against an in-memory field.
//!
//! A key script is a string of characters typed at the cursor, with a few
//! control sequences: `<` is backspace, `>` deletes forward, `!` clears
//! the field and `{n}` moves the cursor to char offset `n`.

use std::fmt;

use miette::{Result, miette};
use numfield_core::{
    EditController, EditOutcome, FieldEvent, LocaleProfile, MemoryField, RoundingPolicy,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Clear,
    Move(usize),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{c:?}"),
            Key::Backspace => f.write_str("<bksp>"),
            Key::Delete => f.write_str("<del>"),
            Key::Clear => f.write_str("<clear>"),
            Key::Move(n) => write!(f, "<move {n}>"),
        }
    }
}

pub fn parse_keys(script: &str) -> Result<Vec<Key>> {
    let mut keys = Vec::new();
    let mut chars = script.chars();
    while let Some(c) = chars.next() {
        let key = match c {
            '<' => Key::Backspace,
            '>' => Key::Delete,
            '!' => Key::Clear,
            '{' => {
                let digits: String = chars.by_ref().take_while(|&c| c != '}').collect();
                let offset = digits
                    .trim()
                    .parse()
                    .map_err(|_| miette!("invalid cursor move `{{{digits}}}` in key script"))?;
                Key::Move(offset)
            }
            c => Key::Char(c),
        };
        keys.push(key);
    }
    Ok(keys)
}

/// One line of a replay transcript.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub key: Key,
    pub display: String,
    pub cursor: usize,
    pub value: Option<f64>,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut marked: String = self.display.chars().take(self.cursor).collect();
        marked.push('|');
        marked.extend(self.display.chars().skip(self.cursor));
        let value = match self.value {
            Some(v) => v.to_string(),
            None => "absent".to_string(),
        };
        write!(f, "{:>10}  {:<24} {}", self.key.to_string(), marked, value)
    }
}

/// Replay `keys` into a field starting with `initial`.
pub fn replay(
    profile: LocaleProfile,
    policy: RoundingPolicy,
    initial: &str,
    keys: &[Key],
) -> Result<Vec<Step>> {
    let mut value = (!initial.is_empty()).then(|| profile.parse(initial));
    let mut ctl = EditController::new(MemoryField::with_text(initial), profile, |v| {
        tracing::debug!(?v, "value changed");
    })
    .with_policy(policy);

    let mut steps = Vec::with_capacity(keys.len());
    for &key in keys {
        let field = ctl
            .host_mut()
            .ok_or_else(|| miette!("field detached during replay"))?;
        let events = match key {
            Key::Char(c) => field.type_char(c),
            Key::Backspace => field.backspace(),
            Key::Delete => field.delete_forward(),
            Key::Clear => field.clear(),
            Key::Move(offset) => {
                field.move_cursor(offset);
                Vec::new()
            }
        };
        if let Some(outcome) = dispatch(&mut ctl, events) {
            value = outcome.value;
        }

        let field = ctl
            .host()
            .ok_or_else(|| miette!("field detached during replay"))?;
        steps.push(Step {
            key,
            display: field.as_str().to_string(),
            cursor: field.cursor(),
            value,
        });
    }
    ctl.detach();
    Ok(steps)
}

fn dispatch<F: FnMut(Option<f64>)>(
    ctl: &mut EditController<MemoryField, F>,
    events: Vec<FieldEvent>,
) -> Option<EditOutcome> {
    events.into_iter().filter_map(|event| ctl.handle(event)).last()
}
