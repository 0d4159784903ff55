//! Edit-cycle orchestration for one numeric field.
//!
//! [`EditController`] receives the host's edit notifications, anchors the
//! cursor before each edit, reformats the text afterwards, writes the result
//! back to the host and reports the parsed value to the application.

use tracing::{debug, trace};

use crate::cursor::{CursorTracker, RoundingPolicy};
use crate::format::FormatEngine;
use crate::locale::LocaleProfile;
use crate::platform::{FieldEvent, FieldHost};
use crate::types::{EditDelta, EditOutcome};

/// Drives edit cycles for one host field.
///
/// `on_changed` is called once per completed cycle with the parsed value,
/// or None when the field is empty.
pub struct EditController<H, F> {
    host: Option<H>,
    engine: FormatEngine,
    tracker: CursorTracker,
    policy: RoundingPolicy,
    on_changed: F,
    /// Set while the controller writes to the host; notifications that
    /// arrive meanwhile are our own and are ignored.
    self_write: bool,
    value: Option<f64>,
}

impl<H, F> EditController<H, F>
where
    H: FieldHost,
    F: FnMut(Option<f64>),
{
    pub fn new(host: H, profile: LocaleProfile, on_changed: F) -> Self {
        let tracker = CursorTracker::new(profile.grouping_separator());
        Self {
            host: Some(host),
            engine: FormatEngine::new(profile),
            tracker,
            policy: RoundingPolicy::default(),
            on_changed,
            self_write: false,
            value: None,
        }
    }

    pub fn with_policy(mut self, policy: RoundingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RoundingPolicy {
        self.policy
    }

    pub fn profile(&self) -> &LocaleProfile {
        self.engine.profile()
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Value reported by the last completed cycle or `set_value`.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Dispatch one host notification.
    ///
    /// Returns the cycle's outcome for `AfterEdit` events that were processed.
    pub fn handle(&mut self, event: FieldEvent) -> Option<EditOutcome> {
        match event {
            FieldEvent::BeforeEdit(delta) => {
                self.on_before_edit(&delta);
                None
            }
            FieldEvent::AfterEdit(text) => self.on_after_edit(&text),
        }
    }

    /// Record the cursor anchor for an edit about to be applied.
    pub fn on_before_edit(&mut self, delta: &EditDelta) {
        if self.self_write || self.host.is_none() {
            trace!(start = delta.start, "ignoring before-edit notification");
            return;
        }
        self.tracker.compute_anchor(delta);
    }

    /// Reformat the edited text, restore the cursor and report the value.
    ///
    /// Returns None when the notification was ignored (own write in
    /// progress, or detached).
    pub fn on_after_edit(&mut self, new_raw: &str) -> Option<EditOutcome> {
        if self.self_write || self.host.is_none() {
            trace!(text = new_raw, "ignoring after-edit notification");
            return None;
        }

        if new_raw.is_empty() {
            self.tracker.reset();
            self.value = None;
            (self.on_changed)(None);
            return Some(EditOutcome {
                display: Default::default(),
                cursor: None,
                value: None,
            });
        }

        let result = self.engine.reformat(new_raw);
        let cursor = match self.policy {
            RoundingPolicy::Clamp => self.tracker.resolve_offset(&result.text),
            RoundingPolicy::Compensate => {
                let lost = self.tracker.lost_before_anchor(new_raw);
                self.tracker.resolve_offset_with_loss(&result.text, lost)
            }
        };

        self.write_back(&result.text, cursor);
        self.value = result.value;
        (self.on_changed)(result.value);

        Some(EditOutcome {
            display: result.text,
            cursor,
            value: result.value,
        })
    }

    /// Programmatically show `value` in the field, cursor at the end.
    ///
    /// Does not invoke the change callback.
    pub fn set_value(&mut self, value: Option<f64>) {
        if self.host.is_none() {
            return;
        }
        let text = match value {
            Some(v) => self.engine.profile().format(v),
            None => String::new(),
        };
        self.tracker.reset();
        self.value = value.map(|_| self.engine.profile().parse(&text));
        self.write_back(&text, Some(text.chars().count()));
    }

    /// Switch locale, re-rendering the current value with the new symbols.
    pub fn set_profile(&mut self, profile: LocaleProfile) {
        let value = self.value.or_else(|| {
            let current = self.host.as_ref()?.text();
            (!current.is_empty()).then(|| self.engine.profile().parse(&current))
        });

        debug!(from = self.engine.profile().tag(), to = profile.tag(), "switching locale");
        self.tracker.set_separator(profile.grouping_separator());
        self.engine = FormatEngine::new(profile);

        if let Some(value) = value {
            let text = self.engine.profile().format(value);
            self.write_back(&text, Some(text.chars().count()));
        }
    }

    /// Release the host. Further notifications are ignored.
    ///
    /// Returns the host on the first call and None afterwards.
    pub fn detach(&mut self) -> Option<H> {
        self.tracker.reset();
        let host = self.host.take();
        if host.is_some() {
            debug!("detached from host field");
        }
        host
    }

    fn write_back(&mut self, text: &str, cursor: Option<usize>) {
        let Some(host) = self.host.as_mut() else {
            return;
        };

        self.self_write = true;
        host.set_text(text);
        if let Some(offset) = cursor {
            host.set_cursor(offset);
        }
        let echoes = host.take_echoes();
        for echo in echoes {
            trace!(?echo, "notification raised by own write");
            self.handle(echo);
        }
        self.self_write = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::platform::MemoryField;

    type Seen = Rc<RefCell<Vec<Option<f64>>>>;

    fn controller(
        field: MemoryField,
    ) -> (EditController<MemoryField, impl FnMut(Option<f64>)>, Seen) {
        let seen: Seen = Rc::default();
        let sink = seen.clone();
        let ctl = EditController::new(field, LocaleProfile::default(), move |v| {
            sink.borrow_mut().push(v)
        });
        (ctl, seen)
    }

    fn dispatch<F: FnMut(Option<f64>)>(
        ctl: &mut EditController<MemoryField, F>,
        events: Vec<FieldEvent>,
    ) -> Option<EditOutcome> {
        let mut last = None;
        for event in events {
            if let Some(outcome) = ctl.handle(event) {
                last = Some(outcome);
            }
        }
        last
    }

    #[test]
    fn test_cycle_writes_back_and_reports() {
        let (mut ctl, seen) = controller(MemoryField::with_text("123"));
        let events = ctl.host_mut().unwrap().type_char('4');
        let outcome = dispatch(&mut ctl, events).unwrap();

        assert_eq!(outcome.display, "1,234");
        assert_eq!(outcome.cursor, Some(5));
        assert_eq!(outcome.value, Some(1234.0));

        let host = ctl.host().unwrap();
        assert_eq!(host.as_str(), "1,234");
        assert_eq!(host.cursor(), 5);
        assert_eq!(*seen.borrow(), vec![Some(1234.0)]);
        assert_eq!(ctl.value(), Some(1234.0));
    }

    #[test]
    fn test_empty_text_reports_absent() {
        let (mut ctl, seen) = controller(MemoryField::with_text("5"));
        let events = ctl.host_mut().unwrap().backspace();
        let outcome = dispatch(&mut ctl, events).unwrap();

        assert_eq!(outcome.display, "");
        assert_eq!(outcome.cursor, None);
        assert_eq!(outcome.value, None);
        assert_eq!(*seen.borrow(), vec![None]);
        assert_eq!(ctl.value(), None);
    }

    #[test]
    fn test_own_writes_are_not_reprocessed() {
        let (mut ctl, seen) = controller(MemoryField::with_text("123").echoing());
        let events = ctl.host_mut().unwrap().type_char('4');
        dispatch(&mut ctl, events);

        // The echoed set_text notifications must not produce a second cycle.
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(ctl.host().unwrap().as_str(), "1,234");
        assert_eq!(ctl.host().unwrap().cursor(), 5);
        assert!(!ctl.tracker.is_pending());
    }

    #[test]
    fn test_after_edit_without_anchor_keeps_cursor() {
        let (mut ctl, _) = controller(MemoryField::new());
        let outcome = ctl.on_after_edit("1234").unwrap();
        assert_eq!(outcome.display, "1,234");
        assert_eq!(outcome.cursor, None);
    }

    #[test]
    fn test_detach_is_idempotent_and_inert() {
        let (mut ctl, seen) = controller(MemoryField::with_text("12"));
        let host = ctl.detach();
        assert_eq!(host.map(|h| h.as_str().to_string()), Some("12".to_string()));
        assert!(ctl.detach().is_none());
        assert!(!ctl.is_attached());

        ctl.on_before_edit(&EditDelta::insert("12", 2));
        assert_eq!(ctl.on_after_edit("123"), None);
        ctl.set_value(Some(5.0));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_set_value() {
        let (mut ctl, seen) = controller(MemoryField::new());
        ctl.set_value(Some(1234567.891));
        let host = ctl.host().unwrap();
        assert_eq!(host.as_str(), "1,234,567.89");
        assert_eq!(host.cursor(), 12);
        assert_eq!(ctl.value(), Some(1234567.89));

        ctl.set_value(None);
        assert_eq!(ctl.host().unwrap().as_str(), "");
        assert_eq!(ctl.value(), None);
        // Programmatic writes are not user changes.
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_set_profile_rerenders_value() {
        let (mut ctl, _) = controller(MemoryField::new());
        ctl.set_value(Some(1234.5));
        ctl.set_profile(LocaleProfile::for_locale("de-DE").unwrap());

        assert_eq!(ctl.host().unwrap().as_str(), "1.234,5");
        assert_eq!(ctl.profile().tag(), "de-DE");

        // Editing continues with the new separator.
        let events = ctl.host_mut().unwrap().type_char('6');
        let outcome = dispatch(&mut ctl, events).unwrap();
        assert_eq!(outcome.display, "1.234,56");
        assert_eq!(outcome.value, Some(1234.56));
    }

    #[test]
    fn test_set_profile_parses_unowned_text() {
        let (mut ctl, _) = controller(MemoryField::with_text("9,876"));
        ctl.set_profile(LocaleProfile::for_locale("fr-FR").unwrap());
        assert_eq!(ctl.host().unwrap().as_str(), "9\u{202f}876");
    }

    #[test]
    fn test_compensate_policy() {
        let (ctl, _) = controller(MemoryField::with_text("5"));
        let mut ctl = ctl.with_policy(RoundingPolicy::Compensate);
        assert_eq!(ctl.policy(), RoundingPolicy::Compensate);

        ctl.host_mut().unwrap().move_cursor(0);
        let events = ctl.host_mut().unwrap().type_char('0');
        let outcome = dispatch(&mut ctl, events).unwrap();
        assert_eq!(outcome.display, "5");
        assert_eq!(outcome.cursor, Some(0));
    }

    #[test]
    fn test_compensate_ignores_rounding_behind_cursor() {
        let (ctl, _) = controller(MemoryField::with_text("12.34"));
        let mut ctl = ctl.with_policy(RoundingPolicy::Compensate);

        ctl.host_mut().unwrap().move_cursor(3);
        let events = ctl.host_mut().unwrap().type_char('9');
        let outcome = dispatch(&mut ctl, events).unwrap();
        assert_eq!(outcome.display, "12.93");
        assert_eq!(outcome.cursor, Some(4));
        assert_eq!(outcome.value, Some(12.93));
    }

    #[test]
    fn test_clamp_policy_on_leading_zero() {
        let (mut ctl, _) = controller(MemoryField::with_text("5"));
        ctl.host_mut().unwrap().move_cursor(0);
        let events = ctl.host_mut().unwrap().type_char('0');
        let outcome = dispatch(&mut ctl, events).unwrap();
        assert_eq!(outcome.display, "5");
        assert_eq!(outcome.cursor, Some(1));
    }
}
