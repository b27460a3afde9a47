//! Owned focus groups.

use lume_core::group::{self, GroupKey};

use crate::mixins::Widget;
use crate::obj::Obj;

/// Move-only owner of an engine focus group. One key wide; drop deletes the
/// group (members are untouched).
#[derive(Debug)]
pub struct Group {
    key: GroupKey,
}

impl Group {
    pub fn new() -> Self {
        Self { key: group::create() }
    }

    pub fn raw(&self) -> GroupKey {
        self.key
    }

    /// Append a widget to the navigation order.
    pub fn add(&mut self, widget: impl Widget) -> &mut Self {
        group::add_widget(self.key, widget.raw());
        self
    }

    pub fn remove(&mut self, widget: impl Widget) {
        group::remove_widget(self.key, widget.raw());
    }

    pub fn len(&self) -> usize {
        group::member_count(self.key)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move focus forward; fires `Defocused`/`Focused` events.
    pub fn focus_next(&mut self) -> Option<Obj> {
        group::focus_next(self.key).map(Obj::from_raw)
    }

    pub fn focus_prev(&mut self) -> Option<Obj> {
        group::focus_prev(self.key).map(Obj::from_raw)
    }

    /// Focus a specific member. Returns false for non-members.
    pub fn focus(&mut self, widget: impl Widget) -> bool {
        group::focus_widget(self.key, widget.raw())
    }

    pub fn focused(&self) -> Option<Obj> {
        group::focused(self.key).map(Obj::from_raw)
    }

    /// Whether focus wraps past either end.
    pub fn set_wrap(&mut self, wrap: bool) {
        group::set_wrap(self.key, wrap);
    }

    pub fn set_editing(&mut self, editing: bool) {
        group::set_editing(self.key, editing);
    }

    pub fn editing(&self) -> bool {
        group::editing(self.key)
    }

    /// Deliver a key code to the focused member as a bubbling `Key` event.
    pub fn send_key(&mut self, key_code: u32) -> bool {
        group::send_key(self.key, key_code)
    }

    /// Give up ownership without deleting the group.
    pub fn release(self) -> GroupKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Group {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            group::delete(self.key);
        }
    }
}
