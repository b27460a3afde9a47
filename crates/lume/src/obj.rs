//! The base widget handle.

use lume_core::{widget, WidgetKey};

use crate::mixins::Widget;

/// A pointer-sized, copyable handle to an engine widget.
///
/// `Obj` owns nothing: copies alias the same widget and a handle may outlive
/// it. Every operation on a dead handle is a no-op or returns the empty
/// value, matching the engine's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obj(WidgetKey);

impl Obj {
    /// The handle that refers to no widget.
    pub fn null() -> Self {
        Obj(WidgetKey::default())
    }

    /// Create a plain container widget under `parent`.
    pub fn create(parent: impl Widget) -> Self {
        Obj(widget::create(parent.raw()))
    }

    /// Wrap an engine key. The explicit name marks the trust boundary; the
    /// key is not checked until first use.
    pub fn from_raw(raw: WidgetKey) -> Self {
        Obj(raw)
    }

    /// Delete the widget and its subtree. Safe on dead handles.
    pub fn delete(self) {
        widget::delete(self.0);
    }

    /// Whether this handle refers to a live widget.
    pub fn is_valid(self) -> bool {
        widget::exists(self.0)
    }

    pub fn parent(self) -> Obj {
        Obj(widget::parent(self.0).unwrap_or_default())
    }

    pub fn child_count(self) -> usize {
        widget::child_count(self.0)
    }

    pub fn child(self, index: usize) -> Option<Obj> {
        widget::child_at(self.0, index).map(Obj)
    }

    /// Position among siblings.
    pub fn index(self) -> Option<usize> {
        widget::index_of(self.0)
    }

    pub fn is_descendant_of(self, ancestor: impl Widget) -> bool {
        widget::is_descendant_of(self.0, ancestor.raw())
    }

    /// Move to the top of the sibling stacking order.
    pub fn move_foreground(self) -> Self {
        widget::move_foreground(self.0);
        self
    }

    /// Move to the bottom of the sibling stacking order.
    pub fn move_background(self) -> Self {
        widget::move_background(self.0);
        self
    }

    /// Raw access to the widget's single user-data word.
    ///
    /// Components claim this slot on their root widget; everywhere else it
    /// is free for the application.
    pub fn set_user_data(self, data: *mut ()) -> Self {
        widget::set_user_data(self.0, data);
        self
    }

    pub fn user_data(self) -> *mut () {
        widget::user_data(self.0)
    }
}

impl Widget for Obj {
    fn raw(&self) -> WidgetKey {
        self.0
    }

    fn from_obj(obj: Obj) -> Self {
        obj
    }
}

impl Default for Obj {
    fn default() -> Self {
        Obj::null()
    }
}
