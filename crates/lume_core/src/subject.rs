//! Reactive subjects: an opaque value plus an observer list.
//!
//! A [`Subject`] is a standalone primitive designed to be embedded inline in
//! a longer-lived container. It holds internal pointers (widgets keep raw
//! back-pointers to subjects for teardown), so a subject must keep a stable
//! address for as long as any observer is registered - the embedding
//! container is expected to be non-movable.
//!
//! Value changes notify observers synchronously, in registration order.
//! Observers optionally tie themselves to a widget's lifetime: when that
//! widget is deleted the engine detaches the observer from the subject.

use std::cell::{Cell, RefCell};
use std::ptr;

use smallvec::SmallVec;
use tracing::trace;

use crate::context::{is_initialized, with_ui};
use crate::draw::Color;
use crate::widget::WidgetKey;

/// The three wire variants a subject can hold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubjectValue {
    Int(i32),
    Ptr(*mut ()),
    Color(Color),
}

/// Identity of one observer registration on a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

/// Observer callback: receives the subject and its own registration entry.
pub type ObserverCb = fn(&Subject, &ObserverEntry);

/// One observer registration.
#[derive(Clone, Copy)]
pub struct ObserverEntry {
    id: ObserverId,
    cb: ObserverCb,
    user_data: *mut (),
    widget: Option<WidgetKey>,
    fmt: Option<&'static str>,
}

impl ObserverEntry {
    pub fn user_data(&self) -> *mut () {
        self.user_data
    }

    /// Widget this observer is tied to, if any.
    pub fn widget(&self) -> Option<WidgetKey> {
        self.widget
    }

    /// Static format string payload, used by text bindings.
    pub fn fmt(&self) -> Option<&'static str> {
        self.fmt
    }
}

/// Back-reference stored on a widget so deletion can detach observers.
pub(crate) struct BoundObserver {
    pub subject: *const Subject,
    pub id: ObserverId,
}

/// A notification primitive holding an opaque value and its observers.
pub struct Subject {
    value: Cell<SubjectValue>,
    observers: RefCell<SmallVec<[ObserverEntry; 4]>>,
    next_id: Cell<u64>,
}

impl Subject {
    pub fn new_int(value: i32) -> Self {
        Self::new(SubjectValue::Int(value))
    }

    pub fn new_ptr(value: *mut ()) -> Self {
        Self::new(SubjectValue::Ptr(value))
    }

    pub fn new_color(value: Color) -> Self {
        Self::new(SubjectValue::Color(value))
    }

    fn new(value: SubjectValue) -> Self {
        Self {
            value: Cell::new(value),
            observers: RefCell::new(SmallVec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn value(&self) -> SubjectValue {
        self.value.get()
    }

    pub fn int(&self) -> i32 {
        match self.value.get() {
            SubjectValue::Int(v) => v,
            other => panic!("subject does not hold an int: {other:?}"),
        }
    }

    pub fn ptr(&self) -> *mut () {
        match self.value.get() {
            SubjectValue::Ptr(p) => p,
            other => panic!("subject does not hold a pointer: {other:?}"),
        }
    }

    pub fn color(&self) -> Color {
        match self.value.get() {
            SubjectValue::Color(c) => c,
            other => panic!("subject does not hold a color: {other:?}"),
        }
    }

    /// Write the value without notifying anyone.
    pub fn store(&self, value: SubjectValue) {
        self.value.set(value);
    }

    /// Compare-and-notify for the int variant.
    pub fn set_int(&self, value: i32) {
        if self.int() != value {
            self.value.set(SubjectValue::Int(value));
            self.notify();
        }
    }

    /// Compare-and-notify for the pointer variant (pointer equality).
    pub fn set_ptr(&self, value: *mut ()) {
        if !ptr::eq(self.ptr(), value) {
            self.value.set(SubjectValue::Ptr(value));
            self.notify();
        }
    }

    /// Compare-and-notify for the color variant (byte comparison).
    pub fn set_color(&self, value: Color) {
        if self.color() != value {
            self.value.set(SubjectValue::Color(value));
            self.notify();
        }
    }

    /// Invoke every observer, change check or not.
    pub fn notify(&self) {
        // Snapshot so callbacks can (un)subscribe without tripping the
        // RefCell.
        let entries: SmallVec<[ObserverEntry; 4]> = self.observers.borrow().clone();
        trace!(count = entries.len(), "subject notify");
        for entry in entries {
            (entry.cb)(self, &entry);
        }
    }

    /// Register an observer. Not invoked for the current value.
    pub fn subscribe(&self, cb: ObserverCb, user_data: *mut ()) -> ObserverId {
        self.push(cb, user_data, None, None)
    }

    /// Register an observer tied to `widget`'s lifetime: deleting the widget
    /// detaches the observer.
    ///
    /// The subject must outlive the widget; widget deletion reaches back
    /// into the subject through a raw pointer.
    pub fn subscribe_with_widget(
        &self,
        cb: ObserverCb,
        widget: WidgetKey,
        user_data: *mut (),
    ) -> ObserverId {
        let id = self.push(cb, user_data, Some(widget), None);
        self.register_teardown(widget, id);
        id
    }

    /// Widget-tied registration carrying a static format string instead of a
    /// user-data pointer. Used by label text bindings.
    pub fn subscribe_with_widget_fmt(
        &self,
        cb: ObserverCb,
        widget: WidgetKey,
        fmt: &'static str,
    ) -> ObserverId {
        let id = self.push(cb, ptr::null_mut(), Some(widget), Some(fmt));
        self.register_teardown(widget, id);
        id
    }

    fn push(
        &self,
        cb: ObserverCb,
        user_data: *mut (),
        widget: Option<WidgetKey>,
        fmt: Option<&'static str>,
    ) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.observers.borrow_mut().push(ObserverEntry {
            id,
            cb,
            user_data,
            widget,
            fmt,
        });
        id
    }

    fn register_teardown(&self, widget: WidgetKey, id: ObserverId) {
        let subject = self as *const Subject;
        with_ui(|ui| {
            if let Some(node) = ui.widgets.get_mut(widget) {
                node.bound_observers.push(BoundObserver { subject, id });
            }
        });
    }

    /// Remove one observer. Returns whether it was present.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|e| e.id != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl Drop for Subject {
    fn drop(&mut self) {
        // Remove widget back-references so a later widget deletion does not
        // chase a dangling subject pointer.
        if !is_initialized() {
            return;
        }
        let subject = self as *const Subject;
        let widgets: Vec<WidgetKey> = self
            .observers
            .borrow()
            .iter()
            .filter_map(|e| e.widget)
            .collect();
        if widgets.is_empty() {
            return;
        }
        with_ui(|ui| {
            for w in widgets {
                if let Some(node) = ui.widgets.get_mut(w) {
                    node.bound_observers.retain(|b| !ptr::eq(b.subject, subject));
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::widget;
    use std::cell::Cell;

    thread_local! {
        static SEEN: Cell<i32> = const { Cell::new(0) };
        static CALLS: Cell<u32> = const { Cell::new(0) };
    }

    fn watch(subject: &Subject, _entry: &ObserverEntry) {
        SEEN.with(|s| s.set(subject.int()));
        CALLS.with(|c| c.set(c.get() + 1));
    }

    fn reset() {
        SEEN.with(|s| s.set(0));
        CALLS.with(|c| c.set(0));
    }

    #[test]
    fn set_notifies_on_change_only() {
        context::init();
        reset();
        let subject = Subject::new_int(3);
        subject.subscribe(watch, std::ptr::null_mut());

        subject.set_int(3);
        assert_eq!(CALLS.with(|c| c.get()), 0);

        subject.set_int(7);
        assert_eq!(CALLS.with(|c| c.get()), 1);
        assert_eq!(SEEN.with(|s| s.get()), 7);

        subject.notify();
        assert_eq!(CALLS.with(|c| c.get()), 2);
    }

    #[test]
    fn color_compares_by_bytes() {
        context::init();
        reset();
        let subject = Subject::new_color(Color::rgb(1, 2, 3));
        fn count(_: &Subject, _: &ObserverEntry) {
            CALLS.with(|c| c.set(c.get() + 1));
        }
        subject.subscribe(count, std::ptr::null_mut());

        subject.set_color(Color::rgb(1, 2, 3));
        assert_eq!(CALLS.with(|c| c.get()), 0);
        subject.set_color(Color::rgb(1, 2, 4));
        assert_eq!(CALLS.with(|c| c.get()), 1);
    }

    #[test]
    fn widget_deletion_detaches_observer() {
        context::init();
        reset();
        let subject = Subject::new_int(0);
        let w = widget::create(context::screen());
        subject.subscribe_with_widget(watch, w, std::ptr::null_mut());
        assert_eq!(subject.observer_count(), 1);

        subject.set_int(1);
        assert_eq!(CALLS.with(|c| c.get()), 1);

        widget::delete(w);
        assert_eq!(subject.observer_count(), 0);
        subject.set_int(2);
        assert_eq!(CALLS.with(|c| c.get()), 1);
    }

    #[test]
    fn unsubscribe_by_id() {
        context::init();
        reset();
        let subject = Subject::new_int(0);
        let id = subject.subscribe(watch, std::ptr::null_mut());
        assert!(subject.unsubscribe(id));
        assert!(!subject.unsubscribe(id));
        subject.set_int(5);
        assert_eq!(CALLS.with(|c| c.get()), 0);
    }
}
