//! Typed event reading and zero-overhead callback registration.
//!
//! The engine stores exactly one function pointer and one user-data word per
//! registration. This module keeps that true for every callback shape it
//! accepts:
//!
//! 1. Raw: a plain `fn(&RawEvent)` plus a user-data word, unchanged.
//! 2. A zero-sized callable (closure without captures, or fn item) over
//!    [`Event`]: the trampoline materializes a fresh instance of the
//!    callable type on each dispatch, so nothing is stored at all.
//! 3. Same as 2 with the shorthand registrations (`on_clicked` and friends).
//! 4. A bound instance: the instance pointer rides in the user-data word and
//!    a zero-sized `Fn(&mut T, Event)` is materialized around it.
//!
//! A callable with captured state has nowhere to live in that scheme, so
//! shape 2/3 registration rejects it at compile time with an error naming
//! the bound-instance alternative.

use std::ptr::NonNull;

use lume_core::event::{self, DescriptorId, EventCb, EventCode, RawEvent};

use crate::mixins::Widget;
use crate::obj::Obj;

/// Pointer-sized reader over an in-flight engine event.
#[derive(Clone, Copy)]
pub struct Event<'a> {
    raw: &'a RawEvent,
}

impl<'a> Event<'a> {
    pub(crate) fn new(raw: &'a RawEvent) -> Self {
        Self { raw }
    }

    /// The widget the event was originally sent to.
    pub fn target(&self) -> Obj {
        Obj::from_raw(self.raw.target())
    }

    /// The widget whose descriptor is currently being invoked (differs from
    /// [`target`](Self::target) while bubbling).
    pub fn current_target(&self) -> Obj {
        Obj::from_raw(self.raw.current_target())
    }

    pub fn code(&self) -> EventCode {
        self.raw.code()
    }

    /// The user-data word of the descriptor being invoked.
    pub fn user_data(&self) -> *mut () {
        self.raw.user_data()
    }

    /// The sender-supplied parameter pointer.
    pub fn param(&self) -> *mut () {
        self.raw.param()
    }

    /// Key code, when this is a [`EventCode::Key`] event.
    pub fn key_code(&self) -> Option<u32> {
        if self.raw.code() != EventCode::Key {
            return None;
        }
        let param = self.raw.param().cast::<u32>();
        // The engine's key injection always passes a key code pointer.
        unsafe { param.as_ref().copied() }
    }

    /// Nonzero when the event came from an input device rather than code.
    pub fn indev(&self) -> u32 {
        self.raw.indev()
    }

    pub fn is_from_input(&self) -> bool {
        self.raw.indev() != 0
    }

    /// Stop the event from reaching ancestor widgets.
    pub fn stop_bubbling(&self) {
        self.raw.stop_bubbling();
    }

    /// Stop invoking further descriptors on the current widget.
    pub fn stop_processing(&self) {
        self.raw.stop_processing();
    }
}

// =============================================================================
// Trampolines
// =============================================================================

fn stateless_trampoline<F>(raw: &RawEvent)
where
    F: for<'a> Fn(Event<'a>) + Copy,
{
    // SAFETY: registration proved F is zero-sized.
    let f: F = unsafe { crate::conjure::<F>() };
    f(Event::new(raw));
}

fn bound_trampoline<T, F>(raw: &RawEvent)
where
    F: for<'a> Fn(&mut T, Event<'a>) + Copy,
{
    let target = raw.user_data().cast::<T>();
    // SAFETY: registration proved F is zero-sized, and the registration
    // contract guarantees `target` points at a live, unaliased T.
    let f: F = unsafe { crate::conjure::<F>() };
    f(unsafe { &mut *target }, Event::new(raw));
}

// =============================================================================
// Registration
// =============================================================================

macro_rules! shorthands {
    ($( $(#[$doc:meta])* $name:ident / $bound:ident => $code:ident ),* $(,)?) => {
        $(
            $(#[$doc])*
            fn $name<F>(self, f: F) -> Self
            where
                F: for<'a> Fn(Event<'a>) + Copy,
            {
                self.on_event(EventCode::$code, f)
            }

            /// Bound-instance form.
            ///
            /// # Safety
            ///
            /// Same contract as [`Events::on_event_bound`].
            unsafe fn $bound<T, F>(self, target: NonNull<T>, f: F) -> Self
            where
                F: for<'a> Fn(&mut T, Event<'a>) + Copy,
            {
                unsafe { self.on_event_bound(EventCode::$code, target, f) }
            }
        )*
    };
}

/// Event registration and dispatch for widget handles.
pub trait Events: Widget {
    /// Shape 1: register an engine-level callback unchanged.
    fn add_event_cb_raw(self, code: EventCode, cb: EventCb, user_data: *mut ()) -> DescriptorId {
        event::add_event_cb(self.raw(), code, cb, user_data)
    }

    /// Shapes 2 and 3: register a stateless callable over [`Event`].
    ///
    /// Only zero-sized callables are accepted; a closure that captures state
    /// fails to compile here. Bind the state explicitly with
    /// [`on_event_bound`](Self::on_event_bound) instead. The passed instance
    /// is never stored; dispatch re-materializes the callable type.
    fn on_event<F>(self, code: EventCode, _f: F) -> Self
    where
        F: for<'a> Fn(Event<'a>) + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "event callback captures state and cannot be registered; \
                 bind the instance explicitly with `on_event_bound`"
            )
        };
        event::add_event_cb(
            self.raw(),
            code,
            stateless_trampoline::<F>,
            std::ptr::null_mut(),
        );
        self
    }

    /// Shape 4: register a member-style callable bound to `target`.
    ///
    /// The instance pointer is stored in the descriptor's user-data word;
    /// the callable itself must be zero-sized.
    ///
    /// # Safety
    ///
    /// `target` must outlive every dispatch to this descriptor, must not
    /// move, and must not be aliased mutably during dispatch. Deleting the
    /// widget (or removing the descriptor) before `target` goes away makes
    /// this trivially true; [`crate::Mounted`] arranges exactly that.
    unsafe fn on_event_bound<T, F>(self, code: EventCode, target: NonNull<T>, _f: F) -> Self
    where
        F: for<'a> Fn(&mut T, Event<'a>) + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "bound event callback must not capture state; \
                 move the state into the bound instance instead"
            )
        };
        event::add_event_cb(
            self.raw(),
            code,
            bound_trampoline::<T, F>,
            target.as_ptr().cast(),
        );
        self
    }

    /// Remove every registration made through [`on_event`](Self::on_event)
    /// with this callable type, any code. Returns how many were removed.
    ///
    /// Identity is the callable type, not the instance: all registrations
    /// of the same zero-sized callable match.
    fn remove_on_event<F>(self, _f: F) -> usize
    where
        F: for<'a> Fn(Event<'a>) + Copy,
    {
        event::remove_event_cbs_matching(self.raw(), stateless_trampoline::<F>)
    }

    /// Remove one registration by descriptor id.
    fn remove_event(self, id: DescriptorId) -> bool {
        event::remove_event_cb(id)
    }

    /// Remove one registration by position.
    fn remove_event_at(self, index: usize) -> bool {
        event::remove_event_cb_at(self.raw(), index)
    }

    fn event_cb_count(self) -> usize {
        event::descriptor_count(self.raw())
    }

    /// Send an event to this widget and let it bubble.
    fn send_event(self, code: EventCode, param: *mut ()) -> Self {
        event::send(self.raw(), code, param);
        self
    }

    shorthands! {
        on_clicked / on_clicked_bound => Clicked,
        on_pressed / on_pressed_bound => Pressed,
        on_released / on_released_bound => Released,
        on_value_changed / on_value_changed_bound => ValueChanged,
        on_focused / on_focused_bound => Focused,
        on_defocused / on_defocused_bound => Defocused,
        on_hover_enter / on_hover_enter_bound => HoverEnter,
        on_hover_leave / on_hover_leave_bound => HoverLeave,
        on_single_clicked / on_single_clicked_bound => SingleClicked,
        on_double_clicked / on_double_clicked_bound => DoubleClicked,
        on_triple_clicked / on_triple_clicked_bound => TripleClicked,
        on_long_pressed / on_long_pressed_bound => LongPressed,
        on_scroll / on_scroll_bound => Scroll,
        on_scroll_begin / on_scroll_begin_bound => ScrollBegin,
        on_scroll_end / on_scroll_end_bound => ScrollEnd,
        on_gesture / on_gesture_bound => Gesture,
        on_key / on_key_bound => Key,
    }
}

impl<W: Widget> Events for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use crate::obj::Obj;
    use std::cell::Cell;

    thread_local! {
        static HITS: Cell<u32> = const { Cell::new(0) };
    }

    #[test]
    fn stateless_closure_dispatches() {
        app::init();
        HITS.with(|h| h.set(0));
        let w = Obj::create(app::screen()).on_clicked(|e| {
            assert_eq!(e.code(), EventCode::Clicked);
            HITS.with(|h| h.set(h.get() + 1));
        });

        w.send_event(EventCode::Clicked, std::ptr::null_mut());
        w.send_event(EventCode::Clicked, std::ptr::null_mut());
        assert_eq!(HITS.with(|h| h.get()), 2);
    }

    #[test]
    fn fn_item_dispatches_with_target() {
        app::init();
        HITS.with(|h| h.set(0));
        fn handler(e: Event<'_>) {
            assert!(e.target().is_valid());
            HITS.with(|h| h.set(h.get() + 1));
        }
        let w = Obj::create(app::screen()).on_event(EventCode::Pressed, handler);
        w.send_event(EventCode::Pressed, std::ptr::null_mut());
        assert_eq!(HITS.with(|h| h.get()), 1);
    }

    #[test]
    fn bound_instance_receives_self() {
        app::init();
        struct Counter {
            value: i32,
        }
        let mut counter = Counter { value: 0 };
        let target = NonNull::from(&mut counter);

        let w = Obj::create(app::screen());
        // SAFETY: `counter` outlives the widget; both die in this scope.
        unsafe {
            w.on_clicked_bound(target, |c: &mut Counter, _e: Event<'_>| c.value += 1);
        }
        w.send_event(EventCode::Clicked, std::ptr::null_mut());
        w.send_event(EventCode::Clicked, std::ptr::null_mut());
        w.delete();
        assert_eq!(counter.value, 2);
    }

    #[test]
    fn removal_by_callable_identity() {
        app::init();
        HITS.with(|h| h.set(0));
        fn handler(_e: Event<'_>) {
            HITS.with(|h| h.set(h.get() + 1));
        }
        let w = Obj::create(app::screen())
            .on_event(EventCode::Clicked, handler)
            .on_event(EventCode::Pressed, handler);
        assert_eq!(w.event_cb_count(), 2);
        assert_eq!(w.remove_on_event(handler), 2);
        w.send_event(EventCode::Clicked, std::ptr::null_mut());
        assert_eq!(HITS.with(|h| h.get()), 0);
    }
}
