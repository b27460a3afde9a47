//! Inline reactive values.
//!
//! [`State<T>`] embeds an engine subject directly - no allocation, no
//! indirection - and speaks the subject's three wire variants through the
//! sealed [`StateValue`] trait: integers and `bool` ride the int variant,
//! raw pointers the pointer variant, [`Color`] the color variant.
//! [`StateCell<T>`] covers every other `Copy` type by publishing a pointer
//! to an inline slot.
//!
//! Address stability: a state registers raw back-pointers with widgets once
//! widget-bound observers exist, so it must not move afterwards. Keep
//! states in long-lived owners (a component field, a `Box`, a `static`);
//! none of them are `Clone` for this reason.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ptr::NonNull;

use lume_core::subject::{ObserverCb, ObserverEntry, ObserverId, Subject, SubjectValue};
use lume_core::Color;

use crate::mixins::Widget;

mod sealed {
    pub trait Sealed {}
}

/// Value types a [`State`] can hold natively.
pub trait StateValue: Copy + PartialEq + sealed::Sealed + 'static {
    #[doc(hidden)]
    fn initial(self) -> SubjectValue;
    #[doc(hidden)]
    fn store(self, subject: &Subject);
    #[doc(hidden)]
    fn load(subject: &Subject) -> Self;
}

macro_rules! int_state_value {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl StateValue for $t {
                fn initial(self) -> SubjectValue {
                    SubjectValue::Int(self as i32)
                }

                fn store(self, subject: &Subject) {
                    subject.set_int(self as i32);
                }

                fn load(subject: &Subject) -> Self {
                    subject.int() as $t
                }
            }
        )*
    };
}

int_state_value!(i8, u8, i16, u16, i32, u32);

impl sealed::Sealed for bool {}

impl StateValue for bool {
    fn initial(self) -> SubjectValue {
        SubjectValue::Int(self as i32)
    }

    fn store(self, subject: &Subject) {
        subject.set_int(self as i32);
    }

    fn load(subject: &Subject) -> Self {
        subject.int() != 0
    }
}

impl sealed::Sealed for Color {}

impl StateValue for Color {
    fn initial(self) -> SubjectValue {
        SubjectValue::Color(self)
    }

    fn store(self, subject: &Subject) {
        subject.set_color(self);
    }

    fn load(subject: &Subject) -> Self {
        subject.color()
    }
}

impl<T: 'static> sealed::Sealed for *mut T {}

impl<T: 'static> StateValue for *mut T {
    fn initial(self) -> SubjectValue {
        SubjectValue::Ptr(self.cast())
    }

    fn store(self, subject: &Subject) {
        subject.set_ptr(self.cast());
    }

    fn load(subject: &Subject) -> Self {
        subject.ptr().cast()
    }
}

// =============================================================================
// State
// =============================================================================

/// A reactive value with inline storage.
///
/// Not `Clone`: two states sharing observers makes teardown ambiguous, and
/// the inline subject's address is load-bearing once observers exist.
pub struct State<T: StateValue> {
    subject: Subject,
    _marker: PhantomData<T>,
}

fn stateless_observer<T: StateValue, F: Fn(T) + Copy>(subject: &Subject, _entry: &ObserverEntry) {
    // SAFETY: registration proved F is zero-sized.
    let f: F = unsafe { crate::conjure::<F>() };
    f(T::load(subject));
}

fn bound_observer<O, T: StateValue, F: Fn(&mut O, T) + Copy>(
    subject: &Subject,
    entry: &ObserverEntry,
) {
    let target = entry.user_data().cast::<O>();
    // SAFETY: registration proved F zero-sized and vouched for `target`.
    let f: F = unsafe { crate::conjure::<F>() };
    f(unsafe { &mut *target }, T::load(subject));
}

impl<T: StateValue> State<T> {
    pub fn new(value: T) -> Self {
        Self {
            subject: match value.initial() {
                SubjectValue::Int(v) => Subject::new_int(v),
                SubjectValue::Ptr(p) => Subject::new_ptr(p),
                SubjectValue::Color(c) => Subject::new_color(c),
            },
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> T {
        T::load(&self.subject)
    }

    /// Write the value; observers run only if it actually changed.
    pub fn set(&self, value: T) {
        value.store(&self.subject);
    }

    /// Re-run every observer with the current value.
    pub fn notify(&self) {
        self.subject.notify();
    }

    /// The embedded engine subject, for binding helpers.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Observe with a stateless callable. Zero-sized callables only; the
    /// instance is never stored.
    pub fn observe<F>(&self, _f: F) -> ObserverId
    where
        F: Fn(T) + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "state observer captures state; bind an instance with `observe_bound`"
            )
        };
        self.subject
            .subscribe(stateless_observer::<T, F>, std::ptr::null_mut())
    }

    /// Observe with a callable bound to `target`.
    ///
    /// # Safety
    ///
    /// `target` must outlive the observer registration (unsubscribe, or
    /// drop this state, before it goes away) and must not move.
    pub unsafe fn observe_bound<O, F>(&self, target: NonNull<O>, _f: F) -> ObserverId
    where
        F: Fn(&mut O, T) + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "bound state observer must not capture state; \
                 move the state into the bound instance instead"
            )
        };
        self.subject
            .subscribe(bound_observer::<O, T, F>, target.as_ptr().cast())
    }

    /// Observe with a raw callback torn down when `widget` is deleted.
    pub fn observe_with_widget(
        &self,
        widget: impl Widget,
        cb: ObserverCb,
        user_data: *mut (),
    ) -> ObserverId {
        self.subject
            .subscribe_with_widget(cb, widget.raw(), user_data)
    }

    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.subject.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }
}

macro_rules! arithmetic_state {
    ($($t:ty),*) => {
        $(
            impl State<$t> {
                pub fn inc(&self) {
                    self.set(self.get().wrapping_add(1));
                }

                pub fn dec(&self) {
                    self.set(self.get().wrapping_sub(1));
                }
            }

            impl std::ops::AddAssign<$t> for State<$t> {
                fn add_assign(&mut self, rhs: $t) {
                    self.set(self.get().wrapping_add(rhs));
                }
            }

            impl std::ops::SubAssign<$t> for State<$t> {
                fn sub_assign(&mut self, rhs: $t) {
                    self.set(self.get().wrapping_sub(rhs));
                }
            }
        )*
    };
}

arithmetic_state!(i8, u8, i16, u16, i32, u32);

// =============================================================================
// StateCell
// =============================================================================

/// Reactive holder for arbitrary `Copy` values.
///
/// The value lives in an inline slot published to observers through the
/// subject's pointer variant. With no cheap equality on the wire,
/// [`set`](Self::set) notifies unconditionally.
pub struct StateCell<T: Copy + 'static> {
    slot: UnsafeCell<T>,
    subject: Subject,
}

fn cell_bound_observer<O, T: Copy + 'static, F: Fn(&mut O, T) + Copy>(
    subject: &Subject,
    entry: &ObserverEntry,
) {
    let target = entry.user_data().cast::<O>();
    // SAFETY: the subject's pointer was published from the cell's own slot,
    // and registration vouched for `target`.
    let value = unsafe { *subject.ptr().cast::<T>() };
    let f: F = unsafe { crate::conjure::<F>() };
    f(unsafe { &mut *target }, value);
}

impl<T: Copy + 'static> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: UnsafeCell::new(value),
            subject: Subject::new_ptr(std::ptr::null_mut()),
        }
    }

    pub fn get(&self) -> T {
        // SAFETY: single-threaded engine; no reference to the slot escapes.
        unsafe { *self.slot.get() }
    }

    /// Write and notify, change or not.
    pub fn set(&self, value: T) {
        // SAFETY: as in `get`; observers run after the write completes.
        unsafe { *self.slot.get() = value };
        self.publish_and_notify();
    }

    /// Re-run observers with the current value.
    pub fn notify(&self) {
        self.publish_and_notify();
    }

    fn publish_and_notify(&self) {
        self.subject.store(SubjectValue::Ptr(self.slot.get().cast()));
        self.subject.notify();
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Observe with a callable bound to `target`.
    ///
    /// # Safety
    ///
    /// Same contract as [`State::observe_bound`].
    pub unsafe fn observe_bound<O, F>(&self, target: NonNull<O>, _f: F) -> ObserverId
    where
        F: Fn(&mut O, T) + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "bound state observer must not capture state; \
                 move the state into the bound instance instead"
            )
        };
        self.subject
            .subscribe(cell_bound_observer::<O, T, F>, target.as_ptr().cast())
    }

    /// Observe with a raw callback torn down when `widget` is deleted.
    pub fn observe_with_widget(
        &self,
        widget: impl Widget,
        cb: ObserverCb,
        user_data: *mut (),
    ) -> ObserverId {
        self.subject
            .subscribe_with_widget(cb, widget.raw(), user_data)
    }

    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.subject.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use std::cell::Cell;

    thread_local! {
        static SEEN: Cell<i32> = const { Cell::new(0) };
        static CALLS: Cell<u32> = const { Cell::new(0) };
    }

    fn reset() {
        SEEN.with(|s| s.set(0));
        CALLS.with(|c| c.set(0));
    }

    #[test]
    fn set_notifies_on_change_only() {
        app::init();
        reset();
        let count = State::new(5i32);
        count.observe(|v| {
            SEEN.with(|s| s.set(v));
            CALLS.with(|c| c.set(c.get() + 1));
        });

        count.set(5);
        assert_eq!(CALLS.with(|c| c.get()), 0);
        count.set(9);
        assert_eq!((SEEN.with(|s| s.get()), CALLS.with(|c| c.get())), (9, 1));
    }

    #[test]
    fn arithmetic_forms() {
        app::init();
        reset();
        let mut count = State::new(0i32);
        count.inc();
        count += 4;
        count.dec();
        count -= 2;
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn bool_and_color_variants() {
        app::init();
        let flag = State::new(false);
        flag.set(true);
        assert!(flag.get());

        let tint = State::new(Color::hex(0x102030));
        tint.set(Color::hex(0x405060));
        assert_eq!(tint.get(), Color::hex(0x405060));
    }

    #[test]
    fn bound_observer_mutates_instance() {
        app::init();
        struct Tally {
            sum: i32,
        }
        let mut tally = Tally { sum: 0 };
        let count = State::new(0i32);
        // SAFETY: `tally` outlives the state in this scope... the state is
        // dropped first, taking the observer with it.
        unsafe {
            count.observe_bound(NonNull::from(&mut tally), |t: &mut Tally, v: i32| t.sum += v);
        }
        count.set(3);
        count.set(7);
        drop(count);
        assert_eq!(tally.sum, 10);
    }

    #[test]
    fn state_cell_notifies_unconditionally() {
        app::init();
        #[derive(Clone, Copy, PartialEq, Debug)]
        struct Point {
            x: i32,
            y: i32,
        }
        struct Sink {
            last: Option<Point>,
            calls: u32,
        }
        let mut sink = Sink { last: None, calls: 0 };
        let cell = StateCell::new(Point { x: 1, y: 2 });
        unsafe {
            cell.observe_bound(NonNull::from(&mut sink), |s: &mut Sink, p: Point| {
                s.last = Some(p);
                s.calls += 1;
            });
        }

        cell.set(Point { x: 1, y: 2 });
        cell.set(Point { x: 3, y: 4 });
        drop(cell);
        assert_eq!(sink.calls, 2);
        assert_eq!(sink.last, Some(Point { x: 3, y: 4 }));
    }
}
