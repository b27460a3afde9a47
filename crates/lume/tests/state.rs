//! Reactive state invariants: change detection, byte-compared colors, and
//! widget-tied observer teardown.

use std::cell::Cell;

use lume::prelude::*;
use lume_core::subject::{ObserverEntry, Subject};

thread_local! {
    static LAST: Cell<i32> = const { Cell::new(i32::MIN) };
    static CALLS: Cell<u32> = const { Cell::new(0) };
}

fn reset() {
    LAST.with(|l| l.set(i32::MIN));
    CALLS.with(|c| c.set(0));
}

#[test]
fn set_notifies_with_the_new_value_only_on_change() {
    lume::init();
    reset();
    let count = State::new(10i32);
    count.observe(|v| {
        LAST.with(|l| l.set(v));
        CALLS.with(|c| c.set(c.get() + 1));
    });

    count.set(10);
    assert_eq!(CALLS.with(|c| c.get()), 0);

    count.set(11);
    assert_eq!(LAST.with(|l| l.get()), 11);
    assert_eq!(CALLS.with(|c| c.get()), 1);

    count.set(11);
    assert_eq!(CALLS.with(|c| c.get()), 1);

    // Explicit notify re-fires with the current value.
    count.notify();
    assert_eq!(CALLS.with(|c| c.get()), 2);
}

#[test]
fn color_states_compare_by_bytes() {
    lume::init();
    reset();
    let tint = State::new(Color::rgb(10, 20, 30));
    tint.observe(|_c: Color| CALLS.with(|c| c.set(c.get() + 1)));

    tint.set(Color::rgb(10, 20, 30));
    assert_eq!(CALLS.with(|c| c.get()), 0);

    tint.set(Color::rgb(10, 20, 31));
    assert_eq!(CALLS.with(|c| c.get()), 1);
}

#[test]
fn widget_bound_observer_dies_with_the_widget() {
    lume::init();
    reset();

    fn observer(subject: &Subject, _entry: &ObserverEntry) {
        LAST.with(|l| l.set(subject.int()));
        CALLS.with(|c| c.set(c.get() + 1));
    }

    let value = State::new(0i32);
    let w = Obj::create(app::screen());
    value.observe_with_widget(w, observer, std::ptr::null_mut());
    assert_eq!(value.observer_count(), 1);

    value.set(5);
    assert_eq!(LAST.with(|l| l.get()), 5);

    w.delete();
    assert_eq!(value.observer_count(), 0);
    value.set(7);
    assert_eq!(CALLS.with(|c| c.get()), 1);
    assert_eq!(LAST.with(|l| l.get()), 5);
}

#[test]
fn label_binding_survives_only_as_long_as_the_label() {
    lume::init();

    let value = State::new(0i32);
    let label = Label::create(app::screen()).bind_text(&value, "{}");
    assert_eq!(label.get_text(), "0");

    value.set(5);
    assert_eq!(label.get_text(), "5");

    label.obj().delete();
    assert_eq!(value.observer_count(), 0);
    // No observer left to fire; this write touches nothing freed.
    value.set(7);
    assert_eq!(value.get(), 7);
}

#[test]
fn state_cell_carries_arbitrary_copy_types() {
    lume::init();

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Insets {
        top: i16,
        left: i16,
    }

    struct Sink {
        seen: u32,
        last: Option<Insets>,
    }
    let mut sink = Sink { seen: 0, last: None };

    let insets = StateCell::new(Insets { top: 1, left: 2 });
    // SAFETY: `sink` outlives the cell; the cell is dropped first below.
    unsafe {
        insets.observe_bound(
            std::ptr::NonNull::from(&mut sink),
            |s: &mut Sink, v: Insets| {
                s.seen += 1;
                s.last = Some(v);
            },
        );
    }

    // Identical value still notifies: no cheap equality for opaque types.
    insets.set(Insets { top: 1, left: 2 });
    insets.set(Insets { top: 3, left: 4 });
    drop(insets);

    assert_eq!(sink.seen, 2);
    assert_eq!(sink.last, Some(Insets { top: 3, left: 4 }));
}
