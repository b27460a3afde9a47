//! Event registration shapes, dispatch accounting and bubbling control.

use std::cell::Cell;
use std::ptr::NonNull;

use lume::prelude::*;

thread_local! {
    static PARENT_HIT: Cell<bool> = const { Cell::new(false) };
    static CHILD_HIT: Cell<bool> = const { Cell::new(false) };
    static CALLS: Cell<u32> = const { Cell::new(0) };
}

fn reset() {
    PARENT_HIT.with(|f| f.set(false));
    CHILD_HIT.with(|f| f.set(false));
    CALLS.with(|c| c.set(0));
}

#[test]
fn stateless_shapes_fire_once_per_dispatch() {
    lume::init();
    reset();

    fn fn_item_handler(e: Event<'_>) {
        assert_eq!(e.code(), EventCode::Clicked);
        CALLS.with(|c| c.set(c.get() + 1));
    }

    let w = Obj::create(app::screen())
        .on_clicked(|e| {
            assert_eq!(e.code(), EventCode::Clicked);
            assert_eq!(e.target(), e.current_target());
            CALLS.with(|c| c.set(c.get() + 1));
        })
        .on_event(EventCode::Clicked, fn_item_handler);

    w.send_event(EventCode::Clicked, std::ptr::null_mut());
    assert_eq!(CALLS.with(|c| c.get()), 2);

    w.send_event(EventCode::Clicked, std::ptr::null_mut());
    assert_eq!(CALLS.with(|c| c.get()), 4);

    // A different code does not reach either handler.
    w.send_event(EventCode::Pressed, std::ptr::null_mut());
    assert_eq!(CALLS.with(|c| c.get()), 4);
}

#[test]
fn bound_shapes_deregister_with_the_widget() {
    lume::init();

    struct Model {
        clicks: u32,
        presses: u32,
        keys: u32,
    }
    let mut model = Model {
        clicks: 0,
        presses: 0,
        keys: 0,
    };
    let target = NonNull::from(&mut model);

    let w = Obj::create(app::screen());
    // SAFETY: `model` outlives the widget, which dies inside this test.
    unsafe {
        w.on_clicked_bound(target, |m: &mut Model, _e: Event<'_>| m.clicks += 1)
            .on_pressed_bound(target, |m: &mut Model, _e: Event<'_>| m.presses += 1)
            .on_key_bound(target, |m: &mut Model, _e: Event<'_>| m.keys += 1);
    }
    assert_eq!(w.event_cb_count(), 3);

    w.send_event(EventCode::Clicked, std::ptr::null_mut())
        .send_event(EventCode::Pressed, std::ptr::null_mut());

    w.delete();
    assert_eq!(w.event_cb_count(), 0);
    // Nothing left to dispatch to; the instance saw exactly the pre-delete
    // events.
    assert_eq!((model.clicks, model.presses, model.keys), (1, 1, 0));
}

#[test]
fn bubbling_and_stop_bubbling() {
    lume::init();
    reset();

    let parent = Obj::create(app::screen()).on_clicked(|_e| PARENT_HIT.with(|f| f.set(true)));
    let child = Obj::create(parent).on_clicked(|e| {
        CHILD_HIT.with(|f| f.set(true));
        e.stop_bubbling();
    });

    // Clicking the child runs its handler and stops the ascent.
    child.send_event(EventCode::Clicked, std::ptr::null_mut());
    assert!(CHILD_HIT.with(|f| f.get()));
    assert!(!PARENT_HIT.with(|f| f.get()));

    // Clicking the parent directly involves only the parent.
    reset();
    parent.send_event(EventCode::Clicked, std::ptr::null_mut());
    assert!(PARENT_HIT.with(|f| f.get()));
    assert!(!CHILD_HIT.with(|f| f.get()));
}

#[test]
fn events_bubble_when_not_stopped() {
    lume::init();
    reset();

    let parent = Obj::create(app::screen()).on_clicked(|e| {
        // While bubbling, the original target stays the child.
        assert_ne!(e.target(), e.current_target());
        PARENT_HIT.with(|f| f.set(true));
    });
    let child = Obj::create(parent).on_clicked(|_e| CHILD_HIT.with(|f| f.set(true)));

    child.send_event(EventCode::Clicked, std::ptr::null_mut());
    assert!(CHILD_HIT.with(|f| f.get()));
    assert!(PARENT_HIT.with(|f| f.get()));
}

#[test]
fn stop_processing_skips_later_descriptors_on_same_widget() {
    lume::init();
    reset();

    let w = Obj::create(app::screen())
        .on_clicked(|e| {
            CALLS.with(|c| c.set(c.get() + 1));
            e.stop_processing();
        })
        .on_clicked(|_e| CALLS.with(|c| c.set(c.get() + 100)));

    w.send_event(EventCode::Clicked, std::ptr::null_mut());
    assert_eq!(CALLS.with(|c| c.get()), 1);
}
