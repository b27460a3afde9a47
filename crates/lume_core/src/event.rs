//! Event descriptors and bubbling dispatch.
//!
//! Registration is C-ABI shaped: `(widget, code, fn pointer, user_data)`
//! yields a [`DescriptorId`]. Dispatch is synchronous. After the target's
//! descriptors run, the event climbs the ancestor chain as long as the
//! current widget carries [`ObjFlag::EVENT_BUBBLE`] and no callback stopped
//! bubbling. A callback can also stop processing, which skips the remaining
//! descriptors at its own level only.

use std::cell::Cell;
use std::ptr;

use tracing::trace;

use crate::context::with_ui;
use crate::widget::{self, ObjFlag, ObjState, WidgetKey};

/// Codes for every event the engine dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    /// Matches every code at dispatch time.
    All,
    Pressed,
    Pressing,
    PressLost,
    ShortClicked,
    SingleClicked,
    DoubleClicked,
    TripleClicked,
    LongPressed,
    LongPressedRepeat,
    Clicked,
    Released,
    ScrollBegin,
    ScrollEnd,
    Scroll,
    Gesture,
    Key,
    Focused,
    Defocused,
    Leave,
    HoverEnter,
    HoverLeave,
    ValueChanged,
    Refresh,
    Ready,
    Cancel,
    Delete,
    ChildChanged,
    SizeChanged,
    StyleChanged,
}

/// The raw event value passed to every registered callback.
///
/// Stop flags and the per-descriptor user-data slot are interior-mutable so
/// the same stack value can be shared down the whole dispatch chain.
pub struct RawEvent {
    target: WidgetKey,
    current_target: Cell<WidgetKey>,
    code: EventCode,
    user_data: Cell<*mut ()>,
    param: *mut (),
    indev: u32,
    stop_bubbling: Cell<bool>,
    stop_processing: Cell<bool>,
}

impl RawEvent {
    fn new(target: WidgetKey, code: EventCode, param: *mut (), indev: u32) -> Self {
        Self {
            target,
            current_target: Cell::new(target),
            code,
            user_data: Cell::new(ptr::null_mut()),
            param,
            indev,
            stop_bubbling: Cell::new(false),
            stop_processing: Cell::new(false),
        }
    }

    /// The widget the event was originally sent to.
    pub fn target(&self) -> WidgetKey {
        self.target
    }

    /// The widget whose descriptors are currently running (moves up the
    /// ancestor chain while bubbling).
    pub fn current_target(&self) -> WidgetKey {
        self.current_target.get()
    }

    pub fn code(&self) -> EventCode {
        self.code
    }

    /// User data of the descriptor currently being invoked.
    pub fn user_data(&self) -> *mut () {
        self.user_data.get()
    }

    /// The parameter passed to `send`.
    pub fn param(&self) -> *mut () {
        self.param
    }

    /// Originating input device id (0 when the event was sent by code).
    pub fn indev(&self) -> u32 {
        self.indev
    }

    /// Prevent ancestor dispatch.
    pub fn stop_bubbling(&self) {
        self.stop_bubbling.set(true);
    }

    /// Skip the remaining descriptors at the current level.
    pub fn stop_processing(&self) {
        self.stop_processing.set(true);
    }
}

/// Callback shape shared by every registration.
pub type EventCb = fn(&RawEvent);

/// Identity of one registration, scoped to its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorId {
    pub(crate) widget: WidgetKey,
    pub(crate) seq: u32,
}

pub(crate) struct Descriptor {
    pub seq: u32,
    pub code: EventCode,
    pub cb: EventCb,
    pub user_data: *mut (),
}

/// Register `cb` for `code` on `w`. Descriptors run in registration order.
pub fn add_event_cb(w: WidgetKey, code: EventCode, cb: EventCb, user_data: *mut ()) -> DescriptorId {
    with_ui(|ui| {
        let node = ui
            .widgets
            .get_mut(w)
            .expect("add_event_cb: widget is not alive");
        let seq = node.next_desc_seq;
        node.next_desc_seq += 1;
        node.descriptors.push(Descriptor {
            seq,
            code,
            cb,
            user_data,
        });
        DescriptorId { widget: w, seq }
    })
}

/// Remove one registration by its id. Returns whether anything was removed.
pub fn remove_event_cb(id: DescriptorId) -> bool {
    with_ui(|ui| {
        let Some(node) = ui.widgets.get_mut(id.widget) else {
            return false;
        };
        let before = node.descriptors.len();
        node.descriptors.retain(|d| d.seq != id.seq);
        node.descriptors.len() != before
    })
}

/// Remove the registration at `index` (registration order).
pub fn remove_event_cb_at(w: WidgetKey, index: usize) -> bool {
    with_ui(|ui| {
        let Some(node) = ui.widgets.get_mut(w) else {
            return false;
        };
        if index < node.descriptors.len() {
            node.descriptors.remove(index);
            true
        } else {
            false
        }
    })
}

/// Remove every registration whose callback is `cb`, regardless of user
/// data. Returns the number removed.
///
/// Matching is on function-pointer identity. When the same generated
/// trampoline serves multiple instances this removes all of them; the
/// behavior is inherited from the callback table layout and is not scoped
/// per instance.
pub fn remove_event_cbs_matching(w: WidgetKey, cb: EventCb) -> usize {
    with_ui(|ui| {
        let Some(node) = ui.widgets.get_mut(w) else {
            return 0;
        };
        let before = node.descriptors.len();
        node.descriptors.retain(|d| d.cb != cb);
        before - node.descriptors.len()
    })
}

/// Number of descriptors registered on `w`.
pub fn descriptor_count(w: WidgetKey) -> usize {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.descriptors.len()).unwrap_or(0))
}

/// Send `code` to `w` and let it bubble.
pub fn send(w: WidgetKey, code: EventCode, param: *mut ()) {
    send_with_indev(w, code, param, 0);
}

pub(crate) fn send_with_indev(target: WidgetKey, code: EventCode, param: *mut (), indev: u32) {
    if !widget::exists(target) {
        return;
    }
    trace!(?target, ?code, "event dispatch");
    let ev = RawEvent::new(target, code, param, indev);
    let mut current = target;
    loop {
        // Snapshot before invoking: callbacks may add or remove descriptors
        // or delete widgets under us.
        let Some((descs, bubbles)) = with_ui(|ui| {
            ui.widgets.get(current).map(|n| {
                let descs: Vec<(EventCb, *mut ())> = n
                    .descriptors
                    .iter()
                    .filter(|d| d.code == code || d.code == EventCode::All)
                    .map(|d| (d.cb, d.user_data))
                    .collect();
                (descs, n.flags.contains(ObjFlag::EVENT_BUBBLE))
            })
        }) else {
            break;
        };
        ev.current_target.set(current);
        for (cb, user_data) in descs {
            ev.user_data.set(user_data);
            cb(&ev);
            if ev.stop_processing.get() {
                ev.stop_processing.set(false);
                break;
            }
        }
        if ev.stop_bubbling.get() || !bubbles {
            break;
        }
        match with_ui(|ui| ui.widgets.get(current).and_then(|n| n.parent)) {
            Some(p) => current = p,
            None => break,
        }
    }

    // Checkable widgets toggle on click and report the change.
    if code == EventCode::Clicked
        && widget::has_flag(target, ObjFlag::CHECKABLE)
        && !widget::has_state(target, ObjState::DISABLED)
    {
        if widget::has_state(target, ObjState::CHECKED) {
            widget::remove_state(target, ObjState::CHECKED);
        } else {
            widget::add_state(target, ObjState::CHECKED);
        }
        send(target, EventCode::ValueChanged, ptr::null_mut());
    }
}

/// Dispatch on one widget only, no bubbling. Used for lifecycle events
/// (`Delete`, focus changes) that must not climb the tree.
pub(crate) fn dispatch_direct(w: WidgetKey, code: EventCode, param: *mut ()) {
    let Some(descs) = with_ui(|ui| {
        ui.widgets.get(w).map(|n| {
            n.descriptors
                .iter()
                .filter(|d| d.code == code || d.code == EventCode::All)
                .map(|d| (d.cb, d.user_data))
                .collect::<Vec<_>>()
        })
    }) else {
        return;
    };
    let ev = RawEvent::new(w, code, param, 0);
    for (cb, user_data) in descs {
        ev.user_data.set(user_data);
        cb(&ev);
        if ev.stop_processing.get() {
            break;
        }
    }
}
