//! Focus groups and key injection.
//!
//! A group is an ordered list of widgets sharing keyboard focus. Exactly
//! one member (or none) holds focus; moving focus fires `Defocused` on the
//! old member and `Focused` on the new one. [`send_key`] delivers a key
//! code to the focused member as a bubbling `Key` event.

use slotmap::new_key_type;
use tracing::{debug, trace};

use crate::context::with_ui;
use crate::event::{self, EventCode};
use crate::widget::WidgetKey;

new_key_type! {
    /// Identity of a focus group.
    pub struct GroupKey;
}

pub(crate) struct GroupNode {
    pub widgets: Vec<WidgetKey>,
    pub focused: Option<usize>,
    pub wrap: bool,
    pub editing: bool,
}

impl GroupNode {
    /// Drop `w` from the group, keeping the focus index coherent. Called
    /// from widget deletion.
    pub(crate) fn remove_widget(&mut self, w: WidgetKey) {
        let Some(pos) = self.widgets.iter().position(|x| *x == w) else {
            return;
        };
        self.widgets.remove(pos);
        self.focused = match self.focused {
            Some(f) if f == pos => None,
            Some(f) if f > pos => Some(f - 1),
            other => other,
        };
    }
}

/// Create an empty group with wrap-around navigation enabled.
pub fn create() -> GroupKey {
    with_ui(|ui| {
        ui.groups.insert(GroupNode {
            widgets: Vec::new(),
            focused: None,
            wrap: true,
            editing: false,
        })
    })
}

/// Delete a group. Member widgets are untouched. Returns whether the key
/// was alive.
pub fn delete(key: GroupKey) -> bool {
    with_ui(|ui| ui.groups.remove(key).is_some())
}

/// Number of live groups.
pub fn count() -> usize {
    with_ui(|ui| ui.groups.len())
}

/// Append `w` to the group's navigation order.
pub fn add_widget(key: GroupKey, w: WidgetKey) {
    with_ui(|ui| {
        if let Some(group) = ui.groups.get_mut(key) {
            group.widgets.push(w);
        }
    });
}

/// Remove `w` from the group. Focus is cleared if `w` held it.
pub fn remove_widget(key: GroupKey, w: WidgetKey) {
    with_ui(|ui| {
        if let Some(group) = ui.groups.get_mut(key) {
            group.remove_widget(w);
        }
    });
}

pub fn member_count(key: GroupKey) -> usize {
    with_ui(|ui| ui.groups.get(key).map(|g| g.widgets.len()).unwrap_or(0))
}

/// The widget currently holding focus.
pub fn focused(key: GroupKey) -> Option<WidgetKey> {
    with_ui(|ui| {
        let group = ui.groups.get(key)?;
        group.focused.map(|i| group.widgets[i])
    })
}

/// Whether focus wraps around past either end.
pub fn set_wrap(key: GroupKey, wrap: bool) {
    with_ui(|ui| {
        if let Some(group) = ui.groups.get_mut(key) {
            group.wrap = wrap;
        }
    });
}

/// Editing mode: navigation keys edit the focused widget instead of moving
/// focus. The engine only stores the flag; interpretation is up to widgets.
pub fn set_editing(key: GroupKey, editing: bool) {
    with_ui(|ui| {
        if let Some(group) = ui.groups.get_mut(key) {
            group.editing = editing;
        }
    });
}

pub fn editing(key: GroupKey) -> bool {
    with_ui(|ui| ui.groups.get(key).map(|g| g.editing).unwrap_or(false))
}

/// Move focus one step forward in the group order.
pub fn focus_next(key: GroupKey) -> Option<WidgetKey> {
    step_focus(key, 1)
}

/// Move focus one step backward in the group order.
pub fn focus_prev(key: GroupKey) -> Option<WidgetKey> {
    step_focus(key, -1)
}

fn step_focus(key: GroupKey, dir: i32) -> Option<WidgetKey> {
    let (old, new) = with_ui(|ui| {
        let group = ui.groups.get_mut(key)?;
        if group.widgets.is_empty() {
            return None;
        }
        let len = group.widgets.len() as i32;
        let old = group.focused;
        let next = match old {
            None => {
                if dir > 0 {
                    0
                } else {
                    len - 1
                }
            }
            Some(cur) => {
                let stepped = cur as i32 + dir;
                if (0..len).contains(&stepped) {
                    stepped
                } else if group.wrap {
                    (stepped + len) % len
                } else {
                    cur as i32
                }
            }
        } as usize;
        group.focused = Some(next);
        Some((old.map(|i| group.widgets[i]), group.widgets[next]))
    })?;
    announce_focus(old, Some(new));
    Some(new)
}

/// Give focus directly to `w`, which must be a member.
pub fn focus_widget(key: GroupKey, w: WidgetKey) -> bool {
    let change = with_ui(|ui| {
        let group = ui.groups.get_mut(key)?;
        let pos = group.widgets.iter().position(|x| *x == w)?;
        let old = group.focused.map(|i| group.widgets[i]);
        group.focused = Some(pos);
        Some(old)
    });
    match change {
        Some(old) => {
            if old != Some(w) {
                announce_focus(old, Some(w));
            }
            true
        }
        None => false,
    }
}

fn announce_focus(old: Option<WidgetKey>, new: Option<WidgetKey>) {
    trace!(?old, ?new, "focus moved");
    if let Some(old) = old {
        event::dispatch_direct(old, EventCode::Defocused, std::ptr::null_mut());
    }
    if let Some(new) = new {
        event::dispatch_direct(new, EventCode::Focused, std::ptr::null_mut());
    }
}

/// Deliver `key_code` to the focused widget as a bubbling [`EventCode::Key`]
/// event. The event's param points at the key code; the indev id is nonzero
/// to mark it as input-driven. Returns whether anything was focused.
pub fn send_key(key: GroupKey, key_code: u32) -> bool {
    let Some(target) = focused(key) else {
        debug!(?key, "send_key with nothing focused");
        return false;
    };
    let mut code = key_code;
    event::send_with_indev(
        target,
        EventCode::Key,
        (&mut code as *mut u32).cast(),
        1,
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::event::RawEvent;
    use crate::widget;
    use std::cell::Cell;

    thread_local! {
        static KEYS: Cell<u32> = const { Cell::new(0) };
        static FOCUS_EVENTS: Cell<u32> = const { Cell::new(0) };
    }

    fn three_members() -> (GroupKey, WidgetKey, WidgetKey, WidgetKey) {
        context::init();
        let g = create();
        let a = widget::create(context::screen());
        let b = widget::create(context::screen());
        let c = widget::create(context::screen());
        add_widget(g, a);
        add_widget(g, b);
        add_widget(g, c);
        (g, a, b, c)
    }

    #[test]
    fn next_prev_and_wrap() {
        let (g, a, b, c) = three_members();
        assert_eq!(focus_next(g), Some(a));
        assert_eq!(focus_next(g), Some(b));
        assert_eq!(focus_next(g), Some(c));
        assert_eq!(focus_next(g), Some(a));
        assert_eq!(focus_prev(g), Some(c));

        set_wrap(g, false);
        assert_eq!(focus_next(g), Some(c));
        assert_eq!(focused(g), Some(c));
    }

    #[test]
    fn focus_events_fire() {
        let (g, a, b, _c) = three_members();
        fn count_focus(event: &RawEvent) {
            FOCUS_EVENTS.with(|f| f.set(f.get() + 1));
            let _ = event;
        }
        FOCUS_EVENTS.with(|f| f.set(0));
        crate::event::add_event_cb(a, EventCode::Focused, count_focus, std::ptr::null_mut());
        crate::event::add_event_cb(a, EventCode::Defocused, count_focus, std::ptr::null_mut());
        crate::event::add_event_cb(b, EventCode::Focused, count_focus, std::ptr::null_mut());

        focus_widget(g, a);
        assert_eq!(FOCUS_EVENTS.with(|f| f.get()), 1);
        focus_next(g);
        assert_eq!(FOCUS_EVENTS.with(|f| f.get()), 3);
        assert_eq!(focused(g), Some(b));
    }

    #[test]
    fn deleting_focused_widget_clears_focus() {
        let (g, _a, b, _c) = three_members();
        focus_widget(g, b);
        widget::delete(b);
        assert_eq!(focused(g), None);
        assert_eq!(member_count(g), 2);
    }

    #[test]
    fn key_injection_reaches_focused_widget() {
        let (g, a, _b, _c) = three_members();
        fn on_key(event: &RawEvent) {
            assert_ne!(event.indev(), 0);
            let code = unsafe { *event.param().cast::<u32>() };
            KEYS.with(|k| k.set(code));
        }
        KEYS.with(|k| k.set(0));
        crate::event::add_event_cb(a, EventCode::Key, on_key, std::ptr::null_mut());

        assert!(!send_key(g, 13));
        focus_widget(g, a);
        assert!(send_key(g, 13));
        assert_eq!(KEYS.with(|k| k.get()), 13);
    }
}
