//! Widget tree: creation, deletion, hierarchy queries, flags, interaction
//! state, the user-data slot and geometry.
//!
//! Widgets are arena-allocated; a [`WidgetKey`] is the widget's identity for
//! the rest of its life. Deleting a widget cascades to its descendants,
//! releases their event descriptors and tears down their widget-bound
//! subject observers.

use std::ptr;

use bitflags::bitflags;
use slotmap::{new_key_type, Key};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::context::{with_ui, Ui};
use crate::event::{self, Descriptor, EventCode};
use crate::style::{PropValue, Selector, StyleKey, StyleProp};
use crate::subject::BoundObserver;

new_key_type! {
    /// Identity of a widget in the tree arena.
    pub struct WidgetKey;
}

bitflags! {
    /// Behavior switches carried by every widget.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ObjFlag: u32 {
        const HIDDEN           = 1 << 0;
        const CLICKABLE        = 1 << 1;
        const SCROLLABLE       = 1 << 2;
        const CHECKABLE        = 1 << 3;
        const EVENT_BUBBLE     = 1 << 4;
        const GESTURE_BUBBLE   = 1 << 5;
        const FLOATING         = 1 << 6;
        const IGNORE_LAYOUT    = 1 << 7;
        const OVERFLOW_VISIBLE = 1 << 8;
        const SNAPPABLE        = 1 << 9;
        const PRESS_LOCK       = 1 << 10;
        const CLICK_FOCUSABLE  = 1 << 11;
    }
}

bitflags! {
    /// Interaction state bits. Also usable as the state half of a style
    /// [`Selector`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ObjState: u16 {
        const CHECKED   = 1 << 0;
        const FOCUSED   = 1 << 1;
        const FOCUS_KEY = 1 << 2;
        const EDITED    = 1 << 3;
        const HOVERED   = 1 << 4;
        const PRESSED   = 1 << 5;
        const SCROLLED  = 1 << 6;
        const DISABLED  = 1 << 7;
    }
}

/// Per-axis size specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSpec {
    /// Fixed size in pixels.
    Px(i32),
    /// Percentage of the parent's resolved size.
    Pct(i32),
    /// Shrink-wrap to the children's extent.
    Content,
    /// Take the parent's full size.
    Fill,
}

/// Named anchor points for coarse alignment against the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// No alignment; the widget sits at its stored position.
    #[default]
    Default,
    TopLeft,
    TopMid,
    TopRight,
    LeftMid,
    Center,
    RightMid,
    BottomLeft,
    BottomMid,
    BottomRight,
}

pub(crate) struct WidgetNode {
    pub parent: Option<WidgetKey>,
    pub children: Vec<WidgetKey>,
    pub flags: ObjFlag,
    pub state: ObjState,
    /// The single caller/library storage slot.
    pub user_data: *mut (),
    pub x: i32,
    pub y: i32,
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub align: Align,
    pub align_x: i32,
    pub align_y: i32,
    pub scroll_x: i32,
    pub scroll_y: i32,
    /// One-shot local style properties, searched before attached styles.
    pub local_props: Vec<(StyleProp, PropValue, Selector)>,
    /// Attached shared styles, by reference; last added wins.
    pub styles: Vec<(StyleKey, Selector)>,
    pub descriptors: Vec<Descriptor>,
    pub next_desc_seq: u32,
    /// Observers to detach from their subjects when this widget dies.
    pub bound_observers: SmallVec<[BoundObserver; 2]>,
    // Widget-class payload. The engine keeps this flat rather than modeling
    // per-class structs; the binding layer projects the relevant accessors.
    pub text: String,
    pub value: i32,
    pub range: (i32, i32),
}

impl WidgetNode {
    fn new(parent: WidgetKey) -> Self {
        Self {
            parent: Some(parent),
            children: Vec::new(),
            flags: ObjFlag::CLICKABLE
                | ObjFlag::SCROLLABLE
                | ObjFlag::EVENT_BUBBLE
                | ObjFlag::CLICK_FOCUSABLE,
            state: ObjState::empty(),
            user_data: ptr::null_mut(),
            x: 0,
            y: 0,
            width: SizeSpec::Content,
            height: SizeSpec::Content,
            align: Align::Default,
            align_x: 0,
            align_y: 0,
            scroll_x: 0,
            scroll_y: 0,
            local_props: Vec::new(),
            styles: Vec::new(),
            descriptors: Vec::new(),
            next_desc_seq: 0,
            bound_observers: SmallVec::new(),
            text: String::new(),
            value: 0,
            range: (0, 100),
        }
    }

    pub(crate) fn screen(size: (i32, i32)) -> Self {
        let mut node = Self::new(WidgetKey::null());
        node.parent = None;
        node.flags = ObjFlag::empty();
        node.width = SizeSpec::Px(size.0);
        node.height = SizeSpec::Px(size.1);
        node
    }

    pub(crate) fn set_fixed_size(&mut self, width: i32, height: i32) {
        self.width = SizeSpec::Px(width);
        self.height = SizeSpec::Px(height);
    }
}

// =============================================================================
// Tree operations
// =============================================================================

/// Create a widget under `parent`.
///
/// Panics if `parent` is not a live widget (programmer error, per the
/// toolkit contract).
pub fn create(parent: WidgetKey) -> WidgetKey {
    let key = with_ui(|ui| {
        assert!(
            ui.widgets.contains_key(parent),
            "create: parent widget is not alive"
        );
        let key = ui.widgets.insert(WidgetNode::new(parent));
        if let Some(pn) = ui.widgets.get_mut(parent) {
            pn.children.push(key);
        }
        key
    });
    trace!(?key, ?parent, "widget created");
    key
}

/// Delete a widget and its whole subtree.
///
/// Fires [`EventCode::Delete`] on every widget in the subtree (parent first,
/// no bubbling), detaches widget-bound observers from their subjects, drops
/// animations targeting the subtree, removes the widgets from any focus
/// group, and frees the nodes. Deleting an already-dead key is a no-op.
pub fn delete(w: WidgetKey) {
    let subtree = with_ui(|ui| collect_subtree(ui, w));
    if subtree.is_empty() {
        return;
    }
    for &k in &subtree {
        event::dispatch_direct(k, EventCode::Delete, ptr::null_mut());
    }
    for &k in &subtree {
        let observers = with_ui(|ui| {
            ui.widgets
                .get_mut(k)
                .map(|n| std::mem::take(&mut n.bound_observers))
                .unwrap_or_default()
        });
        for bound in observers {
            // SAFETY: the subject outlives every widget its observers are
            // bound to; this is the documented contract of
            // `Subject::subscribe_with_widget`.
            unsafe { (*bound.subject).unsubscribe(bound.id) };
        }
    }
    crate::anim::remove_for_widgets(&subtree);
    with_ui(|ui| {
        if let Some(parent) = ui.widgets.get(w).and_then(|n| n.parent) {
            if let Some(pn) = ui.widgets.get_mut(parent) {
                pn.children.retain(|c| *c != w);
            }
        }
        for &k in &subtree {
            ui.widgets.remove(k);
            for (_, group) in ui.groups.iter_mut() {
                group.remove_widget(k);
            }
        }
    });
    debug!(?w, count = subtree.len(), "widget subtree deleted");
}

/// Whether `w` refers to a live widget.
pub fn exists(w: WidgetKey) -> bool {
    with_ui(|ui| ui.widgets.contains_key(w))
}

/// Number of live widgets, the screen included.
pub fn count() -> usize {
    with_ui(|ui| ui.widgets.len())
}

pub fn parent(w: WidgetKey) -> Option<WidgetKey> {
    with_ui(|ui| ui.widgets.get(w).and_then(|n| n.parent))
}

pub fn child_count(w: WidgetKey) -> usize {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.children.len()).unwrap_or(0))
}

pub fn child_at(w: WidgetKey, index: usize) -> Option<WidgetKey> {
    with_ui(|ui| ui.widgets.get(w).and_then(|n| n.children.get(index).copied()))
}

/// Position of `w` among its siblings.
pub fn index_of(w: WidgetKey) -> Option<usize> {
    with_ui(|ui| {
        let parent = ui.widgets.get(w)?.parent?;
        ui.widgets.get(parent)?.children.iter().position(|c| *c == w)
    })
}

pub fn is_descendant_of(w: WidgetKey, ancestor: WidgetKey) -> bool {
    with_ui(|ui| {
        let mut cur = ui.widgets.get(w).and_then(|n| n.parent);
        while let Some(k) = cur {
            if k == ancestor {
                return true;
            }
            cur = ui.widgets.get(k).and_then(|n| n.parent);
        }
        false
    })
}

/// Move `w` to the end of its parent's child list (drawn on top).
pub fn move_foreground(w: WidgetKey) {
    reorder(w, |len| len.saturating_sub(1));
}

/// Move `w` to the front of its parent's child list (drawn first).
pub fn move_background(w: WidgetKey) {
    reorder(w, |_| 0);
}

fn reorder(w: WidgetKey, target: impl FnOnce(usize) -> usize) {
    with_ui(|ui| {
        let Some(parent) = ui.widgets.get(w).and_then(|n| n.parent) else {
            return;
        };
        let Some(pn) = ui.widgets.get_mut(parent) else {
            return;
        };
        if let Some(pos) = pn.children.iter().position(|c| *c == w) {
            let child = pn.children.remove(pos);
            let idx = target(pn.children.len() + 1).min(pn.children.len());
            pn.children.insert(idx, child);
        }
    });
}

// =============================================================================
// Flags, state, user data
// =============================================================================

pub fn add_flag(w: WidgetKey, flag: ObjFlag) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.flags |= flag;
        }
    });
}

pub fn remove_flag(w: WidgetKey, flag: ObjFlag) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.flags &= !flag;
        }
    });
}

pub fn has_flag(w: WidgetKey, flag: ObjFlag) -> bool {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.flags.contains(flag)).unwrap_or(false))
}

pub fn add_state(w: WidgetKey, state: ObjState) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.state |= state;
        }
    });
}

pub fn remove_state(w: WidgetKey, state: ObjState) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.state &= !state;
        }
    });
}

pub fn has_state(w: WidgetKey, state: ObjState) -> bool {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.state.contains(state)).unwrap_or(false))
}

pub(crate) fn state(w: WidgetKey) -> ObjState {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.state).unwrap_or_default())
}

/// Store a raw pointer in the widget's user-data slot.
pub fn set_user_data(w: WidgetKey, data: *mut ()) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.user_data = data;
        }
    });
}

pub fn user_data(w: WidgetKey) -> *mut () {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.user_data).unwrap_or(ptr::null_mut()))
}

// =============================================================================
// Geometry
// =============================================================================

pub fn set_pos(w: WidgetKey, x: i32, y: i32) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.x = x;
            n.y = y;
            n.align = Align::Default;
        }
    });
}

pub fn set_width(w: WidgetKey, spec: SizeSpec) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.width = spec;
        }
    });
}

pub fn set_height(w: WidgetKey, spec: SizeSpec) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.height = spec;
        }
    });
}

/// Align `w` against its parent with pixel offsets.
pub fn align(w: WidgetKey, align: Align, x_ofs: i32, y_ofs: i32) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.align = align;
            n.align_x = x_ofs;
            n.align_y = y_ofs;
        }
    });
}

/// Resolved size in pixels.
pub fn size(w: WidgetKey) -> (i32, i32) {
    with_ui(|ui| (resolve_axis(ui, w, true), resolve_axis(ui, w, false)))
}

/// Bounding extent of the children (percentage/fill children contribute
/// nothing; they would recurse back into this computation).
pub fn content_size(w: WidgetKey) -> (i32, i32) {
    with_ui(|ui| (content_axis(ui, w, true), content_axis(ui, w, false)))
}

/// Resolved position relative to the parent, alignment applied.
pub fn pos(w: WidgetKey) -> (i32, i32) {
    with_ui(|ui| resolve_pos(ui, w))
}

pub fn set_scroll(w: WidgetKey, x: i32, y: i32) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.scroll_x = x;
            n.scroll_y = y;
        }
    });
}

pub fn scroll(w: WidgetKey) -> (i32, i32) {
    with_ui(|ui| ui.widgets.get(w).map(|n| (n.scroll_x, n.scroll_y)).unwrap_or((0, 0)))
}

/// Size minus padding on both axes.
pub fn client_area(w: WidgetKey) -> (i32, i32) {
    with_ui(|ui| {
        let (width, height) = (resolve_axis(ui, w, true), resolve_axis(ui, w, false));
        let pad = crate::style::resolved_in(ui, w, StyleProp::PadAll, crate::style::Part::Main)
            .map(|v| v.int())
            .unwrap_or(0);
        ((width - 2 * pad).max(0), (height - 2 * pad).max(0))
    })
}

fn parent_axis(ui: &Ui, parent: Option<WidgetKey>, horizontal: bool) -> i32 {
    match parent {
        Some(p) => resolve_axis(ui, p, horizontal),
        None => {
            if horizontal {
                ui.screen_size.0
            } else {
                ui.screen_size.1
            }
        }
    }
}

pub(crate) fn resolve_axis(ui: &Ui, w: WidgetKey, horizontal: bool) -> i32 {
    let Some(node) = ui.widgets.get(w) else {
        return 0;
    };
    let spec = if horizontal { node.width } else { node.height };
    match spec {
        SizeSpec::Px(v) => v,
        SizeSpec::Pct(p) => parent_axis(ui, node.parent, horizontal) * p / 100,
        SizeSpec::Fill => parent_axis(ui, node.parent, horizontal),
        SizeSpec::Content => content_axis(ui, w, horizontal),
    }
}

fn content_axis(ui: &Ui, w: WidgetKey, horizontal: bool) -> i32 {
    let Some(node) = ui.widgets.get(w) else {
        return 0;
    };
    let mut extent = 0;
    for &c in &node.children {
        let Some(cn) = ui.widgets.get(c) else {
            continue;
        };
        let spec = if horizontal { cn.width } else { cn.height };
        if matches!(spec, SizeSpec::Px(_) | SizeSpec::Content) {
            let sz = resolve_axis(ui, c, horizontal);
            let (cx, cy) = resolve_pos(ui, c);
            let off = if horizontal { cx } else { cy };
            extent = extent.max(off + sz);
        }
    }
    extent
}

pub(crate) fn resolve_pos(ui: &Ui, w: WidgetKey) -> (i32, i32) {
    let Some(node) = ui.widgets.get(w) else {
        return (0, 0);
    };
    if node.align == Align::Default {
        return (node.x, node.y);
    }
    let pw = parent_axis(ui, node.parent, true);
    let ph = parent_axis(ui, node.parent, false);
    let ow = resolve_axis(ui, w, true);
    let oh = resolve_axis(ui, w, false);
    let (bx, by) = match node.align {
        Align::Default => unreachable!(),
        Align::TopLeft => (0, 0),
        Align::TopMid => ((pw - ow) / 2, 0),
        Align::TopRight => (pw - ow, 0),
        Align::LeftMid => (0, (ph - oh) / 2),
        Align::Center => ((pw - ow) / 2, (ph - oh) / 2),
        Align::RightMid => (pw - ow, (ph - oh) / 2),
        Align::BottomLeft => (0, ph - oh),
        Align::BottomMid => ((pw - ow) / 2, ph - oh),
        Align::BottomRight => (pw - ow, ph - oh),
    };
    (bx + node.align_x, by + node.align_y)
}

// =============================================================================
// Widget-class payload
// =============================================================================

pub fn set_text(w: WidgetKey, text: &str) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.text.clear();
            n.text.push_str(text);
        }
    });
}

pub fn text(w: WidgetKey) -> String {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.text.clone()).unwrap_or_default())
}

/// Set the widget's value, clamped to its range.
pub fn set_value(w: WidgetKey, value: i32) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.value = value.clamp(n.range.0, n.range.1);
        }
    });
}

pub fn value(w: WidgetKey) -> i32 {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.value).unwrap_or(0))
}

pub fn set_range(w: WidgetKey, min: i32, max: i32) {
    with_ui(|ui| {
        if let Some(n) = ui.widgets.get_mut(w) {
            n.range = (min, max);
            n.value = n.value.clamp(min, max);
        }
    });
}

pub fn range(w: WidgetKey) -> (i32, i32) {
    with_ui(|ui| ui.widgets.get(w).map(|n| n.range).unwrap_or((0, 0)))
}

fn collect_subtree(ui: &Ui, w: WidgetKey) -> Vec<WidgetKey> {
    if !ui.widgets.contains_key(w) {
        return Vec::new();
    }
    let mut out = vec![w];
    let mut i = 0;
    while i < out.len() {
        if let Some(n) = ui.widgets.get(out[i]) {
            out.extend(n.children.iter().copied());
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;

    #[test]
    fn tree_create_delete_cascades() {
        context::init();
        let screen = context::screen();
        let a = create(screen);
        let b = create(a);
        let c = create(b);
        assert_eq!(child_count(a), 1);
        assert_eq!(parent(c), Some(b));
        assert!(is_descendant_of(c, a));
        assert!(!is_descendant_of(a, c));

        delete(a);
        assert!(!exists(a));
        assert!(!exists(b));
        assert!(!exists(c));
        assert_eq!(child_count(screen), 0);
    }

    #[test]
    fn sibling_order_and_zorder() {
        context::init();
        let screen = context::screen();
        let a = create(screen);
        let b = create(screen);
        let c = create(screen);
        assert_eq!(index_of(b), Some(1));

        move_foreground(a);
        assert_eq!(child_at(screen, 2), Some(a));
        move_background(c);
        assert_eq!(child_at(screen, 0), Some(c));
    }

    #[test]
    fn size_resolution() {
        context::init();
        let screen = context::screen();
        let outer = create(screen);
        set_width(outer, SizeSpec::Px(200));
        set_height(outer, SizeSpec::Px(100));
        let inner = create(outer);
        set_width(inner, SizeSpec::Pct(50));
        set_height(inner, SizeSpec::Fill);
        assert_eq!(size(inner), (100, 100));

        let wrap = create(screen);
        let child = create(wrap);
        set_pos(child, 10, 20);
        set_width(child, SizeSpec::Px(30));
        set_height(child, SizeSpec::Px(5));
        assert_eq!(size(wrap), (40, 25));
    }

    #[test]
    fn alignment_center() {
        context::init();
        let screen = context::screen();
        let outer = create(screen);
        set_width(outer, SizeSpec::Px(100));
        set_height(outer, SizeSpec::Px(100));
        let inner = create(outer);
        set_width(inner, SizeSpec::Px(20));
        set_height(inner, SizeSpec::Px(20));
        align(inner, Align::Center, 5, 0);
        assert_eq!(pos(inner), (45, 40));
    }

    #[test]
    fn flags_and_state_masks() {
        context::init();
        let w = create(context::screen());
        assert!(has_flag(w, ObjFlag::CLICKABLE));
        remove_flag(w, ObjFlag::CLICKABLE);
        assert!(!has_flag(w, ObjFlag::CLICKABLE));
        add_flag(w, ObjFlag::HIDDEN);
        assert!(has_flag(w, ObjFlag::HIDDEN));

        add_state(w, ObjState::CHECKED | ObjState::FOCUSED);
        assert!(has_state(w, ObjState::CHECKED));
        remove_state(w, ObjState::CHECKED);
        assert!(!has_state(w, ObjState::CHECKED));
        assert!(has_state(w, ObjState::FOCUSED));
    }
}
