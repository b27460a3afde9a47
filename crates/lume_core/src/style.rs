//! Style descriptors and part/state selectors.
//!
//! A style is an arena-allocated list of property/value pairs. Widgets
//! reference styles by key (no copy) together with a [`Selector`] saying
//! which part and state the style applies to. Widgets additionally carry
//! local one-shot properties, which take precedence over attached styles.
//!
//! Selector packing: part in the low 16 bits, state in the high 16 bits.
//! The default selector is main part, default (empty) state.

use slotmap::new_key_type;
use tracing::trace;

use crate::context::{with_ui, Ui};
use crate::draw::Color;
use crate::event::{self, EventCode};
use crate::widget::{ObjState, WidgetKey};

new_key_type! {
    /// Identity of a style descriptor.
    pub struct StyleKey;
}

/// Widget subregion addressable for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Part {
    #[default]
    Main = 0,
    Scrollbar = 1,
    Indicator = 2,
    Knob = 3,
    Selected = 4,
    Items = 5,
    Cursor = 6,
}

/// Composite (part, state) key a style property applies under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector(u32);

impl Selector {
    /// Main part, default state.
    pub const MAIN_DEFAULT: Selector = Selector(0);

    pub const fn new(part: Part, state: ObjState) -> Self {
        Selector((part as u32) | ((state.bits() as u32) << 16))
    }

    pub const fn part_bits(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }

    pub fn state(self) -> ObjState {
        ObjState::from_bits_truncate((self.0 >> 16) as u16)
    }

    /// Whether this selector applies to `part` on a widget in `state`.
    pub fn applies(self, part: Part, state: ObjState) -> bool {
        self.part_bits() == part as u16 && state.contains(self.state())
    }
}

impl From<Part> for Selector {
    fn from(part: Part) -> Self {
        Selector::new(part, ObjState::empty())
    }
}

impl Default for Selector {
    fn default() -> Self {
        Selector::MAIN_DEFAULT
    }
}

/// Every style property the engine knows how to store and resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProp {
    Width,
    Height,
    X,
    Y,
    TranslateX,
    TranslateY,
    Rotation,
    Scale,
    Opa,
    BgColor,
    BgOpa,
    BorderColor,
    BorderWidth,
    BorderOpa,
    Radius,
    PadAll,
    PadRow,
    PadColumn,
    TextColor,
    TextOpa,
    TextLetterSpace,
    LineColor,
    LineWidth,
    ArcColor,
    ArcWidth,
}

/// A stored property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropValue {
    Int(i32),
    Color(Color),
    Ptr(*mut ()),
}

impl PropValue {
    pub fn int(self) -> i32 {
        match self {
            PropValue::Int(v) => v,
            other => panic!("style property is not an int: {other:?}"),
        }
    }

    pub fn color(self) -> Color {
        match self {
            PropValue::Color(c) => c,
            other => panic!("style property is not a color: {other:?}"),
        }
    }

    pub fn ptr(self) -> *mut () {
        match self {
            PropValue::Ptr(p) => p,
            other => panic!("style property is not a pointer: {other:?}"),
        }
    }
}

pub(crate) struct StyleNode {
    pub props: Vec<(StyleProp, PropValue)>,
}

// =============================================================================
// Style object lifecycle
// =============================================================================

/// Allocate an empty style descriptor.
pub fn create() -> StyleKey {
    with_ui(|ui| ui.styles.insert(StyleNode { props: Vec::new() }))
}

/// Free a style descriptor. Widgets still referencing it simply stop
/// resolving through it. Returns whether the key was alive.
pub fn delete(key: StyleKey) -> bool {
    with_ui(|ui| ui.styles.remove(key).is_some())
}

pub fn exists(key: StyleKey) -> bool {
    with_ui(|ui| ui.styles.contains_key(key))
}

/// Number of live style descriptors.
pub fn count() -> usize {
    with_ui(|ui| ui.styles.len())
}

/// Set (or replace) a property inside a style descriptor.
pub fn set_prop(key: StyleKey, prop: StyleProp, value: PropValue) {
    with_ui(|ui| {
        let Some(node) = ui.styles.get_mut(key) else {
            return;
        };
        if let Some(slot) = node.props.iter_mut().find(|(p, _)| *p == prop) {
            slot.1 = value;
        } else {
            node.props.push((prop, value));
        }
    });
}

pub fn prop(key: StyleKey, prop: StyleProp) -> Option<PropValue> {
    with_ui(|ui| {
        ui.styles
            .get(key)?
            .props
            .iter()
            .find(|(p, _)| *p == prop)
            .map(|(_, v)| *v)
    })
}

/// Notify widgets that a shared style changed after it was already in use.
///
/// Bumps the style generation and fires [`EventCode::StyleChanged`] on every
/// widget referencing `key`.
pub fn report_change(key: StyleKey) {
    let affected = with_ui(|ui| {
        ui.style_generation += 1;
        ui.widgets
            .iter()
            .filter(|(_, n)| n.styles.iter().any(|(s, _)| *s == key))
            .map(|(k, _)| k)
            .collect::<Vec<_>>()
    });
    trace!(count = affected.len(), "style change reported");
    for w in affected {
        event::dispatch_direct(w, EventCode::StyleChanged, std::ptr::null_mut());
    }
}

/// Current style generation (bumped by [`report_change`]).
pub fn generation() -> u64 {
    with_ui(|ui| ui.style_generation)
}

// =============================================================================
// Widget attachment and resolution
// =============================================================================

/// Attach a shared style to a widget under a selector. The widget stores the
/// key only; the style must stay alive while the widget uses it.
pub fn obj_add_style(w: WidgetKey, key: StyleKey, selector: Selector) {
    with_ui(|ui| {
        if let Some(node) = ui.widgets.get_mut(w) {
            node.styles.push((key, selector));
        }
    });
}

/// Detach every occurrence of `key` from `w`. Returns how many were removed.
pub fn obj_remove_style(w: WidgetKey, key: StyleKey) -> usize {
    with_ui(|ui| {
        let Some(node) = ui.widgets.get_mut(w) else {
            return 0;
        };
        let before = node.styles.len();
        node.styles.retain(|(s, _)| *s != key);
        before - node.styles.len()
    })
}

/// Set a local one-shot property directly on the widget.
pub fn obj_set_local_prop(w: WidgetKey, prop: StyleProp, value: PropValue, selector: Selector) {
    with_ui(|ui| {
        let Some(node) = ui.widgets.get_mut(w) else {
            return;
        };
        if let Some(slot) = node
            .local_props
            .iter_mut()
            .find(|(p, _, s)| *p == prop && *s == selector)
        {
            slot.1 = value;
        } else {
            node.local_props.push((prop, value, selector));
        }
    });
}

/// Resolve a property for `(w, part)` under the widget's current state:
/// local properties first, then attached styles, most recently added first.
pub fn resolved(w: WidgetKey, prop: StyleProp, part: Part) -> Option<PropValue> {
    with_ui(|ui| resolved_in(ui, w, prop, part))
}

pub(crate) fn resolved_in(ui: &Ui, w: WidgetKey, prop: StyleProp, part: Part) -> Option<PropValue> {
    let node = ui.widgets.get(w)?;
    let state = node.state;
    if let Some((_, v, _)) = node
        .local_props
        .iter()
        .rev()
        .find(|(p, _, sel)| *p == prop && sel.applies(part, state))
    {
        return Some(*v);
    }
    for (key, sel) in node.styles.iter().rev() {
        if !sel.applies(part, state) {
            continue;
        }
        if let Some(style) = ui.styles.get(*key) {
            if let Some((_, v)) = style.props.iter().find(|(p, _)| *p == prop) {
                return Some(*v);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::widget;

    #[test]
    fn selector_packing() {
        let sel = Selector::new(Part::Knob, ObjState::PRESSED);
        assert_eq!(sel.part_bits(), Part::Knob as u16);
        assert_eq!(sel.state(), ObjState::PRESSED);
        assert_eq!(Selector::MAIN_DEFAULT.part_bits(), 0);
        assert!(Selector::MAIN_DEFAULT.state().is_empty());
    }

    #[test]
    fn local_props_override_styles() {
        context::init();
        let w = widget::create(context::screen());
        let style = create();
        set_prop(style, StyleProp::BgColor, PropValue::Color(Color::rgb(1, 2, 3)));
        obj_add_style(w, style, Selector::MAIN_DEFAULT);
        assert_eq!(
            resolved(w, StyleProp::BgColor, Part::Main),
            Some(PropValue::Color(Color::rgb(1, 2, 3)))
        );

        obj_set_local_prop(
            w,
            StyleProp::BgColor,
            PropValue::Color(Color::rgb(9, 9, 9)),
            Selector::MAIN_DEFAULT,
        );
        assert_eq!(
            resolved(w, StyleProp::BgColor, Part::Main),
            Some(PropValue::Color(Color::rgb(9, 9, 9)))
        );
    }

    #[test]
    fn state_qualified_selector() {
        context::init();
        let w = widget::create(context::screen());
        obj_set_local_prop(
            w,
            StyleProp::BorderWidth,
            PropValue::Int(1),
            Selector::MAIN_DEFAULT,
        );
        obj_set_local_prop(
            w,
            StyleProp::BorderWidth,
            PropValue::Int(3),
            Selector::new(Part::Main, ObjState::PRESSED),
        );

        assert_eq!(
            resolved(w, StyleProp::BorderWidth, Part::Main),
            Some(PropValue::Int(1))
        );
        widget::add_state(w, ObjState::PRESSED);
        assert_eq!(
            resolved(w, StyleProp::BorderWidth, Part::Main),
            Some(PropValue::Int(3))
        );
    }

    #[test]
    fn shared_style_edit_is_visible_to_all_users() {
        context::init();
        let a = widget::create(context::screen());
        let b = widget::create(context::screen());
        let style = create();
        set_prop(style, StyleProp::Radius, PropValue::Int(4));
        obj_add_style(a, style, Selector::MAIN_DEFAULT);
        obj_add_style(b, style, Selector::MAIN_DEFAULT);

        set_prop(style, StyleProp::Radius, PropValue::Int(8));
        report_change(style);
        assert_eq!(resolved(a, StyleProp::Radius, Part::Main), Some(PropValue::Int(8)));
        assert_eq!(resolved(b, StyleProp::Radius, Part::Main), Some(PropValue::Int(8)));
    }

    #[test]
    fn part_scoping() {
        context::init();
        let w = widget::create(context::screen());
        obj_set_local_prop(
            w,
            StyleProp::BgColor,
            PropValue::Color(Color::rgb(0, 0, 0xFF)),
            Selector::from(Part::Indicator),
        );
        assert_eq!(resolved(w, StyleProp::BgColor, Part::Main), None);
        assert_eq!(
            resolved(w, StyleProp::BgColor, Part::Indicator),
            Some(PropValue::Color(Color::rgb(0, 0, 0xFF)))
        );
    }
}
