//! Configuration mixins shared by every widget handle.
//!
//! [`Widget`] is the one-method seam: any pointer-sized handle that can
//! produce its engine key picks up [`Geometry`], [`Styling`] and
//! [`FlagState`] (and [`crate::Events`]) through blanket impls. Setters take
//! and return `Self` by value, so a chain started on a derived handle stays
//! that handle:
//!
//! ```
//! use lume::prelude::*;
//!
//! lume::init();
//! let slider = Slider::create(app::screen())
//!     .width(200)
//!     .height(20)
//!     .center()
//!     .range(0, 50);
//! # let _ = slider;
//! ```

use lume_core::style::{self, Part, PropValue, Selector, StyleProp};
use lume_core::widget::{self, Align, ObjFlag, ObjState, SizeSpec};
use lume_core::{Color, WidgetKey};

use crate::obj::Obj;
use crate::style::Style;

/// The seam every widget handle implements.
///
/// Implementors must be pointer-sized aliases of an engine widget; all
/// behavior arrives through the mixin traits.
pub trait Widget: Copy + 'static {
    fn raw(&self) -> WidgetKey;

    /// Reinterpret a base handle as this handle type. No engine check; the
    /// caller vouches the widget is of the right class.
    fn from_obj(obj: Obj) -> Self;

    /// View as the base handle.
    fn obj(&self) -> Obj {
        Obj::from_raw(self.raw())
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Position, sizing and alignment.
pub trait Geometry: Widget {
    fn width(self, px: i32) -> Self {
        widget::set_width(self.raw(), SizeSpec::Px(px));
        self
    }

    fn height(self, px: i32) -> Self {
        widget::set_height(self.raw(), SizeSpec::Px(px));
        self
    }

    /// Percentage of the parent's content width.
    fn width_pct(self, pct: i32) -> Self {
        widget::set_width(self.raw(), SizeSpec::Pct(pct));
        self
    }

    fn height_pct(self, pct: i32) -> Self {
        widget::set_height(self.raw(), SizeSpec::Pct(pct));
        self
    }

    fn size(self, width_px: i32, height_px: i32) -> Self {
        self.width(width_px).height(height_px)
    }

    /// Shrink-wrap both axes around the children.
    fn size_content(self) -> Self {
        widget::set_width(self.raw(), SizeSpec::Content);
        widget::set_height(self.raw(), SizeSpec::Content);
        self
    }

    /// Fill the parent's content area on both axes.
    fn fill(self) -> Self {
        widget::set_width(self.raw(), SizeSpec::Fill);
        widget::set_height(self.raw(), SizeSpec::Fill);
        self
    }

    fn pos(self, x: i32, y: i32) -> Self {
        widget::set_pos(self.raw(), x, y);
        self
    }

    fn align(self, align: Align, x_ofs: i32, y_ofs: i32) -> Self {
        widget::align(self.raw(), align, x_ofs, y_ofs);
        self
    }

    fn center(self) -> Self {
        self.align(Align::Center, 0, 0)
    }

    /// Resolved size in pixels.
    fn resolved_size(self) -> (i32, i32) {
        widget::size(self.raw())
    }

    /// Resolved position relative to the parent, alignment applied.
    fn resolved_pos(self) -> (i32, i32) {
        widget::pos(self.raw())
    }

    fn scroll_to(self, x: i32, y: i32) -> Self {
        widget::set_scroll(self.raw(), x, y);
        self
    }

    fn scroll_pos(self) -> (i32, i32) {
        widget::scroll(self.raw())
    }
}

impl<W: Widget> Geometry for W {}

// =============================================================================
// Styling
// =============================================================================

macro_rules! local_props {
    ($( $(#[$doc:meta])* $name:ident, $name_sel:ident, $prop:ident, int );* $(;)?) => {
        $(
            $(#[$doc])*
            fn $name(self, value: i32) -> Self {
                self.$name_sel(value, Selector::MAIN_DEFAULT)
            }

            fn $name_sel(self, value: i32, selector: Selector) -> Self {
                style::obj_set_local_prop(self.raw(), StyleProp::$prop, PropValue::Int(value), selector);
                self
            }
        )*
    };
    ($( $(#[$doc:meta])* $name:ident, $name_sel:ident, $prop:ident, color );* $(;)?) => {
        $(
            $(#[$doc])*
            fn $name(self, value: Color) -> Self {
                self.$name_sel(value, Selector::MAIN_DEFAULT)
            }

            fn $name_sel(self, value: Color, selector: Selector) -> Self {
                style::obj_set_local_prop(self.raw(), StyleProp::$prop, PropValue::Color(value), selector);
                self
            }
        )*
    };
}

/// One-shot local style properties and shared style attachment.
///
/// Every setter exists twice: the short form targets the main part in the
/// default state, the `_sel` form takes an explicit [`Selector`].
pub trait Styling: Widget {
    local_props! {
        bg_color, bg_color_sel, BgColor, color;
        border_color, border_color_sel, BorderColor, color;
        text_color, text_color_sel, TextColor, color;
        line_color, line_color_sel, LineColor, color;
        arc_color, arc_color_sel, ArcColor, color;
    }

    local_props! {
        /// Whole-widget opacity, 0..=255.
        opa, opa_sel, Opa, int;
        bg_opa, bg_opa_sel, BgOpa, int;
        border_width, border_width_sel, BorderWidth, int;
        border_opa, border_opa_sel, BorderOpa, int;
        radius, radius_sel, Radius, int;
        pad_all, pad_all_sel, PadAll, int;
        pad_row, pad_row_sel, PadRow, int;
        pad_column, pad_column_sel, PadColumn, int;
        text_opa, text_opa_sel, TextOpa, int;
        text_letter_space, text_letter_space_sel, TextLetterSpace, int;
        line_width, line_width_sel, LineWidth, int;
        arc_width, arc_width_sel, ArcWidth, int;
        translate_x, translate_x_sel, TranslateX, int;
        translate_y, translate_y_sel, TranslateY, int;
        /// Rotation in 0.1 degree units.
        rotation, rotation_sel, Rotation, int;
        /// Scale factor, 256 = 100%.
        scale, scale_sel, Scale, int;
    }

    /// Attach a shared style by reference. The style must outlive every
    /// widget it is attached to; the widget stores only the key.
    fn add_style(self, style: &Style, selector: Selector) -> Self {
        style::obj_add_style(self.raw(), style.raw(), selector);
        self
    }

    /// Detach every occurrence of a shared style.
    fn remove_style(self, style: &Style) -> Self {
        style::obj_remove_style(self.raw(), style.raw());
        self
    }

    /// Resolve a property for this widget's current state.
    fn resolved_prop(self, prop: StyleProp, part: Part) -> Option<PropValue> {
        style::resolved(self.raw(), prop, part)
    }
}

impl<W: Widget> Styling for W {}

// =============================================================================
// Flags and interaction state
// =============================================================================

/// Behavior flags and interaction state bits.
pub trait FlagState: Widget {
    fn add_flag(self, flag: ObjFlag) -> Self {
        widget::add_flag(self.raw(), flag);
        self
    }

    fn clear_flag(self, flag: ObjFlag) -> Self {
        widget::remove_flag(self.raw(), flag);
        self
    }

    fn has_flag(self, flag: ObjFlag) -> bool {
        widget::has_flag(self.raw(), flag)
    }

    fn add_state(self, state: ObjState) -> Self {
        widget::add_state(self.raw(), state);
        self
    }

    fn clear_state(self, state: ObjState) -> Self {
        widget::remove_state(self.raw(), state);
        self
    }

    fn has_state(self, state: ObjState) -> bool {
        widget::has_state(self.raw(), state)
    }

    fn hidden(self, hidden: bool) -> Self {
        if hidden {
            self.add_flag(ObjFlag::HIDDEN)
        } else {
            self.clear_flag(ObjFlag::HIDDEN)
        }
    }

    fn clickable(self, clickable: bool) -> Self {
        if clickable {
            self.add_flag(ObjFlag::CLICKABLE)
        } else {
            self.clear_flag(ObjFlag::CLICKABLE)
        }
    }

    fn disabled(self, disabled: bool) -> Self {
        if disabled {
            self.add_state(ObjState::DISABLED)
        } else {
            self.clear_state(ObjState::DISABLED)
        }
    }

    fn is_checked(self) -> bool {
        self.has_state(ObjState::CHECKED)
    }
}

impl<W: Widget> FlagState for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;

    #[test]
    fn chains_preserve_geometry_and_style() {
        app::init();
        let w = Obj::create(app::screen())
            .size(120, 40)
            .pos(5, 6)
            .bg_color(Color::hex(0x336699))
            .radius(8)
            .hidden(true);

        assert_eq!(w.resolved_size(), (120, 40));
        assert_eq!(w.resolved_pos(), (5, 6));
        assert!(w.has_flag(ObjFlag::HIDDEN));
        assert_eq!(
            w.resolved_prop(StyleProp::Radius, Part::Main),
            Some(PropValue::Int(8))
        );
    }

    #[test]
    fn selector_form_targets_state() {
        app::init();
        let w = Obj::create(app::screen())
            .border_width(1)
            .border_width_sel(3, Selector::new(Part::Main, ObjState::PRESSED));

        assert_eq!(
            w.resolved_prop(StyleProp::BorderWidth, Part::Main),
            Some(PropValue::Int(1))
        );
        w.add_state(ObjState::PRESSED);
        assert_eq!(
            w.resolved_prop(StyleProp::BorderWidth, Part::Main),
            Some(PropValue::Int(3))
        );
    }
}
