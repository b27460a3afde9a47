//! Owned shared styles.

use lume_core::style::{self, PropValue, StyleKey, StyleProp};
use lume_core::Color;

/// Move-only owner of an engine style descriptor.
///
/// Exactly one key wide. Widgets attach by reference
/// ([`crate::Styling::add_style`]) and store only the key, so a `Style`
/// must outlive every widget it is attached to; Rust's borrow on the
/// attachment call does not extend that far, the drop order does. Dropping
/// the `Style` deletes the descriptor; [`release`](Self::release) escapes
/// ownership instead.
#[derive(Debug)]
pub struct Style {
    key: StyleKey,
}

macro_rules! setters {
    ($( $(#[$doc:meta])* $name:ident => $prop:ident ),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, value: i32) -> &mut Self {
                self.set(StyleProp::$prop, PropValue::Int(value))
            }
        )*
    };
}

impl Style {
    /// Allocate an empty style descriptor.
    pub fn new() -> Self {
        Self { key: style::create() }
    }

    pub fn raw(&self) -> StyleKey {
        self.key
    }

    fn set(&mut self, prop: StyleProp, value: PropValue) -> &mut Self {
        style::set_prop(self.key, prop, value);
        self
    }

    setters! {
        width => Width,
        height => Height,
        x => X,
        y => Y,
        translate_x => TranslateX,
        translate_y => TranslateY,
        /// Rotation in 0.1 degree units.
        rotation => Rotation,
        /// Scale factor, 256 = 100%.
        scale => Scale,
        opa => Opa,
        bg_opa => BgOpa,
        border_width => BorderWidth,
        border_opa => BorderOpa,
        radius => Radius,
        pad_all => PadAll,
        pad_row => PadRow,
        pad_column => PadColumn,
        text_opa => TextOpa,
        text_letter_space => TextLetterSpace,
        line_width => LineWidth,
        arc_width => ArcWidth,
    }

    pub fn bg_color(&mut self, color: Color) -> &mut Self {
        self.set(StyleProp::BgColor, PropValue::Color(color))
    }

    pub fn border_color(&mut self, color: Color) -> &mut Self {
        self.set(StyleProp::BorderColor, PropValue::Color(color))
    }

    pub fn text_color(&mut self, color: Color) -> &mut Self {
        self.set(StyleProp::TextColor, PropValue::Color(color))
    }

    pub fn line_color(&mut self, color: Color) -> &mut Self {
        self.set(StyleProp::LineColor, PropValue::Color(color))
    }

    pub fn arc_color(&mut self, color: Color) -> &mut Self {
        self.set(StyleProp::ArcColor, PropValue::Color(color))
    }

    /// Read a property back.
    pub fn prop(&self, prop: StyleProp) -> Option<PropValue> {
        style::prop(self.key, prop)
    }

    /// Notify widgets already using this style that it changed.
    pub fn report_change(&self) {
        style::report_change(self.key);
    }

    /// Give up ownership without deleting the descriptor.
    pub fn release(self) -> StyleKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Style {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            style::delete(self.key);
        }
    }
}
