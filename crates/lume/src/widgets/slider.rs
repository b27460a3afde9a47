//! Value slider.

use lume_core::widget;

use crate::mixins::Widget;

super::widget_handle! {
    /// Draggable value selector over an inclusive range (default 0..=100).
    Slider
}

impl Slider {
    pub fn create(parent: impl Widget) -> Self {
        Self(crate::Obj::create(parent))
    }

    pub fn range(self, min: i32, max: i32) -> Self {
        widget::set_range(self.raw(), min, max);
        self
    }

    /// Set the value, clamped into the range. Does not fire `ValueChanged`;
    /// only user input does.
    pub fn value(self, value: i32) -> Self {
        widget::set_value(self.raw(), value);
        self
    }

    pub fn get_value(self) -> i32 {
        widget::value(self.raw())
    }

    pub fn get_range(self) -> (i32, i32) {
        widget::range(self.raw())
    }
}
