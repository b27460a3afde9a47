//! Progress bar.

use lume_core::widget;

use crate::mixins::Widget;

super::widget_handle! {
    /// Read-only value display over an inclusive range.
    Bar
}

impl Bar {
    pub fn create(parent: impl Widget) -> Self {
        let bar = Self(crate::Obj::create(parent));
        // Bars display; they do not take input.
        widget::remove_flag(bar.raw(), lume_core::ObjFlag::CLICKABLE);
        bar
    }

    pub fn range(self, min: i32, max: i32) -> Self {
        widget::set_range(self.raw(), min, max);
        self
    }

    pub fn value(self, value: i32) -> Self {
        widget::set_value(self.raw(), value);
        self
    }

    pub fn get_value(self) -> i32 {
        widget::value(self.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use crate::FlagState;
    use lume_core::ObjFlag;

    #[test]
    fn bars_are_not_clickable() {
        app::init();
        let b = Bar::create(app::screen()).range(0, 10).value(7);
        assert!(!b.has_flag(ObjFlag::CLICKABLE));
        assert_eq!(b.get_value(), 7);
    }
}
