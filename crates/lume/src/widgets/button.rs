//! Push button.

use lume_core::widget;
use lume_core::ObjFlag;

use crate::mixins::Widget;

super::widget_handle! {
    /// Clickable container. Sends `Clicked` on release by default; set
    /// [`checkable`](Button::checkable) to make it toggle `CHECKED` and
    /// send `ValueChanged` instead of acting momentarily.
    Button
}

impl Button {
    pub fn create(parent: impl Widget) -> Self {
        Self(crate::Obj::create(parent))
    }

    pub fn checkable(self, on: bool) -> Self {
        if on {
            widget::add_flag(self.raw(), ObjFlag::CHECKABLE);
        } else {
            widget::remove_flag(self.raw(), ObjFlag::CHECKABLE);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use crate::{Events, FlagState};
    use lume_core::{EventCode, ObjState};
    use std::cell::Cell;

    thread_local! {
        static TOGGLES: Cell<u32> = const { Cell::new(0) };
    }

    #[test]
    fn checkable_toggles_and_reports() {
        app::init();
        TOGGLES.with(|t| t.set(0));
        let b = Button::create(app::screen())
            .checkable(true)
            .on_value_changed(|_e| TOGGLES.with(|t| t.set(t.get() + 1)));

        b.send_event(EventCode::Clicked, std::ptr::null_mut());
        assert!(b.has_state(ObjState::CHECKED));
        b.send_event(EventCode::Clicked, std::ptr::null_mut());
        assert!(!b.has_state(ObjState::CHECKED));
        assert_eq!(TOGGLES.with(|t| t.get()), 2);
    }
}
