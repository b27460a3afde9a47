//! On/off switch.

use lume_core::widget;
use lume_core::{ObjFlag, ObjState};

use crate::mixins::Widget;

super::widget_handle! {
    /// Two-state toggle. Checkable by construction; clicking flips the
    /// `CHECKED` state and sends `ValueChanged`.
    Switch
}

impl Switch {
    pub fn create(parent: impl Widget) -> Self {
        let sw = Self(crate::Obj::create(parent));
        widget::add_flag(sw.raw(), ObjFlag::CHECKABLE);
        sw
    }

    pub fn on(self, on: bool) -> Self {
        if on {
            widget::add_state(self.raw(), ObjState::CHECKED);
        } else {
            widget::remove_state(self.raw(), ObjState::CHECKED);
        }
        self
    }

    pub fn is_on(self) -> bool {
        widget::has_state(self.raw(), ObjState::CHECKED)
    }
}
