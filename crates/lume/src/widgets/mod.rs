//! Derived widget handles.
//!
//! Each handle is a pointer-sized newtype over [`crate::Obj`] implementing
//! [`crate::Widget`], which pulls in the full mixin surface. The widget
//! classes here are representative; new ones follow the same three-line
//! pattern.

mod bar;
mod button;
mod label;
mod slider;
mod switch;

pub use bar::Bar;
pub use button::Button;
pub use label::Label;
pub use slider::Slider;
pub use switch::Switch;

macro_rules! widget_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(crate::Obj);

        impl crate::Widget for $name {
            fn raw(&self) -> lume_core::WidgetKey {
                self.0.raw()
            }

            fn from_obj(obj: crate::Obj) -> Self {
                Self(obj)
            }
        }
    };
}

pub(crate) use widget_handle;
