//! Offscreen subtree capture.

use lume_core::{draw, DrawBuffer};

use crate::mixins::Widget;

/// Rasterized capture of a widget subtree.
pub struct Snapshot;

impl Snapshot {
    /// Render the widget's resolved background rectangles (and its visible
    /// descendants') into an owned RGBA buffer. `None` for dead handles or
    /// zero-sized widgets.
    pub fn take(widget: impl Widget) -> Option<DrawBuffer> {
        draw::snapshot(widget.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app;
    use crate::mixins::{Geometry, Styling};
    use crate::obj::Obj;
    use lume_core::Color;

    #[test]
    fn capture_reflects_background() {
        app::init();
        let w = Obj::create(app::screen())
            .size(4, 4)
            .bg_color(Color::hex(0xAA5500));
        let buf = Snapshot::take(w).expect("snapshot");
        assert_eq!(buf.pixel(2, 2), (0xAA, 0x55, 0x00, 255));
    }
}
