//! Colors, draw buffers and subtree snapshots.
//!
//! The engine does not rasterize text or borders; [`snapshot`] renders the
//! resolved background rectangles of a widget subtree into an RGBA buffer,
//! which is enough for offscreen capture and for verifying style
//! resolution end to end.

use tracing::debug;

use crate::context::with_ui;
use crate::style::{self, Part, StyleProp};
use crate::widget::{self, ObjFlag, WidgetKey};

/// 24-bit RGB color. Byte-for-byte comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`.
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }
}

/// An owned RGBA8888 pixel buffer.
pub struct DrawBuffer {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

impl DrawBuffer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
        }
    }

    /// Pixel at `(x, y)` as `(r, g, b, a)`.
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y * self.width + x) * 4) as usize;
        (self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color, opa: u8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32);
        let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                let i = ((py as u32 * self.width + px as u32) * 4) as usize;
                self.data[i] = color.r;
                self.data[i + 1] = color.g;
                self.data[i + 2] = color.b;
                self.data[i + 3] = opa;
            }
        }
    }
}

/// Render the background rectangles of `w` and its visible descendants into
/// a fresh buffer sized to `w`. Returns `None` for a dead key or a widget
/// with an empty resolved size.
pub fn snapshot(w: WidgetKey) -> Option<DrawBuffer> {
    if !widget::exists(w) {
        return None;
    }
    let (width, height) = widget::size(w);
    if width <= 0 || height <= 0 {
        return None;
    }
    let mut buf = DrawBuffer::new(width as u32, height as u32);
    paint(w, 0, 0, &mut buf);
    debug!(?w, width, height, "snapshot rendered");
    Some(buf)
}

fn paint(w: WidgetKey, origin_x: i32, origin_y: i32, buf: &mut DrawBuffer) {
    if widget::has_flag(w, ObjFlag::HIDDEN) {
        return;
    }
    let (width, height) = widget::size(w);
    if let Some(color) = style::resolved(w, StyleProp::BgColor, Part::Main) {
        let opa = style::resolved(w, StyleProp::BgOpa, Part::Main)
            .map(|v| v.int().clamp(0, 255) as u8)
            .unwrap_or(255);
        if opa > 0 {
            buf.fill_rect(origin_x, origin_y, width, height, color.color(), opa);
        }
    }
    let children = with_ui(|ui| {
        ui.widgets
            .get(w)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    });
    for child in children {
        let (cx, cy) = widget::pos(child);
        paint(child, origin_x + cx, origin_y + cy, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context;
    use crate::style::{PropValue, Selector};
    use crate::widget::SizeSpec;

    #[test]
    fn color_packing() {
        assert_eq!(Color::hex(0x112233), Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(Color::hex(0xFFFFFF), Color::WHITE);
    }

    #[test]
    fn snapshot_paints_background_and_children() {
        context::init();
        let root = widget::create(context::screen());
        widget::set_width(root, SizeSpec::Px(10));
        widget::set_height(root, SizeSpec::Px(10));
        style::obj_set_local_prop(
            root,
            StyleProp::BgColor,
            PropValue::Color(Color::rgb(10, 20, 30)),
            Selector::MAIN_DEFAULT,
        );

        let child = widget::create(root);
        widget::set_width(child, SizeSpec::Px(4));
        widget::set_height(child, SizeSpec::Px(4));
        widget::set_pos(child, 6, 6);
        style::obj_set_local_prop(
            child,
            StyleProp::BgColor,
            PropValue::Color(Color::rgb(200, 0, 0)),
            Selector::MAIN_DEFAULT,
        );

        let buf = snapshot(root).expect("snapshot");
        assert_eq!((buf.width, buf.height), (10, 10));
        assert_eq!(buf.pixel(0, 0), (10, 20, 30, 255));
        assert_eq!(buf.pixel(7, 7), (200, 0, 0, 255));
    }

    #[test]
    fn hidden_children_are_skipped() {
        context::init();
        let root = widget::create(context::screen());
        widget::set_width(root, SizeSpec::Px(8));
        widget::set_height(root, SizeSpec::Px(8));

        let child = widget::create(root);
        widget::set_width(child, SizeSpec::Px(8));
        widget::set_height(child, SizeSpec::Px(8));
        style::obj_set_local_prop(
            child,
            StyleProp::BgColor,
            PropValue::Color(Color::WHITE),
            Selector::MAIN_DEFAULT,
        );
        widget::add_flag(child, ObjFlag::HIDDEN);

        let buf = snapshot(root).expect("snapshot");
        assert_eq!(buf.pixel(0, 0), (0, 0, 0, 0));
    }

    #[test]
    fn dead_key_snapshots_to_none() {
        context::init();
        let w = widget::create(context::screen());
        widget::delete(w);
        assert!(snapshot(w).is_none());
    }
}
