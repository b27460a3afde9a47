//! Fluent animation building and timelines.

use lume_core::anim::{self, AnimEventCb, AnimKey, AnimSpec, ExecCb, PathCb, TimelineKey};
use lume_core::style::{self, PropValue, Selector, StyleProp};
use lume_core::widget::{self, SizeSpec, WidgetKey};

use crate::mixins::Widget;

// Named exec callbacks. Each writes one visual property of the target.

fn exec_translate_x(w: WidgetKey, v: i32) {
    style::obj_set_local_prop(w, StyleProp::TranslateX, PropValue::Int(v), Selector::MAIN_DEFAULT);
}

fn exec_translate_y(w: WidgetKey, v: i32) {
    style::obj_set_local_prop(w, StyleProp::TranslateY, PropValue::Int(v), Selector::MAIN_DEFAULT);
}

fn exec_opacity(w: WidgetKey, v: i32) {
    style::obj_set_local_prop(w, StyleProp::Opa, PropValue::Int(v), Selector::MAIN_DEFAULT);
}

fn exec_rotation(w: WidgetKey, v: i32) {
    style::obj_set_local_prop(w, StyleProp::Rotation, PropValue::Int(v), Selector::MAIN_DEFAULT);
}

fn exec_scale(w: WidgetKey, v: i32) {
    style::obj_set_local_prop(w, StyleProp::Scale, PropValue::Int(v), Selector::MAIN_DEFAULT);
}

fn exec_width(w: WidgetKey, v: i32) {
    widget::set_width(w, SizeSpec::Px(v));
}

fn exec_height(w: WidgetKey, v: i32) {
    widget::set_height(w, SizeSpec::Px(v));
}

/// Builder over an animation description.
///
/// Configure, then [`start`](Self::start); or hand to
/// [`Timeline::add`] for composition. The builder is plain data and can be
/// reused.
#[derive(Clone)]
pub struct Anim {
    spec: AnimSpec,
}

impl Anim {
    pub fn new(target: impl Widget) -> Self {
        Self {
            spec: AnimSpec {
                target: target.raw(),
                ..AnimSpec::default()
            },
        }
    }

    pub fn values(mut self, start: i32, end: i32) -> Self {
        self.spec.start_value = start;
        self.spec.end_value = end;
        self
    }

    pub fn duration(mut self, ms: u32) -> Self {
        self.spec.duration = ms;
        self
    }

    pub fn delay(mut self, ms: u32) -> Self {
        self.spec.delay = ms;
        self
    }

    /// Custom easing path.
    pub fn path(mut self, path: PathCb) -> Self {
        self.spec.path = path;
        self
    }

    pub fn ease_in(self) -> Self {
        self.path(anim::path_ease_in)
    }

    pub fn ease_out(self) -> Self {
        self.path(anim::path_ease_out)
    }

    pub fn ease_in_out(self) -> Self {
        self.path(anim::path_ease_in_out)
    }

    pub fn overshoot(self) -> Self {
        self.path(anim::path_overshoot)
    }

    pub fn bounce(self) -> Self {
        self.path(anim::path_bounce)
    }

    pub fn step(self) -> Self {
        self.path(anim::path_step)
    }

    pub fn repeat(mut self, count: u32) -> Self {
        self.spec.repeat = count;
        self
    }

    pub fn repeat_infinite(mut self) -> Self {
        self.spec.repeat = anim::REPEAT_INFINITE;
        self
    }

    pub fn repeat_delay(mut self, ms: u32) -> Self {
        self.spec.repeat_delay = ms;
        self
    }

    /// Auto-reverse leg after each forward leg.
    pub fn playback(mut self, ms: u32) -> Self {
        self.spec.playback_duration = ms;
        self
    }

    /// Whether the start value is applied immediately, before any delay.
    pub fn early_apply(mut self, on: bool) -> Self {
        self.spec.early_apply = on;
        self
    }

    /// Custom value sink.
    pub fn exec(mut self, exec: ExecCb) -> Self {
        self.spec.exec = Some(exec);
        self
    }

    pub fn animate_translate_x(self) -> Self {
        self.exec(exec_translate_x)
    }

    pub fn animate_translate_y(self) -> Self {
        self.exec(exec_translate_y)
    }

    /// Animate whole-widget opacity (0..=255).
    pub fn animate_opacity(self) -> Self {
        self.exec(exec_opacity)
    }

    pub fn animate_width(self) -> Self {
        self.exec(exec_width)
    }

    pub fn animate_height(self) -> Self {
        self.exec(exec_height)
    }

    pub fn animate_rotation(self) -> Self {
        self.exec(exec_rotation)
    }

    pub fn animate_scale(self) -> Self {
        self.exec(exec_scale)
    }

    pub fn on_start(mut self, cb: AnimEventCb) -> Self {
        self.spec.on_start = Some(cb);
        self
    }

    pub fn on_complete(mut self, cb: AnimEventCb) -> Self {
        self.spec.on_complete = Some(cb);
        self
    }

    pub fn on_deleted(mut self, cb: AnimEventCb) -> Self {
        self.spec.on_deleted = Some(cb);
        self
    }

    pub fn user_data(mut self, data: *mut ()) -> Self {
        self.spec.user_data = data;
        self
    }

    pub(crate) fn spec(&self) -> &AnimSpec {
        &self.spec
    }

    /// Submit to the engine; the animation runs on its own from here.
    pub fn start(self) -> AnimHandle {
        AnimHandle {
            key: anim::start(self.spec),
        }
    }
}

/// Non-owning handle to a running animation.
///
/// Animations are fire-and-forget; the handle just allows queries and early
/// cancellation.
#[derive(Debug, Clone, Copy)]
pub struct AnimHandle {
    key: AnimKey,
}

impl AnimHandle {
    pub fn is_active(self) -> bool {
        anim::exists(self.key)
    }

    /// Current interpolated value, `None` once finished.
    pub fn value(self) -> Option<i32> {
        anim::current_value(self.key)
    }

    /// Stop early, firing the deleted notification. Returns whether the
    /// animation was still running.
    pub fn cancel(self) -> bool {
        anim::delete(self.key)
    }
}

/// Move-only owner of an engine timeline. One key wide; drop deletes the
/// timeline and whatever it still runs.
#[derive(Debug)]
pub struct Timeline {
    key: TimelineKey,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            key: anim::timeline_create(),
        }
    }

    /// Schedule `anim` to begin `start_offset_ms` into the timeline.
    pub fn add(&mut self, start_offset_ms: u32, anim: &Anim) -> &mut Self {
        anim::timeline_add(self.key, start_offset_ms, anim.spec().clone());
        self
    }

    /// Launch every scheduled animation; returns total play time in ms.
    pub fn start(&mut self) -> u32 {
        anim::timeline_start(self.key)
    }

    pub fn pause(&mut self) {
        anim::timeline_pause(self.key);
    }

    /// Play back to front on the next start.
    pub fn set_reverse(&mut self, reverse: bool) {
        anim::timeline_set_reverse(self.key, reverse);
    }

    pub fn set_repeat(&mut self, count: u32, delay_ms: u32) {
        anim::timeline_set_repeat(self.key, count, delay_ms);
    }

    /// Scrub to a fraction of total duration (0..=1024).
    pub fn set_progress(&mut self, progress: u16) {
        anim::timeline_set_progress(self.key, progress);
    }

    pub fn duration(&self) -> u32 {
        anim::timeline_duration(self.key)
    }

    /// Give up ownership without deleting the timeline.
    pub fn release(self) -> TimelineKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Timeline {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            anim::timeline_delete(self.key);
        }
    }
}
