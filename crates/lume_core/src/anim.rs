//! Value animations and timelines driven by the virtual clock.
//!
//! An animation interpolates an `i32` between two endpoints over a duration,
//! mapping elapsed time through an easing path and delivering each computed
//! value to an exec callback. Repeats, a reverse playback leg and start
//! delays are part of the cycle; progress is recomputed from absolute
//! virtual time on every [`crate::context::tick`], so animations stay
//! deterministic under test.
//!
//! Path callbacks return a factor scaled by 1024. Factors outside the
//! `0..=1024` range are legal and produce values outside the endpoint
//! interval (overshoot).

use slotmap::new_key_type;
use tracing::trace;

use crate::context::with_ui;
use crate::widget::WidgetKey;

/// Repeat count meaning "run until deleted".
pub const REPEAT_INFINITE: u32 = u32::MAX;

new_key_type! {
    /// Identity of a running animation.
    pub struct AnimKey;

    /// Identity of a timeline.
    pub struct TimelineKey;
}

/// Easing path: maps `(elapsed_ms, duration_ms)` to a factor scaled by 1024.
pub type PathCb = fn(u32, u32) -> i32;

/// Value sink: receives the animation target and the interpolated value.
pub type ExecCb = fn(WidgetKey, i32);

/// Lifecycle notification for an animation.
pub type AnimEventCb = fn(AnimKey, *mut ());

/// Full description of one animation. Plain data; [`start`] copies it into
/// the engine.
#[derive(Clone)]
pub struct AnimSpec {
    pub target: WidgetKey,
    pub exec: Option<ExecCb>,
    pub start_value: i32,
    pub end_value: i32,
    pub duration: u32,
    pub delay: u32,
    pub path: PathCb,
    /// Number of forward(+playback) cycles; [`REPEAT_INFINITE`] never ends.
    /// 0 is treated as 1.
    pub repeat: u32,
    /// Extra delay inserted between repeat cycles.
    pub repeat_delay: u32,
    /// Reverse leg duration after each forward leg; 0 disables playback.
    pub playback_duration: u32,
    /// Apply the start value immediately on start, before the delay elapses.
    pub early_apply: bool,
    pub on_start: Option<AnimEventCb>,
    pub on_complete: Option<AnimEventCb>,
    pub on_deleted: Option<AnimEventCb>,
    pub user_data: *mut (),
}

impl Default for AnimSpec {
    fn default() -> Self {
        Self {
            target: WidgetKey::default(),
            exec: None,
            start_value: 0,
            end_value: 100,
            duration: 0,
            delay: 0,
            path: path_linear,
            repeat: 1,
            repeat_delay: 0,
            playback_duration: 0,
            early_apply: true,
            on_start: None,
            on_complete: None,
            on_deleted: None,
            user_data: std::ptr::null_mut(),
        }
    }
}

impl AnimSpec {
    /// Wall time of one full cycle, the initial delay excluded.
    fn cycle_ms(&self) -> u64 {
        u64::from(self.duration) + u64::from(self.playback_duration)
    }
}

pub(crate) struct AnimNode {
    pub spec: AnimSpec,
    /// Virtual time the current cycle's delay began.
    pub cycle_start: u64,
    /// Delay in force for the current cycle (`spec.delay` first, then
    /// `spec.repeat_delay`).
    pub delay: u32,
    pub remaining: u32,
    pub started_fired: bool,
    pub early_applied: bool,
}

// =============================================================================
// Easing paths
// =============================================================================

fn factor_x(elapsed: u32, duration: u32) -> i64 {
    if duration == 0 || elapsed >= duration {
        return 1024;
    }
    // Round to nearest so midpoints land on exact values.
    (i64::from(elapsed) * 1024 + i64::from(duration) / 2) / i64::from(duration)
}

/// Constant velocity.
pub fn path_linear(elapsed: u32, duration: u32) -> i32 {
    factor_x(elapsed, duration) as i32
}

/// Cubic acceleration from rest.
pub fn path_ease_in(elapsed: u32, duration: u32) -> i32 {
    let x = factor_x(elapsed, duration);
    (x * x / 1024 * x / 1024) as i32
}

/// Cubic deceleration to rest.
pub fn path_ease_out(elapsed: u32, duration: u32) -> i32 {
    let y = 1024 - factor_x(elapsed, duration);
    (1024 - y * y / 1024 * y / 1024) as i32
}

/// Cubic acceleration then deceleration.
pub fn path_ease_in_out(elapsed: u32, duration: u32) -> i32 {
    let x = factor_x(elapsed, duration);
    if x < 512 {
        (4 * x * x / 1024 * x / 1024) as i32
    } else {
        let y = 1024 - x;
        (1024 - 4 * y * y / 1024 * y / 1024) as i32
    }
}

/// Decelerating path that passes the end value and settles back. Returns
/// factors above 1024 near the end of the run.
pub fn path_overshoot(elapsed: u32, duration: u32) -> i32 {
    // Back-ease-out with c = 1741/1024 (~1.70), fixed point.
    let y = factor_x(elapsed, duration) - 1024;
    (1024 + 2765 * y * y * y / (1024 * 1024 * 1024) + 1741 * y * y / (1024 * 1024)) as i32
}

/// Three diminishing bounces against the end value.
pub fn path_bounce(elapsed: u32, duration: u32) -> i32 {
    let x = factor_x(elapsed, duration);
    if x >= 1024 {
        return 1024;
    }
    // easeOutBounce, n1 = 7744/1024 (7.5625), segment bounds in 1/1024ths.
    let (shift, base) = if x < 372 {
        (0, 0)
    } else if x < 745 {
        (559, 768)
    } else if x < 931 {
        (838, 960)
    } else {
        (977, 1008)
    };
    let xs = x - shift;
    (7744 * xs * xs / (1024 * 1024) + base) as i32
}

/// Holds the start value, then jumps to the end value when time is up.
pub fn path_step(elapsed: u32, duration: u32) -> i32 {
    if elapsed >= duration {
        1024
    } else {
        0
    }
}

// =============================================================================
// Animation lifecycle
// =============================================================================

/// Copy `spec` into the engine and start it at the current virtual time.
pub fn start(spec: AnimSpec) -> AnimKey {
    let (key, early) = with_ui(|ui| {
        let now = ui.now;
        let delay = spec.delay;
        // A zero repeat count still runs one cycle; the countdown in
        // process() assumes remaining >= 1. REPEAT_INFINITE is unaffected.
        let remaining = spec.repeat.max(1);
        let early = if spec.early_apply && delay > 0 {
            spec.exec.map(|exec| (exec, spec.target, spec.start_value))
        } else {
            None
        };
        let key = ui.anims.insert(AnimNode {
            spec,
            cycle_start: now,
            delay,
            remaining,
            started_fired: false,
            early_applied: early.is_some(),
        });
        (key, early)
    });
    if let Some((exec, target, value)) = early {
        exec(target, value);
    }
    trace!(?key, "animation started");
    key
}

/// Delete an animation before it completes. Fires the `on_deleted`
/// notification. Returns whether the key was alive.
pub fn delete(key: AnimKey) -> bool {
    let deleted = with_ui(|ui| ui.anims.remove(key));
    match deleted {
        Some(node) => {
            if let Some(cb) = node.spec.on_deleted {
                cb(key, node.spec.user_data);
            }
            true
        }
        None => false,
    }
}

/// Drop every animation targeting one of `widgets`, with `on_deleted`
/// notifications. Called from widget deletion.
pub(crate) fn remove_for_widgets(widgets: &[WidgetKey]) {
    let dropped: Vec<(AnimKey, AnimNode)> = with_ui(|ui| {
        let doomed: Vec<AnimKey> = ui
            .anims
            .iter()
            .filter(|(_, n)| widgets.contains(&n.spec.target))
            .map(|(k, _)| k)
            .collect();
        doomed
            .into_iter()
            .filter_map(|k| ui.anims.remove(k).map(|n| (k, n)))
            .collect()
    });
    for (key, node) in dropped {
        if let Some(cb) = node.spec.on_deleted {
            cb(key, node.spec.user_data);
        }
    }
}

pub fn exists(key: AnimKey) -> bool {
    with_ui(|ui| ui.anims.contains_key(key))
}

/// Number of running animations.
pub fn count() -> usize {
    with_ui(|ui| ui.anims.len())
}

/// The value the animation holds at the current virtual time, or `None` for
/// a dead key.
pub fn current_value(key: AnimKey) -> Option<i32> {
    with_ui(|ui| {
        let node = ui.anims.get(key)?;
        Some(value_at(node, ui.now))
    })
}

fn interp(start: i32, end: i32, factor: i32) -> i32 {
    let num = i64::from(end - start) * i64::from(factor);
    let biased = if num >= 0 { num + 512 } else { num - 512 };
    (i64::from(start) + biased / 1024) as i32
}

fn value_at(node: &AnimNode, now: u64) -> i32 {
    let spec = &node.spec;
    let elapsed = now.saturating_sub(node.cycle_start);
    if elapsed < u64::from(node.delay) {
        return spec.start_value;
    }
    let t = elapsed - u64::from(node.delay);
    if t < u64::from(spec.duration) {
        let factor = (spec.path)(t as u32, spec.duration);
        return interp(spec.start_value, spec.end_value, factor);
    }
    let tp = t - u64::from(spec.duration);
    if spec.playback_duration > 0 && tp < u64::from(spec.playback_duration) {
        let factor = (spec.path)(tp as u32, spec.playback_duration);
        return interp(spec.end_value, spec.start_value, factor);
    }
    if spec.playback_duration > 0 {
        spec.start_value
    } else {
        spec.end_value
    }
}

/// Advance every animation, retire completed ones, and report the time until
/// the engine next needs to run (0 while anything is mid-flight).
pub(crate) fn process() -> u32 {
    struct Fire {
        key: AnimKey,
        exec: Option<(ExecCb, WidgetKey, i32)>,
        on_start: Option<(AnimEventCb, *mut ())>,
        on_complete: Option<(AnimEventCb, *mut ())>,
    }

    let fires: Vec<Fire> = with_ui(|ui| {
        let now = ui.now;
        let mut fires = Vec::new();
        let mut done = Vec::new();
        for (key, node) in ui.anims.iter_mut() {
            let elapsed = now.saturating_sub(node.cycle_start);
            if elapsed < u64::from(node.delay) {
                continue;
            }
            let mut fire = Fire {
                key,
                exec: None,
                on_start: None,
                on_complete: None,
            };
            if !node.started_fired {
                node.started_fired = true;
                if let Some(cb) = node.spec.on_start {
                    fire.on_start = Some((cb, node.spec.user_data));
                }
            }
            let cycle_end = u64::from(node.delay) + node.spec.cycle_ms();
            if elapsed >= cycle_end {
                // Cycle complete. Either rewind for the next repeat or
                // settle on the final value and retire.
                let final_value = if node.spec.playback_duration > 0 {
                    node.spec.start_value
                } else {
                    node.spec.end_value
                };
                if let Some(exec) = node.spec.exec {
                    fire.exec = Some((exec, node.spec.target, final_value));
                }
                if node.remaining != REPEAT_INFINITE {
                    node.remaining -= 1;
                }
                if node.remaining == 0 {
                    if let Some(cb) = node.spec.on_complete {
                        fire.on_complete = Some((cb, node.spec.user_data));
                    }
                    done.push(key);
                } else {
                    node.cycle_start = now;
                    node.delay = node.spec.repeat_delay;
                }
            } else if let Some(exec) = node.spec.exec {
                fire.exec = Some((exec, node.spec.target, value_at(node, now)));
            }
            fires.push(fire);
        }
        for key in done {
            ui.anims.remove(key);
        }
        fires
    });

    for fire in &fires {
        if let Some((cb, data)) = fire.on_start {
            cb(fire.key, data);
        }
        if let Some((exec, target, value)) = fire.exec {
            exec(target, value);
        }
        if let Some((cb, data)) = fire.on_complete {
            cb(fire.key, data);
        }
    }

    with_ui(|ui| {
        let now = ui.now;
        ui.anims
            .values()
            .map(|n| {
                let wake = n.cycle_start + u64::from(n.delay);
                wake.saturating_sub(now).min(u64::from(u32::MAX)) as u32
            })
            .min()
            .unwrap_or(u32::MAX)
    })
}

// =============================================================================
// Timelines
// =============================================================================

pub(crate) struct TimelineNode {
    pub entries: Vec<(u32, AnimSpec)>,
    pub reverse: bool,
    pub repeat: u32,
    pub repeat_delay: u32,
    /// Animations launched by the last `timeline_start`.
    pub running: Vec<AnimKey>,
    pub paused: bool,
}

/// Create an empty timeline.
pub fn timeline_create() -> TimelineKey {
    with_ui(|ui| {
        ui.timelines.insert(TimelineNode {
            entries: Vec::new(),
            reverse: false,
            repeat: 1,
            repeat_delay: 0,
            running: Vec::new(),
            paused: false,
        })
    })
}

/// Append an animation starting `start_offset_ms` into the timeline.
pub fn timeline_add(key: TimelineKey, start_offset_ms: u32, spec: AnimSpec) {
    with_ui(|ui| {
        if let Some(tl) = ui.timelines.get_mut(key) {
            tl.entries.push((start_offset_ms, spec));
        }
    });
}

/// Total play time of the timeline in milliseconds.
pub fn timeline_duration(key: TimelineKey) -> u32 {
    with_ui(|ui| {
        ui.timelines
            .get(key)
            .map(|tl| duration_of(&tl.entries))
            .unwrap_or(0)
    })
}

fn duration_of(entries: &[(u32, AnimSpec)]) -> u32 {
    entries
        .iter()
        .map(|(offset, spec)| {
            u64::from(*offset) + u64::from(spec.delay) + spec.cycle_ms()
        })
        .max()
        .unwrap_or(0)
        .min(u64::from(u32::MAX)) as u32
}

/// Launch every entry (offsets folded into each animation's delay) and
/// return the total play time. In reverse mode entries run back to front
/// with mirrored values.
pub fn timeline_start(key: TimelineKey) -> u32 {
    let specs: Vec<AnimSpec> = with_ui(|ui| {
        let Some(tl) = ui.timelines.get_mut(key) else {
            return Vec::new();
        };
        tl.paused = false;
        tl.running.clear();
        let total = duration_of(&tl.entries);
        let reverse = tl.reverse;
        let repeat = tl.repeat;
        let repeat_delay = tl.repeat_delay;
        tl.entries
            .iter()
            .map(|(offset, spec)| {
                let mut spec = spec.clone();
                if reverse {
                    std::mem::swap(&mut spec.start_value, &mut spec.end_value);
                    let end =
                        u64::from(*offset) + u64::from(spec.delay) + spec.cycle_ms();
                    spec.delay = (u64::from(total) - end.min(u64::from(total))) as u32
                        + spec.delay;
                } else {
                    spec.delay += *offset;
                }
                spec.repeat = repeat;
                spec.repeat_delay = repeat_delay;
                spec
            })
            .collect()
    });
    let mut running = Vec::with_capacity(specs.len());
    for spec in specs {
        running.push(start(spec));
    }
    with_ui(|ui| {
        let total = ui
            .timelines
            .get(key)
            .map(|tl| duration_of(&tl.entries))
            .unwrap_or(0);
        if let Some(tl) = ui.timelines.get_mut(key) {
            tl.running = running;
        }
        total
    })
}

/// Stop the timeline's running animations without notifications.
pub fn timeline_pause(key: TimelineKey) {
    let running = with_ui(|ui| {
        let Some(tl) = ui.timelines.get_mut(key) else {
            return Vec::new();
        };
        tl.paused = true;
        std::mem::take(&mut tl.running)
    });
    with_ui(|ui| {
        for anim in running {
            ui.anims.remove(anim);
        }
    });
}

/// Play the timeline back to front on the next start.
pub fn timeline_set_reverse(key: TimelineKey, reverse: bool) {
    with_ui(|ui| {
        if let Some(tl) = ui.timelines.get_mut(key) {
            tl.reverse = reverse;
        }
    });
}

/// Repeat count and inter-repeat delay applied to every entry on start.
pub fn timeline_set_repeat(key: TimelineKey, count: u32, delay_ms: u32) {
    with_ui(|ui| {
        if let Some(tl) = ui.timelines.get_mut(key) {
            tl.repeat = count;
            tl.repeat_delay = delay_ms;
        }
    });
}

/// Scrub the running timeline to `progress` (0..=1024 of total duration) by
/// shifting every running animation's base time.
pub fn timeline_set_progress(key: TimelineKey, progress: u16) {
    with_ui(|ui| {
        let now = ui.now;
        let Some(tl) = ui.timelines.get(key) else {
            return;
        };
        let total = duration_of(&tl.entries);
        let target_elapsed =
            u64::from(total) * u64::from(progress.min(1024)) / 1024;
        let running = tl.running.clone();
        for anim in running {
            if let Some(node) = ui.anims.get_mut(anim) {
                node.cycle_start = now.saturating_sub(target_elapsed);
            }
        }
    });
}

/// Delete a timeline and any animations it still runs (no notifications).
pub fn timeline_delete(key: TimelineKey) -> bool {
    with_ui(|ui| {
        let Some(tl) = ui.timelines.remove(key) else {
            return false;
        };
        for anim in tl.running {
            ui.anims.remove(anim);
        }
        true
    })
}
