//! Periodic timers driven by the virtual clock.
//!
//! Timers fire from [`crate::context::tick`], at most once per tick each, so
//! a long stall produces one late callback rather than a burst of catch-up
//! callbacks.

use slotmap::new_key_type;
use tracing::trace;

use crate::context::with_ui;

/// Repeat count meaning "fire forever".
pub const TIMER_REPEAT_INFINITE: u32 = u32::MAX;

new_key_type! {
    /// Identity of a timer.
    pub struct TimerKey;
}

/// Timer callback: receives the timer's own key and its user-data slot.
pub type TimerCb = fn(TimerKey, *mut ());

pub(crate) struct TimerNode {
    pub period: u32,
    /// Virtual time of the last fire (or creation).
    pub last_run: u64,
    /// Remaining fires; [`TIMER_REPEAT_INFINITE`] never decrements.
    pub repeat: u32,
    pub paused: bool,
    pub cb: TimerCb,
    pub user_data: *mut (),
}

/// Create a timer firing every `period_ms`, repeating forever until deleted.
pub fn create(period_ms: u32, cb: TimerCb, user_data: *mut ()) -> TimerKey {
    with_ui(|ui| {
        let now = ui.now;
        ui.timers.insert(TimerNode {
            period: period_ms,
            last_run: now,
            repeat: TIMER_REPEAT_INFINITE,
            paused: false,
            cb,
            user_data,
        })
    })
}

/// Delete a timer. Returns whether the key was alive.
pub fn delete(key: TimerKey) -> bool {
    with_ui(|ui| ui.timers.remove(key).is_some())
}

pub fn exists(key: TimerKey) -> bool {
    with_ui(|ui| ui.timers.contains_key(key))
}

/// Number of live timers.
pub fn count() -> usize {
    with_ui(|ui| ui.timers.len())
}

pub fn pause(key: TimerKey) {
    with_ui(|ui| {
        if let Some(t) = ui.timers.get_mut(key) {
            t.paused = true;
        }
    });
}

/// Resume a paused timer. The period restarts from the current time.
pub fn resume(key: TimerKey) {
    with_ui(|ui| {
        let now = ui.now;
        if let Some(t) = ui.timers.get_mut(key) {
            t.paused = false;
            t.last_run = now;
        }
    });
}

/// Restart the current period from now.
pub fn reset(key: TimerKey) {
    with_ui(|ui| {
        let now = ui.now;
        if let Some(t) = ui.timers.get_mut(key) {
            t.last_run = now;
        }
    });
}

pub fn set_period(key: TimerKey, period_ms: u32) {
    with_ui(|ui| {
        if let Some(t) = ui.timers.get_mut(key) {
            t.period = period_ms;
        }
    });
}

/// Limit how many more times the timer fires. The timer deletes itself once
/// the count reaches zero.
pub fn set_repeat_count(key: TimerKey, count: u32) {
    with_ui(|ui| {
        if let Some(t) = ui.timers.get_mut(key) {
            t.repeat = count;
        }
    });
}

pub fn set_user_data(key: TimerKey, user_data: *mut ()) {
    with_ui(|ui| {
        if let Some(t) = ui.timers.get_mut(key) {
            t.user_data = user_data;
        }
    });
}

/// Fire every due timer once, retire exhausted ones, and report the time in
/// milliseconds until the next timer comes due (`u32::MAX` if none).
pub(crate) fn process() -> u32 {
    // First pass under the borrow: advance timer state and snapshot the
    // callbacks to run. Callbacks run after the borrow is released so they
    // can freely create and delete timers.
    let due: Vec<(TimerKey, TimerCb, *mut ())> = with_ui(|ui| {
        let now = ui.now;
        let mut fired = Vec::new();
        let mut exhausted = Vec::new();
        for (key, t) in ui.timers.iter_mut() {
            if t.paused || t.repeat == 0 {
                continue;
            }
            if now >= t.last_run + u64::from(t.period) {
                t.last_run = now;
                if t.repeat != TIMER_REPEAT_INFINITE {
                    t.repeat -= 1;
                    if t.repeat == 0 {
                        exhausted.push(key);
                    }
                }
                fired.push((key, t.cb, t.user_data));
            }
        }
        for key in exhausted {
            ui.timers.remove(key);
        }
        fired
    });

    if !due.is_empty() {
        trace!(count = due.len(), "timers fired");
    }
    for (key, cb, user_data) in &due {
        cb(*key, *user_data);
    }

    with_ui(|ui| {
        let now = ui.now;
        ui.timers
            .values()
            .filter(|t| !t.paused && t.repeat != 0)
            .map(|t| {
                let due_at = t.last_run + u64::from(t.period);
                due_at.saturating_sub(now).min(u64::from(u32::MAX)) as u32
            })
            .min()
            .unwrap_or(u32::MAX)
    })
}
