//! Owned periodic timers.

use std::ptr::NonNull;

use lume_core::timer::{self, TimerCb, TimerKey};

/// Move-only owner of an engine timer. Exactly one key wide; drop deletes
/// the timer, [`release`](Self::release) escapes ownership.
#[derive(Debug)]
pub struct Timer {
    key: TimerKey,
}

fn stateless_tick<F: Fn() + Copy>(_key: TimerKey, _user_data: *mut ()) {
    // SAFETY: registration proved F is zero-sized.
    let f: F = unsafe { crate::conjure::<F>() };
    f();
}

fn bound_tick<T, F: Fn(&mut T) + Copy>(_key: TimerKey, user_data: *mut ()) {
    let target = user_data.cast::<T>();
    // SAFETY: registration proved F zero-sized and vouched for `target`.
    let f: F = unsafe { crate::conjure::<F>() };
    f(unsafe { &mut *target });
}

impl Timer {
    /// Fire a stateless callable every `period_ms` until dropped.
    ///
    /// Zero-sized callables only; captured state fails to compile. Bind an
    /// instance with [`periodic_bound`](Self::periodic_bound) instead.
    pub fn periodic<F>(period_ms: u32, _f: F) -> Self
    where
        F: Fn() + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "timer callback captures state; bind an instance with `periodic_bound`"
            )
        };
        Self {
            key: timer::create(period_ms, stateless_tick::<F>, std::ptr::null_mut()),
        }
    }

    /// Fire a callable bound to `target` every `period_ms`.
    ///
    /// # Safety
    ///
    /// `target` must outlive the timer and must not move.
    pub unsafe fn periodic_bound<T, F>(period_ms: u32, target: NonNull<T>, _f: F) -> Self
    where
        F: Fn(&mut T) + Copy,
    {
        const {
            assert!(
                std::mem::size_of::<F>() == 0,
                "bound timer callback must not capture state; \
                 move the state into the bound instance instead"
            )
        };
        Self {
            key: timer::create(period_ms, bound_tick::<T, F>, target.as_ptr().cast()),
        }
    }

    /// Register an engine-level callback unchanged.
    pub fn periodic_raw(period_ms: u32, cb: TimerCb, user_data: *mut ()) -> Self {
        Self {
            key: timer::create(period_ms, cb, user_data),
        }
    }

    /// Fire once after `delay_ms`, then retire.
    pub fn one_shot<F>(delay_ms: u32, f: F) -> Self
    where
        F: Fn() + Copy,
    {
        let t = Self::periodic(delay_ms, f);
        timer::set_repeat_count(t.key, 1);
        t
    }

    pub fn raw(&self) -> TimerKey {
        self.key
    }

    pub fn pause(&self) {
        timer::pause(self.key);
    }

    /// Resume a paused timer; the period restarts from now.
    pub fn resume(&self) {
        timer::resume(self.key);
    }

    /// Restart the current period from now.
    pub fn reset(&self) {
        timer::reset(self.key);
    }

    pub fn set_period(&self, period_ms: u32) {
        timer::set_period(self.key, period_ms);
    }

    /// Remaining fires before the timer retires itself.
    pub fn set_repeat(&self, count: u32) {
        timer::set_repeat_count(self.key, count);
    }

    /// Whether the engine still holds this timer (one-shots retire).
    pub fn is_active(&self) -> bool {
        timer::exists(self.key)
    }

    /// Give up ownership without deleting the timer.
    pub fn release(self) -> TimerKey {
        let key = self.key;
        std::mem::forget(self);
        key
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            timer::delete(self.key);
        }
    }
}
