//! Application lifecycle helpers.
//!
//! The engine is cooperative: nothing moves unless the application pumps
//! [`tick_once`]. Time is virtual and advances only through the pump, which
//! keeps whole-app tests deterministic.

use tracing::debug;

use crate::obj::Obj;

/// Initialize the engine for the current thread. Calling again replaces the
/// previous context wholesale (widgets, styles, timers, everything).
pub fn init() {
    lume_core::init();
    debug!("lume initialized");
}

/// Tear the engine down. Handles held across this call go dead.
pub fn deinit() {
    lume_core::deinit();
}

/// The screen root widget.
pub fn screen() -> Obj {
    Obj::from_raw(lume_core::screen())
}

pub fn set_screen_size(width: i32, height: i32) {
    lume_core::set_screen_size(width, height);
}

/// Advance virtual time by `elapsed_ms` and run due timers and animations.
/// Returns the milliseconds until the engine next needs attention
/// (`u32::MAX` when idle).
pub fn tick_once(elapsed_ms: u32) -> u32 {
    lume_core::tick(elapsed_ms)
}

/// Pump in fixed steps while `keep_going` returns true.
///
/// Each iteration advances by `step_ms`. The predicate is checked before
/// every step, so `run_while(|| false, ..)` does nothing.
pub fn run_while(mut keep_going: impl FnMut() -> bool, step_ms: u32) {
    while keep_going() {
        tick_once(step_ms);
    }
}
