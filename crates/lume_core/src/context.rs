//! Thread-local engine context.
//!
//! Every arena the engine allocates from lives in a single [`Ui`] value
//! stored in a thread-local slot. [`init`] installs a fresh context (and a
//! screen root widget); [`deinit`] tears it down. [`tick`] is the
//! caller-driven pump: it advances the virtual clock, then runs due timers
//! and active animations, and reports how many milliseconds may pass before
//! the engine needs attention again.
//!
//! The clock is virtual: it only moves when [`tick`] is called. This keeps
//! timer and animation behavior deterministic under test.

use std::cell::RefCell;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use tracing::debug;

use crate::anim::{AnimKey, AnimNode, TimelineKey, TimelineNode};
use crate::font::{FontKey, FontNode};
use crate::fs::{DirKey, FileKey};
use crate::group::{GroupKey, GroupNode};
use crate::style::{StyleKey, StyleNode};
use crate::timer::{TimerKey, TimerNode};
use crate::widget::{WidgetKey, WidgetNode};

/// Default screen size installed by [`init`].
const DEFAULT_SCREEN_SIZE: (i32, i32) = (480, 320);

pub(crate) struct Ui {
    pub widgets: SlotMap<WidgetKey, WidgetNode>,
    pub styles: SlotMap<StyleKey, StyleNode>,
    pub timers: SlotMap<TimerKey, TimerNode>,
    pub anims: SlotMap<AnimKey, AnimNode>,
    pub timelines: SlotMap<TimelineKey, TimelineNode>,
    pub groups: SlotMap<GroupKey, GroupNode>,
    pub fonts: SlotMap<FontKey, FontNode>,
    pub files: SlotMap<FileKey, std::fs::File>,
    pub dirs: SlotMap<DirKey, std::fs::ReadDir>,
    /// Drive letter -> host directory backing that drive.
    pub drives: FxHashMap<char, PathBuf>,
    /// Path -> loaded font, for reference-counted sharing.
    pub font_cache: FxHashMap<String, FontKey>,
    /// Virtual clock, in milliseconds.
    pub now: u64,
    pub screen: WidgetKey,
    pub screen_size: (i32, i32),
    /// Bumped by `style::report_change`; readers use it to re-resolve.
    pub style_generation: u64,
}

impl Ui {
    fn new() -> Self {
        let mut widgets = SlotMap::with_key();
        let screen = widgets.insert(WidgetNode::screen(DEFAULT_SCREEN_SIZE));
        Self {
            widgets,
            styles: SlotMap::with_key(),
            timers: SlotMap::with_key(),
            anims: SlotMap::with_key(),
            timelines: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            fonts: SlotMap::with_key(),
            files: SlotMap::with_key(),
            dirs: SlotMap::with_key(),
            drives: FxHashMap::default(),
            font_cache: FxHashMap::default(),
            now: 0,
            screen,
            screen_size: DEFAULT_SCREEN_SIZE,
            style_generation: 0,
        }
    }
}

thread_local! {
    static UI: RefCell<Option<Ui>> = const { RefCell::new(None) };
}

/// Run `f` with mutable access to the thread-local context.
///
/// Panics if the context is not initialized, or if called re-entrantly while
/// another `with_ui` borrow is live. Engine internals therefore keep borrows
/// short and never invoke user callbacks while holding one.
pub(crate) fn with_ui<R>(f: impl FnOnce(&mut Ui) -> R) -> R {
    UI.with(|slot| {
        let mut slot = slot.borrow_mut();
        let ui = slot
            .as_mut()
            .expect("lume_core is not initialized; call lume_core::init() first");
        f(ui)
    })
}

/// Initialize the engine context for the current thread.
///
/// Creates the screen root widget. A second call replaces the previous
/// context wholesale, which makes per-test setup trivial.
pub fn init() {
    UI.with(|slot| {
        *slot.borrow_mut() = Some(Ui::new());
    });
    debug!("lume_core context initialized");
}

/// Tear down the engine context for the current thread.
pub fn deinit() {
    UI.with(|slot| {
        *slot.borrow_mut() = None;
    });
    debug!("lume_core context deinitialized");
}

/// Whether [`init`] has been called on this thread.
pub fn is_initialized() -> bool {
    UI.with(|slot| slot.borrow().is_some())
}

/// The screen root widget of the current context.
pub fn screen() -> WidgetKey {
    with_ui(|ui| ui.screen)
}

/// Resize the screen root.
pub fn set_screen_size(width: i32, height: i32) {
    with_ui(|ui| {
        ui.screen_size = (width, height);
        let screen = ui.screen;
        if let Some(node) = ui.widgets.get_mut(screen) {
            node.set_fixed_size(width, height);
        }
    });
}

/// Current virtual time in milliseconds.
pub fn now() -> u64 {
    with_ui(|ui| ui.now)
}

/// Advance the virtual clock by `elapsed_ms` and run everything that came
/// due: timers first, then animations. Returns the number of milliseconds
/// until the engine next needs attention (`u32::MAX` when idle).
pub fn tick(elapsed_ms: u32) -> u32 {
    with_ui(|ui| ui.now += u64::from(elapsed_ms));
    let timer_next = crate::timer::process();
    let anim_next = crate::anim::process();
    timer_next.min(anim_next)
}
