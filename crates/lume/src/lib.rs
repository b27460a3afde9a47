//! Zero-overhead fluent bindings over the `lume_core` widget engine.
//!
//! The engine speaks in arena keys, function pointers and `*mut ()` slots;
//! this crate projects that surface into typed, chainable Rust with no
//! per-widget allocation and no fat callbacks. The load-bearing pieces:
//!
//! - [`Obj`] and the mixin traits ([`Geometry`], [`Styling`], [`FlagState`],
//!   [`Events`]): pointer-sized `Copy` handles whose fluent setters return
//!   the concrete handle type, so chains never lose it.
//! - [`event::Event`]: a pointer-sized reader over the engine's raw event.
//!   Callback registration accepts only zero-sized callables (checked at
//!   compile time) or explicitly bound instances; either way the engine
//!   stores nothing but a plain function pointer and one user-data word.
//! - [`component::Component`]: composite widgets discoverable from any
//!   widget in their subtree through a magic-tagged, type-checked binding
//!   header.
//! - [`state::State`]: inline reactive values bridging to engine subjects.
//! - RAII owners ([`Style`], [`Timer`], [`Timeline`], [`Group`], [`File`],
//!   [`Dir`], [`DynFont`]) that are exactly one key wide and delete their
//!   engine object once, on drop.
//!
//! `size_checks` pins the zero-overhead claims with const assertions.

pub mod app;
pub mod anim;
pub mod component;
pub mod event;
pub mod fs;
pub mod group;
pub mod mixins;
pub mod obj;
mod size_checks;
pub mod snapshot;
pub mod state;
pub mod style;
pub mod timer;
pub mod widgets;
pub mod font;

pub use app::{deinit, init, run_while, screen, tick_once};
pub use anim::{Anim, AnimHandle, Timeline};
pub use component::{Component, ComponentCore, Mounted};
pub use event::{Event, Events};
pub use fs::{Dir, File};
pub use group::Group;
pub use mixins::{FlagState, Geometry, Styling, Widget};
pub use obj::Obj;
pub use snapshot::Snapshot;
pub use state::{State, StateCell, StateValue};
pub use style::Style;
pub use timer::Timer;
pub use widgets::{Bar, Button, Label, Slider, Switch};
pub use font::{DynFont, FontManager};

// The engine vocabulary shows through the binding surface on purpose.
pub use lume_core::{
    Align, Color, DrawBuffer, EventCode, FsMode, FsStatus, ObjFlag, ObjState, Part, Selector,
    Whence,
};

/// One-stop import for application code.
pub mod prelude {
    pub use crate::app::{self, run_while, tick_once};
    pub use crate::{
        Align, Anim, Bar, Button, Color, Component, ComponentCore, Dir, DynFont, Event,
        EventCode, Events, File, FlagState, FsMode, Geometry, Group, Label, Mounted, Obj,
        ObjFlag, ObjState, Part, Selector, Slider, Snapshot, State, StateCell, Style, Styling,
        Switch, Timeline, Timer, Widget,
    };
}

/// Materialize a zero-sized callable out of thin air.
///
/// Callers must have proven `F` is a ZST (the registration paths assert it
/// at compile time); a ZST has exactly one value, so this is sound.
pub(crate) unsafe fn conjure<F: Copy>() -> F {
    debug_assert_eq!(std::mem::size_of::<F>(), 0);
    unsafe { std::mem::MaybeUninit::<F>::uninit().assume_init() }
}
