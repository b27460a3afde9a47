//! Retained-mode widget toolkit engine.
//!
//! `lume_core` is the engine underneath the `lume` binding layer. It owns the
//! widget tree and every auxiliary object the bindings hand out: style
//! descriptors, reactive subjects, timers, animations, focus groups, fonts and
//! filesystem handles. The API surface is deliberately C-library shaped -
//! free functions over arena keys, a single `*mut ()` user-data slot per
//! widget and per event descriptor, and plain function pointers for every
//! callback - so the binding layer can stay a thin, zero-overhead projection.
//!
//! # Threading
//!
//! The engine is single-threaded and cooperative. All state lives in a
//! thread-local context created by [`init`]; every call must come from the
//! thread that drives [`tick`]. Calling into the engine without an
//! initialized context panics.
//!
//! # Modules
//!
//! - [`widget`] - widget tree, flags, interaction state, geometry
//! - [`event`] - descriptor registration and bubbling dispatch
//! - [`style`] - style descriptors and part/state selectors
//! - [`subject`] - reactive subjects and observers
//! - [`timer`] / [`anim`] - clock-driven timers, animations and timelines
//! - [`fs`] - drive-letter filesystem abstraction
//! - [`group`] - focus groups and key injection
//! - [`draw`] - colors, draw buffers and subtree snapshots
//! - [`font`] - reference-counted font loading

pub mod anim;
pub mod context;
pub mod draw;
pub mod event;
pub mod font;
pub mod fs;
pub mod group;
pub mod style;
pub mod subject;
pub mod timer;
pub mod widget;

pub use anim::{AnimKey, AnimSpec, ExecCb, PathCb, TimelineKey, REPEAT_INFINITE};
pub use context::{deinit, init, is_initialized, now, screen, set_screen_size, tick};
pub use draw::{snapshot, Color, DrawBuffer};
pub use event::{DescriptorId, EventCb, EventCode, RawEvent};
pub use font::FontKey;
pub use fs::{register_drive, DirEntry, DirKey, FileKey, FsMode, FsStatus, Whence};
pub use group::GroupKey;
pub use style::{Part, PropValue, Selector, StyleKey, StyleProp};
pub use subject::{ObserverCb, ObserverEntry, ObserverId, Subject, SubjectValue};
pub use timer::{TimerCb, TimerKey};
pub use widget::{Align, ObjFlag, ObjState, SizeSpec, WidgetKey};
