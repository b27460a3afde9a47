//! Structural guarantees, checked at compile time.
//!
//! The binding layer's claim is that its handles add nothing on top of the
//! engine's keys: every handle is one machine word, events wrap a single
//! reference, and `State<T>` is exactly its embedded subject. Compiling
//! this module is the proof.

#![allow(dead_code)]

use std::mem::{align_of, size_of};

use lume_core::subject::Subject;
use lume_core::{Color, StyleKey};

use crate::anim::Timeline;
use crate::event::Event;
use crate::fs::{Dir, File};
use crate::group::Group;
use crate::obj::Obj;
use crate::state::State;
use crate::style::Style;
use crate::timer::Timer;
use crate::widgets::{Bar, Button, Label, Slider, Switch};

const WORD: usize = size_of::<*mut ()>();

#[cfg(target_pointer_width = "64")]
mod word_sized {
    use super::*;

    // Base handle and every derived widget handle.
    const _: () = assert!(size_of::<Obj>() == WORD);
    const _: () = assert!(size_of::<Label>() == WORD);
    const _: () = assert!(size_of::<Button>() == WORD);
    const _: () = assert!(size_of::<Slider>() == WORD);
    const _: () = assert!(size_of::<Bar>() == WORD);
    const _: () = assert!(size_of::<Switch>() == WORD);

    // The event reader is one reference.
    const _: () = assert!(size_of::<Event<'static>>() == WORD);

    // RAII owners carry nothing but the engine key.
    const _: () = assert!(size_of::<Style>() == size_of::<StyleKey>());
    const _: () = assert!(size_of::<Style>() == WORD);
    const _: () = assert!(size_of::<Group>() == WORD);
    const _: () = assert!(size_of::<Timeline>() == WORD);
    const _: () = assert!(size_of::<Timer>() == WORD);
    const _: () = assert!(size_of::<File>() == WORD);
    const _: () = assert!(size_of::<Dir>() == WORD);
}

// States add at most padding on top of the inline subject.
const _: () = assert!(size_of::<State<i32>>() <= size_of::<Subject>() + align_of::<Subject>());
const _: () = assert!(size_of::<State<bool>>() <= size_of::<Subject>() + align_of::<Subject>());
const _: () =
    assert!(size_of::<State<Color>>() <= size_of::<Subject>() + size_of::<Color>() + align_of::<Subject>());
