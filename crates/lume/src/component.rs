//! Composite widgets with in-tree discovery.
//!
//! A component owns a widget subtree and stamps a [`Binding`] header into
//! its root widget's user-data word. Any code holding a widget anywhere in
//! the subtree (an event handler, typically) can walk up to the root and
//! recover a typed pointer to the component - without globals and without
//! allocating per widget. Discovery discriminates twice before trusting the
//! pointer: a high-entropy magic word, then the component's `TypeId`.
//!
//! Widgets below the root never carry a binding, so their user-data word
//! stays free for the application.

use std::any::TypeId;
use std::mem::align_of;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use lume_core::widget;
use tracing::trace;

use crate::event::Event;
use crate::mixins::{FlagState, Widget};
use crate::obj::Obj;

/// First word of every mounted component's root user-data.
const BINDING_MAGIC: u64 = 0x4C55_4D45_0B1D_C0DE;

/// Header stored behind the root widget's user-data pointer.
///
/// Layout is fixed so discovery can read the magic word first and bail
/// before touching anything else.
#[repr(C)]
pub(crate) struct Binding {
    magic: u64,
    type_id: TypeId,
    owner: *mut (),
    payload: *mut (),
}

/// The embedded state every component carries.
///
/// Holds the discovery binding and the root handle. Create with
/// [`ComponentCore::new`] (or `Default`) and hand out through
/// [`Component::core`].
pub struct ComponentCore {
    binding: Binding,
    root: Obj,
}

impl ComponentCore {
    pub fn new() -> Self {
        Self {
            binding: Binding {
                magic: 0,
                type_id: TypeId::of::<()>(),
                owner: std::ptr::null_mut(),
                payload: std::ptr::null_mut(),
            },
            root: Obj::null(),
        }
    }
}

impl Default for ComponentCore {
    fn default() -> Self {
        Self::new()
    }
}

/// A mountable widget composite.
///
/// Implementors embed a [`ComponentCore`] field, build their subtree in
/// [`build`](Self::build), and get mounting, teardown and discovery for
/// free. Use [`Mounted`] unless there is a reason to manage addresses by
/// hand.
pub trait Component: Sized + 'static {
    fn core(&mut self) -> &mut ComponentCore;
    fn core_ref(&self) -> &ComponentCore;

    /// Create the widget subtree and return its root.
    fn build(&mut self, parent: Obj) -> Obj;

    /// Called after the subtree exists and the binding is in place.
    fn on_mount(&mut self) {}

    /// Called right before the subtree is deleted.
    fn on_unmount(&mut self) {}

    /// Build the subtree under `parent` and stamp the discovery binding.
    ///
    /// # Safety
    ///
    /// `self` must not move or drop while mounted: the root widget holds a
    /// raw pointer into it. [`Mounted`] boxes the component to guarantee
    /// this.
    unsafe fn mount(&mut self, parent: Obj) {
        assert!(!self.is_mounted(), "component is already mounted");
        let root = self.build(parent);
        let owner = (self as *mut Self).cast::<()>();
        let core = self.core();
        core.root = root;
        core.binding.magic = BINDING_MAGIC;
        core.binding.type_id = TypeId::of::<Self>();
        core.binding.owner = owner;
        root.set_user_data((&mut core.binding as *mut Binding).cast());
        trace!(root = ?root.raw(), "component mounted");
        self.on_mount();
    }

    /// Tear the subtree down and clear the binding. Safe to call when not
    /// mounted.
    fn unmount(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.on_unmount();
        let core = self.core();
        core.root.delete();
        core.root = Obj::null();
        core.binding.magic = 0;
        core.binding.owner = std::ptr::null_mut();
    }

    /// Unmount, then mount again under a new parent.
    ///
    /// # Safety
    ///
    /// Same contract as [`mount`](Self::mount).
    unsafe fn remount(&mut self, parent: Obj) {
        self.unmount();
        unsafe { self.mount(parent) };
    }

    fn is_mounted(&self) -> bool {
        let core = self.core_ref();
        core.binding.magic == BINDING_MAGIC && core.root.is_valid()
    }

    fn root(&self) -> Obj {
        self.core_ref().root
    }

    fn hide(&mut self) {
        self.root().hidden(true);
    }

    fn show(&mut self) {
        self.root().hidden(false);
    }

    /// Free pointer slot that rides along with the binding.
    fn set_user_payload(&mut self, payload: *mut ()) {
        self.core().binding.payload = payload;
    }

    fn user_payload(&self) -> *mut () {
        self.core_ref().binding.payload
    }

    /// Find the component owning `widget`, walking from `widget` up through
    /// its ancestors until a binding of this exact type matches.
    ///
    /// Returns `None` on dead handles, on widgets outside any component of
    /// this type, and on user-data words that fail the null, alignment,
    /// magic or type checks.
    ///
    /// # Safety
    ///
    /// Every widget user-data word on the path must be either null, a
    /// component binding, or a pointer to at least 8 readable bytes. The
    /// checks reject wrong values; they cannot make an unreadable pointer
    /// readable.
    unsafe fn from_widget(widget: Obj) -> Option<NonNull<Self>> {
        let mut cursor = Some(widget.raw());
        while let Some(w) = cursor {
            if let Some(found) = unsafe { inspect::<Self>(widget::user_data(w)) } {
                return Some(found);
            }
            cursor = widget::parent(w);
        }
        None
    }

    /// [`from_widget`](Self::from_widget) starting at the event's current
    /// target.
    ///
    /// # Safety
    ///
    /// Same contract as [`from_widget`](Self::from_widget).
    unsafe fn from_event(event: &Event<'_>) -> Option<NonNull<Self>> {
        unsafe { Self::from_widget(event.current_target()) }
    }
}

/// Check one user-data word for a binding of type `C`.
unsafe fn inspect<C: Component>(user_data: *mut ()) -> Option<NonNull<C>> {
    if user_data.is_null() {
        return None;
    }
    if (user_data as usize) % align_of::<Binding>() != 0 {
        return None;
    }
    // Magic word first: anything else in the slot fails here and nothing
    // beyond the first 8 bytes is read.
    let candidate = user_data.cast::<Binding>();
    if unsafe { (*candidate).magic } != BINDING_MAGIC {
        return None;
    }
    if unsafe { (*candidate).type_id } != TypeId::of::<C>() {
        return None;
    }
    NonNull::new(unsafe { (*candidate).owner }.cast::<C>())
}

/// Owning wrapper that pins a component behind a `Box` and manages its
/// mount lifecycle.
///
/// Construction mounts; drop unmounts (deleting the subtree). The boxed
/// address is stable, which discharges the [`Component::mount`] safety
/// contract without `unsafe` at the call site.
pub struct Mounted<C: Component> {
    inner: Box<C>,
}

impl<C: Component> Mounted<C> {
    pub fn new(component: C, parent: Obj) -> Self {
        let mut inner = Box::new(component);
        // SAFETY: the box gives the component a stable address for as long
        // as `Mounted` lives, and drop unmounts before freeing.
        unsafe { inner.mount(parent) };
        Self { inner }
    }
}

impl<C: Component> Deref for Mounted<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Component> DerefMut for Mounted<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Component> Drop for Mounted<C> {
    fn drop(&mut self) {
        if lume_core::is_initialized() {
            self.inner.unmount();
        }
    }
}
