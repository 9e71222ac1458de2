// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pipeline orchestrator.
//!
//! ## Overview
//!
//! An [`Instance`] owns one [`State`] and runs passes over it. A pass:
//!
//! 1. measures the reference and popper;
//! 2. resets the per-pass fields (`placement`, `strategy`, `offsets`, outputs, and the
//!    modifier data slots, reseeded from each descriptor's initial data);
//! 3. runs each modifier's `run` in the cached order. A modifier that sets
//!    [`State::reset`] restarts the loop from the first modifier, at most
//!    [`MAX_RESETS_PER_PASS`] times per pass;
//! 4. publishes the result as a new [`Snapshot`].
//!
//! The pass works on a copy. Any error leaves the published state as it was.
//!
//! ## Lifecycle
//!
//! Building an instance resolves the modifier order, registers every modifier effect, and
//! requests the first update. [`Instance::set_options`] re-resolves the order. When the
//! effects, the scroll parents, or the strategy changed, every effect is released and
//! registered again against the instance's original elements; otherwise the live
//! registrations are kept. [`Instance::destroy`] (or dropping the instance) releases every
//! effect exactly once, in reverse registration order.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::error::{ConfigError, PlacementError};
use crate::modifier::{EffectArgs, ModifierArgs, ModifierDescriptor};
use crate::platform::{Disposer, Measure, Platform, StyleWriter, measure_checked};
use crate::resolver::order_modifiers;
use crate::schedule::{Scheduler, UpdateHandle};
use crate::state::{
    ModifiersData, Options, OptionsUpdate, ScrollParents, Snapshot, State, StateOffsets,
};
use crate::types::Elements;

/// Restarts one pass may perform before further reset requests are ignored.
pub const MAX_RESETS_PER_PASS: usize = 2;

/// A live effect and the disposer it returned.
struct Registration {
    descriptor: ModifierDescriptor,
    disposer: Option<Disposer>,
}

/// Held mutably for the length of a pass or an options change.
struct Core {
    registrations: Vec<Registration>,
    first_update_done: bool,
}

struct Shared {
    platform: Platform,
    scheduler: Rc<dyn Scheduler>,
    /// Elements as given at build time, before any effect rewrote them.
    elements: Elements,
    core: RefCell<Core>,
    /// Only borrowed briefly, so readers never observe a pass in progress.
    published: RefCell<Snapshot>,
    pending: RefCell<Option<UpdateHandle>>,
    destroyed: Cell<bool>,
}

/// Positions one floating element against one reference.
///
/// Not `Send`: an instance lives on the thread that owns its host elements.
pub struct Instance {
    shared: Rc<Shared>,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("elements", &self.shared.elements)
            .field("destroyed", &self.shared.destroyed.get())
            .field("pending", &self.shared.pending.borrow().is_some())
            .finish_non_exhaustive()
    }
}

/// Weak handle that enqueues coalesced updates on an instance.
///
/// Observers hold one of these instead of the instance, so an observer callback outliving
/// the instance is harmless.
#[derive(Clone)]
pub struct UpdateRequester {
    shared: Weak<Shared>,
}

impl fmt::Debug for UpdateRequester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRequester")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl UpdateRequester {
    /// Request an update; `None` once the instance is gone.
    pub fn request(&self) -> Option<UpdateHandle> {
        let shared = self.shared.upgrade()?;
        Some(enqueue(&shared))
    }
}

impl Instance {
    /// Build an instance and request its first update.
    ///
    /// A [`ConfigError`] is returned before any effect runs.
    pub fn new(
        elements: Elements,
        options: Options,
        platform: Platform,
        scheduler: Rc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        let ordered = order_modifiers(&options.modifiers)?;
        let mut state = State::new(elements, options, ordered);
        state.scroll_parents = list_scroll_parents(&*platform.measure, &elements);

        let shared = Rc::new(Shared {
            platform,
            scheduler,
            elements,
            core: RefCell::new(Core {
                registrations: Vec::new(),
                first_update_done: false,
            }),
            published: RefCell::new(Rc::new(state.clone())),
            pending: RefCell::new(None),
            destroyed: Cell::new(false),
        });

        let requester = UpdateRequester {
            shared: Rc::downgrade(&shared),
        };
        let registrations = register_effects(&shared.platform, &requester, &mut state);
        shared.core.borrow_mut().registrations = registrations;
        *shared.published.borrow_mut() = Rc::new(state);

        let instance = Self { shared };
        instance.update();
        Ok(instance)
    }

    /// Request a coalesced update.
    ///
    /// Calls made before the scheduled pass runs return handles to the same update.
    /// After [`destroy`](Self::destroy) the handle is already failed with
    /// [`PlacementError::Destroyed`].
    pub fn update(&self) -> UpdateHandle {
        enqueue(&self.shared)
    }

    /// Run one pass now.
    pub fn force_update(&self) -> Result<Snapshot, PlacementError> {
        run_pass(&self.shared)
    }

    /// Merge `update` into the options, re-resolve the modifier order, reconcile effects,
    /// and run a pass.
    ///
    /// An invalid modifier set leaves the instance untouched.
    pub fn set_options(&self, update: OptionsUpdate) -> Result<Snapshot, PlacementError> {
        if self.shared.destroyed.get() {
            return Err(PlacementError::Destroyed);
        }
        {
            let mut core = self
                .shared
                .core
                .try_borrow_mut()
                .map_err(|_| PlacementError::Busy)?;
            let previous = self.state();
            let mut options = previous.options.clone();
            options.merge(update);
            let ordered = order_modifiers(&options.modifiers)?;

            let mut state = (*previous).clone();
            state.placement = options.placement;
            state.strategy = options.strategy;
            state.options = options;
            state.ordered_modifiers = ordered;
            state.elements = self.shared.elements;
            state.scroll_parents =
                list_scroll_parents(&*self.shared.platform.measure, &state.elements);

            let registrations = core::mem::take(&mut core.registrations);
            let unchanged = state.scroll_parents == previous.scroll_parents
                && state.options.strategy == previous.options.strategy
                && same_effects(&registrations, &state.ordered_modifiers);
            core.registrations = if unchanged {
                // The same effects ran against the same inputs; keep what they wrote.
                state.elements = previous.elements;
                registrations
            } else {
                release_all(registrations);
                let requester = self.requester();
                register_effects(&self.shared.platform, &requester, &mut state)
            };

            if self.shared.destroyed.get() {
                // An effect destroyed the instance while its registrations were held here.
                let registrations = core::mem::take(&mut core.registrations);
                drop(core);
                release_all(registrations);
                return Err(PlacementError::Destroyed);
            }
            *self.shared.published.borrow_mut() = Rc::new(state);
        }
        self.force_update()
    }

    /// Release every effect and stop all future updates. Idempotent.
    pub fn destroy(&self) {
        destroy(&self.shared);
    }

    /// True after [`destroy`](Self::destroy).
    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.get()
    }

    /// The latest published state.
    ///
    /// Called from inside a pass or an options change, this is the state from before it.
    pub fn state(&self) -> Snapshot {
        self.shared.published.borrow().clone()
    }

    /// A weak handle for observers that need to request updates.
    pub fn requester(&self) -> UpdateRequester {
        UpdateRequester {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Number of live effect registrations.
    pub fn effect_count(&self) -> usize {
        self.shared
            .core
            .try_borrow()
            .map(|core| core.registrations.len())
            .unwrap_or(0)
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        destroy(&self.shared);
    }
}

fn list_scroll_parents(measure: &dyn Measure, elements: &Elements) -> ScrollParents {
    ScrollParents {
        reference: measure.scroll_parents(elements.reference),
        popper: measure.scroll_parents(elements.popper),
    }
}

/// True when `ordered` carries exactly the live effects, by name and closure identity.
fn same_effects(registrations: &[Registration], ordered: &[ModifierDescriptor]) -> bool {
    let mut with_effect = ordered.iter().filter(|m| m.effect.is_some());
    registrations.iter().all(|r| {
        with_effect
            .next()
            .is_some_and(|m| m.name == r.descriptor.name && m.same_effect(&r.descriptor))
    }) && with_effect.next().is_none()
}

/// Run every effect of `state.ordered_modifiers` in order.
fn register_effects(
    platform: &Platform,
    requester: &UpdateRequester,
    state: &mut State,
) -> Vec<Registration> {
    let ordered = state.ordered_modifiers.clone();
    let mut out = Vec::with_capacity(ordered.len());
    for descriptor in &ordered {
        let Some(effect) = &descriptor.effect else {
            continue;
        };
        log::debug!("registering effect of `{}`", descriptor.name);
        let args = EffectArgs {
            name: descriptor.name,
            platform,
            requester,
        };
        let disposer = effect(state, &args);
        out.push(Registration {
            descriptor: descriptor.clone(),
            disposer,
        });
    }
    out
}

fn enqueue(shared: &Rc<Shared>) -> UpdateHandle {
    if shared.destroyed.get() {
        return UpdateHandle::resolved(Err(PlacementError::Destroyed));
    }
    let handle = {
        let mut pending = shared.pending.borrow_mut();
        if let Some(handle) = pending.as_ref() {
            return handle.clone();
        }
        let handle = UpdateHandle::pending();
        *pending = Some(handle.clone());
        handle
    };
    let weak = Rc::downgrade(shared);
    shared.scheduler.schedule(Box::new(move || {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        // Taking the slot first lets requests made during the pass schedule a fresh one.
        let Some(handle) = shared.pending.borrow_mut().take() else {
            return;
        };
        handle.resolve(run_pass(&shared));
    }));
    handle
}

fn run_pass(shared: &Shared) -> Result<Snapshot, PlacementError> {
    if shared.destroyed.get() {
        return Err(PlacementError::Destroyed);
    }
    let Ok(mut core) = shared.core.try_borrow_mut() else {
        return Err(PlacementError::Busy);
    };

    let measure = &*shared.platform.measure;
    let mut work = (**shared.published.borrow()).clone();
    let result = execute(&mut work, measure, shared.platform.writer.as_deref());

    if shared.destroyed.get() {
        // Destroyed from inside the pass; finish the teardown `destroy` could not do.
        let registrations = core::mem::take(&mut core.registrations);
        drop(core);
        release_all(registrations);
        return Err(PlacementError::Destroyed);
    }
    result?;

    let snapshot = Rc::new(work);
    *shared.published.borrow_mut() = snapshot.clone();
    let first = !core.first_update_done;
    core.first_update_done = true;
    drop(core);

    if first {
        if let Some(callback) = snapshot.options.on_first_update.clone() {
            callback(&snapshot);
        }
    }
    Ok(snapshot)
}

fn execute(
    state: &mut State,
    measure: &dyn Measure,
    writer: Option<&dyn StyleWriter>,
) -> Result<(), PlacementError> {
    state.rects.reference = measure_checked(measure, state.elements.reference, state.strategy)?;
    state.rects.popper = measure_checked(measure, state.elements.popper, state.strategy)?;

    state.reset = false;
    state.placement = state.options.placement;
    state.strategy = state.options.strategy;
    state.offsets = StateOffsets::default();
    state.styles.clear();
    state.attributes.clear();
    state.modifiers_data = ModifiersData::default();
    for m in &state.ordered_modifiers {
        if let Some(data) = &m.data {
            state.modifiers_data.insert(m.name, data.clone());
        }
    }

    let ordered = state.ordered_modifiers.clone();
    log::trace!("pass over {} modifiers", ordered.len());
    let mut resets = 0;
    let mut index = 0;
    while index < ordered.len() {
        if state.reset {
            state.reset = false;
            if resets < MAX_RESETS_PER_PASS {
                resets += 1;
                log::trace!("pass restarted ({resets}/{MAX_RESETS_PER_PASS})");
                index = 0;
                continue;
            }
            log::warn!("reset cap of {MAX_RESETS_PER_PASS} reached; settling on current state");
        }
        let modifier = &ordered[index];
        if let Some(run) = &modifier.run {
            log::trace!("running `{}`", modifier.name);
            let args = ModifierArgs {
                name: modifier.name,
                measure,
                writer,
            };
            run(state, &args).map_err(|source| {
                log::warn!("modifier `{}` failed: {source}", modifier.name);
                PlacementError::Modifier {
                    name: modifier.name,
                    source,
                }
            })?;
        }
        index += 1;
    }
    state.reset = false;
    Ok(())
}

fn destroy(shared: &Shared) {
    if shared.destroyed.replace(true) {
        return;
    }
    log::debug!("destroying placement instance");
    let pending = shared.pending.borrow_mut().take();
    if let Some(handle) = pending {
        handle.resolve(Err(PlacementError::Destroyed));
    }
    // While a pass or an options change is running, the registrations are released when
    // it returns.
    if let Ok(mut core) = shared.core.try_borrow_mut() {
        let registrations = core::mem::take(&mut core.registrations);
        drop(core);
        release_all(registrations);
    }
}

fn release_all(registrations: Vec<Registration>) {
    for registration in registrations.into_iter().rev() {
        log::debug!("releasing effect of `{}`", registration.descriptor.name);
        if let Some(disposer) = registration.disposer {
            disposer.dispose();
        }
    }
}
