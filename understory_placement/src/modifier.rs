// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Modifier descriptors: the unit of work in the placement pipeline.
//!
//! ## Overview
//!
//! A [`ModifierDescriptor`] names one pipeline stage, the [`Phase`] it belongs to, and the
//! stages it depends on. Its behavior is two optional closures:
//!
//! - `run`: invoked once per pass with the mutable [`State`]; pure apart from state mutation.
//! - `effect`: invoked when the instance is built (or its options change); may acquire an
//!   external resource and hand back a [`Disposer`] that releases it.
//!
//! Per-modifier options are captured by these closures when a built-in constructor such as
//! [`flip`](crate::modifiers::flip::flip) builds the descriptor, so options are namespaced by
//! construction and validated only by the modifier that owns them.
//!
//! ## Custom modifiers
//!
//! ```
//! use understory_placement::modifier::{ModifierDescriptor, Phase};
//!
//! // Nudge the popper one unit down after every other main-phase modifier.
//! let nudge = ModifierDescriptor::new("nudge", Phase::AfterMain)
//!     .with_requires(&["popper_offsets"])
//!     .with_run(|state, _args| {
//!         if let Some(p) = state.offsets.popper.as_mut() {
//!             p.y += 1.0;
//!         }
//!         Ok(())
//!     });
//! assert!(nudge.enabled);
//! ```

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::error::MeasureError;
use crate::instance::UpdateRequester;
use crate::platform::{Disposer, Measure, Platform, StyleWriter};
use crate::state::{ModifierData, State};

/// Lifecycle phase. Modifiers run grouped by phase, in this order, unless a dependency
/// edge forces otherwise.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Phase {
    /// Before measurement-derived data is read.
    BeforeRead,
    /// Reads measurements into working offsets.
    Read,
    /// After the read phase.
    AfterRead,
    /// Before the main computation.
    BeforeMain,
    /// Main placement computation.
    Main,
    /// After the main computation.
    AfterMain,
    /// Converts results into outputs.
    BeforeWrite,
    /// Writes outputs to the host.
    Write,
    /// After outputs are written.
    AfterWrite,
}

/// What a `run` closure sees besides the state.
#[derive(Clone, Copy)]
pub struct ModifierArgs<'a> {
    /// Name the modifier is registered under; the key it owns in
    /// [`ModifiersData`](crate::state::ModifiersData).
    pub name: &'static str,
    /// Measurement collaborator.
    pub measure: &'a dyn Measure,
    /// Style sink, if the host has one.
    pub writer: Option<&'a dyn StyleWriter>,
}

impl fmt::Debug for ModifierArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierArgs")
            .field("name", &self.name)
            .field("writer", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

/// What an `effect` closure sees besides the state.
#[derive(Clone, Copy)]
pub struct EffectArgs<'a> {
    /// Name the modifier is registered under.
    pub name: &'static str,
    /// Host collaborators.
    pub platform: &'a Platform,
    /// Enqueues a coalesced update on the owning instance.
    pub requester: &'a UpdateRequester,
}

impl fmt::Debug for EffectArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectArgs")
            .field("name", &self.name)
            .field("platform", self.platform)
            .finish_non_exhaustive()
    }
}

/// Per-pass transform over the state.
pub type RunFn = Rc<dyn Fn(&mut State, &ModifierArgs<'_>) -> Result<(), MeasureError>>;

/// Setup hook; the returned disposer is released on teardown.
pub type EffectFn = Rc<dyn Fn(&mut State, &EffectArgs<'_>) -> Option<Disposer>>;

/// One named pipeline stage.
#[derive(Clone)]
pub struct ModifierDescriptor {
    /// Unique key within one modifier list; later entries with the same name replace earlier ones.
    pub name: &'static str,
    /// Disabled modifiers are dropped before ordering.
    pub enabled: bool,
    /// Phase used to group and break ordering ties.
    pub phase: Phase,
    /// Hard dependencies: must be present, enabled, and ordered earlier.
    pub requires: Vec<&'static str>,
    /// Soft dependencies: ordered earlier only when present and enabled.
    pub requires_if_exists: Vec<&'static str>,
    /// Initial value of this modifier's data slot, reseeded at the start of every pass.
    pub data: Option<ModifierData>,
    /// Per-pass work.
    pub run: Option<RunFn>,
    /// Setup hook with optional teardown.
    pub effect: Option<EffectFn>,
}

impl fmt::Debug for ModifierDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierDescriptor")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("phase", &self.phase)
            .field("requires", &self.requires)
            .field("requires_if_exists", &self.requires_if_exists)
            .field("run", &self.run.is_some())
            .field("effect", &self.effect.is_some())
            .finish_non_exhaustive()
    }
}

impl ModifierDescriptor {
    /// An enabled modifier with no dependencies and no behavior.
    pub fn new(name: &'static str, phase: Phase) -> Self {
        Self {
            name,
            enabled: true,
            phase,
            requires: Vec::new(),
            requires_if_exists: Vec::new(),
            data: None,
            run: None,
            effect: None,
        }
    }

    /// A placeholder that, appended after the real modifier, disables `name`.
    pub fn disabled(name: &'static str) -> Self {
        Self {
            enabled: false,
            ..Self::new(name, Phase::Main)
        }
    }

    /// Set the per-pass closure.
    pub fn with_run(
        mut self,
        run: impl Fn(&mut State, &ModifierArgs<'_>) -> Result<(), MeasureError> + 'static,
    ) -> Self {
        self.run = Some(Rc::new(run));
        self
    }

    /// Set the setup hook.
    pub fn with_effect(
        mut self,
        effect: impl Fn(&mut State, &EffectArgs<'_>) -> Option<Disposer> + 'static,
    ) -> Self {
        self.effect = Some(Rc::new(effect));
        self
    }

    /// Add hard dependencies.
    pub fn with_requires(mut self, names: &[&'static str]) -> Self {
        self.requires.extend_from_slice(names);
        self
    }

    /// Add soft dependencies.
    pub fn with_requires_if_exists(mut self, names: &[&'static str]) -> Self {
        self.requires_if_exists.extend_from_slice(names);
        self
    }

    /// Set the initial data slot.
    pub fn with_data(mut self, data: ModifierData) -> Self {
        self.data = Some(data);
        self
    }

    /// Enable or disable.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// True when both descriptors carry the very same effect closure (or neither has one).
    pub(crate) fn same_effect(&self, other: &Self) -> bool {
        match (&self.effect, &other.effect) {
            (Some(a), Some(b)) => core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b)),
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_are_totally_ordered() {
        let phases = [
            Phase::BeforeRead,
            Phase::Read,
            Phase::AfterRead,
            Phase::BeforeMain,
            Phase::Main,
            Phase::AfterMain,
            Phase::BeforeWrite,
            Phase::Write,
            Phase::AfterWrite,
        ];
        assert!(phases.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn disabled_placeholder_has_no_behavior() {
        let d = ModifierDescriptor::disabled("flip");
        assert!(!d.enabled);
        assert!(d.run.is_none() && d.effect.is_none());
    }

    #[test]
    fn effect_identity_survives_clone_only() {
        let a = ModifierDescriptor::new("a", Phase::Main).with_effect(|_, _| None);
        let b = a.clone();
        let c = ModifierDescriptor::new("a", Phase::Main).with_effect(|_, _| None);
        assert!(a.same_effect(&b));
        assert!(!a.same_effect(&c));
        assert!(ModifierDescriptor::new("x", Phase::Main)
            .same_effect(&ModifierDescriptor::new("y", Phase::Main)));
    }
}
