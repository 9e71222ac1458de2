// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Move the popper to another placement when the preferred one overflows.
//!
//! ## Candidates
//!
//! The preferred placement comes first, followed by `fallback_placements` when given, or
//! else the opposite side and then the two remaining sides clockwise from the preferred one.
//! With `flip_variations`, every aligned candidate is followed by the same side with the
//! opposite alignment.
//!
//! ## Selection
//!
//! A candidate fits when every enabled check has no positive overflow:
//!
//! - `main_axis`: the edge on the candidate's own side;
//! - `alt_axis`: both edges along the alignment axis.
//!
//! The first fitting candidate wins. When none fits, the candidate with the smallest total
//! positive overflow over the enabled checks wins, earliest on ties.
//!
//! Choosing a placement other than the current one restarts the pass so every modifier
//! sees the new placement; the restarted `flip` leaves it alone.

use alloc::vec::Vec;

use crate::error::MeasureError;
use crate::modifier::{ModifierDescriptor, Phase};
use crate::overflow::{Boundary, DetectOverflowOptions, RootBoundary, detect_overflow};
use crate::platform::Measure;
use crate::state::{ModifierData, State};
use crate::types::{Padding, Placement, Side, SideObject};

use super::names;

/// Options for [`flip`].
#[derive(Clone, Debug, PartialEq)]
pub struct FlipOptions {
    /// Check the edge on the candidate's own side.
    pub main_axis: bool,
    /// Also check both edges along the alignment axis.
    pub alt_axis: bool,
    /// Explicit candidates tried after the preferred placement.
    pub fallback_placements: Option<Vec<Placement>>,
    /// Also try the opposite alignment of every aligned candidate.
    pub flip_variations: bool,
    /// Virtual padding around the clipping area.
    pub padding: Padding,
    /// Clipping area.
    pub boundary: Boundary,
    /// Outermost clipping area.
    pub root_boundary: RootBoundary,
    /// Test against the reference's clipping parents.
    pub alt_boundary: bool,
}

impl Default for FlipOptions {
    fn default() -> Self {
        Self {
            main_axis: true,
            alt_axis: false,
            fallback_placements: None,
            flip_variations: true,
            padding: Padding::ZERO,
            boundary: Boundary::default(),
            root_boundary: RootBoundary::default(),
            alt_boundary: false,
        }
    }
}

/// Per-pass bookkeeping of [`flip`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlipData {
    /// This pass already flipped; do nothing until the next pass.
    pub skip: bool,
}

/// Candidate placements in the order they are tried.
pub fn candidates(preferred: Placement, options: &FlipOptions) -> Vec<Placement> {
    let mut sides: Vec<Placement> = Vec::with_capacity(4);
    sides.push(preferred);
    match &options.fallback_placements {
        Some(fallbacks) => sides.extend(fallbacks.iter().copied()),
        None => {
            let side = preferred.side();
            sides.push(preferred.with_side(side.opposite()));
            sides.push(preferred.with_side(side.clockwise()));
            sides.push(preferred.with_side(side.opposite().clockwise()));
        }
    }

    let mut out: Vec<Placement> = Vec::with_capacity(sides.len() * 2);
    for placement in sides {
        let variation = placement
            .alignment()
            .filter(|_| options.flip_variations)
            .map(|a| placement.with_alignment(Some(a.opposite())));
        for p in core::iter::once(placement).chain(variation) {
            if !out.contains(&p) {
                out.push(p);
            }
        }
    }
    out
}

/// Positive overflow over the enabled checks; zero means the placement fits.
fn checked_overflow(placement: Placement, overflow: &SideObject, options: &FlipOptions) -> f64 {
    let mut edges: Vec<Side> = Vec::with_capacity(3);
    if options.main_axis {
        edges.push(placement.side());
    }
    if options.alt_axis {
        let axis = placement.cross_axis();
        edges.push(axis.start_side());
        edges.push(axis.end_side());
    }
    edges.iter().map(|&s| overflow.get(s).max(0.0)).sum()
}

/// The placement `flip` settles on for `state`.
pub fn choose_placement(
    state: &State,
    measure: &dyn Measure,
    options: &FlipOptions,
) -> Result<Placement, MeasureError> {
    let preferred = state.options.placement;
    let mut best: Option<(Placement, f64)> = None;
    for candidate in candidates(preferred, options) {
        let overflow = detect_overflow(
            state,
            measure,
            &DetectOverflowOptions {
                placement: Some(candidate),
                boundary: options.boundary,
                root_boundary: options.root_boundary,
                alt_boundary: options.alt_boundary,
                padding: options.padding,
                ..DetectOverflowOptions::default()
            },
        )?;
        let excess = checked_overflow(candidate, &overflow, options);
        if excess <= 0.0 {
            return Ok(candidate);
        }
        if best.is_none_or(|(_, least)| excess < least) {
            best = Some((candidate, excess));
        }
    }
    Ok(best.map_or(preferred, |(p, _)| p))
}

/// Flips the placement when the preferred one overflows. See the [module docs](self).
pub fn flip(options: FlipOptions) -> ModifierDescriptor {
    ModifierDescriptor::new(names::FLIP, Phase::Main)
        .with_requires_if_exists(&[names::OFFSET])
        .with_data(ModifierData::Flip(FlipData::default()))
        .with_run(move |state, args| {
            if state.modifiers_data.flip().is_some_and(|d| d.skip) {
                return Ok(());
            }
            let chosen = choose_placement(state, args.measure, &options)?;
            if chosen != state.placement {
                log::debug!("flip: {} -> {}", state.placement, chosen);
                state.placement = chosen;
                state
                    .modifiers_data
                    .insert(args.name, ModifierData::Flip(FlipData { skip: true }));
                state.reset = true;
            }
            Ok(())
        })
}
