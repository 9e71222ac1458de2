// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Modifier dependency resolver.
//!
//! ## Overview
//!
//! Turns a declared modifier list into the linear order a pass executes.
//!
//! 1. Merge by name: a later descriptor replaces an earlier one with the same name and takes
//!    over its position.
//! 2. Drop disabled descriptors.
//! 3. Check hard dependencies: each `requires` name must survive steps 1–2.
//! 4. Topologically sort over `requires` and surviving `requires_if_exists` edges.
//!    Whenever several modifiers are ready, the smallest `(phase, position)` goes first.
//! 5. If modifiers remain but none is ready, the remainder contains a cycle.
//!
//! The result is deterministic for equal input and never loops.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::ConfigError;
use crate::modifier::ModifierDescriptor;

/// Merge descriptors by name; the last one wins and keeps the first one's position.
pub fn merge_by_name(modifiers: &[ModifierDescriptor]) -> Vec<ModifierDescriptor> {
    let mut out: Vec<ModifierDescriptor> = Vec::with_capacity(modifiers.len());
    for m in modifiers {
        match out.iter_mut().find(|e| e.name == m.name) {
            Some(slot) => *slot = m.clone(),
            None => out.push(m.clone()),
        }
    }
    out
}

/// Resolve the execution order of `modifiers`.
pub fn order_modifiers(
    modifiers: &[ModifierDescriptor],
) -> Result<Vec<ModifierDescriptor>, ConfigError> {
    let merged: Vec<ModifierDescriptor> = merge_by_name(modifiers)
        .into_iter()
        .filter(|m| m.enabled)
        .collect();
    let n = merged.len();
    let position = |name: &str| merged.iter().position(|m| m.name == name);

    // deps[i]: positions that must be emitted before i.
    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(n);
    for m in &merged {
        let mut d = Vec::with_capacity(m.requires.len() + m.requires_if_exists.len());
        for &required in &m.requires {
            let Some(j) = position(required) else {
                return Err(ConfigError::MissingDependency {
                    modifier: m.name,
                    requires: required,
                });
            };
            d.push(j);
        }
        d.extend(m.requires_if_exists.iter().filter_map(|&soft| position(soft)));
        deps.push(d);
    }

    let mut emitted = vec![false; n];
    let mut order = Vec::with_capacity(n);
    while order.len() < n {
        let ready = (0..n)
            .filter(|&i| !emitted[i] && deps[i].iter().all(|&j| emitted[j]))
            .min_by_key(|&i| (merged[i].phase, i));
        let Some(i) = ready else {
            let modifiers = (0..n)
                .filter(|&i| !emitted[i])
                .map(|i| merged[i].name)
                .collect();
            return Err(ConfigError::Cycle { modifiers });
        };
        emitted[i] = true;
        order.push(i);
    }

    log::debug!(
        "resolved modifier order: {:?}",
        order.iter().map(|&i| merged[i].name).collect::<Vec<_>>()
    );
    Ok(order.into_iter().map(|i| merged[i].clone()).collect())
}
