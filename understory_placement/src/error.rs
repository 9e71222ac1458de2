// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! - [`ConfigError`]: the modifier set cannot be ordered. Surfaced synchronously by
//!   [`Instance::new`](crate::instance::Instance::new) and
//!   [`Instance::set_options`](crate::instance::Instance::set_options).
//! - [`MeasureError`]: a [`Measure`](crate::platform::Measure) collaborator failed or
//!   reported unusable geometry.
//! - [`PlacementError`]: everything an update can fail with.
//!
//! All errors are `Clone` so one coalesced failure can be handed to every waiting caller.

use alloc::vec::Vec;
use core::fmt;

use crate::types::ElementId;

/// The modifier list cannot be turned into an execution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `modifier` hard-requires `requires`, which is absent or disabled.
    MissingDependency {
        /// The dependent modifier.
        modifier: &'static str,
        /// The missing dependency.
        requires: &'static str,
    },
    /// The hard and soft dependency edges form a cycle among `modifiers`.
    Cycle {
        /// Modifiers that could not be ordered, in declaration order.
        modifiers: Vec<&'static str>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDependency { modifier, requires } => write!(
                f,
                "modifier `{modifier}` requires `{requires}`, which is missing or disabled"
            ),
            Self::Cycle { modifiers } => {
                f.write_str("modifier dependency cycle among: ")?;
                for (i, name) in modifiers.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(name)?;
                }
                Ok(())
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// A measurement collaborator failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasureError {
    /// The element cannot be measured (detached, unknown, not laid out).
    Unavailable {
        /// The element that was asked for.
        element: ElementId,
    },
    /// The element reported non-finite or negative-size geometry.
    InvalidGeometry {
        /// The element that was measured.
        element: ElementId,
    },
}

impl fmt::Display for MeasureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { element } => {
                write!(f, "element {} cannot be measured", element.0)
            }
            Self::InvalidGeometry { element } => {
                write!(f, "element {} reported invalid geometry", element.0)
            }
        }
    }
}

impl core::error::Error for MeasureError {}

/// Errors produced by building or updating an [`Instance`](crate::instance::Instance).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlacementError {
    /// The modifier set is invalid.
    Config(ConfigError),
    /// Measuring the reference or popper failed before any modifier ran.
    Measure(MeasureError),
    /// A modifier failed; the published state was left untouched.
    Modifier {
        /// Name of the failing modifier.
        name: &'static str,
        /// What went wrong.
        source: MeasureError,
    },
    /// A pass was requested while another pass of the same instance was running.
    Busy,
    /// The instance was destroyed.
    Destroyed,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid modifier configuration: {e}"),
            Self::Measure(e) => write!(f, "measurement failed: {e}"),
            Self::Modifier { name, source } => write!(f, "modifier `{name}` failed: {source}"),
            Self::Busy => f.write_str("a pass is already running for this instance"),
            Self::Destroyed => f.write_str("instance was destroyed"),
        }
    }
}

impl core::error::Error for PlacementError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Measure(e) | Self::Modifier { source: e, .. } => Some(e),
            Self::Busy | Self::Destroyed => None,
        }
    }
}

impl From<ConfigError> for PlacementError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MeasureError> for PlacementError {
    fn from(e: MeasureError) -> Self {
        Self::Measure(e)
    }
}
