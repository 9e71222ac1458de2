// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host collaborator boundary.
//!
//! The engine itself performs no I/O. A host supplies:
//!
//! - a [`Measure`] collaborator for rects, computed styles, scroll ancestors, and the viewport;
//! - an [`Observer`] collaborator for scroll/resize subscriptions;
//! - optionally a [`StyleWriter`] that applies computed styles to real elements.
//!
//! [`Platform`] bundles the three. [`Platform::headless`] is enough for pure computation:
//! subscriptions are ignored and the `apply_styles` modifier becomes a no-op.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::error::MeasureError;
use crate::geometry::is_valid_rect;
use crate::state::{Attributes, Style};
use crate::types::{ElementId, ScrollTarget, Strategy};

/// Read-only computed style of an element, property name to value.
pub type ComputedStyle = BTreeMap<String, String>;

/// Measurement collaborator.
pub trait Measure {
    /// Layout box of `element` in the coordinate space implied by `strategy`.
    fn measure_rect(&self, element: ElementId, strategy: Strategy) -> Result<Rect, MeasureError>;

    /// Computed style of `element`. The default reports no properties.
    fn computed_style(&self, element: ElementId) -> ComputedStyle {
        let _ = element;
        ComputedStyle::new()
    }

    /// Scrollable ancestors of `element`, nearest first. May end with [`ScrollTarget::Viewport`].
    fn scroll_parents(&self, element: ElementId) -> Vec<ScrollTarget>;

    /// Visible viewport in the coordinate space implied by `strategy`.
    fn viewport_rect(&self, strategy: Strategy) -> Rect;

    /// Full scrollable document. Defaults to the absolute viewport.
    fn document_rect(&self) -> Rect {
        self.viewport_rect(Strategy::Absolute)
    }

    /// Physical pixels per layout unit; used to round offsets.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

bitflags::bitflags! {
    /// Which external events should request an update.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ListenFlags: u8 {
        /// Scrolling of any listed target.
        const SCROLL = 0b0000_0001;
        /// Resizing of the viewport.
        const RESIZE = 0b0000_0010;
    }
}

impl Default for ListenFlags {
    fn default() -> Self {
        Self::SCROLL | Self::RESIZE
    }
}

/// Callback an observer invokes when a subscribed event fires.
pub type ObserverCallback = Rc<dyn Fn()>;

/// Scroll/resize event source.
pub trait Observer {
    /// Start delivering `events` on `targets` to `callback` until the returned disposer is released.
    ///
    /// [`ListenFlags::RESIZE`] applies to the viewport regardless of `targets`.
    fn subscribe(
        &self,
        targets: &[ScrollTarget],
        events: ListenFlags,
        callback: ObserverCallback,
    ) -> Disposer;
}

/// Writes computed output to real elements.
pub trait StyleWriter {
    /// Apply `style` and `attributes` to `element`.
    fn apply(&self, element: ElementId, style: &Style, attributes: &Attributes);
    /// Remove everything previously applied to `element`.
    fn clear(&self, element: ElementId);
}

/// An [`Observer`] that never fires.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn subscribe(
        &self,
        _targets: &[ScrollTarget],
        _events: ListenFlags,
        _callback: ObserverCallback,
    ) -> Disposer {
        Disposer::noop()
    }
}

/// The host collaborators one instance talks to.
#[derive(Clone)]
pub struct Platform {
    /// Measurement collaborator.
    pub measure: Rc<dyn Measure>,
    /// Event source.
    pub observer: Rc<dyn Observer>,
    /// Style sink; `None` in headless use.
    pub writer: Option<Rc<dyn StyleWriter>>,
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("writer", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

impl Platform {
    /// Bundle all three collaborators.
    pub fn new(
        measure: Rc<dyn Measure>,
        observer: Rc<dyn Observer>,
        writer: Option<Rc<dyn StyleWriter>>,
    ) -> Self {
        Self {
            measure,
            observer,
            writer,
        }
    }

    /// Measurement only: no subscriptions, no style writes.
    pub fn headless(measure: Rc<dyn Measure>) -> Self {
        Self {
            measure,
            observer: Rc::new(NoopObserver),
            writer: None,
        }
    }
}

/// Measure `element` and reject unusable geometry.
pub(crate) fn measure_checked(
    measure: &dyn Measure,
    element: ElementId,
    strategy: Strategy,
) -> Result<Rect, MeasureError> {
    let rect = measure.measure_rect(element, strategy)?;
    if is_valid_rect(rect) {
        Ok(rect)
    } else {
        Err(MeasureError::InvalidGeometry { element })
    }
}

/// A scoped resource release.
///
/// Runs its release closure exactly once: on [`Disposer::dispose`] or, failing that, on drop.
pub struct Disposer {
    release: Option<Box<dyn FnOnce()>>,
}

impl Disposer {
    /// Wrap a release closure.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A disposer with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release now.
    pub fn dispose(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn disposer_releases_exactly_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let d = Disposer::new(move || c.set(c.get() + 1));
        d.dispose();
        assert_eq!(count.get(), 1);

        let c = count.clone();
        drop(Disposer::new(move || c.set(c.get() + 1)));
        assert_eq!(count.get(), 2, "dropping an armed disposer releases it");
    }

    #[test]
    fn listen_flags_default_to_both() {
        let f = ListenFlags::default();
        assert!(f.contains(ListenFlags::SCROLL));
        assert!(f.contains(ListenFlags::RESIZE));
    }
}
