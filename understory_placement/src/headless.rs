// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory host.
//!
//! [`Scene`] implements [`Measure`], [`Observer`], and [`StyleWriter`] over a table of
//! rects you set by hand. It records what was written and which subscriptions are live,
//! and can fire scroll/resize events on demand. Useful for tests, for headless layout
//! (server-side, snapshot tests), and as a template for real host bindings.
//!
//! ```
//! use understory_placement::geometry::rect_from_xywh;
//! use understory_placement::headless::Scene;
//! use understory_placement::platform::Measure;
//! use understory_placement::types::{ElementId, Strategy};
//!
//! let scene = Scene::new(rect_from_xywh(0.0, 0.0, 800.0, 600.0));
//! scene.set_rect(ElementId(1), rect_from_xywh(10.0, 10.0, 80.0, 20.0));
//! let r = scene.measure_rect(ElementId(1), Strategy::Absolute).unwrap();
//! assert_eq!(r.width(), 80.0);
//! assert!(scene.measure_rect(ElementId(2), Strategy::Absolute).is_err());
//! ```

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::{Rect, Vec2};

use crate::error::MeasureError;
use crate::platform::{
    ComputedStyle, Disposer, ListenFlags, Measure, Observer, ObserverCallback, Platform,
    StyleWriter,
};
use crate::state::{Attributes, Style};
use crate::types::{ElementId, ScrollTarget, Strategy};

struct Subscription {
    targets: Vec<ScrollTarget>,
    events: ListenFlags,
    callback: ObserverCallback,
}

#[derive(Default)]
struct Inner {
    rects: BTreeMap<ElementId, Rect>,
    computed: BTreeMap<ElementId, ComputedStyle>,
    scroll_parents: BTreeMap<ElementId, Vec<ScrollTarget>>,
    viewport: Rect,
    document: Option<Rect>,
    scroll: Vec2,
    device_pixel_ratio: f64,
    applied: BTreeMap<ElementId, (Style, Attributes)>,
    apply_count: usize,
    clear_count: usize,
    subscriptions: BTreeMap<u64, Subscription>,
    next_subscription: u64,
    unsubscribe_count: usize,
}

/// In-memory host. See the [module docs](self).
pub struct Scene {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scene")
            .field("elements", &inner.rects.len())
            .field("viewport", &inner.viewport)
            .field("subscriptions", &inner.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// An empty scene with the given viewport, in document coordinates.
    pub fn new(viewport: Rect) -> Rc<Self> {
        Rc::new(Self {
            inner: Rc::new(RefCell::new(Inner {
                viewport,
                device_pixel_ratio: 1.0,
                ..Inner::default()
            })),
        })
    }

    /// A [`Platform`] backed by this scene for measuring, observing, and writing.
    pub fn platform(self: &Rc<Self>) -> Platform {
        let writer: Rc<dyn StyleWriter> = self.clone();
        Platform::new(self.clone(), self.clone(), Some(writer))
    }

    /// A [`Platform`] that measures through this scene but never subscribes or writes.
    pub fn headless_platform(self: &Rc<Self>) -> Platform {
        Platform::headless(self.clone())
    }

    /// Set (or move) an element's layout box, in document coordinates.
    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        self.inner.borrow_mut().rects.insert(element, rect);
    }

    /// Detach an element; measuring it fails afterwards.
    pub fn remove(&self, element: ElementId) {
        self.inner.borrow_mut().rects.remove(&element);
    }

    /// Set one computed style property.
    pub fn set_computed_style(&self, element: ElementId, property: &str, value: &str) {
        self.inner
            .borrow_mut()
            .computed
            .entry(element)
            .or_default()
            .insert(property.to_string(), String::from(value));
    }

    /// Set an element's scroll ancestors, nearest first.
    pub fn set_scroll_parents(&self, element: ElementId, parents: Vec<ScrollTarget>) {
        self.inner
            .borrow_mut()
            .scroll_parents
            .insert(element, parents);
    }

    /// Replace the viewport.
    pub fn set_viewport(&self, viewport: Rect) {
        self.inner.borrow_mut().viewport = viewport;
    }

    /// Set the scrollable document area; defaults to the viewport.
    pub fn set_document(&self, document: Rect) {
        self.inner.borrow_mut().document = Some(document);
    }

    /// Scroll the viewport. Fixed-strategy rects are reported relative to it.
    pub fn set_scroll(&self, scroll: Vec2) {
        self.inner.borrow_mut().scroll = scroll;
    }

    /// Set the device pixel ratio.
    pub fn set_device_pixel_ratio(&self, ratio: f64) {
        self.inner.borrow_mut().device_pixel_ratio = ratio;
    }

    /// Last style written to `element`, if any and not cleared since.
    pub fn applied_style(&self, element: ElementId) -> Option<Style> {
        self.inner
            .borrow()
            .applied
            .get(&element)
            .map(|(style, _)| style.clone())
    }

    /// Last attributes written to `element`, if any and not cleared since.
    pub fn applied_attributes(&self, element: ElementId) -> Option<Attributes> {
        self.inner
            .borrow()
            .applied
            .get(&element)
            .map(|(_, attributes)| attributes.clone())
    }

    /// Total [`StyleWriter::apply`] calls.
    pub fn apply_count(&self) -> usize {
        self.inner.borrow().apply_count
    }

    /// Total [`StyleWriter::clear`] calls.
    pub fn clear_count(&self) -> usize {
        self.inner.borrow().clear_count
    }

    /// Subscriptions not yet released.
    pub fn live_subscriptions(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    /// Subscriptions released so far.
    pub fn unsubscribe_count(&self) -> usize {
        self.inner.borrow().unsubscribe_count
    }

    /// Fire a scroll of `target`. Returns how many callbacks ran.
    pub fn emit_scroll(&self, target: ScrollTarget) -> usize {
        self.emit(|s| s.events.contains(ListenFlags::SCROLL) && s.targets.contains(&target))
    }

    /// Fire a viewport resize. Returns how many callbacks ran.
    pub fn emit_resize(&self) -> usize {
        self.emit(|s| s.events.contains(ListenFlags::RESIZE))
    }

    fn emit(&self, filter: impl Fn(&Subscription) -> bool) -> usize {
        // Collect first so callbacks may touch the scene.
        let callbacks: Vec<ObserverCallback> = self
            .inner
            .borrow()
            .subscriptions
            .values()
            .filter(|s| filter(s))
            .map(|s| s.callback.clone())
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }
}

impl Measure for Scene {
    fn measure_rect(&self, element: ElementId, strategy: Strategy) -> Result<Rect, MeasureError> {
        let inner = self.inner.borrow();
        let rect = *inner
            .rects
            .get(&element)
            .ok_or(MeasureError::Unavailable { element })?;
        Ok(match strategy {
            Strategy::Absolute => rect,
            Strategy::Fixed => rect - inner.scroll,
        })
    }

    fn computed_style(&self, element: ElementId) -> ComputedStyle {
        self.inner
            .borrow()
            .computed
            .get(&element)
            .cloned()
            .unwrap_or_default()
    }

    fn scroll_parents(&self, element: ElementId) -> Vec<ScrollTarget> {
        self.inner
            .borrow()
            .scroll_parents
            .get(&element)
            .cloned()
            .unwrap_or_default()
    }

    fn viewport_rect(&self, strategy: Strategy) -> Rect {
        let inner = self.inner.borrow();
        match strategy {
            Strategy::Absolute => inner.viewport,
            Strategy::Fixed => inner.viewport - inner.scroll,
        }
    }

    fn document_rect(&self) -> Rect {
        let inner = self.inner.borrow();
        inner.document.unwrap_or(inner.viewport)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.inner.borrow().device_pixel_ratio
    }
}

impl Observer for Scene {
    fn subscribe(
        &self,
        targets: &[ScrollTarget],
        events: ListenFlags,
        callback: ObserverCallback,
    ) -> Disposer {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_subscription;
            inner.next_subscription += 1;
            inner.subscriptions.insert(
                id,
                Subscription {
                    targets: targets.to_vec(),
                    events,
                    callback,
                },
            );
            id
        };
        let inner = Rc::downgrade(&self.inner);
        Disposer::new(move || {
            if let Some(inner) = inner.upgrade() {
                let mut inner = inner.borrow_mut();
                if inner.subscriptions.remove(&id).is_some() {
                    inner.unsubscribe_count += 1;
                }
            }
        })
    }
}

impl StyleWriter for Scene {
    fn apply(&self, element: ElementId, style: &Style, attributes: &Attributes) {
        let mut inner = self.inner.borrow_mut();
        inner
            .applied
            .insert(element, (style.clone(), attributes.clone()));
        inner.apply_count += 1;
    }

    fn clear(&self, element: ElementId) {
        let mut inner = self.inner.borrow_mut();
        inner.applied.remove(&element);
        inner.clear_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    use crate::geometry::rect_from_xywh;

    #[test]
    fn fixed_rects_are_relative_to_the_scrolled_viewport() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        scene.set_rect(ElementId(1), rect_from_xywh(10.0, 50.0, 5.0, 5.0));
        scene.set_scroll(Vec2::new(0.0, 40.0));
        let fixed = scene.measure_rect(ElementId(1), Strategy::Fixed).unwrap();
        assert_eq!(fixed, rect_from_xywh(10.0, 10.0, 5.0, 5.0));
        assert_eq!(scene.document_rect(), rect_from_xywh(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn subscriptions_fire_by_event_and_release_once() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let panel = ScrollTarget::Element(ElementId(3));
        let disposer = scene.subscribe(
            &[panel],
            ListenFlags::SCROLL,
            Rc::new(move || h.set(h.get() + 1)),
        );
        assert_eq!(scene.live_subscriptions(), 1);
        assert_eq!(scene.emit_scroll(panel), 1);
        assert_eq!(scene.emit_scroll(ScrollTarget::Viewport), 0);
        assert_eq!(scene.emit_resize(), 0);
        assert_eq!(hits.get(), 1);

        disposer.dispose();
        assert_eq!(scene.live_subscriptions(), 0);
        assert_eq!(scene.unsubscribe_count(), 1);
        assert_eq!(scene.emit_scroll(panel), 0);
    }

    #[test]
    fn writes_are_recorded_and_cleared() {
        let scene = Scene::new(rect_from_xywh(0.0, 0.0, 100.0, 100.0));
        let style = Style {
            top: Some(3.0),
            ..Style::default()
        };
        scene.apply(ElementId(1), &style, &Attributes::new());
        assert_eq!(scene.applied_style(ElementId(1)), Some(style));
        scene.clear(ElementId(1));
        assert!(scene.applied_style(ElementId(1)).is_none());
        assert_eq!((scene.apply_count(), scene.clear_count()), (1, 1));

        scene.set_scroll_parents(ElementId(1), vec![ScrollTarget::Viewport]);
        assert_eq!(
            scene.scroll_parents(ElementId(1)),
            [ScrollTarget::Viewport]
        );
    }
}
