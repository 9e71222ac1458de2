// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The state container threaded through every pass, plus the options that configure it.
//!
//! ## Ownership rules
//!
//! - [`State::scroll_parents`] is computed when the instance is built and when its options
//!   change; modifiers only read it.
//! - [`State::offsets`] is the working position of the popper (and arrow). The read phase
//!   initializes it and main-phase modifiers refine it.
//! - [`State::styles`] and [`State::attributes`] are written only by output-phase modifiers.
//! - [`ModifiersData`] holds one slot per modifier name. A modifier writes only the slot under
//!   its own name; any modifier may read any slot.
//! - [`State::reset`] asks the orchestrator to restart the pass from the first modifier.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::modifier::ModifierDescriptor;
use crate::modifiers::arrow::ArrowData;
use crate::modifiers::default_modifiers;
use crate::modifiers::flip::FlipData;
use crate::modifiers::hide::HideData;
use crate::modifiers::names;
use crate::modifiers::offset::OffsetData;
use crate::types::{Elements, Placement, ScrollTarget, Strategy, Target};

/// Callback fired once, after the first completed pass.
pub type FirstUpdateFn = Rc<dyn Fn(&State)>;

/// A published, immutable view of the state after a completed pass.
///
/// Every caller of one coalesced update receives a clone of the same `Rc`.
pub type Snapshot = Rc<State>;

/// Instance configuration.
#[derive(Clone)]
pub struct Options {
    /// Preferred placement.
    pub placement: Placement,
    /// Positioning mode.
    pub strategy: Strategy,
    /// Modifier list; later entries with an equal name replace earlier ones.
    pub modifiers: Vec<ModifierDescriptor>,
    /// Invoked exactly once, after the first completed pass.
    pub on_first_update: Option<FirstUpdateFn>,
}

impl Default for Options {
    /// Bottom placement, absolute strategy, and the [default modifiers](default_modifiers).
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            strategy: Strategy::default(),
            modifiers: default_modifiers(),
            on_first_update: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("placement", &self.placement)
            .field("strategy", &self.strategy)
            .field(
                "modifiers",
                &self.modifiers.iter().map(|m| m.name).collect::<Vec<_>>(),
            )
            .field("on_first_update", &self.on_first_update.is_some())
            .finish()
    }
}

impl Options {
    /// No modifiers at all; useful for fully custom pipelines.
    pub fn bare() -> Self {
        Self {
            modifiers: Vec::new(),
            ..Self::default()
        }
    }

    /// Set the preferred placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Append a modifier, replacing any earlier one with the same name.
    pub fn with_modifier(mut self, modifier: ModifierDescriptor) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Set the first-update callback.
    pub fn with_on_first_update(mut self, callback: impl Fn(&State) + 'static) -> Self {
        self.on_first_update = Some(Rc::new(callback));
        self
    }

    /// Merge a partial update into these options.
    pub fn merge(&mut self, update: OptionsUpdate) {
        if let Some(p) = update.placement {
            self.placement = p;
        }
        if let Some(s) = update.strategy {
            self.strategy = s;
        }
        if let Some(m) = update.modifiers {
            self.modifiers = m;
        }
        if update.on_first_update.is_some() {
            self.on_first_update = update.on_first_update;
        }
    }
}

/// Partial options for [`Instance::set_options`](crate::instance::Instance::set_options).
/// `None` fields keep their current value.
#[derive(Clone, Default)]
pub struct OptionsUpdate {
    /// New preferred placement.
    pub placement: Option<Placement>,
    /// New strategy.
    pub strategy: Option<Strategy>,
    /// New modifier list (replaces the whole list).
    pub modifiers: Option<Vec<ModifierDescriptor>>,
    /// New first-update callback.
    pub on_first_update: Option<FirstUpdateFn>,
}

impl fmt::Debug for OptionsUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsUpdate")
            .field("placement", &self.placement)
            .field("strategy", &self.strategy)
            .field("modifiers", &self.modifiers.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

/// Measured rects of the reference and popper for the current pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StateRects {
    /// Reference layout box.
    pub reference: Rect,
    /// Popper layout box (its size is what placement uses).
    pub popper: Rect,
}

/// Scrollable ancestors of both elements.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrollParents {
    /// Ancestors of the reference, nearest first.
    pub reference: Vec<ScrollTarget>,
    /// Ancestors of the popper, nearest first.
    pub popper: Vec<ScrollTarget>,
}

/// Working positions refined during a pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StateOffsets {
    /// Popper origin; `None` until the read phase sets it.
    pub popper: Option<Point>,
    /// Arrow origin relative to the popper, if an arrow is positioned.
    pub arrow: Option<Point>,
}

/// Renderer-agnostic positioning output for one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Positioning mode.
    pub position: Option<Strategy>,
    /// Left inset.
    pub left: Option<f64>,
    /// Top inset.
    pub top: Option<f64>,
    /// Right inset.
    pub right: Option<f64>,
    /// Bottom inset.
    pub bottom: Option<f64>,
    /// Transform-based positioning.
    pub transform: Option<Transform>,
    /// Margins should be zeroed so they do not shift the computed position.
    pub margin_reset: bool,
}

/// Translation applied through a transform rather than insets.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Transform {
    /// 2D translation.
    Translate(Vec2),
    /// 3D translation with zero depth; hints a compositor layer on high-DPI displays.
    Translate3d(Vec2),
}

/// Attribute value written to an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeValue {
    /// String value.
    Text(String),
    /// Boolean attribute; `false` means absent.
    Flag(bool),
}

/// Attributes of one element, by name.
pub type Attributes = BTreeMap<&'static str, AttributeValue>;

/// Contents of one modifier's data slot.
#[derive(Clone)]
pub enum ModifierData {
    /// Base popper origin computed by `popper_offsets`.
    PopperOffsets(Point),
    /// Displacement table of `offset`.
    Offset(OffsetData),
    /// Bookkeeping of `flip`.
    Flip(FlipData),
    /// Delta applied by `prevent_overflow`.
    PreventOverflow(Vec2),
    /// Arrow position from `arrow`.
    Arrow(ArrowData),
    /// Visibility report from `hide`.
    Hide(HideData),
    /// Data of a custom modifier.
    Custom(Rc<dyn Any>),
}

impl fmt::Debug for ModifierData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PopperOffsets(p) => f.debug_tuple("PopperOffsets").field(p).finish(),
            Self::Offset(d) => f.debug_tuple("Offset").field(d).finish(),
            Self::Flip(d) => f.debug_tuple("Flip").field(d).finish(),
            Self::PreventOverflow(v) => f.debug_tuple("PreventOverflow").field(v).finish(),
            Self::Arrow(d) => f.debug_tuple("Arrow").field(d).finish(),
            Self::Hide(d) => f.debug_tuple("Hide").field(d).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-modifier data slots, keyed by modifier name.
#[derive(Clone, Debug, Default)]
pub struct ModifiersData {
    slots: BTreeMap<&'static str, ModifierData>,
}

impl ModifiersData {
    /// Slot of `name`.
    pub fn get(&self, name: &str) -> Option<&ModifierData> {
        self.slots.get(name)
    }

    /// Mutable slot of `name`. Only the owning modifier should call this.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModifierData> {
        self.slots.get_mut(name)
    }

    /// Replace the slot of `name`. Only the owning modifier should call this.
    pub fn insert(&mut self, name: &'static str, data: ModifierData) -> Option<ModifierData> {
        self.slots.insert(name, data)
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slot is filled.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Base popper origin written by `popper_offsets`.
    pub fn popper_offsets(&self) -> Option<Point> {
        match self.get(names::POPPER_OFFSETS)? {
            ModifierData::PopperOffsets(p) => Some(*p),
            _ => None,
        }
    }

    /// Displacement table written by `offset`.
    pub fn offset(&self) -> Option<&OffsetData> {
        match self.get(names::OFFSET)? {
            ModifierData::Offset(d) => Some(d),
            _ => None,
        }
    }

    /// Bookkeeping written by `flip`.
    pub fn flip(&self) -> Option<&FlipData> {
        match self.get(names::FLIP)? {
            ModifierData::Flip(d) => Some(d),
            _ => None,
        }
    }

    /// Delta applied by `prevent_overflow`.
    pub fn prevent_overflow(&self) -> Option<Vec2> {
        match self.get(names::PREVENT_OVERFLOW)? {
            ModifierData::PreventOverflow(v) => Some(*v),
            _ => None,
        }
    }

    /// Arrow position written by `arrow`.
    pub fn arrow(&self) -> Option<&ArrowData> {
        match self.get(names::ARROW)? {
            ModifierData::Arrow(d) => Some(d),
            _ => None,
        }
    }

    /// Visibility report written by `hide`.
    pub fn hide(&self) -> Option<&HideData> {
        match self.get(names::HIDE)? {
            ModifierData::Hide(d) => Some(d),
            _ => None,
        }
    }

    /// Custom data stored under `name`, if it has type `T`.
    pub fn custom<T: Any>(&self, name: &str) -> Option<&T> {
        match self.get(name)? {
            ModifierData::Custom(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Everything one instance knows about its elements and their placement.
#[derive(Clone, Debug)]
pub struct State {
    /// The positioned elements.
    pub elements: Elements,
    /// Current options.
    pub options: Options,
    /// Current placement; may differ from the preferred one after `flip`.
    pub placement: Placement,
    /// Current strategy.
    pub strategy: Strategy,
    /// Resolved execution order, cached until the options change.
    pub ordered_modifiers: Vec<ModifierDescriptor>,
    /// Rects measured at the start of the pass.
    pub rects: StateRects,
    /// Scrollable ancestors; read-only to modifiers.
    pub scroll_parents: ScrollParents,
    /// Working positions.
    pub offsets: StateOffsets,
    /// Per-target style output.
    pub styles: BTreeMap<Target, Style>,
    /// Per-target attribute output.
    pub attributes: BTreeMap<Target, Attributes>,
    /// Per-modifier data slots.
    pub modifiers_data: ModifiersData,
    /// Set by a modifier to restart the pass from the top.
    pub reset: bool,
}

impl State {
    pub(crate) fn new(
        elements: Elements,
        options: Options,
        ordered_modifiers: Vec<ModifierDescriptor>,
    ) -> Self {
        Self {
            elements,
            placement: options.placement,
            strategy: options.strategy,
            options,
            ordered_modifiers,
            rects: StateRects::default(),
            scroll_parents: ScrollParents::default(),
            offsets: StateOffsets::default(),
            styles: BTreeMap::new(),
            attributes: BTreeMap::new(),
            modifiers_data: ModifiersData::default(),
            reset: false,
        }
    }

    /// Popper rect at the current working offsets, if they are set.
    pub fn popper_rect(&self) -> Option<Rect> {
        self.offsets
            .popper
            .map(|origin| Rect::from_origin_size(origin, self.rects.popper.size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_readers_check_the_variant() {
        let mut data = ModifiersData::default();
        data.insert(names::POPPER_OFFSETS, ModifierData::PopperOffsets(Point::new(1.0, 2.0)));
        data.insert(names::FLIP, ModifierData::PreventOverflow(Vec2::ZERO));
        assert_eq!(data.popper_offsets(), Some(Point::new(1.0, 2.0)));
        assert!(data.flip().is_none(), "wrong variant under a known name");
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn custom_slots_downcast() {
        let mut data = ModifiersData::default();
        data.insert("counter", ModifierData::Custom(Rc::new(3_u32)));
        assert_eq!(data.custom::<u32>("counter"), Some(&3));
        assert!(data.custom::<i64>("counter").is_none());
        assert!(data.custom::<u32>("missing").is_none());
    }

    #[test]
    fn options_merge_keeps_unset_fields() {
        let mut o = Options::bare().with_placement(Placement::LEFT);
        o.merge(OptionsUpdate {
            strategy: Some(Strategy::Fixed),
            ..OptionsUpdate::default()
        });
        assert_eq!(o.placement, Placement::LEFT);
        assert_eq!(o.strategy, Strategy::Fixed);
        assert!(o.modifiers.is_empty());
    }

    #[test]
    fn popper_rect_follows_offsets() {
        let mut s = State::new(
            Elements::new(crate::types::ElementId(1), crate::types::ElementId(2)),
            Options::bare(),
            Vec::new(),
        );
        s.rects.popper = Rect::new(0.0, 0.0, 30.0, 10.0);
        assert!(s.popper_rect().is_none());
        s.offsets.popper = Some(Point::new(5.0, 5.0));
        assert_eq!(s.popper_rect(), Some(Rect::new(5.0, 5.0, 35.0, 15.0)));
    }
}
