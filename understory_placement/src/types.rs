// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core vocabulary: elements, sides, alignments, placements, axes, strategies, and per-edge values.
//!
//! ## Overview
//!
//! These types describe *where* a floating element goes relative to its reference.
//! They are shared by the [`geometry`](crate::geometry) helpers, every built-in
//! [modifier](crate::modifiers), and the [`Instance`](crate::instance::Instance) state.

use core::fmt;
use core::str::FromStr;

use kurbo::{Point, Rect, Size, Vec2};

/// Opaque handle for a host element.
///
/// The engine never dereferences it; it is passed back to the [`Measure`](crate::platform::Measure),
/// [`Observer`](crate::platform::Observer), and [`StyleWriter`](crate::platform::StyleWriter)
/// collaborators, which map it to whatever the host uses (a DOM node, a box tree node, a window).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementId(pub u64);

/// The elements one instance positions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Elements {
    /// Anchor the floating element is placed against.
    pub reference: ElementId,
    /// The floating element (tooltip, dropdown, popover).
    pub popper: ElementId,
    /// Optional arrow/caret inside the popper.
    pub arrow: Option<ElementId>,
}

impl Elements {
    /// Reference and popper without an arrow.
    pub const fn new(reference: ElementId, popper: ElementId) -> Self {
        Self {
            reference,
            popper,
            arrow: None,
        }
    }

    /// Resolve a style target to its element, if the target is present.
    pub fn get(&self, target: Target) -> Option<ElementId> {
        match target {
            Target::Reference => Some(self.reference),
            Target::Popper => Some(self.popper),
            Target::Arrow => self.arrow,
        }
    }
}

/// Keys of the per-target [`styles`](crate::state::State::styles) and
/// [`attributes`](crate::state::State::attributes) outputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Target {
    /// The reference element.
    Reference,
    /// The floating element.
    Popper,
    /// The arrow element.
    Arrow,
}

/// Something a scroll or resize observer can be attached to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ScrollTarget {
    /// A scrollable ancestor element.
    Element(ElementId),
    /// The root viewport (window).
    Viewport,
}

/// Basic side of the reference a floating element is attached to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Side {
    /// Above the reference.
    Top,
    /// Right of the reference.
    Right,
    /// Below the reference.
    Bottom,
    /// Left of the reference.
    Left,
}

impl Side {
    /// All sides, clockwise from the top.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The side across the reference.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Next side clockwise.
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Top => Self::Right,
            Self::Right => Self::Bottom,
            Self::Bottom => Self::Left,
            Self::Left => Self::Top,
        }
    }

    /// Axis perpendicular to this side: `Y` for top/bottom, `X` for left/right.
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Y,
            Self::Left | Self::Right => Axis::X,
        }
    }

    /// True for the sides at the coordinate origin (top and left).
    pub const fn is_origin(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }

    /// Kebab-case label, as used in placement strings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Alignment along the side; absent means centered.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Alignment {
    /// Align with the reference's start edge (left or top).
    Start,
    /// Align with the reference's end edge (right or bottom).
    End,
}

impl Alignment {
    /// `Start` ↔ `End`.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    /// Kebab-case label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// One of the 12 placements: a [`Side`] plus an optional [`Alignment`].
///
/// ```
/// use understory_placement::types::{Alignment, Axis, Placement, Side};
///
/// let p: Placement = "bottom-start".parse().unwrap();
/// assert_eq!(p, Placement::BOTTOM_START);
/// assert_eq!(p.side(), Side::Bottom);
/// assert_eq!(p.alignment(), Some(Alignment::Start));
/// assert_eq!(p.main_axis(), Axis::Y);
/// assert_eq!(p.cross_axis(), Axis::X);
/// assert_eq!(p.to_string(), "bottom-start");
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Placement {
    side: Side,
    alignment: Option<Alignment>,
}

impl Placement {
    /// Centered above.
    pub const TOP: Self = Self::new(Side::Top, None);
    /// Above, start-aligned.
    pub const TOP_START: Self = Self::new(Side::Top, Some(Alignment::Start));
    /// Above, end-aligned.
    pub const TOP_END: Self = Self::new(Side::Top, Some(Alignment::End));
    /// Centered to the right.
    pub const RIGHT: Self = Self::new(Side::Right, None);
    /// Right, start-aligned.
    pub const RIGHT_START: Self = Self::new(Side::Right, Some(Alignment::Start));
    /// Right, end-aligned.
    pub const RIGHT_END: Self = Self::new(Side::Right, Some(Alignment::End));
    /// Centered below.
    pub const BOTTOM: Self = Self::new(Side::Bottom, None);
    /// Below, start-aligned.
    pub const BOTTOM_START: Self = Self::new(Side::Bottom, Some(Alignment::Start));
    /// Below, end-aligned.
    pub const BOTTOM_END: Self = Self::new(Side::Bottom, Some(Alignment::End));
    /// Centered to the left.
    pub const LEFT: Self = Self::new(Side::Left, None);
    /// Left, start-aligned.
    pub const LEFT_START: Self = Self::new(Side::Left, Some(Alignment::Start));
    /// Left, end-aligned.
    pub const LEFT_END: Self = Self::new(Side::Left, Some(Alignment::End));

    /// Every placement, clockwise from the top, centered first within a side.
    pub const ALL: [Self; 12] = [
        Self::TOP,
        Self::TOP_START,
        Self::TOP_END,
        Self::RIGHT,
        Self::RIGHT_START,
        Self::RIGHT_END,
        Self::BOTTOM,
        Self::BOTTOM_START,
        Self::BOTTOM_END,
        Self::LEFT,
        Self::LEFT_START,
        Self::LEFT_END,
    ];

    /// Compose a placement.
    pub const fn new(side: Side, alignment: Option<Alignment>) -> Self {
        Self { side, alignment }
    }

    /// Basic side.
    pub const fn side(self) -> Side {
        self.side
    }

    /// Alignment, `None` when centered.
    pub const fn alignment(self) -> Option<Alignment> {
        self.alignment
    }

    /// Axis the popper is pushed away from the reference along (perpendicular to the side).
    pub const fn main_axis(self) -> Axis {
        self.side.axis()
    }

    /// Axis the alignment applies to (parallel to the side).
    pub const fn cross_axis(self) -> Axis {
        self.side.axis().other()
    }

    /// Same alignment on the opposite side.
    pub const fn opposite(self) -> Self {
        Self::new(self.side.opposite(), self.alignment)
    }

    /// Same side, different alignment.
    pub const fn with_alignment(self, alignment: Option<Alignment>) -> Self {
        Self::new(self.side, alignment)
    }

    /// Same alignment, different side.
    pub const fn with_side(self, side: Side) -> Self {
        Self::new(side, self.alignment)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::BOTTOM
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alignment {
            Some(a) => write!(f, "{}-{}", self.side.label(), a.label()),
            None => f.write_str(self.side.label()),
        }
    }
}

/// Error returned when a placement label does not name one of the 12 placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsePlacementError;

impl fmt::Display for ParsePlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown placement label")
    }
}

impl core::error::Error for ParsePlacementError {}

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, alignment) = match s.split_once('-') {
            Some((side, alignment)) => (side, Some(alignment)),
            None => (s, None),
        };
        let side = match side {
            "top" => Side::Top,
            "right" => Side::Right,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            _ => return Err(ParsePlacementError),
        };
        let alignment = match alignment {
            None => None,
            Some("start") => Some(Alignment::Start),
            Some("end") => Some(Alignment::End),
            Some(_) => return Err(ParsePlacementError),
        };
        Ok(Self::new(side, alignment))
    }
}

/// A 2D axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    /// The perpendicular axis.
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Side at the low end of this axis.
    pub const fn start_side(self) -> Side {
        match self {
            Self::X => Side::Left,
            Self::Y => Side::Top,
        }
    }

    /// Side at the high end of this axis.
    pub const fn end_side(self) -> Side {
        match self {
            Self::X => Side::Right,
            Self::Y => Side::Bottom,
        }
    }

    /// Component of a point.
    pub const fn of_point(self, p: Point) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
        }
    }

    /// Component of a vector.
    pub const fn of_vec(self, v: Vec2) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
        }
    }

    /// Extent of a size along this axis.
    pub const fn of_size(self, s: Size) -> f64 {
        match self {
            Self::X => s.width,
            Self::Y => s.height,
        }
    }

    /// Low edge of a rect along this axis.
    pub const fn start_of(self, r: Rect) -> f64 {
        match self {
            Self::X => r.x0,
            Self::Y => r.y0,
        }
    }

    /// High edge of a rect along this axis.
    pub const fn end_of(self, r: Rect) -> f64 {
        match self {
            Self::X => r.x1,
            Self::Y => r.y1,
        }
    }

    /// Length of a rect along this axis.
    pub fn extent(self, r: Rect) -> f64 {
        self.end_of(r) - self.start_of(r)
    }

    /// Overwrite this axis' component of a point.
    pub fn set_point(self, p: &mut Point, value: f64) {
        match self {
            Self::X => p.x = value,
            Self::Y => p.y = value,
        }
    }

    /// A vector with `value` on this axis and zero on the other.
    pub const fn vec(self, value: f64) -> Vec2 {
        match self {
            Self::X => Vec2::new(value, 0.0),
            Self::Y => Vec2::new(0.0, value),
        }
    }
}

/// Positioning mode; selects the coordinate space rects are measured in.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// Positioned against the offset parent; scrolls with the document.
    #[default]
    Absolute,
    /// Positioned against the viewport.
    Fixed,
}

/// Per-edge values: overflow distances, clamp padding, clipping offsets.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SideObject {
    /// Top edge.
    pub top: f64,
    /// Right edge.
    pub right: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Left edge.
    pub left: f64,
}

/// Per-edge padding. A scalar converts to a uniform padding; use struct update
/// over [`SideObject::ZERO`] for partial per-edge overrides.
///
/// ```
/// use understory_placement::types::{Padding, SideObject};
///
/// let uniform: Padding = 4.0.into();
/// assert_eq!(uniform.left, 4.0);
/// let partial = Padding { top: 8.0, ..SideObject::ZERO };
/// assert_eq!((partial.top, partial.bottom), (8.0, 0.0));
/// ```
pub type Padding = SideObject;

impl SideObject {
    /// All edges zero.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Same value on every edge.
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Value for one edge.
    pub const fn get(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    /// Mutable value for one edge.
    pub fn get_mut(&mut self, side: Side) -> &mut f64 {
        match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        }
    }

    /// True when any edge is `>= 0`.
    pub fn any_non_negative(&self) -> bool {
        Side::ALL.iter().any(|&s| self.get(s) >= 0.0)
    }
}

impl From<f64> for SideObject {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}
