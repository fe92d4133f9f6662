// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region edges and layout axes.

use kurbo::Vec2;

/// One edge of a rectangular region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The `y0` edge.
    Top,
    /// The `x1` edge.
    Right,
    /// The `y1` edge.
    Bottom,
    /// The `x0` edge.
    Left,
}

impl Side {
    /// All four sides in clockwise order starting at the top.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The axis along which content scrolls when this edge triggers.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// `+1.0` for edges that scroll towards larger offsets, `-1.0` otherwise.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Right | Self::Bottom => 1.0,
            Self::Top | Self::Left => -1.0,
        }
    }

    /// Position of this side among its region's trigger zones.
    ///
    /// Used as the last path component of a trigger-zone entity.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Top => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Left => 3,
        }
    }

    /// Unit vector pointing out of the region through this edge.
    #[must_use]
    pub fn outward(self) -> Vec2 {
        self.axis().unit() * self.sign()
    }
}

/// Layout axis of a sort group or scroll direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    #[default]
    Vertical,
}

impl Axis {
    /// Unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(1.0, 0.0),
            Self::Vertical => Vec2::new(0.0, 1.0),
        }
    }

    /// Component of `v` along this axis.
    #[must_use]
    pub fn component(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }
}
