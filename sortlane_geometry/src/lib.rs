// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sortlane Geometry: hitbox math for drag-and-drop over nested scroll regions.
//!
//! Every interactive region tracked by Sortlane is an axis-aligned
//! [`kurbo::Rect`] (`x0, y0, x1, y1` = `minX, minY, maxX, maxY`). Hosts measure
//! rectangles in viewport space, which moves whenever any enclosing scroll
//! region scrolls. This crate converts between the two frames:
//!
//! - A measured rectangle is turned into an *initial* rectangle that no longer
//!   depends on scroll position ([`measured_to_initial`]).
//! - The initial rectangle is projected back into the current viewport frame
//!   using the scroll shift at query time ([`initial_to_current`]).
//!
//! Sort displacement (the transient translation applied to siblings to open a
//! drop gap) participates in the same algebra with the opposite sign: the host
//! measures a displaced element, and the initial rectangle records where it
//! would be without the displacement.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Rect, Vec2};
//! use sortlane_geometry::{initial_to_current, measured_to_initial};
//!
//! // Measured while the enclosing region was scrolled down by 40.
//! let measured = Rect::new(10.0, 60.0, 110.0, 100.0);
//! let initial = measured_to_initial(measured, Vec2::new(0.0, 40.0), Vec2::ZERO);
//! assert_eq!(initial, Rect::new(10.0, 100.0, 110.0, 140.0));
//!
//! // The region has since scrolled to 90.
//! let current = initial_to_current(initial, Vec2::new(0.0, 90.0), Vec2::ZERO);
//! assert_eq!(current, Rect::new(10.0, 10.0, 110.0, 50.0));
//! ```
//!
//! ## Metrics
//!
//! [`metric`] provides the scalar measures used to resolve drop targets and
//! auto-scroll strength: center distance, intersection-over-union, mean corner
//! distance, and per-side edge distance.
//!
//! This crate is `no_std`.

#![no_std]

mod hitbox;
pub mod metric;
mod scroll;
mod side;

pub use hitbox::{
    edge_band, initial_to_current, margin_box, measured_to_initial, normalize,
    translate_for_movement,
};
pub use scroll::ScrollState;
pub use side::{Axis, Side};
