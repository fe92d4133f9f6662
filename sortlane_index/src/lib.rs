// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sortlane Index: broad-phase 2D AABB queries.
//!
//! Sortlane rebuilds a small index of candidate hitboxes on every drag pass
//! and asks it which candidates touch the dragged box. This crate provides:
//!
//! - [`Aabb2D`]: a closed axis-aligned box. Touching boxes overlap.
//! - [`IndexGeneric`]: stable [`Key`]s, payloads, and a pluggable [`Backend`].
//! - [`FlatVec`](backends::FlatVec): linear scans, the default.
//! - [`Grid`](backends::Grid): a uniform `f64` grid (feature `backend_grid`).
//!
//! Entries may carry a summary. With `u64` summaries used as bitmasks, a
//! filtered query skips entries that share no bit with the query mask.
//!
//! ```rust
//! use sortlane_index::{Aabb2D, Index};
//!
//! let mut idx: Index<f64, &str, u64> = Index::new();
//! idx.insert_with_summary(Aabb2D::new(0.0, 0.0, 100.0, 40.0), "card", 0b01);
//! idx.insert_with_summary(Aabb2D::new(0.0, 40.0, 100.0, 80.0), "lane", 0b10);
//!
//! let drag = Aabb2D::new(10.0, 30.0, 90.0, 50.0);
//! let mut hits = Vec::new();
//! idx.visit_rect_filtered(drag, &0b01_u64, &(), |_, p| hits.push(*p));
//! assert_eq!(hits, ["card"]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod backend;
pub mod backends;
mod index;
mod types;

pub use backend::{Backend, SubtreeFilter, SubtreeSummary};
pub use index::{Index, IndexGeneric};
pub use types::{Aabb2D, Key};
