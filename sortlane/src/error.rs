// Copyright 2025 the Sortlane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::ids::{EntityId, PointerId, RegionId, SortGroupId};

/// Errors reported by the `try_*` methods of [`Stage`](crate::Stage).
///
/// The non-`try` counterparts treat every one of these as a logged no-op.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageError {
    /// No entity is registered under this id.
    UnknownEntity(EntityId),
    /// An entity with this id is already registered.
    DuplicateEntity(EntityId),
    /// The entity exists but has not been measured or is hidden.
    InactiveEntity(EntityId),
    /// No region exists with this id.
    UnknownRegion(RegionId),
    /// No sort group exists with this id.
    UnknownSortGroup(SortGroupId),
    /// A drag is already in progress.
    AlreadyDragging {
        /// Entity of the running session.
        entity: EntityId,
    },
    /// No drag is in progress, or it belongs to another pointer.
    NotDragging(PointerId),
    /// Interning another type name would exceed the per-stage limit.
    TooManyTypes {
        /// Maximum number of distinct type names.
        limit: usize,
    },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity(id) => write!(f, "{id} is not registered"),
            Self::DuplicateEntity(id) => write!(f, "{id} is already registered"),
            Self::InactiveEntity(id) => write!(f, "{id} is hidden or has not been measured"),
            Self::UnknownRegion(id) => write!(f, "{id} does not exist"),
            Self::UnknownSortGroup(id) => write!(f, "{id} does not exist"),
            Self::AlreadyDragging { entity } => {
                write!(f, "a drag of {entity} is already in progress")
            }
            Self::NotDragging(pointer) => {
                write!(f, "no drag is in progress for pointer {}", pointer.0)
            }
            Self::TooManyTypes { limit } => {
                write!(f, "cannot intern more than {limit} type names")
            }
        }
    }
}

impl core::error::Error for StageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_subject() {
        assert_eq!(
            StageError::UnknownEntity(EntityId(7)).to_string(),
            "entity#7 is not registered"
        );
        assert_eq!(
            StageError::TooManyTypes { limit: 64 }.to_string(),
            "cannot intern more than 64 type names"
        );
    }
}
