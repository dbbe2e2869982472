//! Annotation shape lookup.
//!
//! Mirrors the seeded `shapes` table. Only the two shapes the conversion
//! pipeline touches are modelled: points are what it reads, polygons are
//! what it writes.

use crate::error::CoreError;
use crate::types::DbId;

/// The geometric shape of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Point,
    Polygon,
}

impl Shape {
    /// Return the seeded database id for this shape.
    pub fn id(&self) -> DbId {
        match self {
            Self::Point => 1,
            Self::Polygon => 3,
        }
    }

    /// Return the shape as a lowercase string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Polygon => "polygon",
        }
    }

    /// Look up a shape by its database id.
    pub fn from_id(id: DbId) -> Result<Self, CoreError> {
        match id {
            1 => Ok(Self::Point),
            3 => Ok(Self::Polygon),
            _ => Err(CoreError::Validation(format!(
                "Unknown shape id {id}. The conversion pipeline only handles point and polygon"
            ))),
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
