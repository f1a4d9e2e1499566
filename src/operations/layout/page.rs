use serde::{Deserialize, Serialize};

use crate::config::{Orientation, PageFormat};
use crate::math::polygon_2d::Bounds2;
use crate::math::{Point2, Vector2};
use crate::topology::FaceId;

/// One face of a placed piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedFace {
    pub face: FaceId,
    /// Scaled loops in piece coordinates, with the piece's lower corner at
    /// the origin.
    pub loops: Vec<Vec<Point2>>,
}

impl PlacedFace {
    /// The loops moved to page coordinates.
    #[must_use]
    pub fn page_loops(&self, offset: &Vector2) -> Vec<Vec<Point2>> {
        self.loops
            .iter()
            .map(|lp| lp.iter().map(|p| p + offset).collect())
            .collect()
    }
}

/// A group placed on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedGroup {
    /// Index of the group in grouping order.
    pub group: usize,
    /// Index of the page the group sits on.
    pub page: usize,
    /// Page position of the piece's lower corner, in millimetres.
    pub offset: Vector2,
    pub width: f64,
    pub height: f64,
    pub faces: Vec<PlacedFace>,
}

impl PlacedGroup {
    /// Footprint of the piece on its page.
    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        let min = Point2::from(self.offset);
        Bounds2 {
            min,
            max: min + Vector2::new(self.width, self.height),
        }
    }
}

/// A printable page and the pieces placed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub format: PageFormat,
    pub orientation: Orientation,
    /// Page width after orientation, in millimetres.
    pub width: f64,
    /// Page height after orientation, in millimetres.
    pub height: f64,
    pub groups: Vec<PlacedGroup>,
}
