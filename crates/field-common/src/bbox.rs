//! Bounding box of a horizontal grid.

use serde::{Deserialize, Serialize};

/// A longitude/latitude bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.4}, {:.4}] x [{:.4}, {:.4}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_edges_inclusive() {
        let bbox = BoundingBox::new(0.0, 0.0, 4.0, 4.0);

        assert!(bbox.contains_point(4.0, 0.0));
        assert!(bbox.contains_point(2.0, 2.0));
        assert!(!bbox.contains_point(4.1, 0.0));
        assert!(!bbox.contains_point(2.0, -0.1));
    }

    #[test]
    fn test_display() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(bbox.to_string(), "[1.0000, 3.0000] x [2.0000, 4.0000]");
    }
}
