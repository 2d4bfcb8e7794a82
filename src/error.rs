use thiserror::Error;

use crate::geometry::Rect;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuadtreeError {
    #[error("max entities per node must be positive (got {max_entities})")]
    InvalidConfiguration { max_entities: usize },

    #[error("bound must be finite with min <= max (min: ({min_x}, {min_y}), max: ({max_x}, {max_y}))")]
    InvalidBound {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("bound {bound} lies outside the tree bound {root}")]
    OutOfBounds { bound: Rect, root: Rect },

    #[error("no entity with bound {0} in the tree")]
    NotFound(Rect),

    /// Routing could not pick any child cell. Only malformed bounds get here.
    #[error("no child quadrant found for bound {0}")]
    NoQuadrantFound(Rect),

    #[error("no entities given")]
    NoEntities,
}

pub type Result<T> = std::result::Result<T, QuadtreeError>;
