use crate::error::{QuadtreeError, Result};

/// Fixed shape parameters of a [`Quadtree`](crate::Quadtree).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Entities a leaf holds before it splits. Must be positive.
    pub max_entities: usize,
    /// Depth at which leaves stop splitting. `0` keeps the root a leaf.
    pub max_depth: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entities: 10,
            max_depth: 5,
        }
    }
}

impl Config {
    pub fn with_max_entities(mut self, max_entities: usize) -> Self {
        self.max_entities = max_entities;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entities == 0 {
            return Err(QuadtreeError::InvalidConfiguration {
                max_entities: self.max_entities,
            });
        }
        Ok(())
    }
}
