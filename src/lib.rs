//! A bounded region quadtree for axis-aligned rectangles.
//!
//! Leaves split into four equal quadrants once they hold more than
//! [`Config::max_entities`] entities, down to [`Config::max_depth`]. Removing
//! entities merges sparse branches back into leaves.

mod config;
mod entity;
mod error;
mod geometry;
mod list;
mod node;
mod quadtree;

pub use config::Config;
pub use entity::{Action, Entity, EntityId};
pub use error::{QuadtreeError, Result};
pub use geometry::{Point, Rect};
pub use node::Quadrant;
pub use quadtree::Quadtree;

/// Callbacks for [`Quadtree::traverse`]. Nodes are visited depth first,
/// children in [`Quadrant`] order.
pub trait QuadtreeVisitor<T> {
    fn entity(&mut self, id: EntityId, entity: &Entity<T>);
    fn leaf(&mut self, depth: u8, bound: &Rect);
    fn branch(&mut self, depth: u8, bound: &Rect);
}
