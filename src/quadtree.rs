use log::{debug, trace};

use crate::config::Config;
use crate::entity::{Entity, EntityId};
use crate::error::{QuadtreeError, Result};
use crate::geometry::Rect;
use crate::list::List;
use crate::node::{Node, NodeId, NodeKind, Quadrant};
use crate::QuadtreeVisitor;

/// Region quadtree over a fixed rectangle.
///
/// Entities are routed by their full bound: a bound crossing a split line
/// is referenced from every leaf it overlaps and reported once by queries.
/// Mutation takes `&mut self` and queries take `&self`, so sharing a tree
/// between threads needs an external reader-writer lock.
pub struct Quadtree<T> {
    config: Config,
    root: NodeId,
    nodes: List<Node>,
    entities: List<Entity<T>>,
}

impl<T> Quadtree<T> {
    pub fn new(bound: Rect, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(bound, config))
    }

    /// Tree with `max_entities = 10` and `max_depth = 5`.
    pub fn with_defaults(bound: Rect) -> Self {
        Self::empty(bound, Config::default())
    }

    fn empty(bound: Rect, config: Config) -> Self {
        let mut nodes = List::new();
        let root = nodes.insert(Node::leaf(bound, 0, None, config.max_entities));
        Self {
            config,
            root,
            nodes,
            entities: List::new(),
        }
    }

    pub fn bound(&self) -> Rect {
        self.nodes[self.root].bound
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of distinct entities stored.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of live nodes, branches and leaves alike.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest live node.
    pub fn depth(&self) -> u8 {
        self.nodes.iter().map(|(_, node)| node.depth).max().unwrap_or(0)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity<T>> {
        self.entities.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity<T>)> {
        self.entities.iter().map(|(index, entity)| (EntityId(index), entity))
    }

    pub fn clear(&mut self) {
        let bound = self.bound();
        self.nodes.clear();
        self.entities.clear();
        self.root = self.nodes.insert(Node::leaf(bound, 0, None, self.config.max_entities));
    }

    /// Stores `entity`. Its bound must lie entirely inside the tree bound.
    pub fn insert(&mut self, entity: Entity<T>) -> Result<EntityId> {
        self.check_bound(&entity.bound)?;

        let bound = entity.bound;
        let id = EntityId(self.entities.insert(entity));
        if let Err(err) = self.node_insert(self.root, id, &bound) {
            self.detach(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Inserts every entity or none of them.
    pub fn insert_many<I>(&mut self, entities: I) -> Result<Vec<EntityId>>
    where
        I: IntoIterator<Item = Entity<T>>,
    {
        let entities: Vec<Entity<T>> = entities.into_iter().collect();
        if entities.is_empty() {
            return Err(QuadtreeError::NoEntities);
        }
        for entity in &entities {
            self.check_bound(&entity.bound)?;
        }

        let mut ids = Vec::with_capacity(entities.len());
        for entity in entities {
            match self.insert(entity) {
                Ok(id) => ids.push(id),
                Err(err) => {
                    for id in ids {
                        self.detach(id);
                    }
                    return Err(err);
                }
            }
        }
        Ok(ids)
    }

    fn check_bound(&self, bound: &Rect) -> Result<()> {
        let root = self.bound();
        if !root.contains_rect(bound) {
            debug!("rejecting entity {} outside tree bound {}", bound, root);
            return Err(QuadtreeError::OutOfBounds { bound: *bound, root });
        }
        Ok(())
    }

    /// Removes the entity whose bound equals `bound` and hands it back.
    ///
    /// When several stored entities share the bound, one of them is removed.
    pub fn remove(&mut self, bound: &Rect) -> Result<Entity<T>> {
        let leaves = if self.bound().intersects(bound) {
            self.find_leaves(self.root, bound)?
        } else {
            Vec::new()
        };

        let found = leaves.iter().find_map(|&leaf| {
            self.nodes[leaf]
                .entities()?
                .iter()
                .copied()
                .find(|id| self.entities[id.0].bound == *bound)
        });
        let Some(id) = found else {
            debug!("no entity with bound {} to remove", bound);
            return Err(QuadtreeError::NotFound(*bound));
        };

        let mut parents = Vec::new();
        for leaf in leaves {
            let node = &mut self.nodes[leaf];
            if let NodeKind::Leaf(entities) = &mut node.kind {
                if let Some(pos) = entities.iter().position(|e| *e == id) {
                    entities.swap_remove(pos);
                    parents.extend(node.parent);
                }
            }
        }
        parents.sort_unstable();
        parents.dedup();
        for parent in parents {
            self.collapse_upward(parent);
        }

        self.entities
            .erase(id.0)
            .ok_or(QuadtreeError::NotFound(*bound))
    }

    pub fn remove_entity(&mut self, entity: &Entity<T>) -> Result<Entity<T>> {
        self.remove(&entity.bound)
    }

    /// Entities stored in every leaf whose cell the query reaches.
    ///
    /// This is a candidate set: it may hold entities that do not overlap
    /// `query`. Each entity appears once.
    pub fn retrieve(&self, query: &Rect) -> Vec<&Entity<T>> {
        self.retrieve_ids(query)
            .into_iter()
            .map(|id| &self.entities[id.0])
            .collect()
    }

    /// Handles of the candidate set returned by [`Quadtree::retrieve`].
    pub fn retrieve_ids(&self, query: &Rect) -> Vec<EntityId> {
        let mut out = Vec::new();
        if !self.bound().intersects(query) {
            return out;
        }
        let leaves = match self.find_leaves(self.root, query) {
            Ok(leaves) => leaves,
            Err(err) => {
                debug!("query {} matched no quadrant: {}", query, err);
                return out;
            }
        };

        let mut seen = vec![false; self.entities.slots()];
        for leaf in leaves {
            for &id in self.nodes[leaf].entities().unwrap_or_default() {
                if !seen[id.0] {
                    seen[id.0] = true;
                    out.push(id);
                }
            }
        }
        out
    }

    /// Entities whose bound overlaps `query`.
    pub fn intersects(&self, query: &Rect) -> Vec<&Entity<T>> {
        self.retrieve(query)
            .into_iter()
            .filter(|entity| entity.bound.intersects(query))
            .collect()
    }

    /// Whether any entity overlaps `query`.
    pub fn is_intersect(&self, query: &Rect) -> bool {
        self.retrieve(query)
            .iter()
            .any(|entity| entity.bound.intersects(query))
    }

    /// Whether an entity with exactly this bound is stored.
    pub fn contains(&self, bound: &Rect) -> bool {
        self.retrieve(bound).iter().any(|entity| entity.bound == *bound)
    }

    pub fn contains_entity(&self, entity: &Entity<T>) -> bool {
        self.contains(&entity.bound)
    }

    pub fn traverse<V>(&self, visitor: &mut V)
    where
        V: QuadtreeVisitor<T>,
    {
        let mut to_process = vec![self.root];

        while let Some(node_id) = to_process.pop() {
            let node = &self.nodes[node_id];
            match &node.kind {
                NodeKind::Branch(children) => {
                    visitor.branch(node.depth, &node.bound);
                    // Reversed so children pop in quadrant order.
                    to_process.extend(children.iter().rev());
                }
                NodeKind::Leaf(entities) => {
                    visitor.leaf(node.depth, &node.bound);
                    for &id in entities {
                        visitor.entity(id, &self.entities[id.0]);
                    }
                }
            }
        }
    }

    /// Leaves under `start_node` whose cells `bound` is routed to.
    fn find_leaves(&self, start_node: NodeId, bound: &Rect) -> Result<Vec<NodeId>> {
        let mut leaves = Vec::new();
        let mut to_process = vec![start_node];

        while let Some(node_id) = to_process.pop() {
            let node = &self.nodes[node_id];
            if node.is_leaf() {
                leaves.push(node_id);
                continue;
            }
            let pending = to_process.len();
            to_process.extend(node.route(bound));
            if to_process.len() == pending {
                debug_assert!(false, "bound {} routed to no child of node {}", bound, node_id);
                return Err(QuadtreeError::NoQuadrantFound(*bound));
            }
        }
        Ok(leaves)
    }

    fn node_insert(&mut self, start_node: NodeId, id: EntityId, bound: &Rect) -> Result<()> {
        for leaf in self.find_leaves(start_node, bound)? {
            self.leaf_insert(leaf, id)?;
        }
        Ok(())
    }

    fn leaf_insert(&mut self, leaf: NodeId, id: EntityId) -> Result<()> {
        let max_entities = self.config.max_entities;
        let max_depth = self.config.max_depth;
        let node = &mut self.nodes[leaf];
        let NodeKind::Leaf(entities) = &mut node.kind else {
            return Err(QuadtreeError::NoQuadrantFound(self.entities[id.0].bound));
        };
        entities.push(id);

        // Leaves at max depth overflow instead of splitting.
        if entities.len() > max_entities && node.depth < max_depth {
            self.split(leaf)?;
        }
        Ok(())
    }

    /// Turns a leaf into a branch and pushes its entities down a level.
    fn split(&mut self, node_id: NodeId) -> Result<()> {
        let Node { bound, depth, .. } = self.nodes[node_id];
        let capacity = self.config.max_entities;

        let mut children = [0; 4];
        for quadrant in Quadrant::ALL {
            let child = Node::leaf(quadrant.cell(&bound), depth + 1, Some(node_id), capacity);
            children[quadrant as usize] = self.nodes.insert(child);
        }

        let previous = std::mem::replace(&mut self.nodes[node_id].kind, NodeKind::Branch(children));
        if let NodeKind::Leaf(moved) = previous {
            trace!("split node {} at depth {}, moving {} entities", node_id, depth, moved.len());
            for id in moved {
                let bound = self.entities[id.0].bound;
                self.node_insert(node_id, id, &bound)?;
            }
        }
        Ok(())
    }

    /// Collapses `node_id` and then its ancestors for as long as each one
    /// qualifies.
    fn collapse_upward(&mut self, node_id: NodeId) {
        let mut next = Some(node_id);
        while let Some(node_id) = next {
            if !self.collapse(node_id) {
                break;
            }
            next = self.nodes[node_id].parent;
        }
    }

    /// Merges the children of a branch into it when they are all leaves
    /// holding fewer than `max_entities` distinct entities together.
    fn collapse(&mut self, node_id: NodeId) -> bool {
        // An earlier collapse in the same removal may have freed this node.
        let Some(node) = self.nodes.get(node_id) else {
            return false;
        };
        let Some(&children) = node.children() else {
            return false;
        };

        let mut merged: Vec<EntityId> = Vec::with_capacity(self.config.max_entities);
        for &child in &children {
            let Some(entities) = self.nodes[child].entities() else {
                return false;
            };
            for id in entities {
                if !merged.contains(id) {
                    merged.push(*id);
                }
            }
            if merged.len() >= self.config.max_entities {
                return false;
            }
        }

        for child in children {
            self.nodes.erase(child);
        }
        trace!("collapsed node {} into a leaf with {} entities", node_id, merged.len());
        self.nodes[node_id].kind = NodeKind::Leaf(merged);
        true
    }

    /// Drops every reference to `id` from the leaves and frees its slot.
    fn detach(&mut self, id: EntityId) {
        let leaves: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(index, _)| index)
            .collect();
        for leaf in leaves {
            if let NodeKind::Leaf(entities) = &mut self.nodes[leaf].kind {
                entities.retain(|e| *e != id);
            }
        }
        self.entities.erase(id.0);
    }
}
