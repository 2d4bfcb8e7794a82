use crate::entity::EntityId;
use crate::geometry::{Point, Rect};

pub(crate) type NodeId = usize;

/// Child slot of a branch. Low `x`/`y` come first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Quadrant {
    BottomLeft = 0,
    BottomRight = 1,
    TopLeft = 2,
    TopRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
        Quadrant::TopLeft,
        Quadrant::TopRight,
    ];

    fn high_x(self) -> bool {
        matches!(self, Quadrant::BottomRight | Quadrant::TopRight)
    }

    fn high_y(self) -> bool {
        matches!(self, Quadrant::TopLeft | Quadrant::TopRight)
    }

    /// Cell covered by this quadrant of `parent`.
    pub fn cell(self, parent: &Rect) -> Rect {
        parent.quarter(parent.center(), self.high_x(), self.high_y())
    }

    /// Quadrants of a cell split at `center` that `bound` is routed to.
    ///
    /// A coordinate equal to the center line belongs to the low side only,
    /// so a point always lands in exactly one quadrant. A bound crossing a
    /// center line lands on both sides. NaN coordinates match nothing.
    pub fn route(center: Point, bound: &Rect) -> impl Iterator<Item = Quadrant> {
        let low_x = bound.min().x <= center.x;
        let high_x = bound.max().x > center.x;
        let low_y = bound.min().y <= center.y;
        let high_y = bound.max().y > center.y;
        Quadrant::ALL.into_iter().filter(move |q| {
            let x = if q.high_x() { high_x } else { low_x };
            let y = if q.high_y() { high_y } else { low_y };
            x && y
        })
    }
}

/// A leaf owns entity handles, a branch owns exactly four children.
#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Leaf(Vec<EntityId>),
    Branch([NodeId; 4]),
}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub bound: Rect,
    pub depth: u8,
    /// Non-owning link used by removal to walk up for collapse checks.
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub fn leaf(bound: Rect, depth: u8, parent: Option<NodeId>, capacity: usize) -> Self {
        Self {
            bound,
            depth,
            parent,
            kind: NodeKind::Leaf(Vec::with_capacity(capacity)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn children(&self) -> Option<&[NodeId; 4]> {
        match &self.kind {
            NodeKind::Branch(children) => Some(children),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn entities(&self) -> Option<&[EntityId]> {
        match &self.kind {
            NodeKind::Leaf(entities) => Some(entities),
            NodeKind::Branch(_) => None,
        }
    }

    /// Children this node routes `bound` to. Empty for leaves.
    pub fn route<'a>(&'a self, bound: &Rect) -> impl Iterator<Item = NodeId> + 'a {
        let children = self.children();
        Quadrant::route(self.bound.center(), bound)
            .filter_map(move |q| children.map(|c| c[q as usize]))
    }
}
