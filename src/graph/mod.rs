//! Routing graph: vertices live in an arena addressed by [`VertexId`], and a
//! [`PriorityTree`] indexes them by coordinate.

pub mod priority_queue;
pub mod priority_tree;
pub mod search;

use std::collections::HashSet;

use crate::error::RoutingError;
use crate::geometry::Point;

pub use priority_queue::IndexedPriorityQueue;
pub use priority_tree::{PriorityTree, TreeItem};
pub use search::{PathEdge, SearchAlgorithm, ShortestPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct GraphVertex {
    pub position: Point,
    edges: Vec<EdgeId>,
}

impl GraphVertex {
    /// Incident edges, in the order they were added.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// Undirected edge. Both endpoints list it in their adjacency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphEdge {
    pub source: VertexId,
    pub destination: VertexId,
    pub weight: f64,
}

impl GraphEdge {
    pub fn opposite(&self, vertex: VertexId) -> VertexId {
        if self.source == vertex {
            self.destination
        } else {
            self.source
        }
    }

    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.source == a && self.destination == b) || (self.source == b && self.destination == a)
    }
}

#[derive(Debug, Clone, Copy)]
struct VertexSlot {
    id: VertexId,
    position: Point,
}

impl TreeItem for VertexSlot {
    type Key = VertexId;

    fn key(&self) -> VertexId {
        self.id
    }

    fn x(&self) -> f64 {
        self.position.x
    }

    fn y(&self) -> f64 {
        self.position.y
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoutingGraph {
    tree: PriorityTree<VertexSlot>,
    vertices: Vec<Option<GraphVertex>>,
    edges: Vec<Option<GraphEdge>>,
}

impl RoutingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Upper bound (exclusive) on [`VertexId::index`] for live vertices.
    pub fn vertex_bound(&self) -> usize {
        self.vertices.len()
    }

    /// Adds a vertex at `position` unless one is already there.
    pub fn add_node(&mut self, position: Point) -> VertexId {
        if let Some(id) = self.find(position.x, position.y) {
            return id;
        }
        let id = self.push_vertex(position);
        self.tree.insert(VertexSlot { id, position });
        id
    }

    /// Adds every new position with a single tree rebuild.
    pub fn add_nodes(&mut self, positions: impl IntoIterator<Item = Point>) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        let mut added = Vec::new();
        let mut ids = Vec::new();
        for position in positions {
            if let Some(id) = self.find(position.x, position.y) {
                ids.push(id);
                continue;
            }
            if !seen.insert(position.bits()) {
                if let Some(slot) = added.iter().find(|s: &&VertexSlot| s.position == position) {
                    ids.push(slot.id);
                }
                continue;
            }
            let id = self.push_vertex(position);
            added.push(VertexSlot { id, position });
            ids.push(id);
        }
        if !added.is_empty() {
            let items: Vec<VertexSlot> = self.tree.items().iter().copied().chain(added).collect();
            self.tree.build(items);
        }
        ids
    }

    /// Connects the vertices at `a` and `b`. Returns `None` if either is missing.
    pub fn add_edge(&mut self, a: Point, b: Point, weight: f64) -> Option<EdgeId> {
        let source = self.find(a.x, a.y)?;
        let destination = self.find(b.x, b.y)?;
        let id = EdgeId(self.edges.len());
        self.edges.push(Some(GraphEdge {
            source,
            destination,
            weight,
        }));
        self.vertex_mut(source)?.edges.push(id);
        if destination != source {
            self.vertex_mut(destination)?.edges.push(id);
        }
        Some(id)
    }

    /// Removes the first edge joining exactly `a` and `b`.
    pub fn remove_edge(&mut self, a: Point, b: Point) -> Option<GraphEdge> {
        let shared = self.edge_between(a, b)?;
        self.remove_edge_by_id(shared)
    }

    /// First edge joining exactly the vertices at `a` and `b`.
    pub fn edge_between(&self, a: Point, b: Point) -> Option<EdgeId> {
        let first = self.find(a.x, a.y)?;
        let second = self.find(b.x, b.y)?;
        self.vertex(first)?
            .edges
            .iter()
            .copied()
            .find(|id| self.edge(*id).is_some_and(|e| e.connects(first, second)))
    }

    pub fn remove_edge_by_id(&mut self, id: EdgeId) -> Option<GraphEdge> {
        let edge = self.edges.get_mut(id.0)?.take()?;
        for end in [edge.source, edge.destination] {
            if let Some(vertex) = self.vertex_mut(end) {
                vertex.edges.retain(|e| *e != id);
            }
        }
        Some(edge)
    }

    /// Removes the vertex at `position` along with its incident edges.
    pub fn remove_node(&mut self, position: Point) -> Option<GraphVertex> {
        let slot = self.tree.remove(position.x, position.y)?;
        let incident = self.vertex(slot.id)?.edges.clone();
        for edge in incident {
            self.remove_edge_by_id(edge);
        }
        self.vertices.get_mut(slot.id.0)?.take()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.vertices.clear();
        self.edges.clear();
    }

    pub fn find(&self, x: f64, y: f64) -> Option<VertexId> {
        self.tree.find(x, y).map(|slot| slot.id)
    }

    /// Looks a vertex up through the tree's key scan rather than the arena.
    pub fn find_by_key(&self, id: VertexId) -> Option<&GraphVertex> {
        let slot = self.tree.find_by_key(&id)?;
        self.vertex(slot.id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&GraphVertex> {
        self.vertices.get(id.0)?.as_ref()
    }

    pub fn position(&self, id: VertexId) -> Option<Point> {
        self.vertex(id).map(|v| v.position)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.edges.get(id.0)?.as_ref()
    }

    /// Vertex ids in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.tree.items().iter().map(|slot| slot.id)
    }

    /// Edges incident to the vertex at `position`; empty if there is none.
    pub fn find_edges(&self, position: Point) -> Vec<&GraphEdge> {
        self.find(position.x, position.y)
            .and_then(|id| self.vertex(id))
            .map(|vertex| vertex.edges.iter().filter_map(|id| self.edge(*id)).collect())
            .unwrap_or_default()
    }

    pub fn interval_find(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<Point> {
        self.tree
            .interval_find(x1, y1, x2, y2)
            .into_iter()
            .map(|slot| slot.position)
            .collect()
    }

    pub fn shortest_path(
        &self,
        start: Point,
        finish: Point,
        algorithm: SearchAlgorithm,
    ) -> Result<ShortestPath, RoutingError> {
        algorithm.shortest_path(self, start, finish)
    }

    fn push_vertex(&mut self, position: Point) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Some(GraphVertex {
            position,
            edges: Vec::new(),
        }));
        id
    }

    fn vertex_mut(&mut self, id: VertexId) -> Option<&mut GraphVertex> {
        self.vertices.get_mut(id.0)?.as_mut()
    }
}
