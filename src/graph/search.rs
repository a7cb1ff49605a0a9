use serde::{Deserialize, Serialize};

use super::{EdgeId, IndexedPriorityQueue, RoutingGraph, VertexId};
use crate::error::RoutingError;
use crate::geometry::{Connection, Point};

/// Shortest-path strategy used over a [`RoutingGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    #[default]
    Dijkstra,
    /// Reserved. Always fails with [`RoutingError::NotImplemented`].
    #[serde(rename = "astar")]
    #[cfg_attr(feature = "cli", value(name = "astar"))]
    AStar,
}

impl SearchAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::AStar => "astar",
        }
    }

    pub fn shortest_path(
        self,
        graph: &RoutingGraph,
        start: Point,
        finish: Point,
    ) -> Result<ShortestPath, RoutingError> {
        match self {
            Self::Dijkstra => dijkstra(graph, start, finish),
            Self::AStar => Err(RoutingError::NotImplemented { algorithm: "A*" }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathEdge {
    pub source: Point,
    pub destination: Point,
    pub weight: f64,
}

/// Vertices and edges from start to finish. An unreachable finish leaves
/// only the start vertex and no edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ShortestPath {
    pub nodes: Vec<Point>,
    pub edges: Vec<PathEdge>,
}

impl ShortestPath {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn cost(&self) -> f64 {
        self.edges.iter().map(|edge| edge.weight).sum()
    }

    /// One segment per traversed edge, each running in travel direction.
    pub fn segments(&self) -> Vec<Connection> {
        self.nodes
            .windows(2)
            .map(|pair| Connection::new(pair[0], pair[1]))
            .collect()
    }
}

fn dijkstra(graph: &RoutingGraph, start: Point, finish: Point) -> Result<ShortestPath, RoutingError> {
    let start_id = graph
        .find(start.x, start.y)
        .ok_or(RoutingError::UnknownVertex {
            x: start.x,
            y: start.y,
        })?;

    let bound = graph.vertex_bound();
    let mut costs = vec![f64::MAX; bound];
    let mut visited = vec![false; bound];
    let mut previous: Vec<Option<(VertexId, EdgeId)>> = vec![None; bound];
    let mut queue = IndexedPriorityQueue::new();

    costs[start_id.index()] = 0.0;
    queue.enqueue(start_id, 0.0)?;
    for id in graph.vertex_ids() {
        if id != start_id {
            queue.enqueue(id, f64::MAX)?;
        }
    }

    while let Some(current) = queue.dequeue() {
        visited[current.index()] = true;
        let Some(vertex) = graph.vertex(current) else {
            continue;
        };
        for &edge_id in vertex.edges() {
            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };
            let next = edge.opposite(current);
            if visited[next.index()] {
                continue;
            }
            let candidate = costs[current.index()] + edge.weight;
            if candidate < costs[next.index()] {
                costs[next.index()] = candidate;
                previous[next.index()] = Some((current, edge_id));
                queue.update_priority(&next, candidate)?;
            }
        }
    }

    let mut vertices = Vec::new();
    let mut edges = Vec::new();
    if let Some(mut last) = graph.find(finish.x, finish.y) {
        while let Some((prev, edge_id)) = previous[last.index()] {
            edges.push(edge_id);
            vertices.push(last);
            last = prev;
        }
    }
    vertices.push(start_id);
    vertices.reverse();
    edges.reverse();

    let path = ShortestPath {
        nodes: vertices.iter().filter_map(|id| graph.position(*id)).collect(),
        edges: edges
            .iter()
            .filter_map(|id| {
                let edge = graph.edge(*id)?;
                Some(PathEdge {
                    source: graph.position(edge.source)?,
                    destination: graph.position(edge.destination)?,
                    weight: edge.weight,
                })
            })
            .collect(),
    };
    tracing::trace!(
        vertices = graph.len(),
        hops = path.edges.len(),
        cost = path.cost(),
        "dijkstra finished"
    );
    Ok(path)
}
