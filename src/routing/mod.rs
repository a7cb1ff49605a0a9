//! Orthogonal connector routing.
//!
//! Lead lines are projected from every obstacle, intersected pairwise, and the
//! intersections become the vertices of a sparse grid graph. Connectors are
//! routed over that graph between side midpoints of their end obstacles.

pub mod collision;

use std::collections::HashSet;
use std::time::Instant;

use serde::{Deserialize, Serialize};

pub use collision::{CollisionParams, Span, lead_lines, trim_lead_line, trim_socket_line};

use collision::Footprint;

use crate::config::RouterConfig;
use crate::error::RoutingError;
use crate::geometry::{Bounds, Connection, Obstacle, Point};
use crate::graph::{RoutingGraph, SearchAlgorithm, ShortestPath};

// ── Connector sides ─────────────────────────────────────────────────

/// Side of an obstacle a connector attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Left,
    Top,
    Right,
    Bottom,
}

impl Orientation {
    /// Tie-break order for [`OrthogonalPathFinder::calculate_orientation`].
    pub const ALL: [Orientation; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
        }
    }

    /// Midpoint of this side of `bounds`, in canvas coordinates.
    pub fn anchor<B: Bounds + ?Sized>(self, bounds: &B) -> Point {
        self.inflated_anchor(bounds, 0.0)
    }

    /// Midpoint of this side of `bounds` grown by `margin`. Computed from the
    /// same extents as the lead lines, so the result is bit-equal to the grid
    /// vertex where this side's edge and centre lines meet.
    pub fn inflated_anchor<B: Bounds + ?Sized>(self, bounds: &B, margin: f64) -> Point {
        let footprint = Footprint::of(bounds, margin);
        match self {
            Self::Left => Point::new(footprint.x.near, footprint.centre.y),
            Self::Top => Point::new(footprint.centre.x, footprint.y.near),
            Self::Right => Point::new(footprint.x.far, footprint.centre.y),
            Self::Bottom => Point::new(footprint.centre.x, footprint.y.far),
        }
    }

    /// Midpoint of this side relative to the obstacle's top-left corner.
    fn local_anchor(self, width: f64, height: f64) -> Point {
        match self {
            Self::Left => Point::new(0.0, height / 2.0),
            Self::Top => Point::new(width / 2.0, 0.0),
            Self::Right => Point::new(width, height / 2.0),
            Self::Bottom => Point::new(width / 2.0, height),
        }
    }
}

/// A connection request between two obstacles and, once routed, its path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub source: Obstacle,
    pub destination: Obstacle,
    pub source_orientation: Orientation,
    pub destination_orientation: Orientation,
    /// Segments from the source anchor to the destination anchor. Empty until
    /// routed, and after a failed route.
    pub path: Vec<Connection>,
}

impl Connector {
    pub fn new<S: Bounds + ?Sized, D: Bounds + ?Sized>(
        source: &S,
        source_orientation: Orientation,
        destination: &D,
        destination_orientation: Orientation,
    ) -> Self {
        Self {
            source: Obstacle::of(source),
            destination: Obstacle::of(destination),
            source_orientation,
            destination_orientation,
            path: Vec::new(),
        }
    }

    /// Picks each side from a point given relative to the obstacle's top-left corner.
    pub fn from_relative_points<S: Bounds + ?Sized, D: Bounds + ?Sized>(
        source: &S,
        source_point: Point,
        destination: &D,
        destination_point: Point,
    ) -> Self {
        Self::new(
            source,
            OrthogonalPathFinder::calculate_orientation(source, source_point),
            destination,
            OrthogonalPathFinder::calculate_orientation(destination, destination_point),
        )
    }

    pub fn source_anchor(&self) -> Point {
        self.source_orientation.anchor(&self.source)
    }

    pub fn destination_anchor(&self) -> Point {
        self.destination_orientation.anchor(&self.destination)
    }

    pub fn is_routed(&self) -> bool {
        !self.path.is_empty()
    }

    /// The path as a list of corner points; empty when unrouted.
    pub fn polyline(&self) -> Vec<Point> {
        let Some(first) = self.path.first() else {
            return Vec::new();
        };
        std::iter::once(first.start)
            .chain(self.path.iter().map(|segment| segment.end))
            .collect()
    }
}

// ── Grid ────────────────────────────────────────────────────────────

/// Lead lines, their intersections and the graph built over them.
/// Reusable for any number of connectors over the same obstacles.
#[derive(Debug, Clone)]
pub struct RoutingGrid {
    connections: Vec<Connection>,
    intersections: Vec<Point>,
    graph: RoutingGraph,
    margin: f64,
    algorithm: SearchAlgorithm,
}

impl RoutingGrid {
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Intersections in discovery order.
    pub fn intersections(&self) -> &[Point] {
        &self.intersections
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.graph
    }

    pub fn shortest_path(&self, start: Point, finish: Point) -> Result<ShortestPath, RoutingError> {
        self.graph.shortest_path(start, finish, self.algorithm)
    }

    /// Routes `connector` and replaces its path.
    ///
    /// With a non-zero margin the search runs between the anchors of the
    /// inflated obstacles; short stubs join those to the real anchors.
    pub fn route(&self, connector: &mut Connector) -> Result<ShortestPath, RoutingError> {
        connector.path.clear();
        let start = connector
            .source_orientation
            .inflated_anchor(&connector.source, self.margin);
        let finish = connector
            .destination_orientation
            .inflated_anchor(&connector.destination, self.margin);

        let path = match self.shortest_path(start, finish) {
            Ok(path) => path,
            Err(err) => {
                tracing::warn!(%err, "connector could not be routed");
                return Err(err);
            }
        };
        if path.is_empty() {
            tracing::warn!(
                from = ?start,
                to = ?finish,
                "no route between connector anchors"
            );
            return Ok(path);
        }

        if self.margin > 0.0 {
            connector
                .path
                .push(Connection::new(connector.source_anchor(), start));
        }
        connector.path.extend(path.segments());
        if self.margin > 0.0 {
            connector
                .path
                .push(Connection::new(finish, connector.destination_anchor()));
        }
        Ok(path)
    }
}

/// Everything one routing pass produced.
#[derive(Debug, Clone)]
pub struct RoutingOutcome {
    pub connections: Vec<Connection>,
    pub intersections: Vec<Point>,
    pub shortest_path: ShortestPath,
}

// ── Path finder ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrthogonalPathFinder {
    pub margin: f64,
    pub algorithm: SearchAlgorithm,
}

impl OrthogonalPathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &RouterConfig) -> Self {
        Self {
            margin: config.margin,
            algorithm: config.algorithm,
        }
    }

    pub fn create_lead_lines<B: Bounds>(
        &self,
        obstacles: &[B],
        max_width: f64,
        max_height: f64,
    ) -> Vec<Connection> {
        lead_lines(obstacles, max_width, max_height, self.margin)
    }

    /// Crossing point of two segments, if both contain it. Parallel and
    /// collinear segments never intersect.
    pub fn find_intersection(a: &Connection, b: &Connection) -> Option<Point> {
        let a1 = a.end.y - a.start.y;
        let b1 = a.start.x - a.end.x;
        let c1 = a1 * a.start.x + b1 * a.start.y;

        let a2 = b.end.y - b.start.y;
        let b2 = b.start.x - b.end.x;
        let c2 = a2 * b.start.x + b2 * b.start.y;

        let det = a1 * b2 - a2 * b1;
        if det == 0.0 {
            return None;
        }
        // Axis-aligned pairs: copy coordinates, no rounding.
        let point = if a.is_vertical() && b.is_horizontal() {
            Point::new(a.start.x, b.start.y)
        } else if a.is_horizontal() && b.is_vertical() {
            Point::new(b.start.x, a.start.y)
        } else {
            Point::new((b2 * c1 - b1 * c2) / det, (a1 * c2 - a2 * c1) / det)
        };
        (a.contains_point(&point) && b.contains_point(&point)).then_some(point)
    }

    /// Distinct pairwise intersections in discovery order.
    pub fn find_intersections(lines: &[Connection]) -> Vec<Point> {
        let mut seen = HashSet::new();
        let mut points = Vec::new();
        for (idx, a) in lines.iter().enumerate() {
            for b in &lines[idx + 1..] {
                if let Some(point) = Self::find_intersection(a, b)
                    && seen.insert(point.bits())
                {
                    points.push(point);
                }
            }
        }
        points
    }

    /// Links every intersection to its nearest neighbour in each direction
    /// along the (at most two) lines through it. Edge weight is the squared
    /// distance.
    pub fn construct_graph(&self, lines: &[Connection], intersections: &[Point]) -> RoutingGraph {
        let mut graph = RoutingGraph::new();
        graph.add_nodes(intersections.iter().copied());
        for &point in intersections {
            let carriers = lines
                .iter()
                .filter(|line| line.contains_point(&point))
                .take(2);

            let mut left: Option<Point> = None;
            let mut right: Option<Point> = None;
            let mut top: Option<Point> = None;
            let mut bottom: Option<Point> = None;
            for line in carriers {
                for &other in intersections {
                    if other == point || !line.contains_point(&other) {
                        continue;
                    }
                    if other.x < point.x && other.y == point.y && left.is_none_or(|l| l.x < other.x) {
                        left = Some(other);
                    } else if other.x > point.x
                        && other.y == point.y
                        && right.is_none_or(|r| r.x > other.x)
                    {
                        right = Some(other);
                    } else if other.y < point.y && other.x == point.x && top.is_none_or(|t| t.y < other.y) {
                        top = Some(other);
                    } else if other.y > point.y
                        && other.x == point.x
                        && bottom.is_none_or(|b| b.y > other.y)
                    {
                        bottom = Some(other);
                    }
                }
            }

            for neighbour in [left, right, top, bottom].into_iter().flatten() {
                if graph.edge_between(point, neighbour).is_none() {
                    graph.add_edge(point, neighbour, point.distance_squared(&neighbour));
                }
            }
        }
        graph
    }

    pub fn shortest_path(
        &self,
        graph: &RoutingGraph,
        start: Point,
        finish: Point,
    ) -> Result<ShortestPath, RoutingError> {
        graph.shortest_path(start, finish, self.algorithm)
    }

    /// Side of `bounds` whose midpoint is nearest to `relative`, a point given
    /// relative to the top-left corner. Ties resolve in [`Orientation::ALL`] order.
    pub fn calculate_orientation<B: Bounds + ?Sized>(bounds: &B, relative: Point) -> Orientation {
        let mut best = Orientation::Left;
        let mut best_distance = f64::INFINITY;
        for side in Orientation::ALL {
            let distance = side
                .local_anchor(bounds.width(), bounds.height())
                .distance_squared(&relative);
            if distance < best_distance {
                best = side;
                best_distance = distance;
            }
        }
        best
    }

    /// Lead lines, intersections and graph for a set of obstacles.
    pub fn build_grid<B: Bounds>(&self, obstacles: &[B], max_width: f64, max_height: f64) -> RoutingGrid {
        let started = Instant::now();
        let connections = self.create_lead_lines(obstacles, max_width, max_height);
        let intersections = Self::find_intersections(&connections);
        tracing::debug!(
            obstacles = obstacles.len(),
            lead_lines = connections.len(),
            intersections = intersections.len(),
            "lead lines intersected"
        );

        let mut ordered = intersections.clone();
        ordered.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        let graph = self.construct_graph(&connections, &ordered);
        tracing::info!(
            vertices = graph.len(),
            edges = graph.edge_count(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "routing grid built"
        );

        RoutingGrid {
            connections,
            intersections,
            graph,
            margin: self.margin,
            algorithm: self.algorithm,
        }
    }

    /// Full pipeline for one connector. Fills `connector.path` on success.
    pub fn orthogonal_path<B: Bounds>(
        &self,
        obstacles: &[B],
        max_width: f64,
        max_height: f64,
        connector: &mut Connector,
    ) -> Result<RoutingOutcome, RoutingError> {
        let grid = self.build_grid(obstacles, max_width, max_height);
        let shortest_path = grid.route(connector)?;
        Ok(RoutingOutcome {
            connections: grid.connections,
            intersections: grid.intersections,
            shortest_path,
        })
    }

    /// Routes every connector over one shared grid. A failing connector does
    /// not stop the others.
    pub fn route_all<B: Bounds>(
        &self,
        obstacles: &[B],
        max_width: f64,
        max_height: f64,
        connectors: &mut [Connector],
    ) -> Vec<Result<ShortestPath, RoutingError>> {
        let grid = self.build_grid(obstacles, max_width, max_height);
        connectors
            .iter_mut()
            .map(|connector| grid.route(connector))
            .collect()
    }
}
