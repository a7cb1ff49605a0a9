//! Lead-line generation.
//!
//! Every obstacle projects lines along its four edges and through its centre
//! on both axes. A line is trimmed against the other obstacles whose
//! perpendicular extent it crosses.

use crate::geometry::{Bounds, Connection, Point};

/// Closed interval on one axis, `near <= far`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub near: f64,
    pub far: f64,
}

impl Span {
    pub const fn new(near: f64, far: f64) -> Self {
        Self { near, far }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.near && value <= self.far
    }
}

/// One trimming job: a full-length candidate line plus what it is measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionParams {
    /// Position along the line that separates "before" from "after" collisions.
    pub reference: f64,
    pub start: Point,
    pub end: Point,
    /// Far canvas boundary along the line.
    pub canvas_limit: f64,
    /// Opposite edge of the obstacle; only socket lines use it.
    pub secondary_boundary: f64,
    pub is_vertical: bool,
}

impl CollisionParams {
    fn along(&self, point: Point) -> f64 {
        if self.is_vertical { point.y } else { point.x }
    }

    /// Segment of this line between two positions along it.
    fn line(&self, from: f64, to: f64) -> Connection {
        if self.is_vertical {
            Connection::from_coords(self.start.x, from, self.end.x, to)
        } else {
            Connection::from_coords(from, self.start.y, to, self.end.y)
        }
    }

    fn start_along(&self) -> f64 {
        self.along(self.start)
    }

    fn end_along(&self) -> f64 {
        self.along(self.end)
    }
}

/// Trims an edge line against the colliding intervals.
pub fn trim_lead_line(collisions: &[Span], params: &CollisionParams) -> Vec<Connection> {
    match collisions {
        [] => vec![Connection::new(params.start, params.end)],
        [single] => vec![single_collision(*single, params)],
        _ => {
            let (minimum, maximum) = clip_bounds(collisions, params);
            vec![params.line(minimum, maximum)]
        }
    }
}

fn single_collision(collision: Span, params: &CollisionParams) -> Connection {
    if collision.far < params.reference {
        params.line(collision.far, params.end_along())
    } else {
        params.line(params.start_along(), collision.near)
    }
}

/// Trims a centre line, leaving out the obstacle's own body: one piece up to
/// the near edge and one from `secondary_boundary` onwards.
pub fn trim_socket_line(collisions: &[Span], params: &CollisionParams) -> Vec<Connection> {
    if collisions.is_empty() {
        return vec![
            Connection::new(params.start, params.end),
            params.line(params.secondary_boundary, params.canvas_limit),
        ];
    }
    let (minimum, maximum) = clip_bounds(collisions, params);
    vec![
        params.line(minimum, params.end_along()),
        params.line(params.secondary_boundary, maximum),
    ]
}

/// Closest far edge before the reference and closest near edge after it.
/// An interval straddling the reference counts for neither.
fn clip_bounds(collisions: &[Span], params: &CollisionParams) -> (f64, f64) {
    let mut minimum = 0.0;
    let mut maximum = params.canvas_limit;
    for collision in collisions {
        if collision.far < params.reference && collision.far > minimum {
            minimum = collision.far;
        } else if collision.near > params.reference && collision.near < maximum {
            maximum = collision.near;
        }
    }
    (minimum, maximum)
}

/// An obstacle's inflated extent on both axes. Lead lines and connector
/// anchors both read their coordinates from here, so anchors land exactly on
/// grid vertices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Footprint {
    pub(crate) x: Span,
    pub(crate) y: Span,
    pub(crate) centre: Point,
}

impl Footprint {
    pub(crate) fn of<B: Bounds + ?Sized>(obstacle: &B, margin: f64) -> Self {
        Self {
            x: Span::new(obstacle.x() - margin, obstacle.right() + margin),
            y: Span::new(obstacle.y() - margin, obstacle.bottom() + margin),
            centre: Point::new(
                (obstacle.x() + obstacle.right()) / 2.0,
                (obstacle.y() + obstacle.bottom()) / 2.0,
            ),
        }
    }
}

/// Lead lines for every obstacle on a `max_width` x `max_height` canvas.
///
/// `margin` inflates every obstacle and pulls the canvas boundaries in by the
/// same amount.
pub fn lead_lines<B: Bounds>(
    obstacles: &[B],
    max_width: f64,
    max_height: f64,
    margin: f64,
) -> Vec<Connection> {
    let max_width = max_width - margin;
    let max_height = max_height - margin;
    let footprints: Vec<Footprint> = obstacles.iter().map(|o| Footprint::of(o, margin)).collect();

    let mut lines = Vec::new();
    for (idx, own) in footprints.iter().enumerate() {
        let others = footprints
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != idx)
            .map(|(_, fp)| fp);

        let vertical: Vec<(Span, Span)> = others.clone().map(|fp| (fp.x, fp.y)).collect();
        axis_lines(
            AxisView {
                across: own.x,
                along: own.y,
                centre: own.centre.x,
                is_vertical: true,
            },
            &vertical,
            max_height,
            margin,
            &mut lines,
        );

        let horizontal: Vec<(Span, Span)> = others.map(|fp| (fp.y, fp.x)).collect();
        axis_lines(
            AxisView {
                across: own.y,
                along: own.x,
                centre: own.centre.y,
                is_vertical: false,
            },
            &horizontal,
            max_width,
            margin,
            &mut lines,
        );
    }
    lines
}

/// An obstacle seen from one axis: `across` is the extent the lines are
/// placed on, `along` the extent the lines run through.
#[derive(Debug, Clone, Copy)]
struct AxisView {
    across: Span,
    along: Span,
    centre: f64,
    is_vertical: bool,
}

impl AxisView {
    fn point(&self, across: f64, along: f64) -> Point {
        if self.is_vertical {
            Point::new(across, along)
        } else {
            Point::new(along, across)
        }
    }
}

/// Emits the two edge lines and the centre line of one obstacle on one axis.
/// `projections` holds `(across, along)` extents of every other obstacle.
fn axis_lines(
    view: AxisView,
    projections: &[(Span, Span)],
    limit: f64,
    margin: f64,
    lines: &mut Vec<Connection>,
) {
    let mut near_hits = Vec::new();
    let mut far_hits = Vec::new();
    let mut centre_hits = Vec::new();
    for (across, along) in projections {
        if across.contains(view.across.near) {
            near_hits.push(*along);
        }
        if across.contains(view.across.far) {
            far_hits.push(*along);
        }
        if across.contains(view.centre) {
            centre_hits.push(*along);
        }
    }

    for (position, hits) in [(view.across.near, &near_hits), (view.across.far, &far_hits)] {
        let params = CollisionParams {
            reference: view.along.near,
            start: view.point(position, margin),
            end: view.point(position, limit),
            canvas_limit: limit,
            secondary_boundary: 0.0,
            is_vertical: view.is_vertical,
        };
        lines.extend(trim_lead_line(hits, &params));
    }

    let socket = CollisionParams {
        reference: view.along.near,
        start: view.point(view.centre, margin),
        end: view.point(view.centre, view.along.near),
        canvas_limit: limit,
        secondary_boundary: view.along.far,
        is_vertical: view.is_vertical,
    };
    lines.extend(trim_socket_line(&centre_hits, &socket));
}
