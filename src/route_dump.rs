use crate::error::RoutingError;
use crate::geometry::{Connection, Obstacle, Point};
use crate::graph::ShortestPath;
use crate::routing::{Connector, OrthogonalPathFinder, RoutingGrid};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RouteDump {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub algorithm: String,
    pub obstacles: Vec<Obstacle>,
    pub connectors: Vec<ConnectorDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridDump>,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub index: usize,
    pub from_side: &'static str,
    pub to_side: &'static str,
    pub source_anchor: [f64; 2],
    pub destination_anchor: [f64; 2],
    pub routed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub segments: Vec<[[f64; 2]; 2]>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct GridDump {
    pub lead_lines: Vec<[[f64; 2]; 2]>,
    pub intersections: Vec<[f64; 2]>,
    pub vertices: usize,
    pub edges: usize,
}

fn pair(point: &Point) -> [f64; 2] {
    [point.x, point.y]
}

fn line(connection: &Connection) -> [[f64; 2]; 2] {
    [pair(&connection.start), pair(&connection.end)]
}

impl ConnectorDump {
    pub fn from_result(
        index: usize,
        connector: &Connector,
        result: &Result<ShortestPath, RoutingError>,
    ) -> Self {
        Self {
            index,
            from_side: connector.source_orientation.name(),
            to_side: connector.destination_orientation.name(),
            source_anchor: pair(&connector.source_anchor()),
            destination_anchor: pair(&connector.destination_anchor()),
            routed: connector.is_routed(),
            cost: result
                .as_ref()
                .ok()
                .filter(|path| !path.is_empty())
                .map(ShortestPath::cost),
            error: result.as_ref().err().map(ToString::to_string),
            segments: connector.path.iter().map(line).collect(),
            points: connector.polyline().iter().map(pair).collect(),
        }
    }
}

impl GridDump {
    pub fn from_grid(grid: &RoutingGrid) -> Self {
        Self {
            lead_lines: grid.connections().iter().map(line).collect(),
            intersections: grid.intersections().iter().map(pair).collect(),
            vertices: grid.graph().len(),
            edges: grid.graph().edge_count(),
        }
    }
}

impl RouteDump {
    pub fn new(
        width: f64,
        height: f64,
        finder: &OrthogonalPathFinder,
        obstacles: &[Obstacle],
        connectors: &[Connector],
        results: &[Result<ShortestPath, RoutingError>],
    ) -> Self {
        Self {
            width,
            height,
            margin: finder.margin,
            algorithm: finder.algorithm.name().to_string(),
            obstacles: obstacles.to_vec(),
            connectors: connectors
                .iter()
                .zip(results)
                .enumerate()
                .map(|(idx, (connector, result))| ConnectorDump::from_result(idx, connector, result))
                .collect(),
            grid: None,
        }
    }

    pub fn with_grid(mut self, grid: &RoutingGrid) -> Self {
        self.grid = Some(GridDump::from_grid(grid));
        self
    }
}

/// Writes pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_route_dump(path: Option<&Path>, dump: &RouteDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
