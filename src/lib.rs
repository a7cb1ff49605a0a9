#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod ir;
pub mod route_dump;
pub mod routing;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{CanvasConfig, Config, RouterConfig, load_config};
pub use error::RoutingError;
pub use geometry::{Bounds, Connection, Obstacle, Point};
pub use graph::{RoutingGraph, SearchAlgorithm, ShortestPath};
pub use ir::{Scene, parse_scene};
pub use routing::{Connector, Orientation, OrthogonalPathFinder, RoutingGrid, RoutingOutcome};
