use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Obstacle, Point};
use crate::routing::{Connector, Orientation, OrthogonalPathFinder};

/// A routing request: obstacles on a canvas plus the connectors to route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin: Option<f64>,
    #[serde(default)]
    pub obstacles: Vec<SceneObstacle>,
    #[serde(default)]
    pub connectors: Vec<ConnectorRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObstacle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds for SceneObstacle {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

/// Obstacle reference: position in `obstacles` or its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObstacleRef {
    Index(usize),
    Id(String),
}

impl std::fmt::Display for ObstacleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "#{idx}"),
            Self::Id(id) => write!(f, "\"{id}\""),
        }
    }
}

/// One connector. A side wins over a point; with neither, the side facing
/// the other obstacle is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorRequest {
    pub from: ObstacleRef,
    pub to: ObstacleRef,
    #[serde(default)]
    pub from_side: Option<Orientation>,
    #[serde(default)]
    pub to_side: Option<Orientation>,
    /// Relative to the source obstacle's top-left corner.
    #[serde(default)]
    pub from_point: Option<Point>,
    #[serde(default)]
    pub to_point: Option<Point>,
}

/// Parses a scene as JSON, falling back to JSON5 (comments, trailing commas).
pub fn parse_scene(input: &str) -> Result<Scene> {
    let scene: Scene = match serde_json::from_str(input) {
        Ok(scene) => scene,
        Err(json_err) => json5::from_str(input)
            .map_err(|_| anyhow!(json_err))
            .context("invalid scene")?,
    };
    scene.validate()?;
    Ok(scene)
}

impl Scene {
    fn validate(&self) -> Result<()> {
        for (idx, obstacle) in self.obstacles.iter().enumerate() {
            let dims = [obstacle.x, obstacle.y, obstacle.width, obstacle.height];
            if dims.iter().any(|v| !v.is_finite()) {
                bail!("obstacle #{idx} has a non-finite coordinate");
            }
            if obstacle.width < 0.0 || obstacle.height < 0.0 {
                bail!("obstacle #{idx} has a negative size");
            }
        }
        Ok(())
    }

    pub fn obstacle_index(&self, reference: &ObstacleRef) -> Option<usize> {
        match reference {
            ObstacleRef::Index(idx) => (*idx < self.obstacles.len()).then_some(*idx),
            ObstacleRef::Id(id) => self
                .obstacles
                .iter()
                .position(|o| o.id.as_deref() == Some(id.as_str())),
        }
    }

    /// Plain obstacles plus one unrouted connector per request.
    pub fn resolve(&self) -> Result<(Vec<Obstacle>, Vec<Connector>)> {
        let obstacles: Vec<Obstacle> = self.obstacles.iter().map(Obstacle::of).collect();
        let mut connectors = Vec::with_capacity(self.connectors.len());
        for (idx, request) in self.connectors.iter().enumerate() {
            let lookup = |reference: &ObstacleRef| {
                self.obstacle_index(reference)
                    .map(|i| obstacles[i])
                    .ok_or_else(|| anyhow!("connector #{idx}: unknown obstacle {reference}"))
            };
            let source = lookup(&request.from)?;
            let destination = lookup(&request.to)?;
            let source_side = pick_side(&source, request.from_side, request.from_point, &destination);
            let destination_side = pick_side(&destination, request.to_side, request.to_point, &source);
            connectors.push(Connector::new(&source, source_side, &destination, destination_side));
        }
        Ok((obstacles, connectors))
    }
}

fn pick_side(
    obstacle: &Obstacle,
    side: Option<Orientation>,
    point: Option<Point>,
    other: &Obstacle,
) -> Orientation {
    if let Some(side) = side {
        return side;
    }
    if let Some(point) = point {
        return OrthogonalPathFinder::calculate_orientation(obstacle, point);
    }
    facing_side(obstacle, other)
}

/// Side of `from` that faces `to`, preferring horizontal sides on a tie.
fn facing_side(from: &Obstacle, to: &Obstacle) -> Orientation {
    let dx = (to.x + to.right()) / 2.0 - (from.x + from.right()) / 2.0;
    let dy = (to.y + to.bottom()) / 2.0 - (from.y + from.bottom()) / 2.0;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 { Orientation::Right } else { Orientation::Left }
    } else if dy >= 0.0 {
        Orientation::Bottom
    } else {
        Orientation::Top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "width": 400,
        "obstacles": [
            { "id": "a", "x": 10, "y": 10, "width": 50, "height": 20 },
            { "x": 200, "y": 10, "width": 50, "height": 20 }
        ],
        "connectors": [
            { "from": "a", "to": 1, "fromSide": "bottom", "toPoint": { "x": 25, "y": 0 } },
            { "from": 0, "to": 1 }
        ]
    }"#;

    #[test]
    fn parses_json_scene() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.width, Some(400.0));
        assert_eq!(scene.height, None);
        assert_eq!(scene.obstacles.len(), 2);
        assert_eq!(scene.connectors[0].from, ObstacleRef::Id("a".into()));
        assert_eq!(scene.connectors[0].to, ObstacleRef::Index(1));
    }

    #[test]
    fn falls_back_to_json5() {
        let scene = parse_scene(
            "{ // two boxes\n obstacles: [{x: 0, y: 0, width: 10, height: 10,},], }",
        )
        .unwrap();
        assert_eq!(scene.obstacles.len(), 1);
        assert!(scene.connectors.is_empty());
    }

    #[test]
    fn resolves_sides_from_side_point_or_facing() {
        let (obstacles, connectors) = parse_scene(SCENE).unwrap().resolve().unwrap();
        assert_eq!(obstacles[1], Obstacle::new(200.0, 10.0, 50.0, 20.0));
        assert_eq!(connectors[0].source_orientation, Orientation::Bottom);
        assert_eq!(connectors[0].destination_orientation, Orientation::Top);
        assert_eq!(connectors[1].source_orientation, Orientation::Right);
        assert_eq!(connectors[1].destination_orientation, Orientation::Left);
    }

    #[test]
    fn unknown_reference_is_reported() {
        let scene = parse_scene(
            r#"{ "obstacles": [{ "x": 0, "y": 0, "width": 1, "height": 1 }],
                 "connectors": [{ "from": 0, "to": "missing" }] }"#,
        )
        .unwrap();
        let err = scene.resolve().unwrap_err().to_string();
        assert!(err.contains("missing"), "{err}");
    }

    #[test]
    fn negative_size_is_rejected() {
        assert!(parse_scene(r#"{ "obstacles": [{ "x": 0, "y": 0, "width": -1, "height": 1 }] }"#).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_scene("not a scene").is_err());
    }
}
