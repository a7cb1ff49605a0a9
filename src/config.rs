use crate::graph::SearchAlgorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 450.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Clearance kept around every obstacle. Also pulls the canvas edges in.
    pub margin: f64,
    pub algorithm: SearchAlgorithm,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub router: RouterConfig,
    pub canvas: CanvasConfig,
}

impl Config {
    /// Rejects a negative or non-finite margin and a non-positive canvas.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.router.margin < 0.0 || !self.router.margin.is_finite() {
            anyhow::bail!("margin must be a finite, non-negative number");
        }
        let (width, height) = (self.canvas.width, self.canvas.height);
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            anyhow::bail!("canvas dimensions must be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouterConfigFile {
    margin: Option<f64>,
    algorithm: Option<SearchAlgorithm>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    router: Option<RouterConfigFile>,
    canvas: Option<CanvasConfigFile>,
    /// Shorthand for `router.margin`.
    margin: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays the fields present in `contents` onto the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(v) = parsed.margin {
        config.router.margin = v;
    }
    if let Some(router) = parsed.router {
        if let Some(v) = router.margin {
            config.router.margin = v;
        }
        if let Some(v) = router.algorithm {
            config.router.algorithm = v;
        }
    }
    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width {
            config.canvas.width = v;
        }
        if let Some(v) = canvas.height {
            config.canvas.height = v;
        }
    }

    config.validate()?;
    Ok(config)
}
