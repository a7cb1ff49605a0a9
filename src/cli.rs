use crate::config::{Config, load_config};
use crate::graph::SearchAlgorithm;
use crate::ir::{Scene, parse_scene};
use crate::route_dump::{RouteDump, write_route_dump};
use crate::routing::OrthogonalPathFinder;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "ortho",
    version,
    about = "Orthogonal connector routing between rectangular obstacles"
)]
pub struct Args {
    /// Scene file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the routed JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Clearance around obstacles
    #[arg(short = 'm', long = "margin")]
    pub margin: Option<f64>,

    /// Shortest-path algorithm
    #[arg(short = 'a', long = "algorithm", value_enum)]
    pub algorithm: Option<SearchAlgorithm>,

    /// Include lead lines and intersections in the output
    #[arg(long = "grid")]
    pub grid: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let scene = parse_scene(&input)?;
    let config = effective_config(config, &scene, &args)?;

    let finder = OrthogonalPathFinder::with_config(&config.router);
    let (obstacles, mut connectors) = scene.resolve()?;
    let grid = finder.build_grid(&obstacles, config.canvas.width, config.canvas.height);
    let results: Vec<_> = connectors.iter_mut().map(|c| grid.route(c)).collect();

    let routed = connectors.iter().filter(|c| c.is_routed()).count();
    tracing::info!(routed, total = connectors.len(), "connectors routed");

    let mut dump = RouteDump::new(
        config.canvas.width,
        config.canvas.height,
        &finder,
        &obstacles,
        &connectors,
        &results,
    );
    if args.grid {
        dump = dump.with_grid(&grid);
    }
    write_route_dump(args.output.as_deref(), &dump)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

/// Config file, then scene, then command-line flags; later wins. The merged
/// result is validated.
fn effective_config(mut config: Config, scene: &Scene, args: &Args) -> Result<Config> {
    if let Some(v) = scene.width {
        config.canvas.width = v;
    }
    if let Some(v) = scene.height {
        config.canvas.height = v;
    }
    if let Some(v) = scene.margin {
        config.router.margin = v;
    }
    if let Some(v) = args.width {
        config.canvas.width = v;
    }
    if let Some(v) = args.height {
        config.canvas.height = v;
    }
    if let Some(v) = args.margin {
        config.router.margin = v;
    }
    if let Some(v) = args.algorithm {
        config.router.algorithm = v;
    }
    config.validate()?;
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    if buf.trim().is_empty() {
        return Err(anyhow::anyhow!("No scene given on stdin"));
    }
    Ok(buf)
}
