use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use photo_showcase::{
    CirclePackingLayout, EmbeddingLayout, EmbeddingSource, GridLayout, LayoutPosition,
    LayoutStrategy, PhotoData, PhotoMetadata, RegionLayout, SceneBounds, ShowcaseConfig,
    ShowcaseResult, SideLayout,
    config::CameraOpts,
    foundation::core::LocalBoxFuture,
    layout::{embedding::WorkspaceConfig, layout_bounds},
    view::camera::{CameraState, compute_fit_distance},
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "photo-showcase", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute positions for a photo set and print them as JSON.
    Layout(LayoutArgs),
    /// Print the camera distance that frames the given bounds.
    Fit(FitArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input JSON array of photo records.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, value_enum, default_value_t = StrategyChoice::Grid)]
    strategy: StrategyChoice,

    /// Illustration SVG (region strategy).
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Embedding grid JSON with `set_id` and `state_hash` (embedding strategy).
    #[arg(long)]
    grid: Option<PathBuf>,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyChoice {
    Grid,
    CirclePacking,
    Side,
    Region,
    Embedding,
}

#[derive(Parser, Debug)]
struct FitArgs {
    #[arg(long, allow_hyphen_values = true)]
    min_x: f64,
    #[arg(long, allow_hyphen_values = true)]
    max_x: f64,
    #[arg(long, allow_hyphen_values = true)]
    min_y: f64,
    #[arg(long, allow_hyphen_values = true)]
    max_y: f64,
    #[arg(long, default_value_t = 45.0)]
    fov: f64,
    #[arg(long, default_value_t = 1.78)]
    aspect: f64,
    #[arg(long, default_value_t = 120.0)]
    margin: f64,
}

#[derive(serde::Serialize)]
struct PlacedPhoto<'a> {
    id: &'a str,
    hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a LayoutPosition>,
}

#[derive(serde::Serialize)]
struct LayoutReport<'a> {
    strategy: &'static str,
    bounds: SceneBounds,
    camera: CameraState,
    photos: Vec<PlacedPhoto<'a>>,
}

/// Embedding data read from a local file instead of the remote service.
struct FileEmbedding {
    config: WorkspaceConfig,
    doc: Value,
}

impl FileEmbedding {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let f = File::open(path).with_context(|| format!("open embedding grid '{}'", path.display()))?;
        let doc: Value = serde_json::from_reader(BufReader::new(f)).context("parse embedding grid JSON")?;
        let config: WorkspaceConfig =
            serde_json::from_value(doc.clone()).context("embedding grid needs set_id and state_hash")?;
        Ok(Self { config, doc })
    }
}

impl EmbeddingSource for FileEmbedding {
    fn workspace_config(&self) -> LocalBoxFuture<'_, ShowcaseResult<WorkspaceConfig>> {
        Box::pin(async move { Ok(self.config.clone()) })
    }

    fn grid(&self, _set_id: i64) -> LocalBoxFuture<'_, ShowcaseResult<Value>> {
        Box::pin(async move { Ok(self.doc.clone()) })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args).await,
        Command::Fit(args) => cmd_fit(args),
    }
}

fn read_photos(path: &Path) -> anyhow::Result<Vec<PhotoMetadata>> {
    let f = File::open(path).with_context(|| format!("open photo records '{}'", path.display()))?;
    let photos: Vec<PhotoMetadata> =
        serde_json::from_reader(BufReader::new(f)).context("parse photo records JSON")?;
    Ok(photos)
}

fn make_strategy(args: &LayoutArgs, config: &ShowcaseConfig) -> anyhow::Result<Box<dyn LayoutStrategy>> {
    Ok(match args.strategy {
        StrategyChoice::Grid => Box::new(GridLayout::new(config.grid_opts())),
        StrategyChoice::CirclePacking => Box::new(CirclePackingLayout::new(config.circle_packing_opts())),
        StrategyChoice::Side => Box::new(SideLayout::new(config.side_opts())),
        StrategyChoice::Region => {
            let svg = args.svg.as_deref().context("--svg is required for the region strategy")?;
            Box::new(RegionLayout::from_svg(config.region_opts(), svg)?)
        }
        StrategyChoice::Embedding => {
            let grid = args.grid.as_deref().context("--grid is required for the embedding strategy")?;
            Box::new(EmbeddingLayout::new(
                Box::new(FileEmbedding::load(grid)?),
                config.embedding.clone(),
            ))
        }
    })
}

async fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(p) => ShowcaseConfig::from_path(p)?,
        None => ShowcaseConfig::default(),
    };
    let records = read_photos(&args.in_path)?;
    let mut strategy = make_strategy(&args, &config)?;
    strategy.initialize().await?;

    let mut photos: Vec<PhotoData> = records.into_iter().map(PhotoData::new).collect();
    for p in &mut photos {
        strategy.add_photo(p);
    }
    let refs: Vec<&PhotoData> = photos.iter().collect();
    let positions = strategy.calculate_all_positions(&refs)?;

    let (hw, hh) = (config.photo.width / 2.0, config.photo.height / 2.0);
    let mut bounds = layout_bounds(&positions, hw, hh);
    if let Some(extent) = strategy.scene_extent() {
        bounds = if positions.iter().any(Option::is_some) {
            bounds.union(extent)
        } else {
            extent
        };
    }
    let report = LayoutReport {
        strategy: strategy.name(),
        bounds,
        camera: CameraState::fit(bounds, &config.camera),
        photos: photos
            .iter()
            .zip(&positions)
            .map(|(p, pos)| PlacedPhoto {
                id: p.id(),
                hidden: pos.is_none(),
                position: pos.as_ref(),
            })
            .collect(),
    };
    strategy.dispose();

    let json = serde_json::to_string_pretty(&report).context("serialize layout report")?;
    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn cmd_fit(args: FitArgs) -> anyhow::Result<()> {
    let bounds = SceneBounds::new(args.min_x, args.max_x, args.min_y, args.max_y);
    let opts = CameraOpts {
        fov_deg: args.fov,
        aspect: args.aspect,
        margin: args.margin,
        ..CameraOpts::default()
    };
    anyhow::ensure!(
        opts.fov_deg > 0.0 && opts.fov_deg < 180.0,
        "--fov must be in (0, 180)"
    );
    let distance = compute_fit_distance(bounds, opts.fov_deg, opts.aspect, opts.margin);
    println!("{distance:.3}");
    Ok(())
}
