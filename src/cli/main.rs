//! Command-line front end for the address sampling API.
//!
//! Searches boundary shapes, fetches their geometry and exports random
//! address samples as CSV.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use addrsample::api::ApiClient;
use addrsample::config::{trim_base_url, Config};
use addrsample::export::{address_list_to_csv, export_name, save_csv, SchemaVersion};
use addrsample::format::format_sampled;
use addrsample::models::{
    Bounds, BoundsGeometry, BuildingType, MultiPolygonGeometry, SampleRequest, SampleSizeUnit,
    ShapeKind, ShapePointer,
};
use addrsample::naming::derive_feature_name;

#[derive(Parser, Debug)]
#[command(name = "addrsample")]
#[command(about = "Search shapes and export random address samples")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the config file and ADDRSAMPLE_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the API is reachable
    Health,

    /// Search boundary shapes by name
    Search {
        text: String,

        /// Maximum number of results (1-50)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Fetch a shape's geometry
    Shape {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Write the shape as a GeoJSON feature
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Draw an address sample and export it as CSV
    Sample(SampleArgs),
}

#[derive(ClapArgs, Debug)]
struct ShapeArgs {
    /// Shape kind (state, county, cousub, place, tract, zcta5)
    #[arg(long)]
    kind: ShapeKind,

    /// Shape id within its kind
    #[arg(long)]
    gid: i64,

    /// Display name, used for the export file name
    #[arg(long)]
    name: Option<String>,
}

impl ShapeArgs {
    fn pointer(&self) -> ShapePointer {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.kind, self.gid));
        ShapePointer::new(name, self.gid, self.kind)
    }
}

#[derive(ClapArgs, Debug)]
struct SampleArgs {
    /// Shape kind of the sampling bounds
    #[arg(long, requires = "gid", required_unless_present = "bounds")]
    kind: Option<ShapeKind>,

    /// Shape id of the sampling bounds
    #[arg(long, requires = "kind")]
    gid: Option<i64>,

    /// Display name of the shape
    #[arg(long)]
    name: Option<String>,

    /// GeoJSON file with custom bounds (Polygon, MultiPolygon or a Feature)
    #[arg(long, conflicts_with_all = ["kind", "gid"])]
    bounds: Option<PathBuf>,

    /// Sample size
    #[arg(short)]
    n: u64,

    /// Sample size unit: total or pct
    #[arg(long, default_value = "total")]
    unit: SampleSizeUnit,

    /// Building types to include (comma-separated: R,B,X)
    #[arg(long, value_delimiter = ',')]
    types: Vec<BuildingType>,

    /// CSV layout: freeform, building_type or structured
    #[arg(long)]
    schema: Option<SchemaVersion>,

    /// Output directory for the CSV
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also print each address
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = &args.api_url {
        config.api.base_url = trim_base_url(url);
    }

    let client = ApiClient::from_config(&config.api).context("Failed to create API client")?;
    info!("Using API at {}", client.base_url());

    match args.command {
        Command::Health => {
            let status = client.health().await?;
            println!("{}", status);
        }
        Command::Search { text, limit } => {
            let results = match limit {
                Some(limit) => client.search_with_limit(&text, limit).await?,
                None => client.search(&text).await?,
            };
            for r in results {
                match &r.secondary {
                    Some(secondary) => println!("{}\t{}\t{}\t{}", r.kind, r.gid, r.name, secondary),
                    None => println!("{}\t{}\t{}", r.kind, r.gid, r.name),
                }
            }
        }
        Command::Shape { shape, out } => {
            check_kind(config.export.schema, shape.kind);
            let shape = client.fetch_shape(&shape.pointer()).await?;

            match shape.geometry.bounding_rect() {
                Some(rect) => info!(
                    "{} spans [{}, {}] to [{}, {}]",
                    shape.name(),
                    rect.min().x,
                    rect.min().y,
                    rect.max().x,
                    rect.max().y
                ),
                None => warn!("{} has an empty geometry", shape.name()),
            }

            if let Some(out) = out {
                let json = serde_json::to_string_pretty(&shape)?;
                fs::write(&out, json)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                info!("Wrote shape to {}", out.display());
            }
        }
        Command::Sample(sample) => run_sample(&client, &config, sample).await?,
    }

    Ok(())
}

async fn run_sample(client: &ApiClient, config: &Config, args: SampleArgs) -> Result<()> {
    let schema = args.schema.unwrap_or(config.export.schema);
    let (bounds, display_name) = match (&args.bounds, args.kind, args.gid) {
        (Some(path), _, _) => {
            let (geom, name) = load_bounds(path)?;
            (Bounds::Custom(geom), args.name.clone().unwrap_or(name))
        }
        (None, Some(kind), Some(gid)) => {
            check_kind(schema, kind);
            let pointer = ShapeArgs {
                kind,
                gid,
                name: args.name.clone(),
            }
            .pointer();
            let name = pointer.name.clone();
            (Bounds::Shape(pointer), name)
        }
        _ => anyhow::bail!("either --bounds or --kind and --gid is required"),
    };

    let request = SampleRequest::new(bounds, args.n, args.unit).with_types(args.types);
    request.validate().map_err(anyhow::Error::msg)?;

    let sample = client.sample_request(&request).await?;
    for message in &sample.validation {
        println!("warning: {}", message);
    }

    let out_dir = args
        .out_dir
        .as_deref()
        .unwrap_or(config.export.out_dir.as_path());
    let blob = address_list_to_csv(&sample.addresses, schema);
    let path = save_csv(
        &blob,
        out_dir,
        &export_name(&display_name, sample.addresses.len()),
    )?;
    println!("{}", path.display());

    if args.print {
        for addr in &sample.addresses {
            println!("{}", format_sampled(addr).replace('\n', ", "));
        }
    }

    Ok(())
}

/// Read custom bounds from a GeoJSON geometry or feature file.
///
/// Returns the geometry and a display name taken from the feature's
/// properties, or the file stem.
fn load_bounds(path: &Path) -> Result<(MultiPolygonGeometry, String)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("custom")
        .to_string();

    let (geometry, name) = if value.get("type").and_then(|t| t.as_str()) == Some("Feature") {
        let name = value
            .get("properties")
            .and_then(|p| p.as_object())
            .map(|props| derive_feature_name(props, Some(&stem)))
            .unwrap_or_else(|| stem.clone());
        (value.get("geometry").cloned().unwrap_or_default(), name)
    } else {
        (value, stem)
    };

    let geometry: BoundsGeometry = serde_json::from_value(geometry)
        .context("Bounds must be a Polygon or MultiPolygon")?;
    Ok((geometry.into(), name))
}

fn check_kind(schema: SchemaVersion, kind: ShapeKind) -> bool {
    let served = schema.shape_kinds().contains(&kind);
    if !served {
        warn!(
            "Shape kind '{}' is not served by the {:?} API version",
            kind, schema
        );
    }
    served
}
