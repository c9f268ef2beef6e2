//! Configuration parsing for the map pipeline.
//!
//! Raw clap arguments are validated once here and turned into the structs the
//! pipeline and server consume.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use quake_core::BaseMapCatalog;
use quake_feed::{DEFAULT_PLATES_PATH, DEFAULT_TIMEOUT, FeedLocation, USGS_ALL_WEEK_URL};

#[derive(Clone, Debug, Default)]
/// Optional telemetry knobs for tracing.
pub struct TelemetryOptions {
    /// Write a Chrome trace JSON file capturing refresh spans.
    pub chrome_trace_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
/// Settings shared by every subcommand that builds a scene.
pub struct QuakeMapConfig {
    pub feed: FeedLocation,
    /// Plate-boundary document; `None` disables the overlay entirely.
    pub plates: Option<FeedLocation>,
    pub base_maps: BaseMapCatalog,
    pub timeout: Duration,
    pub telemetry: TelemetryOptions,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub map: QuakeMapConfig,
    pub bind: String,
    pub port: u16,
    /// Re-fetch period; `None` fetches once at startup.
    pub refresh_every: Option<Duration>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Scene description as JSON.
    Json,
    /// Self-contained Leaflet page.
    Html,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub map: QuakeMapConfig,
    /// Output file; `None` writes to stdout.
    pub out: Option<PathBuf>,
    pub format: ExportFormat,
}

/// Feed and styling arguments shared by `serve` and `export`.
#[derive(Debug, Args)]
pub struct FeedArgs {
    /// Earthquake GeoJSON feed URL or file path.
    #[arg(long = "feed", value_name = "URL|PATH", default_value = USGS_ALL_WEEK_URL)]
    pub feed: String,
    /// Tectonic plate boundary document URL or file path.
    #[arg(long = "plates", value_name = "URL|PATH", default_value = DEFAULT_PLATES_PATH)]
    pub plates: String,
    /// Skip the tectonic plate overlay.
    #[arg(long = "no-plates", action = clap::ArgAction::SetTrue)]
    pub no_plates: bool,
    /// Mapbox access token used by the base-map tiles.
    #[arg(
        long = "mapbox-token",
        env = "MAPBOX_ACCESS_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub mapbox_token: Option<String>,
    /// Base map shown on load (e.g. "Dark Map").
    #[arg(long = "base-map", value_name = "NAME")]
    pub base_map: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
    /// Emit Chrome trace JSON for post-mortem analysis.
    #[arg(long = "chrome-trace", value_name = "PATH")]
    pub chrome_trace: Option<PathBuf>,
}

/// CLI arguments accepted by the `serve` subcommand.
#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub feed: FeedArgs,
    /// Address the preview server binds to.
    #[arg(long = "bind", value_name = "ADDR", default_value = "127.0.0.1")]
    pub bind: String,
    /// Port the preview server listens on.
    #[arg(long = "port", value_name = "PORT", default_value_t = 8080)]
    pub port: u16,
    /// Re-fetch the feed every N seconds instead of once.
    #[arg(long = "refresh-secs", value_name = "SECS")]
    pub refresh_secs: Option<u64>,
}

/// CLI arguments accepted by the `export` subcommand.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub feed: FeedArgs,
    /// Output file, or `-` for stdout.
    #[arg(long = "out", short = 'o', value_name = "PATH", default_value = "-")]
    pub out: String,
    /// Output format.
    #[arg(long = "format", value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,
}

impl TryFrom<FeedArgs> for QuakeMapConfig {
    type Error = anyhow::Error;

    fn try_from(args: FeedArgs) -> Result<Self> {
        let token = args
            .mapbox_token
            .map(|token| token.trim().to_string())
            .unwrap_or_default();

        let mut base_maps = BaseMapCatalog::mapbox(&token);
        if let Some(name) = args.base_map.as_deref() {
            base_maps = base_maps
                .with_default(name)
                .context("--base-map does not name a known style")?;
        }

        let timeout = match args.timeout_secs {
            Some(0) => bail!("--timeout-secs must be at least 1"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        let plates = (!args.no_plates).then(|| FeedLocation::parse(&args.plates));

        Ok(Self {
            feed: FeedLocation::parse(&args.feed),
            plates,
            base_maps,
            timeout,
            telemetry: TelemetryOptions {
                chrome_trace_path: args.chrome_trace,
            },
        })
    }
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = anyhow::Error;

    fn try_from(args: ServeArgs) -> Result<Self> {
        let refresh_every = match args.refresh_secs {
            Some(0) => bail!("--refresh-secs must be at least 1"),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };
        if args.bind.trim().is_empty() {
            bail!("--bind must not be empty");
        }

        Ok(Self {
            map: args.feed.try_into()?,
            bind: args.bind,
            port: args.port,
            refresh_every,
        })
    }
}

impl TryFrom<ExportArgs> for ExportConfig {
    type Error = anyhow::Error;

    fn try_from(args: ExportArgs) -> Result<Self> {
        let out = match args.out.as_str() {
            "-" => None,
            "" => bail!("--out must not be empty; use - for stdout"),
            path => Some(PathBuf::from(path)),
        };

        Ok(Self {
            map: args.feed.try_into()?,
            out,
            format: args.format,
        })
    }
}
