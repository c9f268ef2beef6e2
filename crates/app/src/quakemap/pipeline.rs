//! Refresh pipeline tying together the data source, scene composition, the
//! scene slot, and the preview server.
//!
//! One refresh is a single pass: fetch the earthquake feed and the plate
//! boundaries concurrently, wait for both, then transform and compose
//! synchronously and publish. A failed earthquake fetch publishes nothing.

use std::{
    io::Write,
    net::TcpListener,
    path::Path,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use quake_core::{
    BaseMapCatalog, OverlaySource, SceneDescription, compose, decode_feed, transform_all,
};
use quake_feed::{DataSource, FeedLocation};
use tracing::{Instrument, debug, error, info, warn};

use crate::quakemap::{
    config::{ExportConfig, ExportFormat, QuakeMapConfig, ServeConfig},
    data::{SceneMeta, SceneSlot, SceneSnapshot},
    render::{clamp_radii, render_page},
    server::spawn_preview_server,
    telemetry,
};

/// Everything needed to rebuild the scene, injected once.
pub(crate) struct Refresher {
    source: DataSource,
    feed: FeedLocation,
    plates: Option<FeedLocation>,
    base_maps: BaseMapCatalog,
}

impl Refresher {
    pub(crate) fn new(config: &QuakeMapConfig) -> Result<Self> {
        let source = DataSource::new(config.timeout).context("Failed to create data source")?;
        if config.base_maps.default_style().access_token.is_empty() {
            warn!("No Mapbox token configured; base-map tiles will not load");
        }
        Ok(Self {
            source,
            feed: config.feed.clone(),
            plates: config.plates.clone(),
            base_maps: config.base_maps.clone(),
        })
    }

    /// Fetch, decode, transform and compose one scene without publishing it.
    pub(crate) async fn build(&self) -> Result<(SceneDescription, SceneMeta)> {
        let started = Instant::now();
        let plate_fetch = async {
            match &self.plates {
                Some(location) => Some(self.source.fetch_json(location).await),
                None => None,
            }
        };
        let (quakes, plates) = tokio::join!(self.source.fetch_json(&self.feed), plate_fetch);
        metrics::histogram!("quakemap_fetch_seconds").record(started.elapsed().as_secs_f64());

        let document =
            quakes.with_context(|| format!("Failed to fetch earthquake feed {}", self.feed))?;
        let batch = decode_feed(document)
            .with_context(|| format!("Earthquake feed {} is unusable", self.feed))?;

        for rejected in &batch.rejected {
            warn!("Skipping malformed record: {rejected}");
        }
        metrics::counter!("quakemap_malformed_records_total")
            .increment(batch.rejected.len() as u64);

        let overlays = match plates {
            Some(Ok(data)) => vec![OverlaySource::tectonic_plates(Some(data))],
            Some(Err(err)) => {
                let err = anyhow::Error::new(err);
                warn!("Tectonic plate overlay unavailable: {err:#}");
                vec![OverlaySource::tectonic_plates(None)]
            }
            None => Vec::new(),
        };

        let mut scene = compose(transform_all(&batch.records), overlays, self.base_maps.clone());
        let clamped = clamp_radii(&mut scene);
        if clamped > 0 {
            debug!("Raised {clamped} marker radii to the minimum visible size");
        }

        Ok((
            scene,
            SceneMeta {
                feed_title: batch.title,
                rejected_records: batch.rejected.len(),
            },
        ))
    }

    /// Build a scene and publish it. On error the slot is left untouched.
    pub(crate) async fn refresh(&self, slot: &SceneSlot) -> Result<Arc<SceneSnapshot>> {
        let span = tracing::info_span!(
            "quakemap.refresh",
            feed = %self.feed,
            points = tracing::field::Empty
        );
        let record_span = span.clone();

        async move {
            metrics::counter!("quakemap_refresh_total").increment(1);
            match self.build().await {
                Ok((scene, meta)) => {
                    let points = scene.earthquakes.points.len();
                    record_span.record("points", points as u64);
                    metrics::gauge!("quakemap_scene_points").set(points as f64);
                    let snapshot = slot.publish(scene, meta);
                    info!(
                        "Published scene #{} with {} earthquakes ({} skipped)",
                        snapshot.sequence, points, snapshot.rejected_records
                    );
                    Ok(snapshot)
                }
                Err(err) => {
                    metrics::counter!("quakemap_refresh_errors_total").increment(1);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Serve the map, refreshing once or on a fixed period until Ctrl+C.
pub fn serve(config: ServeConfig) -> Result<()> {
    let _telemetry_guard = telemetry::init(&config.map.telemetry);
    let prometheus = telemetry::init_metrics_recorder().clone();

    let listener = TcpListener::bind((config.bind.as_str(), config.port))
        .with_context(|| format!("Failed to bind {}:{}", config.bind, config.port))?;
    let slot = SceneSlot::default();
    let server = spawn_preview_server(listener, slot.clone(), Some(prometheus))?;
    info!("Map preview listening on http://{}:{}", config.bind, config.port);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("quakemap-refresh")
        .build()
        .context("Failed to start async runtime")?;

    let outcome = runtime.block_on(run_until_shutdown(&config, &slot));

    info!("Shutting down map preview");
    server.stop();
    outcome
}

async fn run_until_shutdown(config: &ServeConfig, slot: &SceneSlot) -> Result<()> {
    let refresher = Refresher::new(&config.map)?;
    tokio::select! {
        _ = refresh_loop(&refresher, slot, config.refresh_every) => Ok(()),
        signal = tokio::signal::ctrl_c() => signal.context("Failed to listen for Ctrl+C"),
    }
}

async fn refresh_loop(refresher: &Refresher, slot: &SceneSlot, every: Option<Duration>) {
    loop {
        if let Err(err) = refresher.refresh(slot).await {
            error!("Refresh failed, keeping the previous scene: {err:#}");
        }
        match every {
            Some(period) => tokio::time::sleep(period).await,
            None => std::future::pending::<()>().await,
        }
    }
}

/// Build one scene and write it as JSON or as a standalone page.
pub fn export(config: ExportConfig) -> Result<()> {
    let _telemetry_guard = telemetry::init(&config.map.telemetry);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let slot = SceneSlot::default();
    let snapshot = runtime.block_on(async {
        let refresher = Refresher::new(&config.map)?;
        refresher.refresh(&slot).await
    })?;

    let body = match config.format {
        ExportFormat::Json => serde_json::to_string_pretty(&*snapshot)
            .context("Failed to serialize scene")?,
        ExportFormat::Html => render_page(&snapshot.scene)?,
    };
    write_output(config.out.as_deref(), &body)
}

fn write_output(out: Option<&Path>, body: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(body.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("Failed to write to stdout")
        }
    }
}
