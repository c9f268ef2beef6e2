//! Actix Web preview server exposing the map page, the scene JSON, and metrics.
//!
//! The server runs on a dedicated thread so the refresh loop's runtime stays
//! free of Actix concerns. Handlers only read the scene slot.

use std::net::TcpListener;

use actix_web::{App, HttpResponse, HttpServer, http::header, web};
use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::error;

use crate::quakemap::{data::SceneSlot, render::render_page};

/// Shared state backing HTTP handlers.
pub(crate) struct ServerState {
    pub(crate) slot: SceneSlot,
    pub(crate) prometheus: Option<PrometheusHandle>,
}

#[derive(Default)]
/// Handle for the preview server thread.
pub(crate) struct PreviewServer {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl PreviewServer {
    /// Signal the server to stop and block until the thread exits.
    pub(crate) fn stop(self) {
        if let Some(tx) = self.shutdown {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle {
            let _ = handle.join();
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    scenes_published: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_refresh: Option<chrono::DateTime<chrono::Utc>>,
}

/// Spawn the preview server thread on an already-bound listener.
pub(crate) fn spawn_preview_server(
    listener: TcpListener,
    slot: SceneSlot,
    prometheus: Option<PrometheusHandle>,
) -> Result<PreviewServer> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = std::thread::Builder::new()
        .name("quakemap-preview-server".into())
        .spawn(move || {
            if let Err(err) = actix_web::rt::System::new().block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(web::Data::new(ServerState {
                            slot: slot.clone(),
                            prometheus: prometheus.clone(),
                        }))
                        .configure(routes)
                })
                .listen(listener)?
                .run();

                let srv_handle = server.handle();
                actix_web::rt::spawn(async move {
                    let _ = shutdown_rx.await;
                    srv_handle.stop(true).await;
                });

                server.await
            }) {
                error!("HTTP server error: {err}");
            }
        })
        .context("Failed to spawn preview server thread")?;
    Ok(PreviewServer {
        shutdown: Some(shutdown_tx),
        handle: Some(handle),
    })
}

pub(crate) fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_route))
        .route("/scene.json", web::get().to(scene_handler))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/healthz", web::get().to(health_handler));
}

/// Serve the Leaflet page for the latest scene.
async fn index_route(state: web::Data<ServerState>) -> HttpResponse {
    let Some(snapshot) = state.slot.latest() else {
        return HttpResponse::ServiceUnavailable()
            .insert_header((header::RETRY_AFTER, "5"))
            .content_type("text/plain; charset=utf-8")
            .body("No earthquake scene has been loaded yet");
    };
    match render_page(&snapshot.scene) {
        Ok(page) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(page),
        Err(err) => {
            error!("Failed to render map page: {err:#}");
            HttpResponse::InternalServerError().body(err.to_string())
        }
    }
}

/// Return the latest scene snapshot as JSON.
async fn scene_handler(state: web::Data<ServerState>) -> HttpResponse {
    match state.slot.latest() {
        Some(snapshot) => HttpResponse::Ok()
            .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
            .append_header(("Cache-Control", "no-cache"))
            .json(&*snapshot),
        None => HttpResponse::NoContent().finish(),
    }
}

/// Render Prometheus metrics in text exposition format.
async fn metrics_handler(state: web::Data<ServerState>) -> HttpResponse {
    match state.prometheus.as_ref() {
        Some(handle) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(handle.render()),
        None => HttpResponse::ServiceUnavailable().body("metrics recorder not installed"),
    }
}

async fn health_handler(state: web::Data<ServerState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        scenes_published: state.slot.published(),
        last_refresh: state.slot.latest().map(|snapshot| snapshot.generated_at),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use quake_core::{
        BaseMapCatalog, EarthquakeRecord, OverlaySource, Position, compose, transform_all,
    };
    use serde_json::Value;

    use super::*;
    use crate::quakemap::data::SceneMeta;

    fn state(slot: &SceneSlot) -> web::Data<ServerState> {
        web::Data::new(ServerState {
            slot: slot.clone(),
            prometheus: None,
        })
    }

    fn publish_testville(slot: &SceneSlot) {
        let records = [EarthquakeRecord {
            id: Some("tv1".into()),
            magnitude: 4.5,
            depth: 35.0,
            place: "10km N of Testville".into(),
            position: Position {
                longitude: -118.2,
                latitude: 34.1,
            },
        }];
        let scene = compose(
            transform_all(&records),
            vec![OverlaySource::tectonic_plates(None)],
            BaseMapCatalog::mapbox("pk.test"),
        );
        slot.publish(scene, SceneMeta::default());
    }

    #[actix_web::test]
    async fn routes_before_first_scene() {
        let slot = SceneSlot::default();
        let app = test::init_service(App::new().app_data(state(&slot)).configure(routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/scene.json").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/healthz").to_request(),
        )
        .await;
        assert_eq!(body["scenes_published"], 0);
        assert!(body.get("last_refresh").is_none());
    }

    #[actix_web::test]
    async fn serves_the_published_scene() {
        let slot = SceneSlot::default();
        publish_testville(&slot);
        let app = test::init_service(App::new().app_data(state(&slot)).configure(routes)).await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/scene.json").to_request(),
        )
        .await;
        assert_eq!(body["sequence"], 1);
        let point = &body["scene"]["earthquakes"]["points"][0];
        assert_eq!(point["radius"], 90_000.0);
        assert_eq!(point["fill_color"], "#FC4E2A");
        assert_eq!(
            body["scene"]["overlays"][0]["name"],
            quake_core::TECTONIC_PLATES_LAYER_NAME
        );

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = test::read_body(resp).await;
        let page = std::str::from_utf8(&page).unwrap();
        assert!(page.contains("Testville"));
        assert!(page.contains("mapbox/satellite-v9"));
    }

    #[actix_web::test]
    async fn metrics_render_when_recorder_present() {
        let slot = SceneSlot::default();
        let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ServerState {
                    slot,
                    prometheus: Some(handle),
                }))
                .configure(routes),
        )
        .await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
