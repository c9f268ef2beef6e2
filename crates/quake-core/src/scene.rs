//! Scene composition: the earthquake layer, overlay layers, and base maps
//! gathered into the single description handed to the renderer.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::{
    basemap::{BaseMapCatalog, BaseMapStyle},
    style::{LegendEntry, legend},
    transform::RenderablePoint,
};

pub const EARTHQUAKE_LAYER_NAME: &str = "Earthquakes";
pub const TECTONIC_PLATES_LAYER_NAME: &str = "Tectonic Plates";

/// Circle styling shared by every earthquake marker.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            fill_opacity: 0.4,
            stroke_color: "black".to_string(),
            stroke_weight: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
}

impl LineStyle {
    pub fn plate_boundaries() -> Self {
        Self {
            color: "orange".to_string(),
            weight: 2.0,
        }
    }
}

/// Initial map view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Viewport {
    /// `[latitude, longitude]`.
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: [15.5994, -28.6731],
            zoom: 3,
        }
    }
}

/// Overlay input to [`compose`]; `data` is `None` when its source has not
/// resolved.
#[derive(Clone, Debug)]
pub struct OverlaySource {
    pub name: String,
    pub data: Option<Value>,
    pub style: LineStyle,
    pub visible: bool,
}

impl OverlaySource {
    pub fn tectonic_plates(data: Option<Value>) -> Self {
        Self {
            name: TECTONIC_PLATES_LAYER_NAME.to_string(),
            data,
            style: LineStyle::plate_boundaries(),
            visible: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EarthquakeLayer {
    pub name: String,
    pub visible: bool,
    pub style: MarkerStyle,
    pub points: Vec<RenderablePoint>,
}

/// Independently togglable line layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub name: String,
    pub visible: bool,
    /// False when the layer is registered but its data never arrived.
    pub resolved: bool,
    pub style: LineStyle,
    /// Line geometry, passed through opaquely.
    pub data: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneDescription {
    pub earthquakes: EarthquakeLayer,
    pub overlays: Vec<OverlayLayer>,
    pub base_maps: BaseMapCatalog,
    pub legend: Vec<LegendEntry>,
    pub viewport: Viewport,
}

/// Assemble the scene. Points keep their input order; overlays are
/// registered even without data, with an empty feature collection.
pub fn compose(
    points: Vec<RenderablePoint>,
    overlays: Vec<OverlaySource>,
    base_maps: BaseMapCatalog,
) -> SceneDescription {
    let mut layers: Vec<OverlayLayer> = Vec::with_capacity(overlays.len());
    for overlay in overlays {
        if overlay.name == EARTHQUAKE_LAYER_NAME
            || layers.iter().any(|layer| layer.name == overlay.name)
        {
            warn!("Dropping overlay with duplicate name {:?}", overlay.name);
            continue;
        }
        let resolved = overlay.data.is_some();
        layers.push(OverlayLayer {
            name: overlay.name,
            visible: overlay.visible,
            resolved,
            style: overlay.style,
            data: overlay.data.unwrap_or_else(empty_collection),
        });
    }

    SceneDescription {
        earthquakes: EarthquakeLayer {
            name: EARTHQUAKE_LAYER_NAME.to_string(),
            visible: true,
            style: MarkerStyle::default(),
            points,
        },
        overlays: layers,
        base_maps,
        legend: legend(),
        viewport: Viewport::default(),
    }
}

fn empty_collection() -> Value {
    json!({ "type": "FeatureCollection", "features": [] })
}

impl SceneDescription {
    pub fn overlay(&self, name: &str) -> Option<&OverlayLayer> {
        self.overlays.iter().find(|layer| layer.name == name)
    }

    /// Toggle one overlay. Returns false when no overlay has that name.
    pub fn set_overlay_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.overlays.iter_mut().find(|layer| layer.name == name) {
            Some(layer) => {
                layer.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn default_base_map(&self) -> &BaseMapStyle {
        self.base_maps.default_style()
    }

    /// Names in layer-control order: the earthquake layer, then overlays.
    pub fn layer_names(&self) -> Vec<&str> {
        std::iter::once(self.earthquakes.name.as_str())
            .chain(self.overlays.iter().map(|layer| layer.name.as_str()))
            .collect()
    }
}
