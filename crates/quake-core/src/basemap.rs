//! Base-map styles offered by the layer control.
//!
//! Every style is served by the same Mapbox tile endpoint; only the style id
//! differs, so the whole catalog is one table plus shared tile options.

use serde::Serialize;
use thiserror::Error;

/// `(display name, Mapbox style id)` rows; the first row is the default.
pub const MAPBOX_STYLES: [(&str, &str); 5] = [
    ("Street Map", "mapbox/streets-v11"),
    ("Dark Map", "mapbox/dark-v10"),
    ("Light Map", "mapbox/light-v10"),
    ("Outdoors Map", "mapbox/outdoors-v11"),
    ("Satellite Map", "mapbox/satellite-v9"),
];

pub const MAPBOX_TILE_URL: &str =
    "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";

pub const MAPBOX_ATTRIBUTION: &str = "\
© <a href='https://www.mapbox.com/about/maps/'>Mapbox</a> \
© <a href='http://www.openstreetmap.org/copyright'>OpenStreetMap</a> \
<strong><a href='https://www.mapbox.com/map-feedback/' target='_blank'>\
Improve this map</a></strong>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("base-map catalog has no styles")]
    Empty,
    #[error("unknown base map {name:?}; available: {available}")]
    UnknownDefault { name: String, available: String },
}

/// Tile request options shared by every style in a catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TileOptions {
    pub url_template: String,
    pub attribution: String,
    pub tile_size: u32,
    pub zoom_offset: i32,
    pub max_zoom: u8,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            url_template: MAPBOX_TILE_URL.to_string(),
            attribution: MAPBOX_ATTRIBUTION.to_string(),
            tile_size: 512,
            zoom_offset: -1,
            max_zoom: 18,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BaseMapStyle {
    pub name: String,
    pub style_id: String,
    /// Supplier credential, forwarded to the tile URL untouched.
    pub access_token: String,
    pub default_active: bool,
}

/// Named base-map alternatives with exactly one marked default-active.
///
/// Catalogs are only built through [`BaseMapCatalog::from_rows`] and
/// [`BaseMapCatalog::mapbox`], so `styles` is never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BaseMapCatalog {
    tiles: TileOptions,
    styles: Vec<BaseMapStyle>,
}

fn styles_from_rows<'a>(
    rows: impl IntoIterator<Item = (&'a str, &'a str)>,
    access_token: &str,
) -> Vec<BaseMapStyle> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, (name, style_id))| BaseMapStyle {
            name: name.to_string(),
            style_id: style_id.to_string(),
            access_token: access_token.to_string(),
            default_active: idx == 0,
        })
        .collect()
}

impl BaseMapCatalog {
    /// Build a catalog from `(name, style id)` rows sharing one token.
    /// The first row is default-active.
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = (&'a str, &'a str)>,
        access_token: &str,
        tiles: TileOptions,
    ) -> Result<Self, CatalogError> {
        let styles = styles_from_rows(rows, access_token);
        if styles.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { tiles, styles })
    }

    /// The five Mapbox styles, Street Map active.
    pub fn mapbox(access_token: &str) -> Self {
        Self {
            tiles: TileOptions::default(),
            styles: styles_from_rows(MAPBOX_STYLES, access_token),
        }
    }

    /// Make `name` the default-active style; matching ignores ASCII case.
    pub fn with_default(mut self, name: &str) -> Result<Self, CatalogError> {
        let Some(target) = self
            .styles
            .iter()
            .position(|style| style.name.eq_ignore_ascii_case(name))
        else {
            return Err(CatalogError::UnknownDefault {
                name: name.to_string(),
                available: self.names().join(", "),
            });
        };
        for (idx, style) in self.styles.iter_mut().enumerate() {
            style.default_active = idx == target;
        }
        Ok(self)
    }

    pub fn default_style(&self) -> &BaseMapStyle {
        self.styles
            .iter()
            .find(|style| style.default_active)
            .unwrap_or(&self.styles[0])
    }

    pub fn styles(&self) -> &[BaseMapStyle] {
        &self.styles
    }

    pub fn tiles(&self) -> &TileOptions {
        &self.tiles
    }

    pub fn names(&self) -> Vec<&str> {
        self.styles.iter().map(|style| style.name.as_str()).collect()
    }
}
