//! Styling and scene composition for the earthquake map.
//!
//! Everything here is synchronous and free of I/O: records come in already
//! fetched, and the composed [`SceneDescription`] goes out to whatever renders it.

pub mod basemap;
pub mod record;
pub mod scene;
pub mod style;
pub mod transform;

pub use basemap::{BaseMapCatalog, BaseMapStyle, CatalogError, TileOptions};
pub use record::{
    EarthquakeRecord, FeedBatch, FeedError, MalformedRecordError, Position, RecordField,
    decode_feature, decode_feed,
};
pub use scene::{
    EARTHQUAKE_LAYER_NAME, OverlayLayer, OverlaySource, SceneDescription,
    TECTONIC_PLATES_LAYER_NAME, compose,
};
pub use style::{color_for_depth, legend, radius_for_magnitude};
pub use transform::{RenderablePoint, transform, transform_all};
