use serde::Serialize;

use crate::{
    record::{EarthquakeRecord, Position},
    style::{color_for_depth, radius_for_magnitude},
};

/// Styled marker derived from one record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderablePoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub position: Position,
    /// Circle radius in meters.
    pub radius: f64,
    pub fill_color: &'static str,
    pub popup_text: String,
}

/// Turn a record into its marker. Pure and total.
pub fn transform(record: &EarthquakeRecord) -> RenderablePoint {
    RenderablePoint {
        id: record.id.clone(),
        position: record.position,
        radius: radius_for_magnitude(record.magnitude),
        fill_color: color_for_depth(record.depth),
        popup_text: popup_text(record),
    }
}

/// Transform every record, keeping input order.
pub fn transform_all(records: &[EarthquakeRecord]) -> Vec<RenderablePoint> {
    records.iter().map(transform).collect()
}

/// Three-line popup body: magnitude, place, depth. The popup is rendered as
/// HTML, so the feed-supplied place is escaped.
pub fn popup_text(record: &EarthquakeRecord) -> String {
    format!(
        "Magnitude: {}<br />Location: {}<br />Depth: {}",
        record.magnitude,
        html_escape::encode_text(&record.place),
        record.depth
    )
}
