//! Earthquake records and their decoding from a GeoJSON feature collection.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Geographic position of an epicenter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Position {
    pub longitude: f64,
    pub latitude: f64,
}

/// One earthquake observation read out of the feed.
#[derive(Clone, Debug, PartialEq)]
pub struct EarthquakeRecord {
    /// Feed identifier, used only as a stable marker key.
    pub id: Option<String>,
    pub magnitude: f64,
    /// Hypocenter depth in kilometers. Slightly negative values occur for
    /// events located above the reference ellipsoid.
    pub depth: f64,
    pub place: String,
    pub position: Position,
}

/// Field a malformed feature was missing or carried in an unusable form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordField {
    Magnitude,
    Place,
    Geometry,
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordField::Magnitude => "magnitude",
            RecordField::Place => "place",
            RecordField::Geometry => "point geometry",
        };
        f.write_str(label)
    }
}

/// A single feature that could not be turned into an [`EarthquakeRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("feature #{index} ({}) has no usable {field}", .id.as_deref().unwrap_or("no id"))]
pub struct MalformedRecordError {
    /// Position of the feature in the collection.
    pub index: usize,
    pub id: Option<String>,
    pub field: RecordField,
}

/// Failures that reject the whole document rather than a single feature.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed document is not valid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a FeatureCollection, found {found:?}")]
    NotFeatureCollection { found: String },
}

/// Outcome of decoding one feed document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedBatch {
    /// Feed title from the USGS `metadata` block, if present.
    pub title: Option<String>,
    /// Feed generation time in epoch milliseconds, if present.
    pub generated_ms: Option<i64>,
    /// Decoded records in input order.
    pub records: Vec<EarthquakeRecord>,
    /// Features that were skipped, in input order.
    pub rejected: Vec<MalformedRecordError>,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Value>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Decode a feature collection, skipping features that lack a required field.
pub fn decode_feed(document: Value) -> Result<FeedBatch, FeedError> {
    let collection: RawCollection = serde_json::from_value(document)?;
    if collection.kind != "FeatureCollection" {
        return Err(FeedError::NotFeatureCollection {
            found: collection.kind,
        });
    }

    let mut batch = FeedBatch::default();
    // Metadata is informational; an unfamiliar shape leaves the fields unset.
    if let Some(metadata) = collection.metadata.as_ref() {
        batch.title = metadata
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_owned);
        batch.generated_ms = metadata.get("generated").and_then(Value::as_i64);
    }

    for (index, feature) in collection.features.iter().enumerate() {
        match decode_feature(index, feature) {
            Ok(record) => batch.records.push(record),
            Err(err) => batch.rejected.push(err),
        }
    }

    Ok(batch)
}

/// Read the four styling fields (plus the id) from a single feature.
pub fn decode_feature(
    index: usize,
    feature: &Value,
) -> Result<EarthquakeRecord, MalformedRecordError> {
    let id = feature.get("id").and_then(Value::as_str).map(str::to_owned);
    let malformed = |field| MalformedRecordError {
        index,
        id: id.clone(),
        field,
    };

    let properties = feature.get("properties");
    let magnitude = properties
        .and_then(|props| props.get("mag"))
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(RecordField::Magnitude))?;
    let place = properties
        .and_then(|props| props.get("place"))
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(RecordField::Place))?
        .to_owned();

    let coordinates = feature
        .get("geometry")
        .and_then(|geometry| geometry.get("coordinates"))
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(RecordField::Geometry))?;
    let coordinate = |i: usize| coordinates.get(i).and_then(Value::as_f64);
    let (Some(longitude), Some(latitude), Some(depth)) =
        (coordinate(0), coordinate(1), coordinate(2))
    else {
        return Err(malformed(RecordField::Geometry));
    };

    Ok(EarthquakeRecord {
        id,
        magnitude,
        depth,
        place,
        position: Position {
            longitude,
            latitude,
        },
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn feature(id: &str, mag: Value, place: Value, coordinates: Value) -> Value {
        json!({
            "type": "Feature",
            "id": id,
            "properties": { "mag": mag, "place": place },
            "geometry": { "type": "Point", "coordinates": coordinates }
        })
    }

    #[test]
    fn decodes_the_usgs_shape() {
        let document = json!({
            "type": "FeatureCollection",
            "metadata": {
                "title": "USGS All Earthquakes, Past Week",
                "generated": 1_700_000_000_000_i64
            },
            "features": [feature(
                "us1",
                json!(4.5),
                json!("10km N of Testville"),
                json!([-120.5, 36.1, 35.0])
            )]
        });

        let batch = decode_feed(document).unwrap();
        assert_eq!(batch.title.as_deref(), Some("USGS All Earthquakes, Past Week"));
        assert_eq!(batch.generated_ms, Some(1_700_000_000_000));
        assert!(batch.rejected.is_empty());
        assert_eq!(
            batch.records,
            vec![EarthquakeRecord {
                id: Some("us1".into()),
                magnitude: 4.5,
                depth: 35.0,
                place: "10km N of Testville".into(),
                position: Position {
                    longitude: -120.5,
                    latitude: 36.1,
                },
            }]
        );
    }

    #[test]
    fn malformed_features_are_skipped_individually() {
        let document = json!({
            "type": "FeatureCollection",
            "features": [
                feature("a", json!(1.0), json!("first"), json!([0.0, 0.0, 5.0])),
                feature("b", Value::Null, json!("no magnitude"), json!([0.0, 0.0, 5.0])),
                feature("c", json!(2.0), Value::Null, json!([0.0, 0.0, 5.0])),
                feature("d", json!(3.0), json!("flat"), json!([0.0, 0.0])),
                feature("e", json!(4.0), json!("last"), json!([1.0, 2.0, -3.0])),
            ]
        });

        let batch = decode_feed(document).unwrap();
        let places: Vec<&str> = batch.records.iter().map(|r| r.place.as_str()).collect();
        assert_eq!(places, ["first", "last"]);

        let fields: Vec<(usize, RecordField)> =
            batch.rejected.iter().map(|err| (err.index, err.field)).collect();
        assert_eq!(
            fields,
            [
                (1, RecordField::Magnitude),
                (2, RecordField::Place),
                (3, RecordField::Geometry),
            ]
        );
        assert_eq!(
            batch.rejected[0].to_string(),
            "feature #1 (b) has no usable magnitude"
        );
    }

    #[test]
    fn feature_without_geometry_or_id() {
        let bare = json!({ "type": "Feature", "properties": { "mag": 1.2, "place": "x" } });
        let err = decode_feature(7, &bare).unwrap_err();
        assert_eq!(err.field, RecordField::Geometry);
        assert_eq!(err.id, None);
        assert_eq!(err.to_string(), "feature #7 (no id) has no usable point geometry");
    }

    #[test]
    fn unfamiliar_metadata_keeps_the_records() {
        let document = json!({
            "type": "FeatureCollection",
            "metadata": { "generated": "2026-10-16T00:00:00Z", "title": 7 },
            "features": [feature("m1", json!(3.1), json!("somewhere"), json!([10.0, 20.0, 8.0]))]
        });

        let batch = decode_feed(document).unwrap();
        assert_eq!(batch.title, None);
        assert_eq!(batch.generated_ms, None);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].place, "somewhere");

        let batch = decode_feed(json!({
            "type": "FeatureCollection",
            "metadata": "not an object",
            "features": []
        }))
        .unwrap();
        assert_eq!(batch.title, None);
    }

    #[test]
    fn empty_collection_decodes_to_empty_batch() {
        let batch = decode_feed(json!({ "type": "FeatureCollection", "features": [] })).unwrap();
        assert!(batch.records.is_empty());
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn rejects_documents_that_are_not_collections() {
        let err = decode_feed(json!({ "type": "Feature", "properties": {} })).unwrap_err();
        assert!(matches!(err, FeedError::NotFeatureCollection { ref found } if found == "Feature"));

        let err = decode_feed(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FeedError::Json(_)));
    }
}
