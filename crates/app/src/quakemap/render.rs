//! Adapter between the composed scene and the Leaflet page.

use anyhow::{Context, Result};
use quake_core::SceneDescription;

use crate::html::map_page::{MAP_PAGE_TEMPLATE, SCENE_PLACEHOLDER};

/// Smallest circle radius (meters) handed to the renderer.
pub(crate) const MIN_VISIBLE_RADIUS_M: f64 = 1_000.0;

/// Raise radii below [`MIN_VISIBLE_RADIUS_M`] (including zero, negative and
/// NaN) to the floor. Returns how many points were adjusted.
pub(crate) fn clamp_radii(scene: &mut SceneDescription) -> usize {
    let mut clamped = 0;
    for point in &mut scene.earthquakes.points {
        if point.radius.is_nan() || point.radius < MIN_VISIBLE_RADIUS_M {
            point.radius = MIN_VISIBLE_RADIUS_M;
            clamped += 1;
        }
    }
    clamped
}

/// Serialize `scene` for embedding inside a `<script>` element. Every `<` is
/// escaped so popup markup cannot close the element early.
pub(crate) fn embeddable_json(scene: &SceneDescription) -> Result<String> {
    let json = serde_json::to_string(scene).context("Failed to serialize scene")?;
    Ok(json.replace('<', "\\u003c"))
}

/// Render the full Leaflet page for `scene`.
pub(crate) fn render_page(scene: &SceneDescription) -> Result<String> {
    let json = embeddable_json(scene)?;
    Ok(MAP_PAGE_TEMPLATE.replacen(SCENE_PLACEHOLDER, &json, 1))
}

#[cfg(test)]
mod tests {
    use quake_core::{
        BaseMapCatalog, EarthquakeRecord, OverlaySource, Position, compose, transform_all,
    };

    use super::*;

    fn scene_with(magnitudes: &[f64], place: &str) -> SceneDescription {
        let records: Vec<EarthquakeRecord> = magnitudes
            .iter()
            .map(|&magnitude| EarthquakeRecord {
                id: None,
                magnitude,
                depth: 20.0,
                place: place.to_string(),
                position: Position {
                    longitude: 140.0,
                    latitude: 38.0,
                },
            })
            .collect();
        compose(
            transform_all(&records),
            vec![OverlaySource::tectonic_plates(None)],
            BaseMapCatalog::mapbox("pk.page"),
        )
    }

    #[test]
    fn clamps_non_positive_and_tiny_radii() {
        let mut scene = scene_with(&[-1.0, 0.0, 0.01, f64::NAN, 3.0], "x");
        assert_eq!(clamp_radii(&mut scene), 4);

        let radii: Vec<f64> = scene.earthquakes.points.iter().map(|p| p.radius).collect();
        assert_eq!(radii, [1_000.0, 1_000.0, 1_000.0, 1_000.0, 60_000.0]);
    }

    #[test]
    fn page_embeds_the_scene() {
        let scene = scene_with(&[4.5], "10km N of Testville");
        let page = render_page(&scene).unwrap();

        assert!(!page.contains(SCENE_PLACEHOLDER));
        assert!(page.contains("leaflet.js"));
        assert!(page.contains("pk.page"));
        assert!(page.contains("mapbox/streets-v11"));
        assert!(page.contains("10km N of Testville"));
        assert!(page.contains("\\u003cbr />"));
    }

    #[test]
    fn hostile_place_names_cannot_close_the_script() {
        let scene = scene_with(&[1.0], "</script><script>alert(1)</script>");
        let page = render_page(&scene).unwrap();
        assert_eq!(
            page.matches("</script>").count(),
            MAP_PAGE_TEMPLATE.matches("</script>").count()
        );

        let json = embeddable_json(&scene).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            decoded["earthquakes"]["points"][0]["popup_text"],
            "Magnitude: 1<br />Location: &lt;/script&gt;&lt;script&gt;alert(1)&lt;/script&gt;\
             <br />Depth: 20"
        );
    }
}
