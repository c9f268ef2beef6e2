//! Depth and magnitude styling rules for earthquake markers.
//!
//! Depth is classified into a small fixed set of bands so the legend stays
//! readable; magnitude scales linearly into a circle radius in meters.

use serde::Serialize;

/// Fill color for depths at or below the shallowest band boundary, and for NaN.
pub const CATCH_ALL_COLOR: &str = "magenta";

/// Meters of circle radius per unit of magnitude at the default zoom.
pub const MAGNITUDE_RADIUS_SCALE: f64 = 20_000.0;

/// A depth range mapped to a single fill color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DepthColorBand {
    /// Depths strictly greater than this bound (km) fall into the band.
    pub lower_bound_exclusive: f64,
    pub color: &'static str,
    /// Text shown next to the swatch in the map legend.
    pub label: &'static str,
}

/// Bands ordered deepest first; the first band whose bound is exceeded wins.
pub const DEPTH_BANDS: [DepthColorBand; 6] = [
    DepthColorBand {
        lower_bound_exclusive: 90.0,
        color: "#800026",
        label: "91+",
    },
    DepthColorBand {
        lower_bound_exclusive: 70.0,
        color: "#BD0026",
        label: "71-90",
    },
    DepthColorBand {
        lower_bound_exclusive: 50.0,
        color: "#E31A1C",
        label: "51-70",
    },
    DepthColorBand {
        lower_bound_exclusive: 30.0,
        color: "#FC4E2A",
        label: "31-50",
    },
    DepthColorBand {
        lower_bound_exclusive: 10.0,
        color: "#FD8D3C",
        label: "11-30",
    },
    DepthColorBand {
        lower_bound_exclusive: -9.0,
        color: "#FEB24C",
        label: "-9-10",
    },
];

/// One row of the depth legend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub color: &'static str,
    pub label: &'static str,
}

/// Classify a depth in kilometers into its band color.
///
/// Total over `f64`: NaN never exceeds a bound, so it lands in the catch-all.
pub fn color_for_depth(depth: f64) -> &'static str {
    DEPTH_BANDS
        .iter()
        .find(|band| depth > band.lower_bound_exclusive)
        .map(|band| band.color)
        .unwrap_or(CATCH_ALL_COLOR)
}

/// Linear magnitude-to-radius rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MagnitudeRadiusRule {
    pub scale: f64,
}

impl Default for MagnitudeRadiusRule {
    fn default() -> Self {
        Self {
            scale: MAGNITUDE_RADIUS_SCALE,
        }
    }
}

impl MagnitudeRadiusRule {
    /// Radius in meters. Zero and negative magnitudes pass straight through;
    /// the renderer adapter decides what to do with them.
    pub fn radius(&self, magnitude: f64) -> f64 {
        magnitude * self.scale
    }
}

/// Radius for `magnitude` under the default scale.
pub fn radius_for_magnitude(magnitude: f64) -> f64 {
    MagnitudeRadiusRule::default().radius(magnitude)
}

/// Legend rows, shallowest band first. The catch-all has no row.
pub fn legend() -> Vec<LegendEntry> {
    DEPTH_BANDS
        .iter()
        .rev()
        .map(|band| LegendEntry {
            color: band.color,
            label: band.label,
        })
        .collect()
}
