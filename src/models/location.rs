//! Resolved location model for geocoded places

use serde::{Deserialize, Serialize};

/// A place name resolved to coordinates, produced once per geocoder call
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Canonical "City, Region, Country" string, absent parts omitted
    pub display_name: String,
}

impl ResolvedLocation {
    /// Create a new resolved location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, display_name: String) -> Self {
        Self {
            latitude,
            longitude,
            display_name,
        }
    }
}
