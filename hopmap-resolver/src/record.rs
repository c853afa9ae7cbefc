use serde::{Deserialize, Serialize};

/// One discovered address, paired with the hostname label of the table row
/// it was found in. A row that yields several addresses produces several
/// records with the same hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopRecord {
    pub hostname: String,
    pub address: String,
}

impl HopRecord {
    pub fn new(hostname: String, address: String) -> Self {
        Self { hostname, address }
    }

    /// Record for a bare address with no separate hostname label.
    pub fn bare(address: String) -> Self {
        Self {
            hostname: address.clone(),
            address,
        }
    }
}

/// Raw lookup outcome for one address. Either coordinate may be absent when
/// the lookup service has no fix for the address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: String,
}

impl GeoPoint {
    pub fn new(address: String) -> Self {
        Self {
            latitude: None,
            longitude: None,
            address,
        }
    }

    pub fn with_coordinates(address: String, latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            address,
        }
    }

    /// True when both coordinates are present and usable. A missing,
    /// non-finite or zero coordinate disqualifies the point.
    pub fn has_coordinates(&self) -> bool {
        matches!(
            (self.latitude, self.longitude),
            (Some(lat), Some(lng))
                if lat.is_finite() && lng.is_finite() && lat != 0.0 && lng != 0.0
        )
    }

    /// Collapse into a plottable location, or None when a coordinate is
    /// missing.
    pub fn into_location(self) -> Option<Location> {
        if !self.has_coordinates() {
            return None;
        }
        Some(Location {
            latitude: self.latitude?,
            longitude: self.longitude?,
            ip: self.address,
        })
    }
}

/// A fully resolved, plottable location. Invariant: both coordinates are
/// present and numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub ip: String,
}
