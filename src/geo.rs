//! Country placement for the globe.
//!
//! Known countries come from a static table. Anything else gets a
//! synthetic point derived from a 32-bit FNV-1a hash of its name. The
//! synthetic point is filler for rendering, not a location.
use crate::types::GeoSource;
use once_cell::sync::Lazy;
use std::collections::HashMap;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

static KNOWN_COORDS: Lazy<HashMap<&'static str, LatLng>> = Lazy::new(|| {
    [
        ("afghanistan", 33.93911, 67.709953),
        ("albania", 41.153332, 20.168331),
        ("algeria", 28.033886, 1.659626),
        ("argentina", -38.416097, -63.616672),
        ("australia", -25.274398, 133.775136),
        ("brazil", -14.235004, -51.92528),
        ("canada", 56.130366, -106.346771),
        ("china", 35.86166, 104.195397),
        ("egypt", 26.820553, 30.802498),
        ("france", 46.227638, 2.213749),
        ("germany", 51.165691, 10.451526),
        ("india", 20.593684, 78.96288),
        ("indonesia", -0.789275, 113.921327),
        ("italy", 41.87194, 12.56738),
        ("japan", 36.204824, 138.252924),
        ("mexico", 23.634501, -102.552784),
        ("nigeria", 9.081999, 8.675277),
        ("russia", 61.52401, 105.318756),
        ("south africa", -30.559482, 22.937506),
        ("spain", 40.463667, -3.74922),
        ("united kingdom", 55.378051, -3.435973),
        ("united states", 37.09024, -95.712891),
    ]
    .into_iter()
    .map(|(name, lat, lng)| (name, LatLng { lat, lng }))
    .collect()
});

pub fn known_coords(country: &str) -> Option<LatLng> {
    KNOWN_COORDS.get(country.trim().to_lowercase().as_str()).copied()
}

/// FNV-1a over UTF-16 code units, read back as a signed 32-bit value.
///
/// An empty string leaves the (unsigned) offset basis untouched, which is
/// why the result is widened to `i64`.
pub fn string_hash(s: &str) -> i64 {
    let mut h = i64::from(FNV_OFFSET);
    for unit in s.encode_utf16() {
        let mixed = (h as u32) ^ u32::from(unit);
        h = i64::from(mixed.wrapping_mul(FNV_PRIME) as i32);
    }
    h
}

/// Deterministic placement from the hash. `%` truncates toward zero and the
/// division by seven floors, so negative hashes land where they always have.
pub fn hash_to_lat_lng(s: &str) -> LatLng {
    let h = string_hash(s);
    let lat = ((h % 180) + 180) - 90;
    let lng = ((h.div_euclid(7) % 360) + 360) - 180;
    LatLng {
        lat: lat as f64,
        lng: lng as f64,
    }
}

/// Known coordinates when available, otherwise the hash placement.
pub fn locate(country: &str) -> (LatLng, GeoSource) {
    match known_coords(country) {
        Some(c) => (c, GeoSource::Known),
        None => (hash_to_lat_lng(country), GeoSource::Synthetic),
    }
}
