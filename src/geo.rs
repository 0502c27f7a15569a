//! Great-circle distance and nearby-place ranking.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude within ±90 and longitude within ±180.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Distance to `other` in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Haversine distance between two points in kilometers.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Anything with a name and a position.
pub trait Located {
    fn name(&self) -> &str;
    fn coordinate(&self) -> Coordinate;
}

impl<T: Located + ?Sized> Located for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn coordinate(&self) -> Coordinate {
        (**self).coordinate()
    }
}

/// A plain named place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

impl Place {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            coordinate: Coordinate::new(lat, lon),
        }
    }
}

impl Located for Place {
    fn name(&self) -> &str {
        &self.name
    }

    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// A place with its distance from the search origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<P> {
    pub place: P,
    pub distance_km: f64,
}

// Lower-cased name plus coordinates at three decimals (about 100 m)
#[allow(clippy::cast_possible_truncation)]
fn dedupe_key(place: &impl Located) -> (String, i64, i64) {
    let coordinate = place.coordinate();
    (
        place.name().to_lowercase(),
        (coordinate.lat * 1000.0).round() as i64,
        (coordinate.lon * 1000.0).round() as i64,
    )
}

/// Nearest places around `origin`.
///
/// Duplicates are dropped (first occurrence wins), then places farther than
/// `radius_km` are dropped, and the rest are sorted by distance and cut to
/// `limit`.
pub fn rank_nearby<P, I>(origin: Coordinate, places: I, radius_km: f64, limit: usize) -> Vec<Ranked<P>>
where
    P: Located,
    I: IntoIterator<Item = P>,
{
    let mut seen = HashSet::new();
    let mut ranked: Vec<Ranked<P>> = places
        .into_iter()
        .filter(|place| seen.insert(dedupe_key(place)))
        .map(|place| {
            let distance_km = haversine_km(origin, place.coordinate());
            Ranked { place, distance_km }
        })
        .filter(|ranked| ranked.distance_km <= radius_km)
        .collect();

    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    debug!("{} places within {radius_km} km of {origin}", ranked.len());
    ranked
}

/// Enforces a minimum interval between outgoing requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time left before a request would be allowed at `now`.
    #[must_use]
    pub fn wait_time(&self, now: Instant) -> Duration {
        self.last_request.map_or(Duration::ZERO, |last| {
            self.min_interval
                .saturating_sub(now.saturating_duration_since(last))
        })
    }

    /// Record a request at `now`, or return how long to wait first.
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), Duration> {
        let wait = self.wait_time(now);
        if wait.is_zero() {
            self.last_request = Some(now);
            Ok(())
        } else {
            Err(wait)
        }
    }
}
