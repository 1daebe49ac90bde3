//! WKT / EWKB point codec for Fieldbook.
//!
//! Converts between the two geometry encodings the service speaks: the
//! human-readable Well-Known Text accepted from and returned to clients, and
//! the SRID-tagged Well-Known Binary blobs held in the store. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```
//! use fieldbook_geo::Point;
//!
//! let point = Point::parse_wkt("POINT(-0.127758 51.507351)").unwrap();
//! let blob  = point.to_ewkb();
//! let back  = Point::from_ewkb(&blob).unwrap();
//! assert_eq!(back.to_wkt(), "POINT(-0.127758 51.507351)");
//! ```

pub mod error;
mod parse;
mod wkb;

pub use error::{Error, Result};

/// SRID of the WGS 84 longitude/latitude reference system. Every geometry
/// this service stores is tagged with it, regardless of what the input text
/// declared.
pub const SRID_WGS84: u32 = 4326;

// ─── Public types ────────────────────────────────────────────────────────────

/// A single geographic point, longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub lon: f64,
  pub lat: f64,
}

// ─── Public API ──────────────────────────────────────────────────────────────

impl Point {
  /// Parse `POINT(lon lat)` text.
  ///
  /// The geometry keyword is case-insensitive and a leading EWKT
  /// `SRID=n;` prefix is tolerated (and discarded — storage always re-tags
  /// with [`SRID_WGS84`]). Anything other than a two-coordinate point is
  /// rejected.
  pub fn parse_wkt(input: &str) -> Result<Point> {
    parse::parse_point(input)
  }

  /// Render as `POINT(lon lat)` with shortest round-trip float formatting.
  pub fn to_wkt(&self) -> String {
    format!("POINT({} {})", self.lon, self.lat)
  }

  /// Encode as little-endian EWKB tagged with [`SRID_WGS84`].
  pub fn to_ewkb(&self) -> Vec<u8> {
    wkb::encode(self)
  }

  /// Decode an (E)WKB point blob.
  ///
  /// Accepts either byte order, with or without the SRID extension; rejects
  /// non-point geometry types and truncated buffers.
  pub fn from_ewkb(blob: &[u8]) -> Result<Point> {
    wkb::decode(blob)
  }
}

// ─── Round-trip tests ────────────────────────────────────────────────────────
