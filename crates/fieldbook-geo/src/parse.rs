//! Well-Known Text point parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ strip_srid_prefix()  → bare WKT
//!          └─ split keyword / coordinate body
//!               └─ parse_coordinates() → Point

use crate::{
  Point,
  error::{Error, Result},
};

/// Parse `POINT(lon lat)`, tolerating an EWKT `SRID=n;` prefix, leading and
/// trailing whitespace, and whitespace between the keyword and the
/// parenthesis.
pub(crate) fn parse_point(input: &str) -> Result<Point> {
  let trimmed = strip_srid_prefix(input.trim())?;

  let open = trimmed
    .find('(')
    .ok_or_else(|| Error::MalformedWkt(format!("missing '(': {input:?}")))?;

  let keyword = trimmed[..open].trim();
  if !keyword.eq_ignore_ascii_case("POINT") {
    return Err(Error::UnsupportedGeometry(keyword.to_string()));
  }

  let rest = &trimmed[open + 1..];
  let close = rest
    .find(')')
    .ok_or_else(|| Error::MalformedWkt(format!("missing ')': {input:?}")))?;
  if !rest[close + 1..].trim().is_empty() {
    return Err(Error::MalformedWkt(format!(
      "trailing content after ')': {input:?}"
    )));
  }

  parse_coordinates(&rest[..close])
}

/// Drop a leading `SRID=n;` (any numeric SRID parses; the declared value is
/// ignored because storage re-tags with SRID 4326 unconditionally).
fn strip_srid_prefix(s: &str) -> Result<&str> {
  let Some(rest) = s
    .strip_prefix("SRID=")
    .or_else(|| s.strip_prefix("srid="))
  else {
    return Ok(s);
  };
  let semi = rest
    .find(';')
    .ok_or_else(|| Error::MalformedWkt(format!("unterminated SRID prefix: {s:?}")))?;
  rest[..semi]
    .trim()
    .parse::<u32>()
    .map_err(|_| Error::MalformedWkt(format!("non-numeric SRID: {s:?}")))?;
  Ok(rest[semi + 1..].trim_start())
}

/// Parse exactly two whitespace-separated finite floats, longitude first.
fn parse_coordinates(body: &str) -> Result<Point> {
  let mut parts = body.split_whitespace();

  let lon = parse_coordinate(parts.next(), body)?;
  let lat = parse_coordinate(parts.next(), body)?;

  if parts.next().is_some() {
    // Three or more coordinates: POINT Z / POINT M, which the store does
    // not model.
    return Err(Error::UnsupportedGeometry(format!(
      "point with more than two coordinates: {body:?}"
    )));
  }

  Ok(Point { lon, lat })
}

fn parse_coordinate(part: Option<&str>, body: &str) -> Result<f64> {
  let raw = part
    .ok_or_else(|| Error::MalformedWkt(format!("expected two coordinates: {body:?}")))?;
  let value: f64 = raw
    .parse()
    .map_err(|_| Error::MalformedWkt(format!("non-numeric coordinate: {raw:?}")))?;
  if !value.is_finite() {
    return Err(Error::NonFiniteCoordinate(raw.to_string()));
  }
  Ok(value)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_basic_point() {
    let p = parse_point("POINT(-0.127758 51.507351)").unwrap();
    assert_eq!(p.lon, -0.127758);
    assert_eq!(p.lat, 51.507351);
  }

  #[test]
  fn keyword_is_case_insensitive() {
    assert!(parse_point("point(1 2)").is_ok());
    assert!(parse_point("Point (1 2)").is_ok());
  }

  #[test]
  fn tolerates_srid_prefix() {
    let p = parse_point("SRID=4326;POINT(36.8219 -1.2921)").unwrap();
    assert_eq!(p.lon, 36.8219);
    // A foreign SRID still parses; storage re-tags it anyway.
    assert!(parse_point("SRID=3857;POINT(1 2)").is_ok());
  }

  #[test]
  fn rejects_non_point_geometry() {
    let err = parse_point("LINESTRING(0 0, 1 1)").unwrap_err();
    assert!(matches!(err, Error::UnsupportedGeometry(_)));
  }

  #[test]
  fn rejects_plain_garbage() {
    assert!(matches!(
      parse_point("NOT A POINT"),
      Err(Error::MalformedWkt(_))
    ));
    assert!(matches!(parse_point(""), Err(Error::MalformedWkt(_))));
  }

  #[test]
  fn rejects_wrong_coordinate_arity() {
    assert!(parse_point("POINT(1)").is_err());
    assert!(parse_point("POINT(1 2 3)").is_err());
  }

  #[test]
  fn rejects_non_numeric_coordinates() {
    assert!(matches!(
      parse_point("POINT(lon lat)"),
      Err(Error::MalformedWkt(_))
    ));
  }

  #[test]
  fn rejects_non_finite_coordinates() {
    assert!(matches!(
      parse_point("POINT(NaN 2)"),
      Err(Error::NonFiniteCoordinate(_))
    ));
    assert!(matches!(
      parse_point("POINT(1 inf)"),
      Err(Error::NonFiniteCoordinate(_))
    ));
  }

  #[test]
  fn rejects_trailing_content() {
    assert!(parse_point("POINT(1 2) extra").is_err());
  }
}
