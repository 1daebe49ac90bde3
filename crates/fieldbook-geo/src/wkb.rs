//! Extended Well-Known Binary encode/decode.
//!
//! Layout (what PostGIS emits and what the store holds):
//!
//! ```text
//! [0]      byte order   0x00 big-endian, 0x01 little-endian
//! [1..5]   u32 geometry type, OR'd with 0x20000000 when an SRID follows
//! [5..9]   u32 SRID                      (only when the flag is set)
//! [..+8]   f64 longitude
//! [..+8]   f64 latitude
//! ```

use crate::{
  Point, SRID_WGS84,
  error::{Error, Result},
};

const WKB_POINT: u32 = 1;
const SRID_FLAG: u32 = 0x2000_0000;

/// Encode `point` as little-endian EWKB, always tagged SRID 4326.
pub(crate) fn encode(point: &Point) -> Vec<u8> {
  let mut out = Vec::with_capacity(25);
  out.push(0x01);
  out.extend_from_slice(&(WKB_POINT | SRID_FLAG).to_le_bytes());
  out.extend_from_slice(&SRID_WGS84.to_le_bytes());
  out.extend_from_slice(&point.lon.to_le_bytes());
  out.extend_from_slice(&point.lat.to_le_bytes());
  out
}

/// Decode a point from (E)WKB, either byte order, SRID extension optional.
pub(crate) fn decode(blob: &[u8]) -> Result<Point> {
  let mut cursor = Cursor::new(blob)?;

  let type_code = cursor.read_u32()?;
  if type_code & !SRID_FLAG != WKB_POINT {
    // Covers non-point geometries and Z/M dimension flags alike.
    return Err(Error::UnsupportedWkbType(type_code));
  }
  if type_code & SRID_FLAG != 0 {
    // The declared SRID is not checked; the writer only ever tags 4326 and
    // foreign blobs are decoded on a best-effort basis.
    cursor.read_u32()?;
  }

  let lon = cursor.read_f64()?;
  let lat = cursor.read_f64()?;
  Ok(Point { lon, lat })
}

// ─── Byte cursor ─────────────────────────────────────────────────────────────

struct Cursor<'a> {
  buf:    &'a [u8],
  pos:    usize,
  little: bool,
}

impl<'a> Cursor<'a> {
  fn new(buf: &'a [u8]) -> Result<Self> {
    let marker = *buf.first().ok_or(Error::TruncatedWkb { expected: 1, got: 0 })?;
    let little = match marker {
      0x00 => false,
      0x01 => true,
      other => return Err(Error::InvalidByteOrder(other)),
    };
    Ok(Cursor { buf, pos: 1, little })
  }

  fn take(&mut self, n: usize) -> Result<&'a [u8]> {
    let end = self.pos + n;
    if end > self.buf.len() {
      return Err(Error::TruncatedWkb { expected: end, got: self.buf.len() });
    }
    let slice = &self.buf[self.pos..end];
    self.pos = end;
    Ok(slice)
  }

  fn read_u32(&mut self) -> Result<u32> {
    let bytes: [u8; 4] = self.take(4)?.try_into().expect("length checked");
    Ok(if self.little {
      u32::from_le_bytes(bytes)
    } else {
      u32::from_be_bytes(bytes)
    })
  }

  fn read_f64(&mut self) -> Result<f64> {
    let bytes: [u8; 8] = self.take(8)?.try_into().expect("length checked");
    Ok(if self.little {
      f64::from_le_bytes(bytes)
    } else {
      f64::from_be_bytes(bytes)
    })
  }
}
