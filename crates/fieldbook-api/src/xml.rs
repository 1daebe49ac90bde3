//! XML request parsing and response generation.
//!
//! Uses `quick-xml`'s writer API for generation and a hand-written event-loop
//! parser for reading `POST /submissions/xml/` request bodies.
//!
//! Response shape: a `submission` root (or a `submissions` root wrapping one
//! `submission` element per row). Attribute mappings become nested elements,
//! sequences become repeated `item` elements, scalars are stringified.

use std::io::Cursor;

use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};
use serde_json::{Map, Value};

use crate::{error::ApiError, submissions::SubmissionResponse};

// ─── Request parsing ─────────────────────────────────────────────────────────

/// The three required elements of an XML ingestion body.
#[derive(Debug)]
pub struct XmlSubmission {
  pub odk_id:      String,
  /// Flat mapping of `<data>` child-element name to its text content.
  pub data:        Map<String, Value>,
  /// Geolocation exactly as submitted; the XML path echoes this text back
  /// rather than re-transcoding the stored blob.
  pub geolocation: String,
}

/// Parse a `<submission>` request body.
///
/// The root element name is not checked (legacy clients vary); what matters
/// is the presence of `<odk_id>`, `<data>` and `<geolocation>` children.
pub fn parse_submission(xml: &str) -> Result<XmlSubmission, ApiError> {
  let mut reader = quick_xml::Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut odk_id: Option<String> = None;
  let mut geolocation: Option<String> = None;
  let mut data: Option<Map<String, Value>> = None;

  let mut depth = 0usize;
  let mut in_data = false;
  let mut current: Option<String> = None;

  loop {
    match reader.read_event() {
      Ok(Event::Start(ref e)) => {
        depth += 1;
        let name = local_name_str(e.name().as_ref());
        match depth {
          2 if name == "data" => {
            in_data = true;
            data.get_or_insert_with(Map::new);
          }
          2 => current = Some(name),
          3 if in_data => {
            // A childless element still yields a key, mapped to null; a
            // following text event overwrites it.
            if let Some(map) = data.as_mut() {
              map.insert(name.clone(), Value::Null);
            }
            current = Some(name);
          }
          _ => {}
        }
      }
      Ok(Event::Empty(ref e)) => {
        let name = local_name_str(e.name().as_ref());
        if in_data && depth == 2 {
          // A self-closing child of <data> carries no text.
          if let Some(map) = data.as_mut() {
            map.insert(name, Value::Null);
          }
        } else if depth == 1 && name == "data" {
          data.get_or_insert_with(Map::new);
        }
      }
      Ok(Event::Text(ref t)) => {
        let text = t
          .unescape()
          .map_err(|e| ApiError::BadRequest(format!("invalid XML body: {e}")))?
          .into_owned();
        if let Some(name) = current.as_deref() {
          if in_data && depth == 3 {
            if let Some(map) = data.as_mut() {
              map.insert(name.to_string(), Value::String(text));
            }
          } else if depth == 2 {
            match name {
              "odk_id" => odk_id = Some(text),
              "geolocation" => geolocation = Some(text),
              _ => {}
            }
          }
        }
      }
      Ok(Event::End(_)) => {
        if in_data && depth == 2 {
          in_data = false;
        }
        current = None;
        depth = depth.saturating_sub(1);
      }
      Ok(Event::Eof) => break,
      Err(e) => {
        return Err(ApiError::BadRequest(format!("invalid XML body: {e}")));
      }
      _ => {}
    }
  }

  let odk_id = odk_id
    .ok_or_else(|| ApiError::BadRequest("missing odk_id element".to_string()))?;
  let data = data
    .ok_or_else(|| ApiError::BadRequest("missing data element".to_string()))?;
  let geolocation = geolocation.ok_or_else(|| {
    ApiError::BadRequest("missing geolocation element".to_string())
  })?;

  Ok(XmlSubmission { odk_id, data, geolocation })
}

fn local_name_str(name: &[u8]) -> String {
  // strip "prefix:" if present
  let local = if let Some(pos) = name.iter().rposition(|&b| b == b':') {
    &name[pos + 1..]
  } else {
    name
  };
  String::from_utf8_lossy(local).into_owned()
}

// ─── Response generation ─────────────────────────────────────────────────────

/// Render one submission under a `submission` root.
pub fn submission_to_xml(resp: &SubmissionResponse) -> String {
  let mut w = Writer::new(Cursor::new(Vec::new()));
  write_start(&mut w, "submission");
  write_submission_fields(&mut w, resp);
  write_end(&mut w, "submission");
  into_string(w)
}

/// Render a collection under a `submissions` root, one `submission` child per
/// row, in input order.
pub fn submissions_to_xml(rows: &[SubmissionResponse]) -> String {
  let mut w = Writer::new(Cursor::new(Vec::new()));
  write_start(&mut w, "submissions");
  for resp in rows {
    write_start(&mut w, "submission");
    write_submission_fields(&mut w, resp);
    write_end(&mut w, "submission");
  }
  write_end(&mut w, "submissions");
  into_string(w)
}

fn write_submission_fields(
  w: &mut Writer<Cursor<Vec<u8>>>,
  resp: &SubmissionResponse,
) {
  write_text_elem(w, "id", &resp.id.to_string());
  write_text_elem(w, "odk_id", &resp.odk_id);

  write_start(w, "data");
  write_value(w, &resp.data);
  write_end(w, "data");

  match &resp.geolocation {
    Some(wkt) => write_text_elem(w, "geolocation", wkt),
    None => write_empty(w, "geolocation"),
  }

  write_text_elem(w, "received_at", &resp.received_at.to_rfc3339());
}

/// Recursive rendering over the closed set of JSON value shapes.
fn write_value(w: &mut Writer<Cursor<Vec<u8>>>, value: &Value) {
  match value {
    Value::Object(map) => {
      for (key, child) in map {
        write_start(w, key);
        write_value(w, child);
        write_end(w, key);
      }
    }
    Value::Array(items) => {
      for item in items {
        write_start(w, "item");
        write_value(w, item);
        write_end(w, "item");
      }
    }
    Value::Null => {}
    Value::String(s) => write_text(w, s),
    other => write_text(w, &other.to_string()),
  }
}

// ─── XML writer helpers ──────────────────────────────────────────────────────

fn write_start(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) {
  w.write_event(Event::Start(BytesStart::new(tag))).unwrap();
}

fn write_end(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) {
  w.write_event(Event::End(BytesEnd::new(tag))).unwrap();
}

fn write_text(w: &mut Writer<Cursor<Vec<u8>>>, text: &str) {
  w.write_event(Event::Text(BytesText::new(text))).unwrap();
}

fn write_text_elem(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) {
  write_start(w, tag);
  write_text(w, text);
  write_end(w, tag);
}

fn write_empty(w: &mut Writer<Cursor<Vec<u8>>>, tag: &str) {
  w.write_event(Event::Empty(BytesStart::new(tag))).unwrap();
}

fn into_string(w: Writer<Cursor<Vec<u8>>>) -> String {
  // The writer only ever sees UTF-8 text we produced ourselves.
  String::from_utf8(w.into_inner().into_inner()).unwrap()
}
