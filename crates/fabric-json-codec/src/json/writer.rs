//! Compact JSON text writer.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::codec::primitive;
use crate::error::{CodecError, Result};

#[derive(Debug, Default)]
struct Frame {
    has_members: bool,
    after_key: bool,
}

/// Writes compact JSON text, placing `,` and `:` separators itself.
///
/// ```
/// use fabric_json_codec::json::JsonWriter;
///
/// let mut w = JsonWriter::new();
/// w.begin_object();
/// w.property_name("Kind").unwrap();
/// w.write_str("NodeUp").unwrap();
/// w.property_name("Ids").unwrap();
/// w.begin_array();
/// w.write_i64(1);
/// w.write_i64(2);
/// w.end_array();
/// w.end_object();
/// assert_eq!(w.finish(), r#"{"Kind":"NodeUp","Ids":[1,2]}"#);
/// ```
#[derive(Debug, Default)]
pub struct JsonWriter {
    out: String,
    frames: Vec<Frame>,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            frames: Vec::new(),
        }
    }

    /// Returns the text written so far.
    pub fn finish(self) -> String {
        self.out
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    fn before_value(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.after_key {
                frame.after_key = false;
            } else {
                if frame.has_members {
                    self.out.push(',');
                }
                frame.has_members = true;
            }
        }
    }

    pub fn begin_object(&mut self) {
        self.before_value();
        self.out.push('{');
        self.frames.push(Frame::default());
    }

    pub fn end_object(&mut self) {
        self.frames.pop();
        self.out.push('}');
    }

    pub fn begin_array(&mut self) {
        self.before_value();
        self.out.push('[');
        self.frames.push(Frame::default());
    }

    pub fn end_array(&mut self) {
        self.frames.pop();
        self.out.push(']');
    }

    pub fn property_name(&mut self, name: &str) -> Result<()> {
        if let Some(frame) = self.frames.last_mut() {
            if frame.has_members {
                self.out.push(',');
            }
            frame.has_members = true;
            frame.after_key = true;
        }
        self.push_escaped(name)?;
        self.out.push(':');
        Ok(())
    }

    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.before_value();
        self.push_escaped(value)
    }

    pub fn write_bool(&mut self, value: bool) {
        self.before_value();
        self.out.push_str(if value { "true" } else { "false" });
    }

    pub fn write_null(&mut self) {
        self.before_value();
        self.out.push_str("null");
    }

    pub fn write_i32(&mut self, value: i32) {
        self.before_value();
        self.out.push_str(&value.to_string());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.before_value();
        self.out.push_str(&value.to_string());
    }

    /// Writes a double. Non-finite values have no JSON representation.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        let number = serde_json::Number::from_f64(value).ok_or(CodecError::MalformedValue {
            path: String::new(),
            expected: "finite number",
            found: value.to_string(),
        })?;
        self.before_value();
        self.out.push_str(&number.to_string());
        Ok(())
    }

    pub fn write_guid(&mut self, value: &Uuid) -> Result<()> {
        self.write_str(&primitive::format_guid(value))
    }

    pub fn write_datetime(&mut self, value: &DateTime<Utc>) -> Result<()> {
        self.write_str(&primitive::format_datetime(value))
    }

    pub fn write_timespan(&mut self, value: &TimeDelta) -> Result<()> {
        self.write_str(&primitive::format_timespan(value))
    }

    /// Writes an arbitrary JSON subtree.
    pub fn write_json(&mut self, value: &serde_json::Value) -> Result<()> {
        self.before_value();
        self.out.push_str(&serde_json::to_string(value)?);
        Ok(())
    }

    fn push_escaped(&mut self, s: &str) -> Result<()> {
        self.out.push_str(&serde_json::to_string(s)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn separators_in_nested_containers() {
        let mut w = JsonWriter::new();
        w.begin_array();
        w.begin_object();
        w.property_name("a").unwrap();
        w.begin_array();
        w.end_array();
        w.property_name("b").unwrap();
        w.begin_object();
        w.end_object();
        w.end_object();
        w.write_null();
        w.write_bool(false);
        w.end_array();
        assert_eq!(w.finish(), r#"[{"a":[],"b":{}},null,false]"#);
    }

    #[test]
    fn escapes_names_and_strings() {
        let mut w = JsonWriter::new();
        w.begin_object();
        w.property_name("quo\"te").unwrap();
        w.write_str("line\nbreak").unwrap();
        w.end_object();
        assert_eq!(w.finish(), r#"{"quo\"te":"line\nbreak"}"#);
    }

    #[test]
    fn doubles() {
        let mut w = JsonWriter::new();
        w.begin_array();
        w.write_f64(1.0).unwrap();
        w.write_f64(-0.25).unwrap();
        assert!(w.write_f64(f64::NAN).is_err());
        assert!(w.write_f64(f64::INFINITY).is_err());
        w.end_array();
        assert_eq!(w.finish(), "[1.0,-0.25]");
    }

    #[test]
    fn raw_json_subtree() {
        let mut w = JsonWriter::new();
        w.begin_object();
        w.property_name("Any").unwrap();
        w.write_json(&json!({"x": [1, "y"]})).unwrap();
        w.end_object();
        assert_eq!(w.finish(), r#"{"Any":{"x":[1,"y"]}}"#);
    }
}
