//! Container codecs: lists, pair-list maps, object maps and byte arrays.

use indexmap::IndexMap;

use super::decode::Decoder;
use super::encode::{Encoder, PathNode};
use crate::error::{CodecError, Result};
use crate::json::{JsonReader, JsonWriter};
use crate::options::DuplicateKeyPolicy;
use crate::schema::FieldType;
use crate::value::Value;

const PAIR_KEY: &str = "Key";
const PAIR_VALUE: &str = "Value";

impl Decoder<'_> {
    /// JSON array; `null` elements are skipped.
    pub(super) fn decode_list(
        &self,
        reader: &mut JsonReader<'_>,
        item: &FieldType,
        depth: usize,
    ) -> Result<Value> {
        self.check_depth(reader, depth)?;
        reader.enter_array()?;
        let mut items = Vec::new();
        while !reader.end_of_array()? {
            if let Some(value) = self.decode_value(reader, item, depth)? {
                items.push(value);
            }
        }
        Ok(Value::List(items))
    }

    /// `[{"Key": k, "Value": v}, ...]`, in wire order.
    pub(super) fn decode_pairs(
        &self,
        reader: &mut JsonReader<'_>,
        value_type: &FieldType,
        depth: usize,
    ) -> Result<Value> {
        self.check_depth(reader, depth)?;
        reader.enter_array()?;
        let mut map = IndexMap::new();
        while !reader.end_of_array()? {
            if reader.try_read_null()? {
                continue;
            }
            self.check_depth(reader, depth + 1)?;
            reader.enter_object()?;
            let mut key: Option<String> = None;
            let mut value: Option<Value> = None;
            while let Some(name) = reader.next_property()? {
                match &*name {
                    PAIR_KEY => {
                        key = if reader.try_read_null()? {
                            None
                        } else {
                            Some(reader.read_string()?.into_owned())
                        };
                    }
                    PAIR_VALUE => value = self.decode_value(reader, value_type, depth + 1)?,
                    _ => {
                        tracing::trace!(property = %name, "skipping unknown pair property");
                        reader.skip_value()?;
                    }
                }
            }
            let Some(key) = key else {
                return Err(reader.value_error("pair with a `Key`", "pair without `Key`"));
            };
            let Some(value) = value else {
                return Err(reader.value_error("pair with a `Value`", format!("no value for key {key:?}")));
            };
            if map.contains_key(&key) && self.options.duplicate_keys == DuplicateKeyPolicy::Reject {
                return Err(CodecError::DuplicateKey {
                    key,
                    path: reader.path(),
                });
            }
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    /// JSON object keyed by string. Repeated keys keep the last value.
    pub(super) fn decode_map(
        &self,
        reader: &mut JsonReader<'_>,
        value_type: &FieldType,
        depth: usize,
    ) -> Result<Value> {
        self.check_depth(reader, depth)?;
        reader.enter_object()?;
        let mut map = IndexMap::new();
        while let Some(key) = reader.next_property()? {
            if let Some(value) = self.decode_value(reader, value_type, depth)? {
                map.insert(key.into_owned(), value);
            }
        }
        Ok(Value::Map(map))
    }

    /// Array of integers in `0..=255`.
    pub(super) fn decode_bytes(&self, reader: &mut JsonReader<'_>, depth: usize) -> Result<Value> {
        self.check_depth(reader, depth)?;
        reader.enter_array()?;
        let mut bytes = Vec::new();
        while !reader.end_of_array()? {
            let n = reader.read_i32()?;
            let byte = u8::try_from(n).map_err(|_| reader.value_error("byte", format!("number {n}")))?;
            bytes.push(byte);
        }
        Ok(Value::Bytes(bytes))
    }
}

impl Encoder<'_> {
    pub(super) fn encode_list(
        &self,
        writer: &mut JsonWriter,
        item: &FieldType,
        items: &[Value],
        path: &PathNode<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(path, depth)?;
        writer.begin_array();
        for (index, value) in items.iter().enumerate() {
            self.encode_value(writer, item, value, &PathNode::Index(path, index), depth)?;
        }
        writer.end_array();
        Ok(())
    }

    pub(super) fn encode_pairs(
        &self,
        writer: &mut JsonWriter,
        value_type: &FieldType,
        map: &IndexMap<String, Value>,
        path: &PathNode<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(path, depth)?;
        writer.begin_array();
        for (index, (key, value)) in map.iter().enumerate() {
            let element = PathNode::Index(path, index);
            self.check_depth(&element, depth + 1)?;
            writer.begin_object();
            writer.property_name(PAIR_KEY)?;
            writer.write_str(key)?;
            writer.property_name(PAIR_VALUE)?;
            self.encode_value(
                writer,
                value_type,
                value,
                &PathNode::Key(&element, PAIR_VALUE),
                depth + 1,
            )?;
            writer.end_object();
        }
        writer.end_array();
        Ok(())
    }

    pub(super) fn encode_map(
        &self,
        writer: &mut JsonWriter,
        value_type: &FieldType,
        map: &IndexMap<String, Value>,
        path: &PathNode<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(path, depth)?;
        writer.begin_object();
        for (key, value) in map {
            writer.property_name(key)?;
            self.encode_value(writer, value_type, value, &PathNode::Key(path, key), depth)?;
        }
        writer.end_object();
        Ok(())
    }

    pub(super) fn encode_bytes(
        &self,
        writer: &mut JsonWriter,
        bytes: &[u8],
        path: &PathNode<'_>,
        depth: usize,
    ) -> Result<()> {
        self.check_depth(path, depth)?;
        writer.begin_array();
        for byte in bytes {
            writer.write_i32(i32::from(*byte));
        }
        writer.end_array();
        Ok(())
    }
}
