//! Tag-prefixed binary codec.
//!
//! Every value starts with a one-byte tag. Small integers get dedicated tags,
//! larger ones fall back to zigzag LEB128, and integer arrays are stored with
//! the narrowest element width that holds their min and max. Multi-byte
//! fixed-width fields are big-endian.
//!
//! Decoding never touches live state until the whole input has been read and
//! validated.

use std::sync::Arc;

use attrstore_types::{ColumnOrigin, ElementClass, Estimator, TypeTag, Value, ValueType};
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::column::{Column, ColumnStore, DenseIndex, MAX_COLUMNS, StoreImage};
use crate::element::{Element, ElementImage, SlotData};
use crate::error::{AttrError, Result};
use crate::timestamp::{CompactIndex, TimestampMap, TimestampValues};

pub mod tag {
    pub const NULL: u8 = 0;
    pub const TRUE: u8 = 1;
    pub const FALSE: u8 = 2;
    pub const INT_M1: u8 = 3;
    /// `INT_0 + n` for `n` in `0..=8`.
    pub const INT_0: u8 = 4;
    pub const INT_8: u8 = 12;
    pub const INT_255: u8 = 13;
    pub const INT_PACKED: u8 = 14;
    pub const LONG_PACKED: u8 = 15;
    pub const BYTE: u8 = 16;
    pub const SHORT: u8 = 17;
    pub const CHAR: u8 = 18;
    pub const FLOAT: u8 = 19;
    pub const DOUBLE: u8 = 20;
    pub const STRING: u8 = 21;
    pub const STRING_EMPTY: u8 = 22;

    pub const INT_ARRAY_I8: u8 = 30;
    pub const INT_ARRAY_I16: u8 = 31;
    pub const INT_ARRAY_I32: u8 = 32;
    pub const LONG_ARRAY_I8: u8 = 33;
    pub const LONG_ARRAY_I16: u8 = 34;
    pub const LONG_ARRAY_I32: u8 = 35;
    pub const LONG_ARRAY_I64: u8 = 36;
    pub const BOOL_ARRAY: u8 = 37;
    pub const BYTE_ARRAY: u8 = 38;
    pub const SHORT_ARRAY: u8 = 39;
    pub const CHAR_ARRAY: u8 = 40;
    pub const FLOAT_ARRAY: u8 = 41;
    pub const DOUBLE_ARRAY: u8 = 42;
    pub const STRING_ARRAY: u8 = 43;

    pub const COLUMN: u8 = 50;
    pub const TIMESTAMP_MAP: u8 = 51;
    pub const VALUE_SET: u8 = 52;
    pub const COLUMN_STORE: u8 = 53;
    pub const ELEMENT: u8 = 54;
}

fn is_known_tag(t: u8) -> bool {
    matches!(t, 0..=22 | 30..=43 | 50..=54)
}

fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn unzigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Appends tagged values to a growable buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    fn put_varint(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.buf.put_u8((v as u8) | 0x80);
            v >>= 7;
        }
        self.buf.put_u8(v as u8);
    }

    fn put_len(&mut self, len: usize) {
        self.put_varint(len as u64);
    }

    pub fn write_null(&mut self) {
        self.buf.put_u8(tag::NULL);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.put_u8(if v { tag::TRUE } else { tag::FALSE });
    }

    pub fn write_int(&mut self, v: i32) {
        match v {
            -1 => self.buf.put_u8(tag::INT_M1),
            0..=8 => self.buf.put_u8(tag::INT_0 + v as u8),
            255 => self.buf.put_u8(tag::INT_255),
            _ => {
                self.buf.put_u8(tag::INT_PACKED);
                self.put_varint(zigzag(v as i64));
            }
        }
    }

    pub fn write_long(&mut self, v: i64) {
        self.buf.put_u8(tag::LONG_PACKED);
        self.put_varint(zigzag(v));
    }

    pub fn write_byte(&mut self, v: i8) {
        self.buf.put_u8(tag::BYTE);
        self.buf.put_i8(v);
    }

    pub fn write_short(&mut self, v: i16) {
        self.buf.put_u8(tag::SHORT);
        self.buf.put_i16(v);
    }

    pub fn write_char(&mut self, v: char) {
        self.buf.put_u8(tag::CHAR);
        self.buf.put_u32(v as u32);
    }

    pub fn write_float(&mut self, v: f32) {
        self.buf.put_u8(tag::FLOAT);
        self.buf.put_f32(v);
    }

    pub fn write_double(&mut self, v: f64) {
        self.buf.put_u8(tag::DOUBLE);
        self.buf.put_f64(v);
    }

    pub fn write_string(&mut self, v: &str) {
        if v.is_empty() {
            self.buf.put_u8(tag::STRING_EMPTY);
            return;
        }
        self.buf.put_u8(tag::STRING);
        self.put_len(v.len());
        self.buf.put_slice(v.as_bytes());
    }

    pub fn write_value(&mut self, value: &Value) {
        match value {
            Value::Bool(v) => self.write_bool(*v),
            Value::Byte(v) => self.write_byte(*v),
            Value::Char(v) => self.write_char(*v),
            Value::Short(v) => self.write_short(*v),
            Value::Int(v) => self.write_int(*v),
            Value::Long(v) => self.write_long(*v),
            Value::Float(v) => self.write_float(*v),
            Value::Double(v) => self.write_double(*v),
            Value::String(v) => self.write_string(v),
        }
    }

    pub fn write_optional_value(&mut self, value: Option<&Value>) {
        match value {
            Some(value) => self.write_value(value),
            None => self.write_null(),
        }
    }

    /// Writes with the narrowest element width holding every value.
    pub fn write_int_array(&mut self, values: &[i32]) {
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        if min >= i8::MIN as i32 && max <= i8::MAX as i32 {
            self.buf.put_u8(tag::INT_ARRAY_I8);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i8(*v as i8));
        } else if min >= i16::MIN as i32 && max <= i16::MAX as i32 {
            self.buf.put_u8(tag::INT_ARRAY_I16);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i16(*v as i16));
        } else {
            self.buf.put_u8(tag::INT_ARRAY_I32);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i32(*v));
        }
    }

    pub fn write_long_array(&mut self, values: &[i64]) {
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);
        let fits = |lo: i64, hi: i64| min >= lo && max <= hi;
        if fits(i8::MIN as i64, i8::MAX as i64) {
            self.buf.put_u8(tag::LONG_ARRAY_I8);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i8(*v as i8));
        } else if fits(i16::MIN as i64, i16::MAX as i64) {
            self.buf.put_u8(tag::LONG_ARRAY_I16);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i16(*v as i16));
        } else if fits(i32::MIN as i64, i32::MAX as i64) {
            self.buf.put_u8(tag::LONG_ARRAY_I32);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i32(*v as i32));
        } else {
            self.buf.put_u8(tag::LONG_ARRAY_I64);
            self.put_len(values.len());
            values.iter().for_each(|v| self.buf.put_i64(*v));
        }
    }

    /// Bools are packed eight to a byte, lowest bit first.
    pub fn write_bool_array(&mut self, values: &[bool]) {
        self.buf.put_u8(tag::BOOL_ARRAY);
        self.put_len(values.len());
        for chunk in values.chunks(8) {
            let byte = chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, b)| acc | ((*b as u8) << i));
            self.buf.put_u8(byte);
        }
    }

    pub fn write_double_array(&mut self, values: &[f64]) {
        self.buf.put_u8(tag::DOUBLE_ARRAY);
        self.put_len(values.len());
        values.iter().for_each(|v| self.buf.put_f64(*v));
    }

    fn write_compact_indices(&mut self, indices: &[CompactIndex]) {
        let ints: Vec<i32> = indices.iter().map(|i| *i as i32).collect();
        self.write_int_array(&ints);
    }

    /// Writes `values`, all of kind `value_type`, as one typed array.
    pub fn write_value_array(&mut self, value_type: ValueType, values: &[Value]) -> Result<()> {
        fn collect<T>(
            value_type: ValueType,
            values: &[Value],
            pick: impl Fn(&Value) -> Option<T>,
        ) -> Result<Vec<T>> {
            values
                .iter()
                .map(|v| {
                    pick(v).ok_or_else(|| {
                        AttrError::InvalidFormat(format!(
                            "expected {} array element, found {}",
                            value_type,
                            v.value_type()
                        ))
                    })
                })
                .collect()
        }

        match value_type {
            ValueType::Bool => {
                let items = collect(value_type, values, Value::as_bool)?;
                self.write_bool_array(&items);
            }
            ValueType::Byte => {
                let items = collect(value_type, values, |v| match v {
                    Value::Byte(b) => Some(*b),
                    _ => None,
                })?;
                self.buf.put_u8(tag::BYTE_ARRAY);
                self.put_len(items.len());
                items.iter().for_each(|v| self.buf.put_i8(*v));
            }
            ValueType::Short => {
                let items = collect(value_type, values, |v| match v {
                    Value::Short(s) => Some(*s),
                    _ => None,
                })?;
                self.buf.put_u8(tag::SHORT_ARRAY);
                self.put_len(items.len());
                items.iter().for_each(|v| self.buf.put_i16(*v));
            }
            ValueType::Char => {
                let items = collect(value_type, values, |v| match v {
                    Value::Char(c) => Some(*c),
                    _ => None,
                })?;
                self.buf.put_u8(tag::CHAR_ARRAY);
                self.put_len(items.len());
                items.iter().for_each(|v| self.buf.put_u32(*v as u32));
            }
            ValueType::Int => {
                let items = collect(value_type, values, |v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })?;
                self.write_int_array(&items);
            }
            ValueType::Long => {
                let items = collect(value_type, values, |v| match v {
                    Value::Long(l) => Some(*l),
                    _ => None,
                })?;
                self.write_long_array(&items);
            }
            ValueType::Float => {
                let items = collect(value_type, values, |v| match v {
                    Value::Float(f) => Some(*f),
                    _ => None,
                })?;
                self.buf.put_u8(tag::FLOAT_ARRAY);
                self.put_len(items.len());
                items.iter().for_each(|v| self.buf.put_f32(*v));
            }
            ValueType::Double => {
                let items = collect(value_type, values, |v| match v {
                    Value::Double(d) => Some(*d),
                    _ => None,
                })?;
                self.write_double_array(&items);
            }
            ValueType::String => {
                let items = collect(value_type, values, |v| v.as_str().map(str::to_string))?;
                self.buf.put_u8(tag::STRING_ARRAY);
                self.put_len(items.len());
                for item in &items {
                    self.put_len(item.len());
                    self.buf.put_slice(item.as_bytes());
                }
            }
        }
        Ok(())
    }

    /// `(id, title, origin, dense_index, type, default, indexed, read_only, estimator)`.
    pub fn write_column(&mut self, column: &Column) {
        self.buf.put_u8(tag::COLUMN);
        self.write_string(column.id());
        self.write_string(column.title());
        self.write_int(column.origin().code() as i32);
        self.write_int(column.dense_index().map_or(-1, |i| i as i32));
        self.write_int(column.type_tag().code() as i32);
        self.write_optional_value(column.default_value());
        self.write_bool(column.is_indexed());
        self.write_bool(column.is_read_only());
        self.write_int(column.estimator().map_or(-1, |e| e.code() as i32));
    }

    /// `(length, sorted timestamps, parallel indices, garbage)`.
    pub fn write_timestamp_map(&mut self, map: &TimestampMap) {
        self.buf.put_u8(tag::TIMESTAMP_MAP);
        let (timestamps, indices): (Vec<f64>, Vec<CompactIndex>) = map.iter().unzip();
        let garbage: Vec<CompactIndex> = map.garbage().collect();
        self.write_int(map.length() as i32);
        self.write_double_array(&timestamps);
        self.write_compact_indices(&indices);
        self.write_compact_indices(&garbage);
    }

    /// `(value type, size, index array, value array)`.
    pub fn write_value_set(&mut self, set: &TimestampValues) -> Result<()> {
        self.buf.put_u8(tag::VALUE_SET);
        self.write_int(set.value_type().code() as i32);
        self.write_int(set.len() as i32);
        self.write_compact_indices(set.indices());
        self.write_value_array(set.value_type(), &set.values())
    }

    /// User columns, garbage and timestamp maps. Built-in columns are implied.
    pub fn write_store(&mut self, store: &ColumnStore) {
        let image = store.export();
        self.buf.put_u8(tag::COLUMN_STORE);
        self.write_int(image.class.code() as i32);
        self.write_int(image.slot_count as i32);
        self.write_int(image.columns.len() as i32);
        for (_, column) in &image.columns {
            self.write_column(column);
        }
        let garbage: Vec<i32> = image.garbage.iter().map(|i| *i as i32).collect();
        self.write_int_array(&garbage);
        self.write_int(image.timestamp_maps.len() as i32);
        for (index, map) in &image.timestamp_maps {
            self.write_int(*index as i32);
            self.write_timestamp_map(map);
        }
    }

    /// Attribute slots followed by the element timestamp set.
    pub fn write_element(&mut self, element: &Element) -> Result<()> {
        let image = element.export();
        self.buf.put_u8(tag::ELEMENT);
        self.write_int(image.slots.len() as i32);
        for slot in &image.slots {
            match slot {
                None => self.write_null(),
                Some(SlotData::Scalar(value)) => self.write_value(value),
                Some(SlotData::Series(series)) => self.write_value_set(series)?,
            }
        }
        self.write_double_array(&image.timestamps);
        Ok(())
    }
}

/// Reads tagged values back out of a buffer.
#[derive(Debug)]
pub struct Decoder {
    buf: Bytes,
}

impl Decoder {
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            Err(AttrError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn peek_tag(&self) -> Result<u8> {
        self.buf.first().copied().ok_or(AttrError::UnexpectedEof)
    }

    fn tag(&mut self) -> Result<u8> {
        let t = self.u8()?;
        if is_known_tag(t) {
            Ok(t)
        } else {
            Err(AttrError::UnknownTypeTag(t))
        }
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        let t = self.tag()?;
        if t == expected {
            Ok(())
        } else {
            Err(unexpected(expected, t))
        }
    }

    fn varint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = self.u8()?;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(AttrError::InvalidFormat("varint is too long".into()))
    }

    /// Reads an array length, refusing lengths the input cannot hold.
    fn len(&mut self, element_size: usize) -> Result<usize> {
        let len = usize::try_from(self.varint()?)
            .map_err(|_| AttrError::InvalidFormat("length overflows".into()))?;
        self.need(len.saturating_mul(element_size))?;
        Ok(len)
    }

    fn utf8(&mut self) -> Result<String> {
        let len = self.len(1)?;
        let raw = self.buf.split_to(len);
        String::from_utf8(raw.to_vec())
            .map_err(|_| AttrError::InvalidFormat("string is not valid UTF-8".into()))
    }

    fn char_from(raw: u32) -> Result<char> {
        char::from_u32(raw)
            .ok_or_else(|| AttrError::InvalidFormat(format!("invalid char code {:#x}", raw)))
    }

    /// Reads any scalar; `NULL` reads as `None`.
    pub fn read_value(&mut self) -> Result<Option<Value>> {
        let t = self.tag()?;
        self.value_after(t)
    }

    fn value_after(&mut self, t: u8) -> Result<Option<Value>> {
        Ok(Some(match t {
            tag::NULL => return Ok(None),
            tag::TRUE => Value::Bool(true),
            tag::FALSE => Value::Bool(false),
            tag::INT_M1 => Value::Int(-1),
            tag::INT_0..=tag::INT_8 => Value::Int((t - tag::INT_0) as i32),
            tag::INT_255 => Value::Int(255),
            tag::INT_PACKED => {
                let v = unzigzag(self.varint()?);
                Value::Int(
                    i32::try_from(v)
                        .map_err(|_| AttrError::InvalidFormat(format!("{} overflows int", v)))?,
                )
            }
            tag::LONG_PACKED => Value::Long(unzigzag(self.varint()?)),
            tag::BYTE => {
                self.need(1)?;
                Value::Byte(self.buf.get_i8())
            }
            tag::SHORT => {
                self.need(2)?;
                Value::Short(self.buf.get_i16())
            }
            tag::CHAR => {
                self.need(4)?;
                Value::Char(Self::char_from(self.buf.get_u32())?)
            }
            tag::FLOAT => {
                self.need(4)?;
                Value::Float(self.buf.get_f32())
            }
            tag::DOUBLE => {
                self.need(8)?;
                Value::Double(self.buf.get_f64())
            }
            tag::STRING => Value::String(self.utf8()?),
            tag::STRING_EMPTY => Value::String(String::new()),
            other => {
                return Err(AttrError::InvalidFormat(format!(
                    "tag {} is not a scalar",
                    other
                )));
            }
        }))
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.tag()? {
            tag::TRUE => Ok(true),
            tag::FALSE => Ok(false),
            t => Err(unexpected(tag::TRUE, t)),
        }
    }

    pub fn read_int(&mut self) -> Result<i32> {
        let t = self.tag()?;
        match self.value_after(t)? {
            Some(Value::Int(v)) => Ok(v),
            _ => Err(unexpected(tag::INT_PACKED, t)),
        }
    }

    pub fn read_long(&mut self) -> Result<i64> {
        let t = self.tag()?;
        match self.value_after(t)? {
            Some(Value::Long(v)) => Ok(v),
            Some(Value::Int(v)) => Ok(v as i64),
            _ => Err(unexpected(tag::LONG_PACKED, t)),
        }
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.expect(tag::DOUBLE)?;
        self.need(8)?;
        Ok(self.buf.get_f64())
    }

    pub fn read_string(&mut self) -> Result<String> {
        match self.tag()? {
            tag::STRING => self.utf8(),
            tag::STRING_EMPTY => Ok(String::new()),
            t => Err(unexpected(tag::STRING, t)),
        }
    }

    fn read_count(&mut self, what: &str) -> Result<usize> {
        let n = self.read_int()?;
        usize::try_from(n).map_err(|_| AttrError::InvalidFormat(format!("negative {} {}", what, n)))
    }

    pub fn read_int_array(&mut self) -> Result<Vec<i32>> {
        let t = self.tag()?;
        let width = match t {
            tag::INT_ARRAY_I8 => 1,
            tag::INT_ARRAY_I16 => 2,
            tag::INT_ARRAY_I32 => 4,
            _ => return Err(unexpected(tag::INT_ARRAY_I32, t)),
        };
        let len = self.len(width)?;
        Ok((0..len)
            .map(|_| match width {
                1 => self.buf.get_i8() as i32,
                2 => self.buf.get_i16() as i32,
                _ => self.buf.get_i32(),
            })
            .collect())
    }

    pub fn read_long_array(&mut self) -> Result<Vec<i64>> {
        let t = self.tag()?;
        let width = match t {
            tag::LONG_ARRAY_I8 => 1,
            tag::LONG_ARRAY_I16 => 2,
            tag::LONG_ARRAY_I32 => 4,
            tag::LONG_ARRAY_I64 => 8,
            _ => return Err(unexpected(tag::LONG_ARRAY_I64, t)),
        };
        let len = self.len(width)?;
        Ok((0..len)
            .map(|_| match width {
                1 => self.buf.get_i8() as i64,
                2 => self.buf.get_i16() as i64,
                4 => self.buf.get_i32() as i64,
                _ => self.buf.get_i64(),
            })
            .collect())
    }

    pub fn read_bool_array(&mut self) -> Result<Vec<bool>> {
        self.expect(tag::BOOL_ARRAY)?;
        let len = usize::try_from(self.varint()?)
            .map_err(|_| AttrError::InvalidFormat("length overflows".into()))?;
        let bytes = len.div_ceil(8);
        self.need(bytes)?;
        let packed = self.buf.split_to(bytes);
        Ok((0..len).map(|i| packed[i / 8] & (1 << (i % 8)) != 0).collect())
    }

    pub fn read_double_array(&mut self) -> Result<Vec<f64>> {
        self.expect(tag::DOUBLE_ARRAY)?;
        let len = self.len(8)?;
        Ok((0..len).map(|_| self.buf.get_f64()).collect())
    }

    fn read_compact_indices(&mut self) -> Result<Vec<CompactIndex>> {
        self.read_int_array()?
            .into_iter()
            .map(|i| {
                CompactIndex::try_from(i)
                    .map_err(|_| AttrError::InvalidFormat(format!("negative compact index {}", i)))
            })
            .collect()
    }

    /// Reads a typed array written by [`Encoder::write_value_array`].
    pub fn read_value_array(&mut self, value_type: ValueType) -> Result<Vec<Value>> {
        Ok(match value_type {
            ValueType::Bool => self.read_bool_array()?.into_iter().map(Value::Bool).collect(),
            ValueType::Int => self.read_int_array()?.into_iter().map(Value::Int).collect(),
            ValueType::Long => self.read_long_array()?.into_iter().map(Value::Long).collect(),
            ValueType::Double => self
                .read_double_array()?
                .into_iter()
                .map(Value::Double)
                .collect(),
            ValueType::Byte => {
                self.expect(tag::BYTE_ARRAY)?;
                let len = self.len(1)?;
                (0..len).map(|_| Value::Byte(self.buf.get_i8())).collect()
            }
            ValueType::Short => {
                self.expect(tag::SHORT_ARRAY)?;
                let len = self.len(2)?;
                (0..len).map(|_| Value::Short(self.buf.get_i16())).collect()
            }
            ValueType::Char => {
                self.expect(tag::CHAR_ARRAY)?;
                let len = self.len(4)?;
                (0..len)
                    .map(|_| Self::char_from(self.buf.get_u32()).map(Value::Char))
                    .collect::<Result<Vec<_>>>()?
            }
            ValueType::Float => {
                self.expect(tag::FLOAT_ARRAY)?;
                let len = self.len(4)?;
                (0..len).map(|_| Value::Float(self.buf.get_f32())).collect()
            }
            ValueType::String => {
                self.expect(tag::STRING_ARRAY)?;
                let len = self.len(1)?;
                (0..len)
                    .map(|_| self.utf8().map(Value::String))
                    .collect::<Result<Vec<_>>>()?
            }
        })
    }

    /// Reads a column along with the dense index it was saved with.
    pub fn read_column(&mut self) -> Result<(Column, Option<DenseIndex>)> {
        self.expect(tag::COLUMN)?;
        let id = self.read_string()?;
        let title = self.read_string()?;
        let origin = self.read_int()?;
        let origin = u8::try_from(origin)
            .ok()
            .and_then(ColumnOrigin::from_code)
            .ok_or_else(|| AttrError::InvalidFormat(format!("unknown column origin {}", origin)))?;
        let dense_index = match self.read_int()? {
            -1 => None,
            i => Some(
                DenseIndex::try_from(i)
                    .map_err(|_| AttrError::InvalidFormat(format!("invalid dense index {}", i)))?,
            ),
        };
        let code = self.read_int()?;
        let type_tag = u8::try_from(code)
            .ok()
            .and_then(TypeTag::from_code)
            .ok_or_else(|| AttrError::InvalidFormat(format!("unknown column type {}", code)))?;
        let default_value = self.read_value()?;
        let indexed = self.read_bool()?;
        let read_only = self.read_bool()?;
        let estimator = match self.read_int()? {
            -1 => None,
            code => Some(
                u8::try_from(code)
                    .ok()
                    .and_then(Estimator::from_code)
                    .ok_or_else(|| AttrError::InvalidFormat(format!("unknown estimator {}", code)))?,
            ),
        };

        let mut builder = Column::builder(id, type_tag)
            .title(title)
            .origin(origin)
            .indexed(indexed)
            .read_only(read_only);
        if let Some(value) = default_value {
            builder = builder.default_value(value);
        }
        if let Some(estimator) = estimator {
            builder = builder.estimator(estimator);
        }
        Ok((builder.build()?, dense_index))
    }

    pub fn read_timestamp_map(&mut self) -> Result<TimestampMap> {
        self.expect(tag::TIMESTAMP_MAP)?;
        let length = self.read_count("timestamp map length")?;
        let timestamps = self.read_double_array()?;
        let indices = self.read_compact_indices()?;
        let garbage = self.read_compact_indices()?;
        TimestampMap::from_parts(length, &timestamps, &indices, &garbage)
    }

    pub fn read_value_set(&mut self) -> Result<TimestampValues> {
        self.expect(tag::VALUE_SET)?;
        let code = self.read_int()?;
        let value_type = u8::try_from(code)
            .ok()
            .and_then(ValueType::from_code)
            .ok_or_else(|| AttrError::InvalidFormat(format!("unknown value type {}", code)))?;
        let size = self.read_count("value set size")?;
        let indices = self.read_compact_indices()?;
        let values = self.read_value_array(value_type)?;
        if indices.len() != size || values.len() != size {
            return Err(AttrError::InvalidFormat(
                "value set size does not match its arrays".into(),
            ));
        }
        TimestampValues::from_parts(value_type, indices, values)
    }

    pub(crate) fn read_store(&mut self) -> Result<StoreImage> {
        self.expect(tag::COLUMN_STORE)?;
        let class = self.read_int()?;
        let class = u8::try_from(class)
            .ok()
            .and_then(ElementClass::from_code)
            .ok_or_else(|| AttrError::InvalidFormat(format!("unknown element class {}", class)))?;
        let slot_count = self.read_count("slot count")?;

        let column_count = self.read_count("column count")?;
        let mut columns = Vec::with_capacity(column_count.min(self.remaining()));
        for _ in 0..column_count {
            let (column, index) = self.read_column()?;
            let index = index.ok_or_else(|| {
                AttrError::InvalidFormat(format!("column '{}' has no dense index", column.id()))
            })?;
            columns.push((index, Arc::new(column)));
        }

        let garbage = self
            .read_int_array()?
            .into_iter()
            .map(|i| {
                DenseIndex::try_from(i)
                    .map_err(|_| AttrError::InvalidFormat(format!("invalid garbage index {}", i)))
            })
            .collect::<Result<Vec<_>>>()?;

        let map_count = self.read_count("timestamp map count")?;
        let mut timestamp_maps = Vec::with_capacity(map_count.min(self.remaining()));
        for _ in 0..map_count {
            let index = self.read_int()?;
            let index = DenseIndex::try_from(index)
                .map_err(|_| AttrError::InvalidFormat(format!("invalid map index {}", index)))?;
            timestamp_maps.push((index, self.read_timestamp_map()?));
        }

        Ok(StoreImage {
            class,
            slot_count,
            columns,
            garbage,
            timestamp_maps,
        })
    }

    pub(crate) fn read_element(&mut self) -> Result<ElementImage> {
        self.expect(tag::ELEMENT)?;
        let slot_count = self.read_count("slot count")?;
        if slot_count > MAX_COLUMNS {
            return Err(AttrError::InvalidFormat(format!(
                "element has {} slots, more than {}",
                slot_count, MAX_COLUMNS
            )));
        }
        let mut slots = Vec::with_capacity(slot_count.min(self.remaining()));
        for _ in 0..slot_count {
            let slot = if self.peek_tag()? == tag::VALUE_SET {
                Some(SlotData::Series(self.read_value_set()?))
            } else {
                self.read_value()?.map(SlotData::Scalar)
            };
            slots.push(slot);
        }
        let timestamps = self.read_double_array()?;
        Ok(ElementImage { slots, timestamps })
    }
}

fn unexpected(expected: u8, found: u8) -> AttrError {
    AttrError::InvalidFormat(format!("expected tag {}, found {}", expected, found))
}

/// Encodes the user schema and timestamp maps of `store`.
pub fn encode_store(store: &ColumnStore) -> Bytes {
    let mut encoder = Encoder::new();
    encoder.write_store(store);
    encoder.finish()
}

/// Loads an encoded schema into `store`, which must hold only its built-ins.
pub fn decode_store(store: &ColumnStore, bytes: Bytes) -> Result<()> {
    let mut decoder = Decoder::new(bytes);
    let image = decoder.read_store()?;
    store.install(image)
}

pub fn encode_element(element: &Element) -> Result<Bytes> {
    let mut encoder = Encoder::new();
    encoder.write_element(element)?;
    Ok(encoder.finish())
}

/// Rebuilds an element against a store that already holds its columns.
pub fn decode_element(store: Arc<ColumnStore>, bytes: Bytes) -> Result<Element> {
    let mut decoder = Decoder::new(bytes);
    let image = decoder.read_element()?;
    Element::from_image(store, image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn encoded(write: impl FnOnce(&mut Encoder)) -> Bytes {
        let mut encoder = Encoder::new();
        write(&mut encoder);
        encoder.finish()
    }

    #[test]
    fn test_small_ints_use_one_byte() {
        for (v, t) in [(-1, tag::INT_M1), (0, tag::INT_0), (8, tag::INT_8), (255, tag::INT_255)] {
            let bytes = encoded(|e| e.write_int(v));
            assert_eq!(&bytes[..], &[t][..]);
            assert_eq!(Decoder::new(bytes).read_int().unwrap(), v);
        }
        let bytes = encoded(|e| e.write_int(300));
        assert_eq!(bytes[0], tag::INT_PACKED);
        assert_eq!(bytes.len(), 3);
        assert_eq!(Decoder::new(bytes).read_int().unwrap(), 300);

        let bytes = encoded(|e| e.write_int(i32::MIN));
        assert_eq!(Decoder::new(bytes).read_int().unwrap(), i32::MIN);
    }

    #[test]
    fn test_int_array_picks_narrowest_width() {
        let bytes = encoded(|e| e.write_int_array(&[1, -5, 100]));
        assert_eq!(bytes[0], tag::INT_ARRAY_I8);
        assert_eq!(bytes.len(), 1 + 1 + 3);

        let bytes = encoded(|e| e.write_int_array(&[1, 1000]));
        assert_eq!(bytes[0], tag::INT_ARRAY_I16);

        let values = [0, 70_000, -3];
        let bytes = encoded(|e| e.write_int_array(&values));
        assert_eq!(bytes[0], tag::INT_ARRAY_I32);
        assert_eq!(Decoder::new(bytes).read_int_array().unwrap(), values);

        let longs = [1i64, i64::MAX];
        let bytes = encoded(|e| e.write_long_array(&longs));
        assert_eq!(bytes[0], tag::LONG_ARRAY_I64);
        assert_eq!(Decoder::new(bytes).read_long_array().unwrap(), longs);
    }

    #[test]
    fn test_scalars_keep_their_kind() {
        let values = [
            Value::Bool(false),
            Value::Byte(-7),
            Value::Char('é'),
            Value::Short(-300),
            Value::Int(2),
            Value::Long(2),
            Value::Float(1.5),
            Value::Double(-0.25),
            Value::from(""),
            Value::from("hello"),
        ];
        let bytes = encoded(|e| values.iter().for_each(|v| e.write_value(v)));
        let mut decoder = Decoder::new(bytes);
        for value in &values {
            assert_eq!(decoder.read_value().unwrap().as_ref(), Some(value));
        }
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_bool_array_is_packed() {
        let values = [true, false, true, true, false, false, false, false, true];
        let bytes = encoded(|e| e.write_bool_array(&values));
        assert_eq!(bytes.len(), 1 + 1 + 2);
        assert_eq!(Decoder::new(bytes).read_bool_array().unwrap(), values);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            Decoder::new(Bytes::from_static(&[99])).read_value(),
            Err(AttrError::UnknownTypeTag(99))
        ));
        assert!(matches!(
            Decoder::new(Bytes::from_static(&[tag::DOUBLE, 0, 0])).read_value(),
            Err(AttrError::UnexpectedEof)
        ));
        assert!(matches!(
            Decoder::new(Bytes::from_static(&[tag::DOUBLE_ARRAY, 200, 1])).read_double_array(),
            Err(AttrError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_column_layout() {
        let column = Column::builder("w", TypeTag::Timestamped(ValueType::Double))
            .title("Weight")
            .default_value(Value::Double(1.0))
            .estimator(Estimator::Max)
            .build()
            .unwrap();
        let bytes = encoded(|e| e.write_column(&column));
        let (decoded, index) = Decoder::new(bytes).read_column().unwrap();
        assert_eq!(decoded, column);
        assert_eq!(decoded.title(), "Weight");
        assert_eq!(decoded.default_value(), Some(&Value::Double(1.0)));
        assert_eq!(decoded.estimator(), Some(Estimator::Max));
        assert_eq!(index, None);
    }

    #[test]
    fn test_timestamp_map_and_value_set() {
        let mut map = TimestampMap::new();
        for ts in [3.0, 1.0, 2.0] {
            map.get_timestamp_index(ts).unwrap();
        }
        map.free_timestamp(1.0);
        let bytes = encoded(|e| e.write_timestamp_map(&map));
        let decoded = Decoder::new(bytes).read_timestamp_map().unwrap();
        assert_eq!(decoded.iter().collect::<Vec<_>>(), map.iter().collect::<Vec<_>>());
        assert_eq!(decoded.garbage().collect::<Vec<_>>(), vec![1]);
        assert_eq!(decoded.length(), 3);

        let mut set = TimestampValues::new(ValueType::String);
        set.put(2, Value::from("b")).unwrap();
        set.put(0, Value::from("a")).unwrap();
        let bytes = encoded(|e| e.write_value_set(&set).unwrap());
        assert_eq!(Decoder::new(bytes).read_value_set().unwrap(), set);
    }

    #[test]
    fn test_store_requires_empty_target() {
        let source = ColumnStore::new(ElementClass::Node, Config::default()).unwrap();
        source
            .add_column(
                Column::builder("age", TypeTag::Scalar(ValueType::Int))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let bytes = encode_store(&source);

        let target = ColumnStore::new(ElementClass::Node, Config::default()).unwrap();
        decode_store(&target, bytes.clone()).unwrap();
        assert_eq!(target.get_column("age").unwrap().dense_index(), Some(3));

        assert!(matches!(
            decode_store(&target, bytes),
            Err(AttrError::StoreNotEmpty)
        ));
    }

    #[test]
    fn test_element_slot_count_is_bounded() {
        let store = Arc::new(ColumnStore::new(ElementClass::Node, Config::default()).unwrap());
        let column = store
            .add_column(
                Column::builder("s", TypeTag::Timestamped(ValueType::Int))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(column.dense_index(), Some(3));

        // Slot 65539 would land on dense index 3 if narrowed to u16.
        let mut set = TimestampValues::new(ValueType::Int);
        set.put(0, Value::Int(42)).unwrap();
        let bytes = encoded(|e| {
            e.buf.put_u8(tag::ELEMENT);
            e.write_int(65540);
            e.write_string("n1");
            for _ in 1..65539 {
                e.write_null();
            }
            e.write_value_set(&set).unwrap();
            e.write_double_array(&[]);
        });
        assert!(matches!(
            decode_element(store, bytes),
            Err(AttrError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_truncated_store_leaves_target_untouched() {
        let source = ColumnStore::new(ElementClass::Edge, Config::default()).unwrap();
        for id in ["a", "b", "c"] {
            source
                .add_column(
                    Column::builder(id, TypeTag::Scalar(ValueType::Long))
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        let bytes = encode_store(&source);
        let truncated = bytes.slice(..bytes.len() - 2);

        let target = ColumnStore::new(ElementClass::Edge, Config::default()).unwrap();
        assert!(decode_store(&target, truncated).is_err());
        assert_eq!(target.size(), 3);
        decode_store(&target, bytes).unwrap();
        assert_eq!(target.size(), 6);
    }
}
