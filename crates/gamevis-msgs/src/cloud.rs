//! Point cloud frame and its binary wire format
//!
//! Layout (all integers little-endian):
//! - Bytes 0-3: Magic "GVPC"
//! - Byte 4: Format version
//! - Frame id: u16 length + UTF-8
//! - Stamp: i64 microseconds
//! - Height, width: u32
//! - Field count: u8, then per field [NAME_LEN:1][NAME][OFFSET:4][DATATYPE:1][COUNT:4]
//! - is_bigendian: u8
//! - Point step, row step: u32
//! - Data: u32 length + bytes
//! - is_dense: u8

use bytes::{Buf, BufMut, Bytes, BytesMut};
use gamevis_core::{Stamp, VisError, VisResult};

use crate::Header;

/// Wire magic
pub const CLOUD_MAGIC: &[u8; 4] = b"GVPC";

/// Current cloud wire format version
pub const CLOUD_WIRE_VERSION: u8 = 1;

/// Smallest possible encoded frame (empty frame id, no fields, no data)
pub const MIN_CLOUD_FRAME_SIZE: usize = 4 + 1 + 2 + 8 + 4 + 4 + 1 + 1 + 4 + 4 + 4 + 1;

/// Scalar type of a point field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldType {
    Int8 = 1,
    Uint8 = 2,
    Int16 = 3,
    Uint16 = 4,
    Int32 = 5,
    Uint32 = 6,
    Float32 = 7,
    Float64 = 8,
}

impl FieldType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(FieldType::Int8),
            2 => Some(FieldType::Uint8),
            3 => Some(FieldType::Int16),
            4 => Some(FieldType::Uint16),
            5 => Some(FieldType::Int32),
            6 => Some(FieldType::Uint32),
            7 => Some(FieldType::Float32),
            8 => Some(FieldType::Float64),
            _ => None,
        }
    }

    /// Size of one element in bytes
    pub fn size(self) -> usize {
        match self {
            FieldType::Int8 | FieldType::Uint8 => 1,
            FieldType::Int16 | FieldType::Uint16 => 2,
            FieldType::Int32 | FieldType::Uint32 | FieldType::Float32 => 4,
            FieldType::Float64 => 8,
        }
    }
}

/// One named field inside each point record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointField {
    pub name: String,
    pub offset: u32,
    pub datatype: FieldType,
    pub count: u32,
}

impl PointField {
    pub fn new(name: impl Into<String>, offset: u32, datatype: FieldType, count: u32) -> Self {
        PointField {
            name: name.into(),
            offset,
            datatype,
            count,
        }
    }

    /// Byte past the end of this field within a point record.
    /// A zero count still occupies one element.
    pub fn end(&self) -> usize {
        self.offset as usize + self.datatype.size() * self.count.max(1) as usize
    }
}

/// A framed point cloud, as sent on a points channel
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CloudMessage {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Bytes,
    pub is_dense: bool,
}

impl CloudMessage {
    /// Number of points described by the frame
    pub fn point_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }

    pub fn field(&self, name: &str) -> Option<&PointField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that sizes, steps and field offsets agree
    pub fn validate(&self) -> VisResult<()> {
        let row_bytes = self.point_step as usize * self.width as usize;
        if (self.row_step as usize) < row_bytes {
            return Err(VisError::InvalidWireFormat(format!(
                "row step {} shorter than {} points of {} bytes",
                self.row_step, self.width, self.point_step
            )));
        }

        let expected = self.row_step as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(VisError::InvalidWireFormat(format!(
                "data length {} does not match row step * height = {}",
                self.data.len(),
                expected
            )));
        }

        if let Some(field) = self.fields.iter().find(|f| f.end() > self.point_step as usize) {
            return Err(VisError::InvalidWireFormat(format!(
                "field '{}' exceeds point step {}",
                field.name, self.point_step
            )));
        }

        Ok(())
    }

    /// Encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        let fields: usize = self.fields.iter().map(|f| 1 + f.name.len() + 4 + 1 + 4).sum();
        MIN_CLOUD_FRAME_SIZE + self.header.frame_id.len() + fields + self.data.len()
    }

    /// Serialize to the wire format
    pub fn encode(&self) -> VisResult<Bytes> {
        if self.header.frame_id.len() > u16::MAX as usize {
            return Err(VisError::InvalidWireFormat("frame id too long".into()));
        }
        if self.fields.len() > u8::MAX as usize {
            return Err(VisError::InvalidWireFormat("too many fields".into()));
        }
        if self.data.len() > u32::MAX as usize {
            return Err(VisError::InvalidWireFormat("payload too large".into()));
        }

        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_slice(CLOUD_MAGIC);
        buf.put_u8(CLOUD_WIRE_VERSION);

        buf.put_u16_le(self.header.frame_id.len() as u16);
        buf.put_slice(self.header.frame_id.as_bytes());
        buf.put_i64_le(self.header.stamp.as_micros());

        buf.put_u32_le(self.height);
        buf.put_u32_le(self.width);

        buf.put_u8(self.fields.len() as u8);
        for field in &self.fields {
            if field.name.len() > u8::MAX as usize {
                return Err(VisError::InvalidWireFormat(format!(
                    "field name too long: {}",
                    field.name
                )));
            }
            buf.put_u8(field.name.len() as u8);
            buf.put_slice(field.name.as_bytes());
            buf.put_u32_le(field.offset);
            buf.put_u8(field.datatype as u8);
            buf.put_u32_le(field.count);
        }

        buf.put_u8(self.is_bigendian as u8);
        buf.put_u32_le(self.point_step);
        buf.put_u32_le(self.row_step);
        buf.put_u32_le(self.data.len() as u32);
        buf.put_slice(&self.data);
        buf.put_u8(self.is_dense as u8);

        Ok(buf.freeze())
    }

    /// Parse from the wire format and validate the payload layout
    pub fn decode(buf: &[u8]) -> VisResult<Self> {
        if buf.len() < MIN_CLOUD_FRAME_SIZE {
            return Err(VisError::BufferTooShort {
                expected: MIN_CLOUD_FRAME_SIZE,
                actual: buf.len(),
            });
        }

        let total = buf.len();
        let mut r = buf;

        if &r[..4] != CLOUD_MAGIC {
            return Err(VisError::InvalidWireFormat("bad magic".into()));
        }
        r.advance(4);

        let version = r.get_u8();
        if version != CLOUD_WIRE_VERSION {
            return Err(VisError::InvalidWireFormat(format!(
                "unsupported version {}",
                version
            )));
        }

        let frame_len = r.get_u16_le() as usize;
        let frame_id = take_str(&mut r, frame_len, total)?;
        need(&r, 8 + 4 + 4 + 1, total)?;
        let stamp = Stamp::from_micros(r.get_i64_le());
        let height = r.get_u32_le();
        let width = r.get_u32_le();

        let field_count = r.get_u8() as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            need(&r, 1, total)?;
            let name_len = r.get_u8() as usize;
            let name = take_str(&mut r, name_len, total)?;
            need(&r, 4 + 1 + 4, total)?;
            let offset = r.get_u32_le();
            let dt = r.get_u8();
            let datatype = FieldType::from_byte(dt).ok_or_else(|| {
                VisError::InvalidWireFormat(format!("unknown field datatype {}", dt))
            })?;
            let count = r.get_u32_le();
            fields.push(PointField {
                name,
                offset,
                datatype,
                count,
            });
        }

        need(&r, 1 + 4 + 4 + 4, total)?;
        let is_bigendian = r.get_u8() != 0;
        let point_step = r.get_u32_le();
        let row_step = r.get_u32_le();
        let data_len = r.get_u32_le() as usize;
        need(&r, data_len + 1, total)?;
        let data = Bytes::copy_from_slice(&r[..data_len]);
        r.advance(data_len);
        let is_dense = r.get_u8() != 0;

        if r.has_remaining() {
            return Err(VisError::InvalidWireFormat(format!(
                "{} trailing bytes",
                r.remaining()
            )));
        }

        let msg = CloudMessage {
            header: Header { frame_id, stamp },
            height,
            width,
            fields,
            is_bigendian,
            point_step,
            row_step,
            data,
            is_dense,
        };
        msg.validate()?;
        Ok(msg)
    }
}

fn need(r: &[u8], n: usize, total: usize) -> VisResult<()> {
    if r.remaining() < n {
        return Err(VisError::BufferTooShort {
            expected: total - r.remaining() + n,
            actual: total,
        });
    }
    Ok(())
}

fn take_str(r: &mut &[u8], len: usize, total: usize) -> VisResult<String> {
    need(r, len, total)?;
    let s = std::str::from_utf8(&r[..len])
        .map_err(|_| VisError::InvalidWireFormat("string is not UTF-8".into()))?
        .to_string();
    r.advance(len);
    Ok(s)
}
