//! Conversion between decoded clouds and wire frames

use bytes::{BufMut, BytesMut};
use gamevis_core::{Stamp, VisError, VisResult};
use gamevis_msgs::{CloudMessage, FieldType, Header, PointField};

use crate::{PointCloud, PointXyzRgb};

/// Bytes per point in the canonical layout: x, y, z (f32) + packed rgb
pub const XYZRGB_POINT_STEP: u32 = 16;

/// Canonical x/y/z/rgb field layout
pub fn xyzrgb_fields() -> Vec<PointField> {
    vec![
        PointField::new("x", 0, FieldType::Float32, 1),
        PointField::new("y", 4, FieldType::Float32, 1),
        PointField::new("z", 8, FieldType::Float32, 1),
        // Packed 0x00RRGGBB carried in a float slot
        PointField::new("rgb", 12, FieldType::Float32, 1),
    ]
}

/// Bytes in one row of `width` canonical points
pub fn xyzrgb_row_step(width: u32) -> VisResult<u32> {
    XYZRGB_POINT_STEP
        .checked_mul(width)
        .ok_or_else(|| VisError::InvalidArgument(format!("row of {} points overflows the frame", width)))
}

impl PointCloud {
    /// Frame the cloud for a points channel.
    ///
    /// Fails when a row would not fit the frame's 32-bit size fields.
    pub fn to_message(&self, frame_id: &str, stamp: Stamp) -> VisResult<CloudMessage> {
        // Organized shape only survives when it still matches the point count
        let (width, height) = if self.width as usize * self.height as usize == self.len() && self.height > 0 {
            (self.width, self.height)
        } else {
            let width = u32::try_from(self.len()).map_err(|_| {
                VisError::InvalidArgument(format!("{} points do not fit one frame", self.len()))
            })?;
            (width, 1)
        };
        let row_step = xyzrgb_row_step(width)?;

        let mut data = BytesMut::with_capacity(self.len() * XYZRGB_POINT_STEP as usize);
        for p in &self.points {
            data.put_f32_le(p.x);
            data.put_f32_le(p.y);
            data.put_f32_le(p.z);
            data.put_u32_le(p.packed_rgb());
        }

        Ok(CloudMessage {
            header: Header::new(frame_id, stamp),
            height,
            width,
            fields: xyzrgb_fields(),
            is_bigendian: false,
            point_step: XYZRGB_POINT_STEP,
            row_step,
            data: data.freeze(),
            is_dense: self.is_dense,
        })
    }

    /// Decode a wire frame. `x`, `y` and `z` are required; `rgb` or `rgba`
    /// is optional and absent color decodes as black.
    pub fn from_message(msg: &CloudMessage) -> VisResult<Self> {
        msg.validate()?;

        let x = required_field(msg, "x")?;
        let y = required_field(msg, "y")?;
        let z = required_field(msg, "z")?;
        let rgb = msg.field("rgb").or_else(|| msg.field("rgba"));
        if let Some(f) = rgb {
            if !matches!(f.datatype, FieldType::Float32 | FieldType::Uint32) {
                return Err(VisError::InvalidWireFormat(format!(
                    "field '{}' must be float32 or uint32, got {:?}",
                    f.name, f.datatype
                )));
            }
        }

        let data = &msg.data[..];
        let big = msg.is_bigendian;
        let mut points = Vec::with_capacity(msg.point_count());

        for row in 0..msg.height as usize {
            for col in 0..msg.width as usize {
                let base = row * msg.row_step as usize + col * msg.point_step as usize;
                let mut p = PointXyzRgb::new(
                    read_coord(data, base, x, big),
                    read_coord(data, base, y, big),
                    read_coord(data, base, z, big),
                );
                if let Some(f) = rgb {
                    p.set_packed_rgb(read_u32(data, base + f.offset as usize, big));
                }
                points.push(p);
            }
        }

        Ok(PointCloud {
            points,
            width: msg.width,
            height: msg.height,
            is_dense: msg.is_dense,
        })
    }
}

fn required_field<'a>(msg: &'a CloudMessage, name: &str) -> VisResult<&'a PointField> {
    let field = msg
        .field(name)
        .ok_or_else(|| VisError::MissingField(name.to_string()))?;
    match field.datatype {
        FieldType::Float32 | FieldType::Float64 => Ok(field),
        other => Err(VisError::InvalidWireFormat(format!(
            "field '{}' must be floating point, got {:?}",
            name, other
        ))),
    }
}

// Offsets were checked against point_step by validate()
fn read_u32(data: &[u8], at: usize, big: bool) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[at..at + 4]);
    if big {
        u32::from_be_bytes(raw)
    } else {
        u32::from_le_bytes(raw)
    }
}

fn read_coord(data: &[u8], base: usize, field: &PointField, big: bool) -> f32 {
    let at = base + field.offset as usize;
    match field.datatype {
        FieldType::Float64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&data[at..at + 8]);
            let v = if big {
                f64::from_be_bytes(raw)
            } else {
                f64::from_le_bytes(raw)
            };
            v as f32
        }
        _ => f32::from_bits(read_u32(data, at, big)),
    }
}
