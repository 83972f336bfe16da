//! PCD point cloud files
//!
//! Reads `DATA ascii` and `DATA binary` files with `x y z` and an optional
//! packed `rgb`/`rgba` field. Writes ASCII and binary with `x y z rgb`.

use std::io::Write;
use std::path::Path;

use gamevis_core::{VisError, VisResult};

use crate::{PointCloud, PointXyzRgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Ascii,
    Binary,
}

#[derive(Debug, Clone)]
struct PcdField {
    name: String,
    size: usize,
    kind: char,
    count: usize,
}

#[derive(Debug)]
struct PcdHeader {
    fields: Vec<PcdField>,
    width: u32,
    height: u32,
    points: usize,
    /// Bytes per binary record; bounds every field offset and column count
    record: usize,
    data: DataFormat,
}

impl PcdHeader {
    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Read a PCD file from disk
pub fn read_pcd(path: impl AsRef<Path>) -> VisResult<PointCloud> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_pcd(&bytes)
}

/// Parse PCD content
pub fn parse_pcd(bytes: &[u8]) -> VisResult<PointCloud> {
    let (header, body) = parse_header(bytes)?;

    let x = require(&header, "x")?;
    let y = require(&header, "y")?;
    let z = require(&header, "z")?;
    let rgb = header.position("rgb").or_else(|| header.position("rgba"));

    let points = match header.data {
        DataFormat::Ascii => parse_ascii(&header, body, [x, y, z], rgb)?,
        DataFormat::Binary => parse_binary(&header, body, [x, y, z], rgb)?,
    };

    let mut cloud = PointCloud::from_points(points);
    if header.width as usize * header.height as usize == cloud.len() {
        cloud.width = header.width;
        cloud.height = header.height;
    }
    cloud.is_dense = cloud
        .points
        .iter()
        .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
    Ok(cloud)
}

fn require(header: &PcdHeader, name: &str) -> VisResult<usize> {
    header
        .position(name)
        .ok_or_else(|| VisError::MissingField(name.to_string()))
}

fn parse_header(bytes: &[u8]) -> VisResult<(PcdHeader, &[u8])> {
    let mut names: Vec<String> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut kinds: Vec<char> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut width = None;
    let mut height = 1u32;
    let mut points = None;

    let mut offset = 0;
    while offset < bytes.len() {
        let end = bytes[offset..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|p| offset + p + 1)
            .unwrap_or(bytes.len());
        let line = std::str::from_utf8(&bytes[offset..end])
            .map_err(|_| VisError::Pcd("header is not UTF-8".into()))?
            .trim();
        offset = end;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let key = parts.next().unwrap_or_default().to_ascii_uppercase();
        let values: Vec<&str> = parts.collect();

        match key.as_str() {
            "VERSION" | "VIEWPOINT" => {}
            "FIELDS" => names = values.iter().map(|s| s.to_string()).collect(),
            "SIZE" => sizes = parse_list(&values, "SIZE")?,
            "TYPE" => {
                kinds = values
                    .iter()
                    .map(|s| s.chars().next().unwrap_or('?').to_ascii_uppercase())
                    .collect()
            }
            "COUNT" => counts = parse_list(&values, "COUNT")?,
            "WIDTH" => width = Some(parse_one(&values, "WIDTH")?),
            "HEIGHT" => height = parse_one(&values, "HEIGHT")?,
            "POINTS" => points = Some(parse_one::<usize>(&values, "POINTS")?),
            "DATA" => {
                let data = match values.first().map(|s| s.to_ascii_lowercase()) {
                    Some(ref s) if s == "ascii" => DataFormat::Ascii,
                    Some(ref s) if s == "binary" => DataFormat::Binary,
                    Some(other) => {
                        return Err(VisError::Pcd(format!("unsupported DATA format '{}'", other)))
                    }
                    None => return Err(VisError::Pcd("DATA without format".into())),
                };

                if counts.is_empty() {
                    counts = vec![1; names.len()];
                }
                if sizes.len() != names.len() || kinds.len() != names.len() || counts.len() != names.len() {
                    return Err(VisError::Pcd(
                        "FIELDS, SIZE, TYPE and COUNT lengths differ".into(),
                    ));
                }

                let fields = names
                    .into_iter()
                    .zip(sizes)
                    .zip(kinds)
                    .zip(counts)
                    .map(|(((name, size), kind), count)| PcdField {
                        name,
                        size,
                        kind,
                        count,
                    })
                    .collect::<Vec<_>>();

                for f in &fields {
                    if f.count == 0 {
                        return Err(VisError::Pcd(format!("field '{}' has COUNT 0", f.name)));
                    }
                    if !matches!((f.kind, f.size), ('F', 4) | ('F', 8) | ('U' | 'I', 1 | 2 | 4 | 8)) {
                        return Err(VisError::Pcd(format!(
                            "unsupported field '{}' of type {}{}",
                            f.name, f.kind, f.size
                        )));
                    }
                }

                let record = fields.iter().try_fold(0usize, |acc, f| {
                    f.size
                        .checked_mul(f.count)
                        .and_then(|n| acc.checked_add(n))
                        .ok_or_else(|| VisError::Pcd(format!("field '{}' COUNT {} is too large", f.name, f.count)))
                })?;

                let width = width.ok_or_else(|| VisError::Pcd("missing WIDTH".into()))?;
                let points = points.unwrap_or(width as usize * height as usize);

                return Ok((
                    PcdHeader {
                        fields,
                        width,
                        height,
                        points,
                        record,
                        data,
                    },
                    &bytes[offset..],
                ));
            }
            other => return Err(VisError::Pcd(format!("unknown header key '{}'", other))),
        }
    }

    Err(VisError::Pcd("missing DATA line".into()))
}

fn parse_one<T: std::str::FromStr>(values: &[&str], key: &str) -> VisResult<T> {
    values
        .first()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| VisError::Pcd(format!("bad {} value", key)))
}

fn parse_list<T: std::str::FromStr>(values: &[&str], key: &str) -> VisResult<Vec<T>> {
    values
        .iter()
        .map(|v| {
            v.parse()
                .map_err(|_| VisError::Pcd(format!("bad {} entry '{}'", key, v)))
        })
        .collect()
}

fn parse_ascii(
    header: &PcdHeader,
    body: &[u8],
    xyz: [usize; 3],
    rgb: Option<usize>,
) -> VisResult<Vec<PointXyzRgb>> {
    let text = std::str::from_utf8(body).map_err(|_| VisError::Pcd("data is not UTF-8".into()))?;

    // Column of the first element of each field
    let mut columns = Vec::with_capacity(header.fields.len());
    let mut col = 0;
    for f in &header.fields {
        columns.push(col);
        col += f.count;
    }
    let width = col;

    let mut points = Vec::with_capacity(header.points.min(body.len()));
    for (lineno, line) in text.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
        if points.len() == header.points {
            break;
        }
        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() < width {
            return Err(VisError::Pcd(format!(
                "data line {} has {} values, expected {}",
                lineno + 1,
                values.len(),
                width
            )));
        }

        let coord = |i: usize| -> VisResult<f32> {
            values[columns[i]]
                .parse::<f32>()
                .map_err(|_| VisError::Pcd(format!("bad coordinate on data line {}", lineno + 1)))
        };
        let mut p = PointXyzRgb::new(coord(xyz[0])?, coord(xyz[1])?, coord(xyz[2])?);

        if let Some(i) = rgb {
            let raw = values[columns[i]];
            let packed = if header.fields[i].kind == 'F' {
                raw.parse::<f32>().map(f32::to_bits).ok()
            } else {
                raw.parse::<u64>().map(|v| v as u32).ok()
            };
            let packed = packed
                .ok_or_else(|| VisError::Pcd(format!("bad color on data line {}", lineno + 1)))?;
            p.set_packed_rgb(packed);
        }
        points.push(p);
    }

    if points.len() < header.points {
        return Err(VisError::Pcd(format!(
            "expected {} points, found {}",
            header.points,
            points.len()
        )));
    }
    Ok(points)
}

fn parse_binary(
    header: &PcdHeader,
    body: &[u8],
    xyz: [usize; 3],
    rgb: Option<usize>,
) -> VisResult<Vec<PointXyzRgb>> {
    let record = header.record;
    let needed = record
        .checked_mul(header.points)
        .ok_or_else(|| VisError::Pcd(format!("{} points overflow the data size", header.points)))?;
    if body.len() < needed {
        return Err(VisError::BufferTooShort {
            expected: needed,
            actual: body.len(),
        });
    }

    let mut offsets = Vec::with_capacity(header.fields.len());
    let mut at = 0;
    for f in &header.fields {
        offsets.push(at);
        at += f.size * f.count;
    }

    let mut points = Vec::with_capacity(header.points);
    for chunk in body[..needed].chunks_exact(record) {
        let coord = |i: usize| -> f32 {
            let f = &header.fields[i];
            let at = offsets[i];
            match (f.kind, f.size) {
                ('F', 8) => f64::from_le_bytes(le_bytes(&chunk[at..at + 8])) as f32,
                ('F', _) => f32::from_le_bytes(le_bytes(&chunk[at..at + 4])),
                _ => read_int(&chunk[at..at + f.size], f.kind) as f32,
            }
        };
        let mut p = PointXyzRgb::new(coord(xyz[0]), coord(xyz[1]), coord(xyz[2]));
        if let Some(i) = rgb {
            let f = &header.fields[i];
            let at = offsets[i];
            p.set_packed_rgb(read_int(&chunk[at..at + f.size.min(4)], 'U') as u32);
        }
        points.push(p);
    }
    Ok(points)
}

fn le_bytes<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

fn read_int(slice: &[u8], kind: char) -> i64 {
    let mut raw = [0u8; 8];
    raw[..slice.len()].copy_from_slice(slice);
    let unsigned = u64::from_le_bytes(raw);
    if kind == 'I' {
        // Sign-extend from the field width
        let shift = 64 - slice.len() * 8;
        ((unsigned << shift) as i64) >> shift
    } else {
        unsigned as i64
    }
}

fn write_header<W: Write>(cloud: &PointCloud, data: &str, out: &mut W) -> VisResult<()> {
    writeln!(out, "# .PCD v0.7 - Point Cloud Data file format")?;
    writeln!(out, "VERSION 0.7")?;
    writeln!(out, "FIELDS x y z rgb")?;
    writeln!(out, "SIZE 4 4 4 4")?;
    writeln!(out, "TYPE F F F U")?;
    writeln!(out, "COUNT 1 1 1 1")?;
    let (width, height) = if cloud.width as usize * cloud.height as usize == cloud.len() {
        (cloud.width, cloud.height)
    } else {
        (cloud.len() as u32, 1)
    };
    writeln!(out, "WIDTH {}", width)?;
    writeln!(out, "HEIGHT {}", height)?;
    writeln!(out, "VIEWPOINT 0 0 0 1 0 0 0")?;
    writeln!(out, "POINTS {}", cloud.len())?;
    writeln!(out, "DATA {}", data)?;
    Ok(())
}

/// Write a cloud as an ASCII PCD
pub fn write_pcd_ascii<W: Write>(cloud: &PointCloud, mut out: W) -> VisResult<()> {
    write_header(cloud, "ascii", &mut out)?;
    for p in &cloud.points {
        writeln!(out, "{} {} {} {}", p.x, p.y, p.z, p.packed_rgb())?;
    }
    Ok(())
}

/// Write a cloud as a binary PCD
pub fn write_pcd_binary<W: Write>(cloud: &PointCloud, mut out: W) -> VisResult<()> {
    write_header(cloud, "binary", &mut out)?;
    for p in &cloud.points {
        out.write_all(&p.x.to_le_bytes())?;
        out.write_all(&p.y.to_le_bytes())?;
        out.write_all(&p.z.to_le_bytes())?;
        out.write_all(&p.packed_rgb().to_le_bytes())?;
    }
    Ok(())
}
