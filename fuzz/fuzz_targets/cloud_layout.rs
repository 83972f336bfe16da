#![no_main]

use arbitrary::Arbitrary;
use gamevis_cloud::PointCloud;
use gamevis_msgs::{CloudMessage, FieldType, PointField};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FieldSpec {
    name: u8,
    offset: u8,
    datatype: u8,
    count: u8,
}

#[derive(Arbitrary, Debug)]
struct LayoutInput {
    fields: Vec<FieldSpec>,
    width: u8,
    point_step: u8,
    is_bigendian: bool,
    data: Vec<u8>,
}

const NAMES: [&str; 5] = ["x", "y", "z", "rgb", "rgba"];

fuzz_target!(|input: LayoutInput| {
    let fields = input
        .fields
        .iter()
        .filter_map(|f| {
            let datatype = FieldType::from_byte(f.datatype)?;
            let name = NAMES[f.name as usize % NAMES.len()];
            Some(PointField::new(name, f.offset as u32, datatype, f.count as u32))
        })
        .collect();
    let point_step = input.point_step as u32;
    let msg = CloudMessage {
        height: 1,
        width: input.width as u32,
        fields,
        is_bigendian: input.is_bigendian,
        point_step,
        row_step: point_step * input.width as u32,
        data: input.data.into(),
        ..Default::default()
    };
    // Arbitrary layouts must be rejected, never read out of bounds
    let _ = PointCloud::from_message(&msg);
});
