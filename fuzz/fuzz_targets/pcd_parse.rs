#![no_main]

use gamevis_cloud::{parse_pcd, write_pcd_binary};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cloud) = parse_pcd(data) {
        let mut out = Vec::new();
        write_pcd_binary(&cloud, &mut out).expect("parsed cloud writes");
        assert_eq!(parse_pcd(&out).expect("written cloud parses").len(), cloud.len());
    }
});
