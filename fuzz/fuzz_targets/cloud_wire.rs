#![no_main]

use gamevis_cloud::PointCloud;
use gamevis_msgs::CloudMessage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(msg) = CloudMessage::decode(data) {
        // A frame that decodes must survive re-encoding and point extraction
        let encoded = msg.encode().expect("decoded frame re-encodes");
        assert_eq!(CloudMessage::decode(&encoded).expect("round trip"), msg);
        let _ = PointCloud::from_message(&msg);
    }
});
