#![no_main]

//! Fuzz target for snapshot parsing.
//!
//! Arbitrary bytes are parsed as JSON and YAML snapshots. Parsing must never panic, and any
//! snapshot that loads must survive a serialize/parse cycle unchanged.

use libfuzzer_sys::fuzz_target;
use orderfix_snapshots::{SnapshotFormat, parse_snapshot, serialize_snapshot};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    for format in [SnapshotFormat::Json, SnapshotFormat::Yaml] {
        let Ok(snapshot) = parse_snapshot(format, s) else {
            continue;
        };
        let text = serialize_snapshot(format, &snapshot).expect("serialize loaded snapshot");
        let again = parse_snapshot(format, &text).expect("reparse serialized snapshot");
        assert_eq!(again, snapshot);
    }
});
