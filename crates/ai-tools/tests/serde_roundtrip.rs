#![cfg(feature = "serde")]

use ai_tools::{TraceEvent, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::new(1, "bt.step"),
            TraceEvent::new(1, "bt.status").with_node(0).with_a(0).with_b(1),
            TraceEvent::new(2, "bt.child_added").with_node(4).with_a(0),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}
