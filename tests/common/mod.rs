#![allow(dead_code)]

use serde_json::{json, Value};

/// Small profile with an allocator shim, a runtime frame and three user
/// functions spread over four stacks
pub fn sample_profile() -> Value {
    json!({
        "sites": {
            "strings": [
                "malloc",
                "operator new(unsigned long)",
                "__gnu_cxx::new_allocator<char>::allocate",
                "foo",
                "bar",
                "main",
                "/src/app/main.cpp",
                "/usr/include/c++/vector"
            ],
            "instr": {
                "0x10": {"function": 0},
                "0x11": {"function": 1},
                "0x12": {"function": 2, "file": 7, "line": 120},
                "0x20": {"function": 3, "file": 6, "line": 10},
                "0x21": {"function": 4, "file": 6, "line": 20},
                "0x22": {"function": 5, "file": 6, "line": 30},
                "0x23": {"function": 4, "file": 7, "line": 88}
            }
        },
        "stacks": {"stats": [
            {"stackId": "S1", "stack": ["0x10", "0x20", "0x21", "0x22"],
             "infos": {"alloc": {"count": 3, "sum": "900"}, "globalPeak": "100"}},
            {"stackId": "S2", "stack": ["0x11", "0x12", "0x21", "0x22"],
             "infos": {"alloc": {"count": 1, "sum": "500"}, "globalPeak": "0"}},
            {"stackId": "S3", "stack": ["0x10", "0x12"],
             "infos": {"alloc": {"count": 2, "sum": "64"}, "globalPeak": "32"}},
            {"stackId": "S4", "stack": ["0x10", "0x20"],
             "infos": {"alloc": {"count": 7, "sum": "0"}, "globalPeak": "0"}}
        ]},
        "globals": {"ticksPerSecond": 1000.0},
        "timeline": {"memoryTimeline": {
            "perPoints": 250.0,
            "fields": ["requestedMem", "physicalMem", "virtualMem", "internalMem"],
            "values": [
                [100, 4096, 8192, 1],
                [900, 8192, 16384, 1],
                [300],
                [1400, 8192, 16384, 2]
            ],
            "callsite": ["S1", "S2", "S1", "0xfeed"]
        }},
        "leaks": [
            {"memory": 64, "count": 2, "stack": ["0x10", "0x12"]}
        ]
    })
}
