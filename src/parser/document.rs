//! Decoding of a MALT JSON document into typed records.
//!
//! This is the only place that navigates the generic JSON tree. Every
//! structural problem surfaces here as `ProfileError::MalformedDocument`
//! so that a half-decoded profile never reaches the indexer.

use super::names::NamePool;
use super::schema::{LeakRecord, MemoryTimeline, StackRecord, TimelineColumns};
use super::symbols::SymbolTable;
use crate::utils::config::{PHYSICAL_FIELD, REQUESTED_FIELD, VIRTUAL_FIELD};
use crate::utils::error::ProfileError;
use log::{debug, info, warn};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Every section of the profile, decoded
#[derive(Debug, Clone)]
pub struct DecodedProfile {
    pub names: NamePool,
    pub symbols: SymbolTable,
    pub stacks: Vec<StackRecord>,
    pub timeline: MemoryTimeline,
    pub leaks: Vec<LeakRecord>,
}

/// Read and parse a profile file into a JSON tree
///
/// # Errors
/// * `ProfileError::Io` - file cannot be opened
/// * `ProfileError::Json` - file is not valid JSON
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, ProfileError> {
    let path = path.as_ref();
    info!("Reading {}", path.display());

    let file = File::open(path)?;
    let document = serde_json::from_reader(BufReader::new(file))?;

    Ok(document)
}

/// Decode a parsed document into typed sections
///
/// **Public** - main entry point for decoding
///
/// # Errors
/// * `ProfileError::MalformedDocument` - a required key is absent or has the
///   wrong type, or a numeric field does not parse
/// * `ProfileError::OutOfRange` - a site refers outside the name pool
pub fn decode_document(root: &Value) -> Result<DecodedProfile, ProfileError> {
    if !root.is_object() {
        return Err(ProfileError::malformed("profile root must be a JSON object"));
    }

    let names = NamePool::from_value(require(root, &["sites", "strings"])?)?;
    let symbols = SymbolTable::build(require(root, &["sites", "instr"])?, &names)?;
    let stacks = decode_stacks(require(root, &["stacks", "stats"])?)?;
    let timeline = decode_timeline(root)?;
    let leaks = match root.get("leaks") {
        Some(node) => decode_leaks(node)?,
        None => Vec::new(),
    };

    debug!(
        "Decoded {} names, {} sites, {} stacks, {} samples, {} leaks",
        names.len(),
        symbols.len(),
        stacks.len(),
        timeline.rows.len(),
        leaks.len()
    );

    Ok(DecodedProfile {
        names,
        symbols,
        stacks,
        timeline,
        leaks,
    })
}

/// Walk a key path, failing with the dotted path when any key is missing
///
/// **Private** - internal navigation helper
fn require<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value, ProfileError> {
    path.iter().try_fold(root, |node, key| {
        node.get(*key)
            .ok_or_else(|| ProfileError::malformed(format!("missing key {}", path.join("."))))
    })
}

/// Decode `stacks.stats`
///
/// **Private** - internal helper for decode_document
fn decode_stacks(node: &Value) -> Result<Vec<StackRecord>, ProfileError> {
    let entries = node
        .as_array()
        .ok_or_else(|| ProfileError::malformed("stacks.stats must be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| decode_stack_record(i, entry))
        .collect()
}

fn decode_stack_record(index: usize, entry: &Value) -> Result<StackRecord, ProfileError> {
    let at = |field: &str| format!("stacks.stats[{}].{}", index, field);

    let stack_id = entry
        .get("stackId")
        .and_then(identifier)
        .ok_or_else(|| ProfileError::malformed(format!("missing or invalid {}", at("stackId"))))?;

    let stack = identifier_list(
        entry
            .get("stack")
            .ok_or_else(|| ProfileError::malformed(format!("missing {}", at("stack"))))?,
        &at("stack"),
    )?;

    let count = field_u64(entry, &["infos", "alloc", "count"], &at("infos.alloc.count"))?;
    let inclusive_bytes = field_u64(entry, &["infos", "alloc", "sum"], &at("infos.alloc.sum"))?;
    let global_peak_bytes = field_u64(entry, &["infos", "globalPeak"], &at("infos.globalPeak"))?;

    Ok(StackRecord {
        stack_id,
        stack,
        count,
        inclusive_bytes,
        global_peak_bytes,
    })
}

/// Decode `timeline.memoryTimeline` and `globals.ticksPerSecond`
///
/// **Private** - internal helper for decode_document
fn decode_timeline(root: &Value) -> Result<MemoryTimeline, ProfileError> {
    let ticks_per_second = parse_json_f64(require(root, &["globals", "ticksPerSecond"])?)
        .map_err(|e| ProfileError::malformed(format!("globals.ticksPerSecond: {}", e)))?;
    if ticks_per_second <= 0.0 {
        return Err(ProfileError::malformed(format!(
            "globals.ticksPerSecond must be positive, found {}",
            ticks_per_second
        )));
    }

    let timeline = require(root, &["timeline", "memoryTimeline"])?;

    let per_points = parse_json_f64(require(timeline, &["perPoints"])?)
        .map_err(|e| ProfileError::malformed(format!("memoryTimeline.perPoints: {}", e)))?;

    let fields = require(timeline, &["fields"])?
        .as_array()
        .ok_or_else(|| ProfileError::malformed("memoryTimeline.fields must be an array"))?;
    let column = |name: &str| {
        fields
            .iter()
            .position(|f| f.as_str() == Some(name))
            .ok_or_else(|| {
                ProfileError::malformed(format!("memoryTimeline.fields has no {} column", name))
            })
    };
    let columns = TimelineColumns {
        physical: column(PHYSICAL_FIELD)?,
        virtual_mem: column(VIRTUAL_FIELD)?,
        requested: column(REQUESTED_FIELD)?,
    };

    let rows = require(timeline, &["values"])?
        .as_array()
        .ok_or_else(|| ProfileError::malformed("memoryTimeline.values must be an array"))?
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_array()
                .map(|cells| cells.iter().map(sample_bytes).collect::<Vec<u64>>())
                .ok_or_else(|| {
                    ProfileError::malformed(format!("memoryTimeline.values[{}] is not an array", i))
                })
        })
        .collect::<Result<Vec<Vec<u64>>, _>>()?;

    let callsite = match timeline.get("callsite") {
        Some(node) => identifier_list(node, "memoryTimeline.callsite")?,
        None => Vec::new(),
    };

    Ok(MemoryTimeline {
        ticks_per_second,
        per_points,
        columns,
        rows,
        callsite,
    })
}

/// Decode the optional `leaks` array
///
/// **Private** - internal helper for decode_document
fn decode_leaks(node: &Value) -> Result<Vec<LeakRecord>, ProfileError> {
    let entries = node
        .as_array()
        .ok_or_else(|| ProfileError::malformed("leaks must be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<LeakRecord, ProfileError> {
            let at = |field: &str| format!("leaks[{}].{}", i, field);
            Ok(LeakRecord {
                memory: field_u64(entry, &["memory"], &at("memory"))?,
                count: field_u64(entry, &["count"], &at("count"))?,
                stack: identifier_list(
                    entry
                        .get("stack")
                        .ok_or_else(|| ProfileError::malformed(format!("missing {}", at("stack"))))?,
                    &at("stack"),
                )?,
            })
        })
        .collect()
}

/// Read a nested unsigned field, naming `label` in any error
fn field_u64(entry: &Value, path: &[&str], label: &str) -> Result<u64, ProfileError> {
    let value = require(entry, path).map_err(|_| ProfileError::malformed(format!("missing {}", label)))?;
    parse_json_u64(value).map_err(|e| ProfileError::malformed(format!("{}: {}", label, e)))
}

/// Site and stack identifiers are strings, though some writers emit numbers
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn identifier_list(value: &Value, label: &str) -> Result<Vec<String>, ProfileError> {
    value
        .as_array()
        .ok_or_else(|| ProfileError::malformed(format!("{} must be an array", label)))?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            identifier(v).ok_or_else(|| {
                ProfileError::malformed(format!("{}[{}] is not an identifier: {}", label, i, v))
            })
        })
        .collect()
}

/// Convert one timeline cell to a byte count
///
/// Non-numeric or negative cells count as zero.
fn sample_bytes(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 => f as u64,
        _ => {
            warn!("Non-numeric timeline cell {}, reading as 0", value);
            0
        }
    }
}

/// Parse an unsigned value from a JSON number or a numeric string
///
/// Byte sums in MALT profiles may exceed 32 bits and are often written as
/// decimal strings.
pub fn parse_json_u64(val: &Value) -> Result<u64, String> {
    if let Some(n) = val.as_u64() {
        Ok(n)
    } else if let Some(s) = val.as_str() {
        parse_byte_count(s)
    } else if let Some(f) = val.as_f64().filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0) {
        Ok(f as u64)
    } else {
        Err(format!("expected unsigned number or numeric string, found {}", val))
    }
}

/// Parse a byte count from a decimal or `0x` hex string
pub fn parse_byte_count(value: &str) -> Result<u64, String> {
    let value = value.trim();
    if let Some(hex_str) = value.strip_prefix("0x") {
        u64::from_str_radix(hex_str, 16).map_err(|e| format!("invalid hex value '{}': {}", value, e))
    } else {
        value
            .parse::<u64>()
            .map_err(|e| format!("invalid decimal value '{}': {}", value, e))
    }
}

fn parse_json_f64(val: &Value) -> Result<f64, String> {
    if let Some(f) = val.as_f64() {
        Ok(f)
    } else if let Some(s) = val.as_str() {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", s, e))
    } else {
        Err(format!("expected number, found {}", val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "sites": {
                "strings": ["foo"],
                "instr": {"0x1": {"function": 0}}
            },
            "stacks": {
                "stats": [{
                    "stackId": "S1",
                    "stack": ["0x1"],
                    "infos": {"alloc": {"count": 2, "sum": "18446744073709551000"}, "globalPeak": 0}
                }]
            },
            "globals": {"ticksPerSecond": 1000.0},
            "timeline": {"memoryTimeline": {
                "perPoints": 10.0,
                "fields": ["requestedMem", "physicalMem", "virtualMem"],
                "values": [[1, 2, 3]],
                "callsite": ["S1"]
            }}
        })
    }

    #[test]
    fn test_decode_minimal_document() {
        let decoded = decode_document(&minimal()).unwrap();

        assert_eq!(decoded.stacks.len(), 1);
        assert_eq!(decoded.stacks[0].inclusive_bytes, 18_446_744_073_709_551_000);
        assert_eq!(decoded.timeline.columns.requested, 0);
        assert_eq!(decoded.timeline.columns.physical, 1);
        assert_eq!(decoded.timeline.delta(), 0.01);
        assert!(decoded.leaks.is_empty());
    }

    #[test]
    fn test_unparsable_sum_is_malformed() {
        let mut doc = minimal();
        doc["stacks"]["stats"][0]["infos"]["alloc"]["sum"] = json!("12kB");

        let err = decode_document(&doc).unwrap_err();
        match err {
            ProfileError::MalformedDocument(msg) => assert!(msg.contains("infos.alloc.sum")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_timeline_column_is_malformed() {
        let mut doc = minimal();
        doc["timeline"]["memoryTimeline"]["fields"] = json!(["requestedMem", "physicalMem"]);
        assert!(matches!(
            decode_document(&doc),
            Err(ProfileError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_non_positive_ticks_is_malformed() {
        for ticks in [json!(0.0), json!(-5), json!("0")] {
            let mut doc = minimal();
            doc["globals"]["ticksPerSecond"] = ticks;

            match decode_document(&doc).unwrap_err() {
                ProfileError::MalformedDocument(msg) => {
                    assert!(msg.contains("ticksPerSecond must be positive"))
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_non_numeric_timeline_cell_reads_as_zero() {
        let mut doc = minimal();
        doc["timeline"]["memoryTimeline"]["values"] = json!([[1, "n/a", 3]]);

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(decoded.timeline.rows, vec![vec![1, 0, 3]]);
    }

    #[test]
    fn test_missing_section_names_path() {
        let mut doc = minimal();
        doc.as_object_mut().unwrap().remove("stacks");

        let err = decode_document(&doc).unwrap_err();
        assert!(err.to_string().contains("stacks.stats"));
    }

    #[test]
    fn test_parse_json_u64() {
        assert_eq!(parse_json_u64(&json!(900)).unwrap(), 900);
        assert_eq!(parse_json_u64(&json!("900")).unwrap(), 900);
        assert_eq!(parse_json_u64(&json!("0x384")).unwrap(), 900);
        assert!(parse_json_u64(&json!(-1)).is_err());
        assert!(parse_json_u64(&json!("nine")).is_err());
    }
}
