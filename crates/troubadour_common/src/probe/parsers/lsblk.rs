//! Parser for `lsblk -J -b -o NAME,SIZE,MODEL,ROTA,TYPE,LABEL,MOUNTPOINT`.
//!
//! util-linux changed value encodings over time: `size` and `rota` come as
//! strings (`"512110190592"`, `"0"`) on older releases and as numbers or
//! booleans on newer ones. Both are accepted.

use crate::inventory::{StorageDevice, StorageKind};
use serde::Deserialize;
use serde_json::Value;

/// Virtual block devices that are never qualification targets
const VIRTUAL_PREFIXES: &[&str] = &["loop", "zram", "ram", "dm-", "md"];

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<LsblkDevice>,
}

#[derive(Debug, Deserialize)]
struct LsblkDevice {
    name: String,
    #[serde(default)]
    size: Value,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    rota: Value,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    mountpoint: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    children: Vec<LsblkDevice>,
}

impl LsblkDevice {
    /// Own mount point or label, else the first partition that has one
    fn first_of(&self, field: fn(&LsblkDevice) -> Option<&String>) -> String {
        field(self)
            .or_else(|| self.children.iter().find_map(field))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }
}

/// Whole disks with a non-zero size, in lsblk order
pub fn parse_lsblk_json(output: &str) -> Result<Vec<StorageDevice>, serde_json::Error> {
    let parsed: LsblkOutput = serde_json::from_str(output)?;

    Ok(parsed
        .blockdevices
        .iter()
        .filter(|d| d.kind.as_deref() == Some("disk"))
        .filter(|d| !VIRTUAL_PREFIXES.iter().any(|p| d.name.starts_with(p)))
        .filter_map(|d| {
            let size_bytes = value_u64(&d.size).filter(|s| *s > 0)?;
            Some(StorageDevice {
                kind: classify(&d.name, value_bool(&d.rota)),
                model: d
                    .model
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(d.name.as_str())
                    .to_string(),
                size_bytes,
                mount_point: d.first_of(|d| d.mountpoint.as_ref()),
                label: d.first_of(|d| d.label.as_ref()),
            })
        })
        .collect())
}

/// Device class from kernel name and rotational flag
pub fn classify(name: &str, rotational: Option<bool>) -> StorageKind {
    if name.starts_with("nvme") {
        StorageKind::Nvme
    } else if name.starts_with("mmcblk") {
        StorageKind::Flash
    } else if name.starts_with("sd") || name.starts_with("vd") || name.starts_with("hd") {
        match rotational {
            Some(true) => StorageKind::Hdd,
            Some(false) => StorageKind::Ssd,
            None => StorageKind::Other,
        }
    } else {
        StorageKind::Other
    }
}

fn value_u64(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|n| n != 0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
