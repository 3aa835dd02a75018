//! Parsers for `dmidecode` output.
//!
//! - `-t processor`: first processor block → `DmiProcessor`
//! - `-t memory`: populated `Memory Device` blocks → `Vec<MemorySlot>`
//! - `-s <keyword>`: single value, comment lines skipped
//! - `-t <type>`: raw dump grouped by `Handle ...` header

use super::{field_value, parse_leading_number};
use crate::inventory::{MemoryInfo, MemorySlot};
use std::collections::BTreeMap;

/// Values vendors leave in unprogrammed DMI serial fields
const PLACEHOLDER_SERIALS: &[&str] = &[
    "",
    "Not Specified",
    "System Serial Number",
    "To be filled by O.E.M.",
    "To Be Filled By O.E.M.",
    "Default string",
    "0",
];

/// Processor fields from `dmidecode -t processor`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmiProcessor {
    pub version: Option<String>,
    pub family: Option<String>,
    pub core_count: Option<u32>,
    pub thread_count: Option<u32>,
    pub max_speed_mhz: Option<f64>,
    pub external_clock_mhz: Option<f64>,
}

impl DmiProcessor {
    /// Best frequency: rated maximum before bus clock
    pub fn frequency_mhz(&self) -> Option<f64> {
        self.max_speed_mhz.or(self.external_clock_mhz)
    }
}

/// Parse the first `Processor Information` block.
///
/// ```text
/// Handle 0x0004, DMI type 4, 48 bytes
/// Processor Information
///         Family: Core i7
///         Version: Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz
///         External Clock: 100 MHz
///         Max Speed: 4600 MHz
///         Core Count: 6
///         Thread Count: 12
/// ```
pub fn parse_processor(output: &str) -> DmiProcessor {
    let mut info = DmiProcessor::default();
    let mut in_block = false;

    for line in output.lines() {
        let line = line.trim();

        if line == "Processor Information" {
            if in_block {
                break; // second socket: keep the first
            }
            in_block = true;
            continue;
        }
        if !in_block {
            continue;
        }

        if let Some(v) = field_value(line, "Version") {
            info.version.get_or_insert(v);
        } else if let Some(v) = field_value(line, "Family") {
            info.family.get_or_insert(v);
        } else if let Some(v) = field_value(line, "Core Count") {
            info.core_count = info.core_count.or(v.parse().ok());
        } else if let Some(v) = field_value(line, "Thread Count") {
            info.thread_count = info.thread_count.or(v.parse().ok());
        } else if let Some(v) = field_value(line, "Max Speed") {
            info.max_speed_mhz = info.max_speed_mhz.or(parse_leading_number(&v));
        } else if let Some(v) = field_value(line, "External Clock") {
            info.external_clock_mhz = info.external_clock_mhz.or(parse_leading_number(&v));
        }
    }

    info
}

/// Parse populated memory slots from `dmidecode -t memory`.
///
/// Slots are numbered in device order, empty slots included, so the numbers
/// match the board silkscreen order dmidecode reports.
pub fn parse_memory_devices(output: &str) -> Vec<MemorySlot> {
    let mut slots = Vec::new();
    let mut current: Option<MemorySlot> = None;
    let mut slot_number = 0;

    for line in output.lines() {
        let line = line.trim();

        if line == "Memory Device" {
            if let Some(slot) = current.take().filter(|s| s.size_bytes > 0) {
                slots.push(slot);
            }
            slot_number += 1;
            current = Some(MemorySlot {
                slot_number,
                ..Default::default()
            });
            continue;
        }

        let Some(slot) = current.as_mut() else {
            continue;
        };

        if let Some(size) = field_value(line, "Size") {
            match parse_memory_size(&size) {
                Some(bytes) => slot.size_bytes = bytes,
                None => current = None, // "No Module Installed"
            }
        } else if let Some(v) = field_value(line, "Manufacturer") {
            slot.manufacturer = v;
        } else if let Some(v) = field_value(line, "Speed") {
            if v != "Unknown" {
                slot.frequency = v;
            }
        }
    }

    if let Some(slot) = current.filter(|s| s.size_bytes > 0) {
        slots.push(slot);
    }
    slots
}

/// Summary values come from the first slot that reports them
pub fn summarize_memory(total_bytes: u64, slots: Vec<MemorySlot>) -> MemoryInfo {
    let manufacturer = slots
        .iter()
        .map(|s| s.manufacturer.as_str())
        .find(|m| !m.is_empty())
        .unwrap_or_default()
        .to_string();
    let frequency = slots
        .iter()
        .map(|s| s.frequency.as_str())
        .find(|f| !f.is_empty())
        .unwrap_or_default()
        .to_string();

    MemoryInfo {
        total_bytes,
        slots,
        frequency,
        manufacturer,
    }
}

/// `16 GB`, `16384 MB`, `8192 kB` → bytes; None for empty slots
pub fn parse_memory_size(value: &str) -> Option<u64> {
    let mut parts = value.split_whitespace();
    let amount: u64 = parts.next()?.parse().ok()?;
    let multiplier = match parts.next().map(|u| u.to_ascii_uppercase()) {
        Some(u) if u == "TB" => 1024 * 1024 * 1024 * 1024,
        Some(u) if u == "GB" => 1024 * 1024 * 1024,
        Some(u) if u == "MB" => 1024 * 1024,
        Some(u) if u == "KB" => 1024,
        Some(u) if u == "BYTES" => 1,
        _ => return None,
    };
    Some(amount * multiplier)
}

/// Value of `dmidecode -s <keyword>`, skipping `#` comment lines
pub fn parse_string_value(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
}

pub fn is_placeholder_serial(serial: &str) -> bool {
    PLACEHOLDER_SERIALS.contains(&serial.trim())
}

/// Group a raw dump by `Handle ...` header into trimmed non-empty lines
pub fn parse_sections(output: &str) -> BTreeMap<String, Vec<String>> {
    let mut sections = BTreeMap::new();
    let mut header: Option<String> = None;
    let mut content = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.starts_with("Handle ") {
            if let Some(h) = header.take() {
                sections.insert(h, std::mem::take(&mut content));
            }
            header = Some(line.to_string());
        } else if !line.is_empty() && header.is_some() {
            content.push(line.to_string());
        }
    }

    if let Some(h) = header {
        sections.insert(h, content);
    }
    sections
}
