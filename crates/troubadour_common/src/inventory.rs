//! Inventory Snapshot - the immutable hardware-identity record
//!
//! Captured once per session by an `InventoryProbe` and never mutated after.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel serial number used when no DMI source yields a usable value
pub const UNKNOWN_SERIAL: &str = "UNKNOWN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorInfo {
    pub model: String,
    pub cores: u32,
    pub threads: u32,
    pub frequency_mhz: f64,
    pub cache: String,
    pub architecture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySlot {
    pub slot_number: u32,
    pub size_bytes: u64,
    pub manufacturer: String,
    pub frequency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub slots: Vec<MemorySlot>,
    pub frequency: String,
    pub manufacturer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub model: String,
    pub mac_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub model: String,
    pub memory: String,
    pub resolution: String,
    pub driver: String,
}

/// Storage device class, as shown grouped on the review screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StorageKind {
    #[serde(rename = "NVME")]
    Nvme,
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
    #[serde(rename = "Flash")]
    Flash,
    #[serde(rename = "Other")]
    Other,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Nvme => "NVME",
            StorageKind::Ssd => "SSD",
            StorageKind::Hdd => "HDD",
            StorageKind::Flash => "Flash",
            StorageKind::Other => "Other",
        }
    }

    /// Display order on the review screen
    pub const ALL: [StorageKind; 5] = [
        StorageKind::Nvme,
        StorageKind::Ssd,
        StorageKind::Hdd,
        StorageKind::Flash,
        StorageKind::Other,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDevice {
    #[serde(rename = "type")]
    pub kind: StorageKind,
    pub model: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mount_point: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

/// Hardware identity of the unit under qualification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub processor: ProcessorInfo,
    pub memory: MemoryInfo,
    pub network_cards: Vec<NetworkInterface>,
    pub gpu: GpuInfo,
    pub storage_devices: Vec<StorageDevice>,
    pub serial_number: String,
}

impl InventorySnapshot {
    /// Whether the serial number is the `UNKNOWN` sentinel
    pub fn serial_is_unknown(&self) -> bool {
        self.serial_number == UNKNOWN_SERIAL
    }

    pub fn storage_of_kind(&self, kind: StorageKind) -> impl Iterator<Item = &StorageDevice> {
        self.storage_devices.iter().filter(move |d| d.kind == kind)
    }
}

/// Verbatim output of the vendor tool that produced the serial number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialEvidence {
    /// Command line as run, e.g. `dmidecode -s system-serial-number`
    pub command: String,
    /// Raw stdout, untrimmed
    pub raw_output: String,
}

/// Everything one probe run hands to the wizard
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub snapshot: InventorySnapshot,
    pub serial_evidence: SerialEvidence,
    /// Full DMI dump grouped by `Handle ...` header
    pub dmi_sections: BTreeMap<String, Vec<String>>,
}

/// Bytes to GiB for display
pub fn gib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}
