//! Parser for `lscpu` output.

use super::{field_value, parse_leading_number};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LscpuInfo {
    pub model_name: Option<String>,
    pub architecture: Option<String>,
    pub cpus: Option<u32>,
    pub cores_per_socket: Option<u32>,
    pub sockets: Option<u32>,
    pub mhz: Option<f64>,
    pub l2_cache: Option<String>,
}

impl LscpuInfo {
    /// Physical cores across all sockets
    pub fn cores(&self) -> Option<u32> {
        let per_socket = self.cores_per_socket?;
        Some(per_socket * self.sockets.unwrap_or(1))
    }
}

/// Parse `lscpu` key/value output.
///
/// Older releases print `CPU MHz`, newer ones only `CPU max MHz`; the
/// current clock wins when both are present.
pub fn parse_lscpu(output: &str) -> LscpuInfo {
    let mut info = LscpuInfo::default();
    let mut max_mhz = None;

    for line in output.lines() {
        let line = line.trim();

        if let Some(v) = field_value(line, "Model name") {
            info.model_name.get_or_insert(v);
        } else if let Some(v) = field_value(line, "Architecture") {
            info.architecture = Some(v);
        } else if let Some(v) = field_value(line, "CPU(s)") {
            info.cpus = info.cpus.or(v.parse().ok());
        } else if let Some(v) = field_value(line, "Core(s) per socket") {
            info.cores_per_socket = v.parse().ok();
        } else if let Some(v) = field_value(line, "Socket(s)") {
            info.sockets = v.parse().ok();
        } else if let Some(v) = field_value(line, "CPU MHz") {
            info.mhz = parse_leading_number(&v);
        } else if let Some(v) = field_value(line, "CPU max MHz") {
            max_mhz = parse_leading_number(&v);
        } else if let Some(v) = field_value(line, "L2 cache") {
            info.l2_cache = Some(v);
        }
    }

    info.mhz = info.mhz.or(max_mhz);
    info
}
