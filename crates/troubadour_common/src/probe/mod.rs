//! Inventory probe - gathers the hardware snapshot once per session.
//!
//! `SystemProbe` combines sysinfo with vendor tools (dmidecode, lscpu, lspci,
//! xrandr, glxinfo, lshw, ethtool, lsblk). Each source is best effort: a
//! missing or failing tool leaves its fields empty. The probe only fails when
//! neither a processor model nor a memory total could be determined.

pub mod parsers;

use crate::error::ProbeError;
use crate::inventory::{
    GpuInfo, InventorySnapshot, MemoryInfo, NetworkInterface, ProbeReport, ProcessorInfo,
    SerialEvidence, StorageDevice, UNKNOWN_SERIAL,
};
use parsers::{display, dmidecode, lsblk, lscpu, lspci, net};
use std::collections::BTreeMap;
use std::fs;
use std::process::Command;
use sysinfo::{Networks, System};
use tracing::{debug, info, warn};

/// DMI keywords tried in order for the unit serial number
pub const SERIAL_SOURCES: &[&str] = &[
    "system-serial-number",
    "baseboard-serial-number",
    "chassis-serial-number",
];

/// DMI types captured verbatim into the record
pub const DMI_SECTIONS: &[&str] = &[
    "bios",
    "system",
    "baseboard",
    "chassis",
    "processor",
    "memory",
    "cache",
    "connector",
    "slot",
];

const NO_MAC: &str = "00:00:00:00:00:00";

const LSBLK_COLUMNS: &str = "NAME,SIZE,MODEL,ROTA,TYPE,LABEL,MOUNTPOINT";

/// Source of an inventory snapshot
pub trait InventoryProbe: Send + Sync + 'static {
    fn collect(&self) -> Result<ProbeReport, ProbeError>;
}

/// Runs an external tool and returns its stdout
pub trait ToolRunner: Send + Sync {
    /// None when the tool is missing, cannot start, or exits non-zero
    fn run(&self, program: &str, args: &[&str]) -> Option<String>;
}

/// `ToolRunner` backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTools;

impl ToolRunner for SystemTools {
    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        let output = match Command::new(program).args(args).output() {
            Ok(o) => o,
            Err(e) => {
                debug!(program, error = %e, "tool unavailable");
                return None;
            }
        };
        if !output.status.success() {
            debug!(program, ?args, status = %output.status, "tool failed");
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Host values read through sysinfo, used when the vendor tools say nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostBaseline {
    pub cpu_brand: String,
    pub cpu_mhz: u64,
    pub logical_cpus: usize,
    pub physical_cores: Option<usize>,
    pub total_memory: u64,
    /// Up, non-loopback interfaces with their MAC addresses
    pub interfaces: Vec<(String, String)>,
}

impl HostBaseline {
    pub fn read() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu();

        let cpus = sys.cpus();
        let networks = Networks::new_with_refreshed_list();
        let mut interfaces: Vec<(String, String)> = networks
            .iter()
            .filter(|(name, _)| name.as_str() != "lo" && interface_is_up(name))
            .map(|(name, data)| (name.clone(), data.mac_address().to_string()))
            .filter(|(_, mac)| mac != NO_MAC)
            .collect();
        interfaces.sort();

        Self {
            cpu_brand: cpus
                .first()
                .map(|c| c.brand().trim().to_string())
                .unwrap_or_default(),
            cpu_mhz: cpus.first().map(|c| c.frequency()).unwrap_or(0),
            logical_cpus: cpus.len(),
            physical_cores: sys.physical_core_count(),
            total_memory: sys.total_memory(),
            interfaces,
        }
    }
}

fn interface_is_up(name: &str) -> bool {
    fs::read_to_string(format!("/sys/class/net/{}/operstate", name))
        .map(|s| s.trim() == "up")
        .unwrap_or(false)
}

/// The production probe
pub struct SystemProbe<R: ToolRunner = SystemTools> {
    tools: R,
}

impl SystemProbe<SystemTools> {
    pub fn new() -> Self {
        Self { tools: SystemTools }
    }
}

impl Default for SystemProbe<SystemTools> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ToolRunner> SystemProbe<R> {
    pub fn with_tools(tools: R) -> Self {
        Self { tools }
    }

    /// Build a report from a host baseline and whatever the tools return
    pub fn collect_with(&self, host: &HostBaseline) -> Result<ProbeReport, ProbeError> {
        let processor = collect_processor(&self.tools, host);
        let memory = collect_memory(&self.tools, host.total_memory);

        if processor.model.is_empty() && memory.total_bytes == 0 {
            warn!("neither processor nor memory could be identified");
            return Err(ProbeError::Empty);
        }

        let network_cards = collect_network(&self.tools, &host.interfaces);
        let gpu = collect_gpu(&self.tools);
        let storage_devices = collect_storage(&self.tools);
        let (serial_number, serial_evidence) = resolve_serial(&self.tools);
        let dmi_sections = collect_dmi_sections(&self.tools);

        info!(
            cpu = %processor.model,
            memory_bytes = memory.total_bytes,
            nics = network_cards.len(),
            disks = storage_devices.len(),
            serial = %serial_number,
            "inventory collected"
        );

        Ok(ProbeReport {
            snapshot: InventorySnapshot {
                processor,
                memory,
                network_cards,
                gpu,
                storage_devices,
                serial_number,
            },
            serial_evidence,
            dmi_sections,
        })
    }
}

impl<R: ToolRunner + 'static> InventoryProbe for SystemProbe<R> {
    fn collect(&self) -> Result<ProbeReport, ProbeError> {
        self.collect_with(&HostBaseline::read())
    }
}

/// The OS-reported model name wins over the DMI `Version` string. Counts and
/// frequency come from dmidecode first, lscpu second, sysinfo last. The DMI
/// `Family` takes precedence over the lscpu architecture.
pub fn collect_processor(tools: &dyn ToolRunner, host: &HostBaseline) -> ProcessorInfo {
    let dmi = tools
        .run("dmidecode", &["-t", "processor"])
        .map(|out| dmidecode::parse_processor(&out))
        .unwrap_or_default();
    let cpu = tools
        .run("lscpu", &[])
        .map(|out| lscpu::parse_lscpu(&out))
        .unwrap_or_default();

    let model = cpu
        .model_name
        .clone()
        .or_else(|| dmi.version.clone())
        .or_else(|| (!host.cpu_brand.is_empty()).then(|| host.cpu_brand.clone()))
        .unwrap_or_default();

    let cores = dmi
        .core_count
        .or(cpu.cores())
        .or(host.physical_cores.map(|c| c as u32))
        .unwrap_or(0);
    let threads = dmi
        .thread_count
        .or(cpu.cpus)
        .unwrap_or(host.logical_cpus as u32);
    let frequency_mhz = dmi
        .frequency_mhz()
        .or(cpu.mhz)
        .unwrap_or(host.cpu_mhz as f64);

    ProcessorInfo {
        model,
        cores,
        threads,
        frequency_mhz,
        cache: cpu.l2_cache.unwrap_or_default(),
        architecture: dmi
            .family
            .or(cpu.architecture)
            .unwrap_or_else(|| std::env::consts::ARCH.to_string()),
    }
}

pub fn collect_memory(tools: &dyn ToolRunner, total_bytes: u64) -> MemoryInfo {
    let slots = tools
        .run("dmidecode", &["-t", "memory"])
        .map(|out| dmidecode::parse_memory_devices(&out))
        .unwrap_or_default();

    // sysinfo reports usable memory; fall back to installed modules
    let total_bytes = if total_bytes > 0 {
        total_bytes
    } else {
        slots.iter().map(|s| s.size_bytes).sum()
    };
    dmidecode::summarize_memory(total_bytes, slots)
}

/// Model from lshw, else ethtool, else `Unknown`
pub fn collect_network(
    tools: &dyn ToolRunner,
    interfaces: &[(String, String)],
) -> Vec<NetworkInterface> {
    let lshw = tools.run("lshw", &["-class", "network", "-short"]);

    interfaces
        .iter()
        .map(|(name, mac)| {
            let model = lshw
                .as_deref()
                .and_then(|out| net::lshw_model(out, name))
                .or_else(|| {
                    tools
                        .run("ethtool", &["-i", name.as_str()])
                        .and_then(|out| net::ethtool_model(&out))
                })
                .unwrap_or_else(|| "Unknown".to_string());
            NetworkInterface {
                name: name.clone(),
                model,
                mac_address: mac.clone(),
            }
        })
        .collect()
}

/// lspci for model, memory and driver; xrandr for resolution; glxinfo fills gaps
pub fn collect_gpu(tools: &dyn ToolRunner) -> GpuInfo {
    let pci = tools
        .run("lspci", &["-v"])
        .and_then(|out| lspci::parse_display_controller(&out));
    let resolution = tools
        .run("xrandr", &["--current"])
        .and_then(|out| display::parse_xrandr_resolution(&out));
    let glx = tools
        .run("glxinfo", &["-B"])
        .map(|out| display::parse_glxinfo(&out))
        .unwrap_or_default();

    let (model, memory, driver) = match pci {
        Some(p) => (Some(p.model), p.memory, p.driver),
        None => (None, None, None),
    };

    GpuInfo {
        model: model.or(glx.renderer).unwrap_or_default(),
        memory: memory.or(glx.video_memory).unwrap_or_default(),
        resolution: resolution.unwrap_or_default(),
        driver: driver.or(glx.version).unwrap_or_default(),
    }
}

pub fn collect_storage(tools: &dyn ToolRunner) -> Vec<StorageDevice> {
    let Some(out) = tools.run("lsblk", &["-J", "-b", "-o", LSBLK_COLUMNS]) else {
        return Vec::new();
    };
    match lsblk::parse_lsblk_json(&out) {
        Ok(devices) => devices,
        Err(e) => {
            warn!(error = %e, "unparseable lsblk output");
            Vec::new()
        }
    }
}

/// Walk `SERIAL_SOURCES` until one yields a real serial.
///
/// The evidence is the last command actually attempted, so an `UNKNOWN`
/// serial still records what the firmware answered.
pub fn resolve_serial(tools: &dyn ToolRunner) -> (String, SerialEvidence) {
    let mut evidence = SerialEvidence::default();

    for keyword in SERIAL_SOURCES {
        let command = format!("dmidecode -s {}", keyword);
        let Some(raw_output) = tools.run("dmidecode", &["-s", keyword]) else {
            continue;
        };

        let value = dmidecode::parse_string_value(&raw_output).unwrap_or_default();
        evidence = SerialEvidence {
            command,
            raw_output,
        };
        if !dmidecode::is_placeholder_serial(&value) {
            debug!(source = keyword, "serial resolved");
            return (value, evidence);
        }
        debug!(source = keyword, value = %value, "placeholder serial");
    }

    (UNKNOWN_SERIAL.to_string(), evidence)
}

pub fn collect_dmi_sections(tools: &dyn ToolRunner) -> BTreeMap<String, Vec<String>> {
    let mut sections = BTreeMap::new();
    for kind in DMI_SECTIONS {
        if let Some(out) = tools.run("dmidecode", &["-t", kind]) {
            sections.extend(dmidecode::parse_sections(&out));
        }
    }
    sections
}
