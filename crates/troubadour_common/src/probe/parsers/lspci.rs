//! Parser for `lspci -v` output, display controllers only.

/// Lines scanned after the controller header for memory and driver
const DETAIL_WINDOW: usize = 15;

const DISPLAY_CLASSES: &[&str] = &[
    "VGA compatible controller",
    "3D controller",
    "Display controller",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PciDisplay {
    pub model: String,
    /// Last `Memory at ...` line of the device block, verbatim
    pub memory: Option<String>,
    pub driver: Option<String>,
}

/// First display controller in `lspci -v` output.
///
/// ```text
/// 00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 630 (rev 02)
///         Memory at f6000000 (64-bit, non-prefetchable) [size=16M]
///         Kernel driver in use: i915
/// ```
pub fn parse_display_controller(output: &str) -> Option<PciDisplay> {
    let lines: Vec<&str> = output.lines().collect();

    let (start, model) = lines.iter().enumerate().find_map(|(i, line)| {
        DISPLAY_CLASSES.iter().find_map(|class| {
            let marker = format!("{}: ", class);
            line.find(&marker)
                .map(|pos| (i, line[pos + marker.len()..].trim().to_string()))
        })
    })?;

    let mut display = PciDisplay {
        model,
        ..Default::default()
    };

    for line in lines.iter().skip(start + 1).take(DETAIL_WINDOW) {
        let line = line.trim();
        if line.is_empty() {
            break; // end of device block
        }
        if line.starts_with("Memory at") {
            display.memory = Some(line.to_string());
        } else if let Some(driver) = line.strip_prefix("Kernel driver in use:") {
            display.driver.get_or_insert_with(|| driver.trim().to_string());
        }
    }

    Some(display)
}
