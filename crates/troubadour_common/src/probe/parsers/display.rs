//! Parsers for `xrandr` and `glxinfo -B`. Both need a running display server,
//! so empty output is normal on a headless unit.

use super::field_value;
use regex::Regex;
use std::sync::OnceLock;

fn mode_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d+)x(\d+)\+\d+\+\d+\b").ok())
        .as_ref()
}

fn current_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"current (\d+) x (\d+)").ok())
        .as_ref()
}

/// Active resolution as `WIDTHxHEIGHT`.
///
/// The primary connected output wins, then the first connected one, then the
/// `current` size of the X screen.
pub fn parse_xrandr_resolution(output: &str) -> Option<String> {
    let mode_re = mode_re()?;
    let mut first_connected = None;

    for line in output.lines() {
        if !line.contains(" connected") {
            continue;
        }
        let Some(caps) = mode_re.captures(line) else {
            continue; // connected but disabled
        };
        let resolution = format!("{}x{}", &caps[1], &caps[2]);
        if line.contains(" primary ") {
            return Some(resolution);
        }
        first_connected.get_or_insert(resolution);
    }

    first_connected.or_else(|| {
        let caps = current_re()?.captures(output)?;
        Some(format!("{}x{}", &caps[1], &caps[2]))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlxInfo {
    pub renderer: Option<String>,
    pub video_memory: Option<String>,
    pub version: Option<String>,
}

pub fn parse_glxinfo(output: &str) -> GlxInfo {
    let mut info = GlxInfo::default();
    for line in output.lines() {
        let line = line.trim();
        if let Some(v) = field_value(line, "OpenGL renderer string") {
            info.renderer = Some(v);
        } else if let Some(v) = field_value(line, "Video memory") {
            info.video_memory.get_or_insert(v);
        } else if let Some(v) = field_value(line, "OpenGL version string") {
            info.version = Some(v);
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const XRANDR: &str = r#"Screen 0: minimum 320 x 200, current 4480 x 1440, maximum 16384 x 16384
HDMI-1 connected 1920x1080+2560+0 (normal left inverted right x axis y axis) 527mm x 296mm
   1920x1080     60.00*+  50.00    59.94
eDP-1 connected primary 2560x1440+0+0 (normal left inverted right x axis y axis) 344mm x 193mm
   2560x1440     60.00*+
DP-1 disconnected (normal left inverted right x axis y axis)
"#;

    const GLXINFO: &str = r#"name of display: :0
display: :0  screen: 0
direct rendering: Yes
Extended renderer info (GLX_MESA_query_renderer):
    Vendor: Intel (0x8086)
    Device: Mesa Intel(R) UHD Graphics 630 (CFL GT2) (0x3e92)
    Version: 23.2.1
    Video memory: 3072MB
OpenGL vendor string: Intel
OpenGL renderer string: Mesa Intel(R) UHD Graphics 630 (CFL GT2)
OpenGL core profile version string: 4.6 (Core Profile) Mesa 23.2.1
OpenGL version string: 4.6 (Compatibility Profile) Mesa 23.2.1
"#;

    #[test]
    fn golden_xrandr_prefers_primary() {
        assert_eq!(parse_xrandr_resolution(XRANDR).as_deref(), Some("2560x1440"));
    }

    #[test]
    fn test_xrandr_first_connected_without_primary() {
        let output = XRANDR.replace(" primary", "");
        assert_eq!(parse_xrandr_resolution(&output).as_deref(), Some("1920x1080"));
    }

    #[test]
    fn test_xrandr_falls_back_to_screen_size() {
        let output = "Screen 0: minimum 8 x 8, current 1024 x 768, maximum 32767 x 32767\nVirtual-1 connected (normal left inverted right x axis y axis)\n";
        assert_eq!(parse_xrandr_resolution(output).as_deref(), Some("1024x768"));
        assert_eq!(parse_xrandr_resolution(""), None);
    }

    #[test]
    fn golden_glxinfo() {
        let info = parse_glxinfo(GLXINFO);
        assert_eq!(
            info.renderer.as_deref(),
            Some("Mesa Intel(R) UHD Graphics 630 (CFL GT2)")
        );
        assert_eq!(info.video_memory.as_deref(), Some("3072MB"));
        assert_eq!(
            info.version.as_deref(),
            Some("4.6 (Compatibility Profile) Mesa 23.2.1")
        );
    }
}
