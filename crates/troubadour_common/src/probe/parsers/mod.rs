//! Pure parsers for the vendor tools the system probe shells out to.
//!
//! Every parser takes captured stdout and returns typed values. No process
//! spawning happens here, so each one is tested against fixture output.

pub mod display;
pub mod dmidecode;
pub mod lsblk;
pub mod lscpu;
pub mod lspci;
pub mod net;

/// Value of a `Key: value` line, None for other keys or empty values
pub(crate) fn field_value(line: &str, key: &str) -> Option<String> {
    let (k, v) = line.split_once(':')?;
    if k.trim() != key {
        return None;
    }
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

/// Leading decimal of a value: `4600 MHz` → 4600.0
pub(crate) fn parse_leading_number(value: &str) -> Option<f64> {
    let end = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    value[..end].parse().ok()
}
