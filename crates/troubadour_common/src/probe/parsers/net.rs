//! NIC model lookup from `lshw -class network -short` and `ethtool -i`.

/// Description column of the `lshw -short` row for `interface`.
///
/// ```text
/// H/W path            Device      Class          Description
/// ==========================================================
/// /0/100/1f.6         eno1        network        Ethernet Connection (7) I219-LM
/// ```
pub fn lshw_model(output: &str, interface: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let _path = fields.next()?;
        if fields.next()? != interface {
            return None;
        }
        let _class = fields.next()?;
        let description = fields.collect::<Vec<_>>().join(" ");
        (!description.is_empty()).then_some(description)
    })
}

/// `driver version` from `ethtool -i`, the fallback when lshw is missing
pub fn ethtool_model(output: &str) -> Option<String> {
    let mut driver = None;
    let mut version = None;

    for line in output.lines() {
        if let Some(v) = line.strip_prefix("driver:") {
            driver = Some(v.trim());
        } else if let Some(v) = line.strip_prefix("version:") {
            version = Some(v.trim());
        }
    }

    match (driver?, version) {
        ("", _) => None,
        (d, Some(v)) if !v.is_empty() => Some(format!("{} {}", d, v)),
        (d, _) => Some(d.to_string()),
    }
}
