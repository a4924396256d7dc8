//! Platform memory introspection

use std::fs;

/// Estimate available memory in bytes from `/proc/meminfo`
///
/// Prefers `MemAvailable`; older kernels only report the components, so
/// fall back to `MemFree + Buffers + Cached`. Returns None where there is
/// no `/proc/meminfo` or it cannot be parsed.
pub fn available_memory() -> Option<u64> {
    let contents = fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo(&contents)
}

/// Parse the text of `/proc/meminfo` into an available-bytes estimate
pub fn parse_meminfo(contents: &str) -> Option<u64> {
    let field = |name: &str| -> Option<u64> {
        contents.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            Some(kb.saturating_mul(1024))
        })
    };

    if let Some(avail) = field("MemAvailable") {
        return Some(avail);
    }

    let free = field("MemFree")?;
    Some(
        free.saturating_add(field("Buffers").unwrap_or(0))
            .saturating_add(field("Cached").unwrap_or(0)),
    )
}
