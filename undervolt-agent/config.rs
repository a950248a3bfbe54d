//! Startup configuration helpers
//!
//! The only configuration this tool takes is which CPU's MSR device to
//! drive; the helpers here detect the online CPU set so a bad `--cpu` is
//! refused before any register access.

/// Detect online CPUs from /sys/devices/system/cpu/online
pub fn detect_online_cpus() -> Vec<u32> {
    std::fs::read_to_string("/sys/devices/system/cpu/online")
        .ok()
        .and_then(|s| parse_cpu_list(&s))
        .unwrap_or_else(|| {
            tracing::warn!("Failed to detect online CPUs, assuming CPU 0 only");
            vec![0]
        })
}

/// True when `cpu` is reported online
pub fn cpu_is_online(cpu: u32) -> bool {
    detect_online_cpus().contains(&cpu)
}

/// Parse a CPU list like "0-3,8-11" into a vector of ids
fn parse_cpu_list(s: &str) -> Option<Vec<u32>> {
    let mut cpus = Vec::new();
    for part in s.trim().split(',') {
        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start.parse().ok()?;
            let end: u32 = end.parse().ok()?;
            cpus.extend(start..=end);
        } else {
            cpus.push(part.parse().ok()?);
        }
    }
    Some(cpus)
}
