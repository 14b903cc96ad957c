//! Live system metric providers: one blocking, zero-argument query per
//! signal, each returning a plain scalar.
//!
//! A bad reading must never freeze or kill the LED loop, so every
//! provider degrades to a documented fallback instead of returning an
//! error — the mapping layer only ever sees a usable number.
//!
//! ## Rust concepts
//! - `fs::read_to_string` + `Option` combinator chains for parsing
//! - `std::process::Command` for the one shell-out (vcgencmd)
//! - Private parsers over `&str`/`Path` so tests never touch real /proc

use std::fs;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

// ── Sources and fallbacks ──────────────────────────────────────────

const PROC_STAT_PATH: &str = "/proc/stat";
const PROC_MEMINFO_PATH: &str = "/proc/meminfo";
const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

/// Window over which CPU utilization is measured. `cpu_percent` blocks
/// for this long on every call.
pub const CPU_SAMPLE_WINDOW: Duration = Duration::from_millis(500);

/// Substituted when /proc is unreadable or unparsable.
pub const CPU_FALLBACK_PCT: f32 = 0.0;
pub const MEM_FALLBACK_PCT: f32 = 0.0;

/// Substituted when the thermal zone cannot be read.
pub const TEMP_FALLBACK_C: f32 = 50.0;

/// Substituted when vcgencmd is missing, fails, or prints something
/// unexpected.
pub const VOLTS_FALLBACK: f32 = 1.2;

// ── CPU ────────────────────────────────────────────────────────────

/// Aggregate CPU utilization (0–100 %) over `CPU_SAMPLE_WINDOW`:
/// two `/proc/stat` snapshots, busy share of the tick delta.
pub fn cpu_percent() -> f32 {
    let first = read_cpu_totals(Path::new(PROC_STAT_PATH));
    thread::sleep(CPU_SAMPLE_WINDOW);
    let second = read_cpu_totals(Path::new(PROC_STAT_PATH));

    match (first, second) {
        (Some((idle0, total0)), Some((idle1, total1))) => {
            let total = total1.saturating_sub(total0);
            let idle = idle1.saturating_sub(idle0);
            if total == 0 {
                CPU_FALLBACK_PCT
            } else {
                total.saturating_sub(idle) as f32 / total as f32 * 100.0
            }
        }
        _ => CPU_FALLBACK_PCT,
    }
}

fn read_cpu_totals(path: &Path) -> Option<(u64, u64)> {
    parse_cpu_totals(&fs::read_to_string(path).ok()?)
}

/// Parse the aggregate `cpu` line of /proc/stat into
/// (idle + iowait ticks, total ticks).
fn parse_cpu_totals(stat: &str) -> Option<(u64, u64)> {
    let line = stat.lines().next()?;
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }
    let ticks: Vec<u64> = fields.filter_map(|f| f.parse().ok()).collect();
    if ticks.len() < 4 {
        return None;
    }
    let idle = ticks[3] + ticks.get(4).copied().unwrap_or(0);
    Some((idle, ticks.iter().sum()))
}

// ── Memory ─────────────────────────────────────────────────────────

/// Instantaneous memory pressure (0–100 % used), from
/// `MemTotal`/`MemAvailable` in /proc/meminfo.
pub fn memory_percent() -> f32 {
    read_memory_percent(Path::new(PROC_MEMINFO_PATH))
}

fn read_memory_percent(path: &Path) -> f32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|contents| parse_meminfo(&contents))
        .unwrap_or(MEM_FALLBACK_PCT)
}

fn parse_meminfo(meminfo: &str) -> Option<f32> {
    let mut total_kb = None;
    let mut avail_kb = None;
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            avail_kb = parse_kb(rest);
        }
    }
    let (total, avail) = (total_kb?, avail_kb?);
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(avail) as f32 / total as f32 * 100.0)
}

fn parse_kb(rest: &str) -> Option<u64> {
    rest.split_whitespace().next()?.parse().ok()
}

// ── Temperature ────────────────────────────────────────────────────

/// CPU temperature in °C from the SoC thermal zone.
pub fn cpu_temperature() -> f32 {
    read_temperature(Path::new(THERMAL_ZONE_PATH))
}

/// The thermal zone file holds millidegrees (e.g. `48250`). Any read or
/// parse failure substitutes `TEMP_FALLBACK_C`.
fn read_temperature(path: &Path) -> f32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|raw| raw.trim().parse::<f32>().ok())
        .map(|millideg| millideg / 1000.0)
        .unwrap_or(TEMP_FALLBACK_C)
}

// ── Voltage ────────────────────────────────────────────────────────

/// Core voltage in volts via `vcgencmd measure_volts core`. The
/// subprocess may take a moment; callers should show liveness first.
/// Spawn failure, non-zero exit, or unexpected output all substitute
/// `VOLTS_FALLBACK` — no subprocess error ever reaches the caller.
pub fn core_voltage() -> f32 {
    let output = Command::new("vcgencmd")
        .args(["measure_volts", "core"])
        .output();

    match output {
        Ok(out) if out.status.success() => {
            parse_voltage(&String::from_utf8_lossy(&out.stdout)).unwrap_or(VOLTS_FALLBACK)
        }
        _ => VOLTS_FALLBACK,
    }
}

/// vcgencmd prints exactly `volt=1.2000V`.
fn parse_voltage(raw: &str) -> Option<f32> {
    raw.trim()
        .strip_prefix("volt=")?
        .strip_suffix("V")?
        .parse()
        .ok()
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    // ── /proc/stat parsing ─────────────────────────────────────────

    #[test]
    fn parse_cpu_totals_sums_idle_and_iowait() {
        let stat = "cpu  100 0 50 800 50 0 0 0 0 0\ncpu0 100 0 50 800 50 0 0 0 0 0\n";
        assert_eq!(parse_cpu_totals(stat), Some((850, 1000)));
    }

    #[test]
    fn parse_cpu_totals_accepts_minimal_field_count() {
        // Very old kernels report only user/nice/system/idle.
        assert_eq!(parse_cpu_totals("cpu 10 20 30 40\n"), Some((40, 100)));
    }

    #[rstest]
    #[case("")]
    #[case("cpu0 100 0 50 800\n")] // per-core line, not the aggregate
    #[case("cpu 10 20\n")] // too few fields
    #[case("intr 12345\n")]
    fn parse_cpu_totals_rejects_bad_input(#[case] stat: &str) {
        assert_eq!(parse_cpu_totals(stat), None);
    }

    // ── /proc/meminfo parsing ──────────────────────────────────────

    #[test]
    fn parse_meminfo_computes_used_percent() {
        let meminfo = "MemTotal:        8000 kB\nMemFree:          500 kB\nMemAvailable:    2000 kB\n";
        assert_eq!(parse_meminfo(meminfo), Some(75.0));
    }

    #[rstest]
    #[case("MemTotal:        8000 kB\n")] // no MemAvailable
    #[case("MemAvailable:    2000 kB\n")] // no MemTotal
    #[case("MemTotal:        0 kB\nMemAvailable:    0 kB\n")] // degenerate
    #[case("")]
    fn parse_meminfo_rejects_incomplete_input(#[case] meminfo: &str) {
        assert_eq!(parse_meminfo(meminfo), None);
    }

    #[test]
    fn read_memory_percent_falls_back_when_unreadable() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("meminfo");
        assert_eq!(read_memory_percent(&missing), MEM_FALLBACK_PCT);
    }

    // ── Temperature ────────────────────────────────────────────────

    #[test]
    fn read_temperature_converts_millidegrees() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("temp");
        std::fs::write(&path, "48250\n").unwrap();
        assert_eq!(read_temperature(&path), 48.25);
    }

    #[test]
    fn read_temperature_falls_back_on_missing_file() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("temp");
        assert_eq!(read_temperature(&missing), TEMP_FALLBACK_C);
    }

    #[test]
    fn read_temperature_falls_back_on_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("temp");
        std::fs::write(&path, "not-a-number\n").unwrap();
        assert_eq!(read_temperature(&path), TEMP_FALLBACK_C);
    }

    // ── Voltage ────────────────────────────────────────────────────

    #[rstest]
    #[case("volt=1.2000V", 1.2)]
    #[case("volt=0.8563V\n", 0.8563)]
    #[case("  volt=1.3500V  ", 1.35)]
    fn parse_voltage_reads_vcgencmd_format(#[case] raw: &str, #[case] volts: f32) {
        assert_eq!(parse_voltage(raw), Some(volts));
    }

    #[rstest]
    #[case("")]
    #[case("1.2000")]
    #[case("volt=1.2000")] // missing trailing unit
    #[case("VCHI initialization failed")]
    fn parse_voltage_rejects_unexpected_output(#[case] raw: &str) {
        assert_eq!(parse_voltage(raw), None);
    }
}
