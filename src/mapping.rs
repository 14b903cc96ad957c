//! Scalar → color mapping: the pure numeric core of every monitor mode.
//!
//! Each mapping is a total function of the latest sample — no history,
//! no hysteresis. The piecewise ramps are continuous at their breakpoints
//! and monotonic per channel within each segment, so a slowly moving
//! metric never produces a visible color jump.
//!
//! Breakpoints, thresholds, and temperature bounds are the calibration
//! constants for this hardware; they live here so every consumer shares
//! one canonical set.

use crate::Color;

// ── Calibration constants ──────────────────────────────────────────

/// CPU ramp breakpoints (percent): blue band below, green band between,
/// red band above.
pub const CPU_MID_BREAK: f32 = 33.0;
pub const CPU_HIGH_BREAK: f32 = 66.0;

/// Memory ramp breakpoints (percent used).
pub const MEM_MID_BREAK: f32 = 50.0;
pub const MEM_HIGH_BREAK: f32 = 80.0;

/// Core voltage thresholds (volts). Good above `VOLTS_WARNING`,
/// Critical at or below `VOLTS_CRITICAL`, Warning between.
pub const VOLTS_WARNING: f32 = 1.15;
pub const VOLTS_CRITICAL: f32 = 1.10;

/// Temperature range mapped onto the blue channel in the system mix:
/// 30 °C reads as 0, 80 °C as fully lit.
pub const TEMP_COLD_C: f32 = 30.0;
pub const TEMP_HOT_C: f32 = 80.0;

// ── CPU ramp ───────────────────────────────────────────────────────

/// Map CPU utilization (0–100 %) onto a blue → green → yellow → red ramp.
///
/// Segment anchors: 0 % is pure blue, `CPU_MID_BREAK` pure green,
/// `CPU_HIGH_BREAK` yellow, 100 % pure red.
pub fn cpu_color(percent: f32) -> Color {
    let pct = percent.clamp(0.0, 100.0);
    if pct <= CPU_MID_BREAK {
        let pos = pct / CPU_MID_BREAK;
        Color::new(0.0, pos * 100.0, (1.0 - pos) * 100.0)
    } else if pct <= CPU_HIGH_BREAK {
        let pos = (pct - CPU_MID_BREAK) / (CPU_HIGH_BREAK - CPU_MID_BREAK);
        Color::new(pos * 100.0, 100.0, 0.0)
    } else {
        let pos = (pct - CPU_HIGH_BREAK) / (100.0 - CPU_HIGH_BREAK);
        Color::new(100.0, (1.0 - pos) * 100.0, 0.0)
    }
}

// ── Memory ramp ────────────────────────────────────────────────────

/// Map memory pressure (0–100 % used) onto a green → orange → red ramp.
///
/// The green band dims as pressure grows, the middle band brings red up
/// to orange at `MEM_HIGH_BREAK`, and the top band fades the remaining
/// green out toward pure red at 100 %.
pub fn memory_color(percent: f32) -> Color {
    let pct = percent.clamp(0.0, 100.0);
    if pct <= MEM_MID_BREAK {
        Color::new(0.0, 100.0 - pct, 0.0)
    } else if pct <= MEM_HIGH_BREAK {
        let pos = (pct - MEM_MID_BREAK) / (MEM_HIGH_BREAK - MEM_MID_BREAK);
        Color::new(pos * 100.0, 50.0, 0.0)
    } else {
        let pos = (pct - MEM_HIGH_BREAK) / (100.0 - MEM_HIGH_BREAK);
        Color::new(100.0, 50.0 - pos * 50.0, 0.0)
    }
}

// ── Combined system mix ────────────────────────────────────────────

/// One color for the whole machine: red tracks CPU load, green tracks
/// how much memory is still available, blue tracks temperature between
/// `TEMP_COLD_C` and `TEMP_HOT_C`. Out-of-range inputs clamp.
pub fn system_color(cpu_pct: f32, mem_used_pct: f32, temp_c: f32) -> Color {
    let blue = (temp_c - TEMP_COLD_C) / (TEMP_HOT_C - TEMP_COLD_C) * 100.0;
    Color::new(cpu_pct, 100.0 - mem_used_pct, blue)
}

// ── Voltage tiers ──────────────────────────────────────────────────

/// Severity classification of a core-voltage sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoltageTier {
    Good,
    Warning,
    Critical,
}

impl VoltageTier {
    /// Classify a sample against the fixed thresholds. Pure: two equal
    /// samples always land in the same tier, however close to a
    /// threshold they sit.
    pub fn classify(volts: f32) -> Self {
        if volts > VOLTS_WARNING {
            Self::Good
        } else if volts > VOLTS_CRITICAL {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
