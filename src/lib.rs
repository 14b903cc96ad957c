//! Shared types for the RGB status LED binary.
//!
//! This module provides the pieces every mode uses:
//! - Pin assignment configuration
//! - The clamped `Color` intensity triple and HSV→RGB conversion
//! - The mode selector enum
//! - Signal handling for clean shutdown
//!
//! It also re-exports the driver, engine, mapping, and metrics modules
//! used by the main binary.

pub mod driver;
pub mod engine;
pub mod mapping;
pub mod metrics;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Pin configuration ──────────────────────────────────────────────

/// BCM pin assignment for the three LED channels.
///
/// # Rust concept: derive macros
/// `Clone, Copy` make this cheaply copyable (it's just three u8s).
/// `Debug` gives us `{:?}` formatting. `PartialEq, Eq` let us compare.
/// This is the idiomatic way to pass configuration through a system —
/// explicit, testable, and no hidden global state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinConfig {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl PinConfig {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl Default for PinConfig {
    /// The wiring this project ships with: BCM 17/27/22.
    fn default() -> Self {
        Self {
            red: 17,
            green: 27,
            blue: 22,
        }
    }
}

// ── Mode ───────────────────────────────────────────────────────────

/// Which pattern strategy the binary runs. Exactly one per process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Idle rainbow cycle (no metric input)
    Cycle,
    /// Color tracks CPU utilization (blue → green → red)
    Cpu,
    /// Color tracks memory pressure (green → orange → red)
    Memory,
    /// Red = CPU, green = free memory, blue = temperature
    System,
    /// Tiered core-voltage alarm (solid / flashing)
    Voltage,
    /// Step through eight known colors once, then exit
    SelfTest,
}

// ── Color ──────────────────────────────────────────────────────────

/// An LED color: three channel intensities, each in [0, 100].
///
/// Intensities map linearly onto PWM duty cycles, so they stay `f32`
/// all the way to the hardware boundary. The fields are private and
/// `new` clamps, so a `Color` can never hold an out-of-range intensity
/// no matter what a mapping function computes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    r: f32,
    g: f32,
    b: f32,
}

impl Color {
    /// All channels off.
    pub const OFF: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Create a color, clamping each intensity to [0, 100].
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 100.0),
            g: g.clamp(0.0, 100.0),
            b: b.clamp(0.0, 100.0),
        }
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    /// Convert HSV to RGB: hue in degrees (wraps at 360), saturation
    /// and value in [0, 100].
    ///
    /// Standard six-sector conversion: the hue circle splits into six
    /// 60° sectors; within a sector one channel interpolates while the
    /// other two sit at the bounds `value` and `value × (1 − saturation)`.
    ///
    /// # Rust concept: match expressions
    /// Rust's `match` is exhaustive — the compiler ensures we handle all
    /// six sectors (the `_` arm covers sector 5).
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let v = (value / 100.0).clamp(0.0, 1.0);

        let sector = h.floor() as u32 % 6;
        let f = h - h.floor();
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector {
            0 => (v, t, p), // Red → Yellow
            1 => (q, v, p), // Yellow → Green
            2 => (p, v, t), // Green → Cyan
            3 => (p, q, v), // Cyan → Blue
            4 => (t, p, v), // Blue → Magenta
            _ => (v, p, q), // Magenta → Red
        };

        Self::new(r * 100.0, g * 100.0, b * 100.0)
    }
}

// ── Signal handling ────────────────────────────────────────────────

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// # Rust concept: Arc and AtomicBool
/// We need to share the `running` flag between the strategy loop and the
/// signal handler. `Arc` (Atomic Reference Counting) lets multiple owners
/// share data. `AtomicBool` is a thread-safe boolean — no mutex needed
/// for a single bool.
///
/// An interrupt is not an error: the handler logs it and the active loop
/// falls out at its next flag check, taking the same shutdown path as a
/// normal exit.
pub fn setup_signal_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone(); // Clone the Arc, not the bool — both point to same data

    ctrlc::set_handler(move || {
        tracing::info!("Interrupt received, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    running
}

/// Check if the active strategy loop should keep running.
///
/// `Ordering::SeqCst` is the strongest memory ordering — for a simple
/// "should I stop?" flag, it's the safe default.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Channel-wise tolerance for float color comparisons.
    const EPS: f32 = 0.01;

    fn assert_rgb(c: Color, r: f32, g: f32, b: f32) {
        assert!(
            (c.r() - r).abs() < EPS && (c.g() - g).abs() < EPS && (c.b() - b).abs() < EPS,
            "expected rgb({r}, {g}, {b}), got {c:?}"
        );
    }

    // ── PinConfig tests ────────────────────────────────────────────

    #[test]
    fn pin_config_default_matches_wiring() {
        let pins = PinConfig::default();
        assert_eq!(pins, PinConfig::new(17, 27, 22));
    }

    // ── Color tests ────────────────────────────────────────────────

    #[test]
    fn color_new_keeps_in_range_values() {
        let c = Color::new(10.0, 20.0, 30.0);
        assert_eq!(c.r(), 10.0);
        assert_eq!(c.g(), 20.0);
        assert_eq!(c.b(), 30.0);
    }

    #[rstest]
    #[case(-5.0, 0.0)]
    #[case(0.0, 0.0)]
    #[case(100.0, 100.0)]
    #[case(150.0, 100.0)]
    fn color_new_clamps_each_channel(#[case] input: f32, #[case] expected: f32) {
        let c = Color::new(input, input, input);
        assert_eq!(c.r(), expected);
        assert_eq!(c.g(), expected);
        assert_eq!(c.b(), expected);
    }

    #[test]
    fn color_off_is_black() {
        assert_rgb(Color::OFF, 0.0, 0.0, 0.0);
    }

    // ── HSV conversion tests ───────────────────────────────────────

    #[rstest]
    #[case(0.0, 100.0, 0.0, 0.0)] // Red
    #[case(60.0, 100.0, 100.0, 0.0)] // Yellow
    #[case(120.0, 0.0, 100.0, 0.0)] // Green
    #[case(180.0, 0.0, 100.0, 100.0)] // Cyan
    #[case(240.0, 0.0, 0.0, 100.0)] // Blue
    #[case(300.0, 100.0, 0.0, 100.0)] // Magenta
    fn from_hsv_sector_boundaries(#[case] hue: f32, #[case] r: f32, #[case] g: f32, #[case] b: f32) {
        assert_rgb(Color::from_hsv(hue, 100.0, 100.0), r, g, b);
    }

    #[test]
    fn from_hsv_sector_midpoint_interpolates() {
        // 30° is halfway through the red→yellow sector: green at half scale.
        assert_rgb(Color::from_hsv(30.0, 100.0, 100.0), 100.0, 50.0, 0.0);
    }

    #[rstest]
    #[case(0.0)]
    #[case(45.0)]
    #[case(123.0)]
    #[case(359.0)]
    fn from_hsv_zero_saturation_is_grey(#[case] hue: f32) {
        assert_rgb(Color::from_hsv(hue, 0.0, 40.0), 40.0, 40.0, 40.0);
    }

    #[test]
    fn from_hsv_full_saturation_pins_extremes() {
        // A pure hue always has some channel fully on and some fully off.
        for hue in 0..360 {
            let c = Color::from_hsv(hue as f32, 100.0, 100.0);
            let max = c.r().max(c.g()).max(c.b());
            let min = c.r().min(c.g()).min(c.b());
            assert!((max - 100.0).abs() < EPS, "hue {hue}: max {max}");
            assert!(min.abs() < EPS, "hue {hue}: min {min}");
        }
    }

    #[test]
    fn from_hsv_is_continuous_in_hue() {
        // One degree of hue moves a channel by at most 100/60 ≈ 1.67.
        let max_step = 100.0 / 60.0 + EPS;
        let mut prev = Color::from_hsv(0.0, 100.0, 100.0);
        for hue in 1..=360 {
            let next = Color::from_hsv(hue as f32, 100.0, 100.0);
            assert!(
                (next.r() - prev.r()).abs() <= max_step
                    && (next.g() - prev.g()).abs() <= max_step
                    && (next.b() - prev.b()).abs() <= max_step,
                "jump at hue {hue}: {prev:?} -> {next:?}"
            );
            prev = next;
        }
    }

    #[test]
    fn from_hsv_wraps_at_360() {
        assert_eq!(
            Color::from_hsv(360.0, 80.0, 50.0),
            Color::from_hsv(0.0, 80.0, 50.0)
        );
        assert_eq!(
            Color::from_hsv(450.0, 80.0, 50.0),
            Color::from_hsv(90.0, 80.0, 50.0)
        );
    }

    #[test]
    fn from_hsv_value_scales_brightness() {
        assert_rgb(Color::from_hsv(0.0, 100.0, 50.0), 50.0, 0.0, 0.0);
        assert_rgb(Color::from_hsv(0.0, 100.0, 0.0), 0.0, 0.0, 0.0);
    }
}
