//! The Pattern Engine: runs exactly one strategy loop, translating a
//! live scalar signal (or none) into `set_color` calls and sleeps.
//!
//! `run` is the single entry point. It executes the selected strategy
//! under an unwind boundary and then shuts the driver down whatever
//! happened, so every exit path — normal fall-through, user interrupt,
//! or a fault inside the loop body — ends with the LED off and the
//! lines released.
//!
//! ## Rust concepts
//! - `catch_unwind` as a loop-boundary fault barrier
//! - Closures (`impl FnMut`) to parameterize the shared monitor skeleton
//! - `while is_running(...)` + fixed sleeps for the animation cadence

use crate::driver::LedDriver;
use crate::mapping::{self, VoltageTier};
use crate::metrics;
use crate::{Color, Mode, is_running};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

// ── Cadence constants ──────────────────────────────────────────────

/// Idle rainbow: ~20 updates/s, one full hue revolution every 36 s.
const CYCLE_FRAME: Duration = Duration::from_millis(50);
const CYCLE_HUE_STEP: f32 = 0.5;
/// Gentle, not searing: moderate saturation at half brightness.
const CYCLE_SATURATION: f32 = 80.0;
const CYCLE_VALUE: f32 = 50.0;

/// Pause after applying a monitor sample. The CPU provider additionally
/// blocks for its own 500 ms sampling window.
const CPU_PAUSE: Duration = Duration::from_millis(500);
const MEMORY_PAUSE: Duration = Duration::from_secs(1);
const SYSTEM_PAUSE: Duration = Duration::from_secs(1);

/// Voltage alarm: liveness pulse halves, Good dwell, flash counts and
/// half-periods per tier (Critical flashes more and faster), and the
/// pause before the next sample.
const SAMPLING_PULSE: Duration = Duration::from_millis(100);
const GOOD_DWELL: Duration = Duration::from_secs(2);
const WARNING_FLASHES: u32 = 6;
const WARNING_HALF_PERIOD: Duration = Duration::from_millis(300);
const CRITICAL_FLASHES: u32 = 10;
const CRITICAL_HALF_PERIOD: Duration = Duration::from_millis(150);
const VOLTAGE_PAUSE: Duration = Duration::from_secs(1);

/// Self-test dwell per color.
const SELF_TEST_DWELL: Duration = Duration::from_millis(1500);

// ── Entry point ────────────────────────────────────────────────────

/// Run `mode` until its loop ends, then shut the driver down.
///
/// The driver moves in here and never leaves: scoped acquisition. The
/// `catch_unwind` boundary means even a fault inside a strategy routes
/// through the same `shutdown()` call as a clean stop — and `Drop` on
/// `LedDriver` backstops the path `catch_unwind` cannot cover.
pub fn run(mode: Mode, mut driver: LedDriver, running: &AtomicBool) {
    tracing::info!("Starting {mode:?} strategy");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match mode {
        Mode::Cycle => idle_cycle(&mut driver, running),
        Mode::Cpu => cpu_monitor(&mut driver, running),
        Mode::Memory => memory_monitor(&mut driver, running),
        Mode::System => system_monitor(&mut driver, running),
        Mode::Voltage => voltage_alarm(&mut driver, running),
        Mode::SelfTest => self_test(&mut driver, running),
    }));

    driver.shutdown();

    match outcome {
        Ok(()) => tracing::info!("LED off, GPIO lines released"),
        Err(_) => tracing::error!("Strategy aborted on a panic; LED off, GPIO lines released"),
    }
}

// ── Strategies ─────────────────────────────────────────────────────

/// Smooth rainbow sweep: advance the hue accumulator a little each
/// frame, wrapping at 360°. Runs until externally stopped.
fn idle_cycle(driver: &mut LedDriver, running: &AtomicBool) {
    tracing::info!("Rainbow cycle running (Ctrl+C to stop)");
    let mut hue = 0.0_f32;
    while is_running(running) {
        driver.set_color(Color::from_hsv(hue, CYCLE_SATURATION, CYCLE_VALUE));
        hue = (hue + CYCLE_HUE_STEP) % 360.0;
        thread::sleep(CYCLE_FRAME);
    }
}

/// Shared skeleton for the reactive monitors: sample, map, apply, pause.
/// Purely reactive — each iteration stands alone, no smoothing.
fn monitor_loop(
    driver: &mut LedDriver,
    running: &AtomicBool,
    pause: Duration,
    mut sample: impl FnMut() -> Color,
) {
    while is_running(running) {
        driver.set_color(sample());
        thread::sleep(pause);
    }
}

fn cpu_monitor(driver: &mut LedDriver, running: &AtomicBool) {
    tracing::info!("CPU monitor running: blue=low, green=medium, red=high");
    monitor_loop(driver, running, CPU_PAUSE, || {
        let pct = metrics::cpu_percent();
        let color = mapping::cpu_color(pct);
        log_sample("CPU", pct, color);
        color
    });
}

fn memory_monitor(driver: &mut LedDriver, running: &AtomicBool) {
    tracing::info!("Memory monitor running: green=low, orange=medium, red=high");
    monitor_loop(driver, running, MEMORY_PAUSE, || {
        let pct = metrics::memory_percent();
        let color = mapping::memory_color(pct);
        log_sample("Memory", pct, color);
        color
    });
}

/// Combined view: red tracks CPU, green tracks free memory, blue tracks
/// temperature.
fn system_monitor(driver: &mut LedDriver, running: &AtomicBool) {
    tracing::info!("System monitor running: red=CPU, green=free memory, blue=temperature");
    monitor_loop(driver, running, SYSTEM_PAUSE, || {
        let cpu = metrics::cpu_percent();
        let mem = metrics::memory_percent();
        let temp = metrics::cpu_temperature();
        tracing::info!(
            "CPU {cpu:5.1}% | memory {mem:5.1}% used | {temp:4.1} °C"
        );
        mapping::system_color(cpu, mem, temp)
    });
}

/// Tiered alarm: classify each fresh voltage sample and play the tier's
/// pattern — solid green dwell, yellow flashes, or faster red flashes.
fn voltage_alarm(driver: &mut LedDriver, running: &AtomicBool) {
    tracing::info!(
        "Voltage alarm running: green=good (>{} V), yellow=warning, red=critical (<={} V)",
        mapping::VOLTS_WARNING,
        mapping::VOLTS_CRITICAL
    );

    while is_running(running) {
        // Dim blue pulse: visible liveness while the slow vcgencmd
        // shell-out runs.
        driver.set_color(Color::new(0.0, 0.0, 50.0));
        thread::sleep(SAMPLING_PULSE);
        driver.set_color(Color::OFF);
        thread::sleep(SAMPLING_PULSE);

        let volts = metrics::core_voltage();
        let tier = VoltageTier::classify(volts);
        tracing::info!("Core voltage {volts:.3} V: {tier:?}");

        match tier {
            VoltageTier::Good => {
                driver.set_color(Color::new(0.0, 100.0, 0.0));
                thread::sleep(GOOD_DWELL);
            }
            VoltageTier::Warning => flash(
                driver,
                running,
                Color::new(100.0, 100.0, 0.0),
                WARNING_FLASHES,
                WARNING_HALF_PERIOD,
            ),
            VoltageTier::Critical => flash(
                driver,
                running,
                Color::new(100.0, 0.0, 0.0),
                CRITICAL_FLASHES,
                CRITICAL_HALF_PERIOD,
            ),
        }

        thread::sleep(VOLTAGE_PAUSE);
    }
}

/// Alternate `color` and off `count` times with equal on/off halves,
/// bailing early if the run flag clears mid-pattern.
fn flash(
    driver: &mut LedDriver,
    running: &AtomicBool,
    color: Color,
    count: u32,
    half_period: Duration,
) {
    for _ in 0..count {
        if !is_running(running) {
            return;
        }
        driver.set_color(color);
        thread::sleep(half_period);
        driver.set_color(Color::OFF);
        thread::sleep(half_period);
    }
}

/// Step through eight known colors once — a quick wiring check — then
/// fall out of the loop normally.
fn self_test(driver: &mut LedDriver, running: &AtomicBool) {
    const COLORS: [(&str, f32, f32, f32); 8] = [
        ("red", 100.0, 0.0, 0.0),
        ("green", 0.0, 100.0, 0.0),
        ("blue", 0.0, 0.0, 100.0),
        ("yellow", 100.0, 100.0, 0.0),
        ("magenta", 100.0, 0.0, 100.0),
        ("cyan", 0.0, 100.0, 100.0),
        ("white", 100.0, 100.0, 100.0),
        ("off", 0.0, 0.0, 0.0),
    ];

    for (name, r, g, b) in COLORS {
        if !is_running(running) {
            return;
        }
        tracing::info!("Test color: {name}");
        driver.set_color(Color::new(r, g, b));
        thread::sleep(SELF_TEST_DWELL);
    }
}

fn log_sample(label: &str, pct: f32, color: Color) {
    tracing::info!(
        "{label} {pct:5.1}% -> rgb({:.0}, {:.0}, {:.0})",
        color.r(),
        color.g(),
        color.b()
    );
}
