//! RGB status LED entry point.
//!
//! One process drives one pattern strategy on a single RGB LED: pick it
//! with the positional mode keyword. Without a recognized mode, clap
//! prints usage and exits before any GPIO is touched.
//!
//! ## Architecture
//! - **LedDriver**: owns the three PWM lines, released on every exit path
//! - **Pattern Engine**: the one blocking strategy loop for this process
//!
//! ## Usage
//! ```sh
//! ./target/release/rgb-status-rs voltage
//! ./target/release/rgb-status-rs cycle --red-pin 5
//! ```

#[cfg(not(feature = "hardware"))]
fn main() {
    eprintln!("This binary requires the 'hardware' feature (rppal).");
    eprintln!("Build with: cargo build --release");
    eprintln!("Tests can run without it: cargo test --no-default-features");
    std::process::exit(1);
}

#[cfg(feature = "hardware")]
fn main() {
    use clap::Parser;
    use rgb_status_rs::driver::LedDriver;
    use rgb_status_rs::{Mode, PinConfig, engine, setup_signal_handler};

    /// System-health RGB status LED
    #[derive(Parser)]
    #[command(name = "rgb-status-rs")]
    #[command(about = "Drive an RGB LED from live system-health signals")]
    #[command(version)]
    struct Args {
        /// Pattern strategy to run
        #[arg(value_enum)]
        mode: Mode,

        /// BCM pin driving the red channel
        #[arg(long, default_value = "17")]
        red_pin: u8,

        /// BCM pin driving the green channel
        #[arg(long, default_value = "27")]
        green_pin: u8,

        /// BCM pin driving the blue channel
        #[arg(long, default_value = "22")]
        blue_pin: u8,
    }

    // Initialize tracing subscriber for status logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();

    let args = Args::parse();
    let pins = PinConfig::new(args.red_pin, args.green_pin, args.blue_pin);

    tracing::info!("RGB status LED v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Pins (BCM): red={} green={} blue={}",
        pins.red,
        pins.green,
        pins.blue
    );
    tracing::info!("Mode: {:?}", args.mode);

    // The interrupt flag goes in before the lines are claimed, so a
    // Ctrl+C at any point afterwards still unwinds through shutdown.
    let running = setup_signal_handler();

    // Setup failure is fatal: nothing was fully acquired, so there is
    // nothing to clean up — report and exit.
    let driver = match LedDriver::new(pins) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to claim GPIO lines: {e}");
            std::process::exit(1);
        }
    };

    engine::run(args.mode, driver, &running);
}
