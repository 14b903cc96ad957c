//! The PWM LED driver: sole owner of the three GPIO output lines.
//!
//! One `LedDriver` is built per process and handed to the single active
//! strategy loop. Construction claims all three lines or none; shutdown
//! is idempotent and also runs from `Drop`, so the LED cannot be left
//! lit (or mid-flash) on any exit path.
//!
//! The GPIO access itself sits behind the `hardware` feature, mirroring
//! how color logic is kept testable off-Pi: duty and release bookkeeping
//! goes through the private `PwmLine` seam, which tests stand in for.

use crate::Color;
#[cfg(feature = "hardware")]
use crate::PinConfig;

/// Software PWM carrier frequency for all three channels.
#[cfg(feature = "hardware")]
const PWM_FREQUENCY_HZ: f64 = 1000.0;

/// One PWM-driven output line.
trait PwmLine {
    /// Update the duty cycle (0–100 %).
    fn set_duty(&mut self, percent: f32);
    /// Stop PWM generation and force the line low.
    fn release(&mut self);
}

#[cfg(feature = "hardware")]
struct GpioLine(rppal::gpio::OutputPin);

#[cfg(feature = "hardware")]
impl PwmLine for GpioLine {
    fn set_duty(&mut self, percent: f32) {
        // Reconfiguring running software PWM does not normally fail; a
        // refused update is logged and skipped, never surfaced.
        let duty = f64::from(percent) / 100.0;
        if let Err(e) = self.0.set_pwm_frequency(PWM_FREQUENCY_HZ, duty) {
            tracing::debug!("PWM duty update refused: {e}");
        }
    }

    fn release(&mut self) {
        let _ = self.0.clear_pwm();
        self.0.set_low();
    }
}

/// Owns the red/green/blue PWM lines for the process lifetime.
pub struct LedDriver {
    red: Box<dyn PwmLine>,
    green: Box<dyn PwmLine>,
    blue: Box<dyn PwmLine>,
    released: bool,
}

impl LedDriver {
    /// Claim the three BCM lines and start 1 kHz PWM at 0 % duty on each.
    ///
    /// All-or-nothing: if any line cannot be claimed or configured, the
    /// `?` bails out, the lines already claimed drop, and rppal returns
    /// them to their previous state. There is no partially usable driver.
    #[cfg(feature = "hardware")]
    pub fn new(pins: PinConfig) -> Result<Self, Box<dyn std::error::Error>> {
        use rppal::gpio::Gpio;

        let gpio = Gpio::new()?;
        let claim = |bcm: u8| -> Result<Box<dyn PwmLine>, Box<dyn std::error::Error>> {
            let mut line = gpio.get(bcm)?.into_output();
            line.set_pwm_frequency(PWM_FREQUENCY_HZ, 0.0)?;
            Ok(Box::new(GpioLine(line)))
        };

        Ok(Self {
            red: claim(pins.red)?,
            green: claim(pins.green)?,
            blue: claim(pins.blue)?,
            released: false,
        })
    }

    #[cfg(test)]
    fn from_lines(red: Box<dyn PwmLine>, green: Box<dyn PwmLine>, blue: Box<dyn PwmLine>) -> Self {
        Self {
            red,
            green,
            blue,
            released: false,
        }
    }

    /// Apply a color: three sequential duty updates, red then green then
    /// blue. Infallible once the driver exists; momentary skew between
    /// the channels during the update is expected.
    pub fn set_color(&mut self, color: Color) {
        if self.released {
            return; // no-op once released
        }
        self.red.set_duty(color.r());
        self.green.set_duty(color.g());
        self.blue.set_duty(color.b());
    }

    /// Zero all duties, stop PWM, and drive the lines low. Safe to call
    /// any number of times; only the first call touches the hardware.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for line in [&mut self.red, &mut self.green, &mut self.blue] {
            line.set_duty(0.0);
            line.release();
        }
    }
}

/// # Rust concept: Drop
/// `Drop` runs when the value goes out of scope — including while a
/// panic unwinds the stack. Routing it through `shutdown()` makes
/// cleanup unconditional: normal return, interrupt, or fault all end
/// with the LED off and the lines released.
impl Drop for LedDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Tests ──────────────────────────────────────────────────────────
