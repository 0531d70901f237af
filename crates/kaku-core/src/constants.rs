//! Core constants for the KaKu telegram format.
//!
//! This module defines the bit layout of a command word, the timing shape of
//! a transmitted frame, and the defaults of the device front-end. Everything
//! that touches the wire format refers to these values instead of repeating
//! the literals.
//!
//! # Command Word Layout
//!
//! A command word is a 32-bit unsigned integer, read from the least
//! significant bit upward:
//!
//! ```text
//!  31             23 22   20 19                                0
//! +-----------------+-------+-----------------------------------+
//! |   period (us)   |  rep  |   payload (12 trits, base 3)      |
//! +-----------------+-------+-----------------------------------+
//!        9 bits      3 bits              20 bits
//! ```
//!
//! # Frame Shape
//!
//! One frame carries 12 symbols of 4 transitions each, followed by a 2
//! transition termination gap. A telegram sends the frame `2^rep` times.
//!
//! ```
//! use kaku_core::constants::*;
//!
//! assert_eq!(TRANSITIONS_PER_FRAME, 50);
//! assert_eq!(MAX_REPEATS * TRANSITIONS_PER_FRAME, 6400);
//! ```

// ============================================================================
// Command Word Layout
// ============================================================================

/// Number of payload bits at the bottom of a command word.
pub const PAYLOAD_BITS: u32 = 20;

/// Mask selecting the payload bits.
pub const PAYLOAD_MASK: u32 = (1 << PAYLOAD_BITS) - 1;

/// Bit offset of the repeat exponent.
pub const REPEAT_SHIFT: u32 = 20;

/// Mask applied to the repeat exponent after shifting.
///
/// Three bits give exponents 0-7, so a telegram is sent 1 to 128 times.
pub const REPEAT_MASK: u32 = 0x7;

/// Bit offset of the period field.
///
/// The period occupies the remaining 9 bits, so no mask is needed after the
/// shift.
pub const PERIOD_SHIFT: u32 = 23;

/// Largest representable period in microseconds.
pub const MAX_PERIOD_US: u32 = u32::MAX >> PERIOD_SHIFT;

/// Largest repeat exponent.
pub const MAX_REPEAT_EXPONENT: u8 = REPEAT_MASK as u8;

/// Largest repeat count (`2^7`).
pub const MAX_REPEATS: usize = 1 << MAX_REPEAT_EXPONENT;

// ============================================================================
// Trit Encoding
// ============================================================================

/// Number of trits carried by a telegram.
pub const TRIT_COUNT: usize = 12;

/// Width of one packed symbol slot in bits.
pub const SYMBOL_BITS: u32 = 2;

/// Mask selecting one packed symbol slot.
pub const SYMBOL_MASK: u32 = (1 << SYMBOL_BITS) - 1;

/// Number of distinct payload values 12 trits can carry (`3^12`).
///
/// Payloads are 20 bits wide, which exceeds this range. The packing keeps
/// only the lowest 12 trits, so a payload is effectively taken modulo this
/// value.
///
/// ```
/// use kaku_core::constants::{PAYLOAD_MASK, TRIT_RANGE};
///
/// assert_eq!(TRIT_RANGE, 531_441);
/// assert!(PAYLOAD_MASK > TRIT_RANGE);
/// ```
pub const TRIT_RANGE: u32 = 3u32.pow(TRIT_COUNT as u32);

// ============================================================================
// Frame Timing
// ============================================================================

/// Line transitions emitted for each symbol.
pub const TRANSITIONS_PER_SYMBOL: usize = 4;

/// Line transitions of the termination gap.
pub const TERMINATION_TRANSITIONS: usize = 2;

/// Line transitions in one frame (12 symbols plus termination gap).
pub const TRANSITIONS_PER_FRAME: usize =
    TRIT_COUNT * TRANSITIONS_PER_SYMBOL + TERMINATION_TRANSITIONS;

/// Period units held by every symbol (`1 + 3 + 1 + 3` or `3 + 1 + 3 + 1`).
pub const PERIODS_PER_SYMBOL: u32 = 8;

/// Period units of the termination gap (`1` high, `31` low).
pub const TERMINATION_PERIODS: u32 = 32;

/// Period units of the low half of the termination gap.
pub const TERMINATION_LOW_PERIODS: u32 = TERMINATION_PERIODS - 1;

/// Period units of one full frame.
pub const PERIODS_PER_FRAME: u32 = TRIT_COUNT as u32 * PERIODS_PER_SYMBOL + TERMINATION_PERIODS;

/// Default timing tolerance around each nominal hold (microseconds).
///
/// A hold may end up to this much early to absorb host scheduling slack
/// without upsetting the receiver's short/long pulse discrimination.
pub const DEFAULT_TOLERANCE_US: u64 = 50;

/// Largest tolerance the device accepts (microseconds).
///
/// The transmitter additionally caps the tolerance at half the period unit
/// of each telegram, so short periods keep their pulse shape.
pub const MAX_TOLERANCE_US: u64 = 1000;

// ============================================================================
// Device Front-End
// ============================================================================

/// Exact number of bytes a write must carry.
pub const COMMAND_LEN: usize = 4;

/// Device name used in logs and by the CLI.
pub const DEVICE_NAME: &str = "kakudev";

/// Default output line (GPIO 134, the OMAP pin the transmitter is wired to).
pub const DEFAULT_LINE: u32 = 134;

/// Default sysfs GPIO root.
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_covers_word() {
        assert_eq!(PAYLOAD_BITS + 3 + (32 - PERIOD_SHIFT), 32);
        assert_eq!(MAX_PERIOD_US, 0x1FF);
        assert_eq!(REPEAT_SHIFT + 3, PERIOD_SHIFT);
    }

    #[test]
    fn test_frame_constants() {
        assert_eq!(TRANSITIONS_PER_FRAME, 50);
        assert_eq!(PERIODS_PER_FRAME, 128);
        assert_eq!(MAX_REPEATS, 128);
    }
}
