//! Common test utilities for integration tests.
//!
//! Helpers here turn a command word into the flat `(level, hold)` list a
//! recording sink produces, and compute the expected list independently
//! from the transmitter by walking the documented pulse table.

#![allow(dead_code)]

use std::time::Duration;

use kaku_core::{CommandWord, Level};
use kaku_hardware::mock::RecordingSink;
use kaku_protocol::{PackedSymbols, Symbol, Transmitter};

/// Tolerance used by every helper.
pub const TOLERANCE: Duration = Duration::from_micros(50);

/// Transmit `raw` into a fresh recording sink.
pub fn record(raw: u32) -> RecordingSink {
    let mut sink = RecordingSink::new();
    Transmitter::new(TOLERANCE).transmit(CommandWord::new(raw), &mut sink);
    sink
}

/// Expected `(level, hold)` list for one symbol, straight from the table.
pub fn symbol_table(symbol: Symbol, period: Duration) -> [(Level, Duration); 4] {
    let (t, t3) = (period, period * 3);
    match symbol {
        Symbol::Zero => [
            (Level::High, t),
            (Level::Low, t3),
            (Level::High, t),
            (Level::Low, t3),
        ],
        Symbol::One => [
            (Level::High, t3),
            (Level::Low, t),
            (Level::High, t3),
            (Level::Low, t),
        ],
        Symbol::Float => [
            (Level::High, t),
            (Level::Low, t3),
            (Level::High, t3),
            (Level::Low, t),
        ],
    }
}

/// Expected `(level, hold)` list for a whole telegram.
pub fn expected_transitions(raw: u32) -> Vec<(Level, Duration)> {
    let command = CommandWord::new(raw);
    let period = command.period();
    let packed = PackedSymbols::pack(command.payload());

    let mut frame = Vec::new();
    for symbol in packed.symbols() {
        frame.extend(symbol_table(symbol, period));
    }
    frame.push((Level::High, period));
    frame.push((Level::Low, period * 31));

    frame.repeat(command.repeats())
}

/// Split a base-3 payload into trits, most significant first.
pub fn trits_msb_first(mut payload: u32) -> [u32; 12] {
    let mut trits = [0u32; 12];
    for slot in trits.iter_mut().rev() {
        *slot = payload % 3;
        payload /= 3;
    }
    trits
}
