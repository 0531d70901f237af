//! Base-3 to base-4 payload packing.
//!
//! The payload of a command word is a base-3 numeral of twelve trits. Before
//! transmission it is repacked once into twelve two-bit slots so that the
//! per-symbol loop only needs a mask and a shift, never a division. The
//! conversion consumes the least significant trit first and pushes it in at
//! the low end of an accumulator that shifts left every step; the least
//! significant trit therefore ends up in the highest slot.
//!
//! ```text
//! payload trits (base 3):  d11 d10 ... d1 d0
//! packed slots:            slot11 = d0, ..., slot0 = d11
//! transmit order:          slot0 first  ->  d11 d10 ... d0
//! ```
//!
//! Payloads are 20 bits wide but twelve trits only reach `3^12 - 1`. The
//! packing keeps the lowest twelve trits and drops the rest, so a payload
//! is effectively reduced modulo [`TRIT_RANGE`].
//!
//! ```
//! use kaku_protocol::{PackedSymbols, Symbol};
//!
//! // 1 = trit d0 set, which is sent last.
//! let packed = PackedSymbols::pack(1);
//! let symbols: Vec<Symbol> = packed.symbols().collect();
//! assert_eq!(symbols[11], Symbol::One);
//! assert!(symbols[..11].iter().all(|s| *s == Symbol::Zero));
//! ```

use kaku_core::constants::{PAYLOAD_MASK, SYMBOL_BITS, SYMBOL_MASK, TRIT_COUNT, TRIT_RANGE};
use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// Twelve symbols packed into two-bit slots, slot 0 sent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedSymbols(u32);

impl PackedSymbols {
    /// Pack a payload (masked to 20 bits) into base-4 slots.
    #[must_use]
    pub fn pack(payload: u32) -> Self {
        let mut payload = payload & PAYLOAD_MASK;
        let mut packed = 0u32;

        for _ in 0..TRIT_COUNT {
            packed <<= SYMBOL_BITS;
            packed |= payload % 3;
            payload /= 3;
        }

        Self(packed)
    }

    /// Pack symbols given in transmit order.
    #[must_use]
    pub fn from_symbols(symbols: &[Symbol; TRIT_COUNT]) -> Self {
        let packed = symbols
            .iter()
            .enumerate()
            .fold(0u32, |acc, (slot, symbol)| {
                acc | (symbol.code() << (slot as u32 * SYMBOL_BITS))
            });
        Self(packed)
    }

    /// Raw packed accumulator.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Iterate the symbols in transmit order.
    #[must_use]
    pub fn symbols(&self) -> Symbols {
        Symbols {
            packed: self.0,
            remaining: TRIT_COUNT,
        }
    }

    /// Symbols in transmit order as an array.
    #[must_use]
    pub fn to_array(&self) -> [Symbol; TRIT_COUNT] {
        let mut symbols = [Symbol::Zero; TRIT_COUNT];
        for (slot, symbol) in symbols.iter_mut().zip(self.symbols()) {
            *slot = symbol;
        }
        symbols
    }

    /// Payload value these symbols encode, in `0..3^12`.
    ///
    /// For any 20-bit payload `p`, `PackedSymbols::pack(p).payload()` equals
    /// `p % 3^12`.
    #[must_use]
    pub fn payload(&self) -> u32 {
        let payload = self
            .symbols()
            .fold(0u32, |acc, symbol| acc * 3 + symbol.code());
        debug_assert!(payload < TRIT_RANGE);
        payload
    }
}

/// Iterator over packed symbols, slot 0 first.
#[derive(Debug, Clone)]
pub struct Symbols {
    packed: u32,
    remaining: usize,
}

impl Iterator for Symbols {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let code = self.packed & SYMBOL_MASK;
        self.packed >>= SYMBOL_BITS;

        // Packing only produces codes 0-2.
        Some(Symbol::from_code(code).unwrap_or(Symbol::Float))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Symbols {}
