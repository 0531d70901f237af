pub mod builder;
pub mod packing;
pub mod symbol;
pub mod telegram;
pub mod transmitter;

pub use builder::CommandBuilder;
pub use packing::{PackedSymbols, Symbols};
pub use symbol::{Pulse, Symbol, TERMINATION, format_trits, parse_trits};
pub use telegram::{Telegram, TelegramSchedule, TimedPulse};
pub use transmitter::{Transmitter, transmit};
