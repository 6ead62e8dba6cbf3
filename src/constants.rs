//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable.

/// Error message display duration in seconds before auto-dismiss.
pub const ERROR_TTL_SECS: u64 = 6;

/// Input poll timeout while idle, in milliseconds.
pub const IDLE_POLL_MS: u64 = 150;

/// Input poll timeout while requests are in flight or particles are moving.
/// Doubles as the animation tick.
pub const ACTIVE_POLL_MS: u64 = 33;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;

// === Particle effects ===

/// Particles spawned per burst.
pub const PARTICLE_COUNT: usize = 24;

/// A burst is cleared this long after it starts.
pub const PARTICLE_LIFETIME_MS: u64 = 900;

/// Downward acceleration in cells per second squared.
pub const GRAVITY: f32 = 30.0;

// === Layout ===

/// Maximum width of the card in columns.
pub const CARD_MAX_WIDTH: u16 = 72;

/// Maximum height of the card in lines.
pub const CARD_MAX_HEIGHT: u16 = 18;

/// Wrap width used when converting an email body to text.
pub const READER_TEXT_WIDTH: usize = 100;
