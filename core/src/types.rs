//! Shared primitive types used across the entire draw engine.

/// Milliseconds on the reveal clock.
pub type Millis = u64;

/// Stable identifier of a catalog item.
pub type ItemId = String;

/// Stable identifier of a player profile.
pub type ProfileId = String;

/// Identifier of a persisted inventory grant.
pub type GrantId = String;
