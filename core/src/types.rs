//! Shared primitive types used across the entire core.

/// A user key. The transport identifies users by WhatsApp phone number.
pub type Phone = String;

/// A financial-literacy week (1..=15).
pub type Week = u8;

/// A rupiah amount. User figures are whole rupiah carried as f64,
/// matching the repayment-capacity arithmetic.
pub type Rupiah = f64;
