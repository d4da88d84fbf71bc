//! Application layer - Port definitions.

/// Outbound port for record writes.
pub mod ports;
