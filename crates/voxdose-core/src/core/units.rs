//! The engine's internal unit convention.
//!
//! Lengths are millimeters and mass densities are g/cm³. Input files carry
//! their values in these same physical units, so the conversion factors are
//! unity, but every boundary that reads external data multiplies through them
//! so the convention is applied in exactly one place per quantity.

/// Millimeters per internal length unit.
pub const MM: f64 = 1.0;

/// Internal mass-density units per g/cm³.
pub const G_PER_CM3: f64 = 1.0;

/// Converts a density given in g/cm³ to internal units. Applied once, at read.
#[inline]
pub fn density_from_g_per_cm3(value: f64) -> f64 {
    value * G_PER_CM3
}

/// Converts an internal density back to g/cm³ for external outputs.
#[inline]
pub fn density_to_g_per_cm3(value: f64) -> f64 {
    value / G_PER_CM3
}

/// Converts a length given in mm to internal units. Applied once, at read.
#[inline]
pub fn length_from_mm(value: f64) -> f64 {
    value * MM
}
