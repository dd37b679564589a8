use std::f64::consts::{PI, TAU};

/// Reduce a longitude to the range ±π.
///
/// Values within π + 1e-12 are returned untouched, to avoid spurious
/// sign switching at the date line. Anything further out is reduced
/// by an integral number of revolutions.
#[must_use]
pub fn adjlon(longitude: f64) -> f64 {
    if longitude.abs() < PI + 1e-12 {
        return longitude;
    }

    // To 0..2π, remove whole revolutions, and back to ±π
    let mut lon = longitude + PI;
    lon -= TAU * (lon / TAU).floor();
    lon - PI
}

/// Convert an angle given in arc seconds to radians
#[must_use]
pub fn arcsec_to_radians(arcsec: f64) -> f64 {
    (arcsec / 3600.).to_radians()
}

// ----- Tests ---------------------------------------------------------------------
