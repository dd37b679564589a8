use super::*;

use std::f64::consts::FRAC_PI_2;

impl Ellipsoid {
    /// Geographic to geocentric latitude (`Fwd`), or the other way round (`Inv`).
    ///
    /// The tangent goes through the roof at the poles, so within the last
    /// centimetre of the poles the latitude is passed through unchanged.
    /// The two latitudes converge at the poles, so the difference is
    /// negligible. Likewise on the sphere, where they are identical.
    #[must_use]
    pub fn geocentric_latitude(&self, latitude: f64, direction: Direction) -> f64 {
        const LIMIT: f64 = FRAC_PI_2 - 1e-9;
        let es = self.eccentricity_squared();
        if latitude > LIMIT || latitude < -LIMIT || es == 0. {
            return latitude;
        }
        let one_es = 1. - es;
        match direction {
            Direction::Fwd => (one_es * latitude.tan()).atan(),
            Direction::Inv => (latitude.tan() / one_es).atan(),
        }
    }
}

// ----- Tests ---------------------------------------------------------------------
