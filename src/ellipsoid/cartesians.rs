use super::*;

use std::f64::consts::FRAC_PI_2;

impl Ellipsoid {
    // ----- Cartesian <--> Geographic conversion ----------------------------------

    /// Geographic (λ, φ, h) in radians and metres, to cartesian (X, Y, Z).
    /// The fourth element is passed through.
    #[must_use]
    #[allow(non_snake_case)]
    pub fn cartesian(&self, geographic: &Coor4D) -> Coor4D {
        let lam = geographic[0];
        let phi = geographic[1];
        let h = geographic[2];
        let t = geographic[3];

        let N = self.prime_vertical_radius_of_curvature(phi);
        let (sinphi, cosphi) = phi.sin_cos();
        let (sinlam, coslam) = lam.sin_cos();

        let X = (N + h) * cosphi * coslam;
        let Y = (N + h) * cosphi * sinlam;
        let Z = (N * (1.0 - self.eccentricity_squared()) + h) * sinphi;

        Coor4D::raw(X, Y, Z, t)
    }

    /// Cartesian to geographic conversion, following Fukushima (2006)
    /// with Claessens' (2019) refinements
    #[must_use]
    #[allow(non_snake_case)]
    pub fn geographic(&self, cartesian: &Coor4D) -> Coor4D {
        let X = cartesian[0];
        let Y = cartesian[1];
        let Z = cartesian[2];
        let t = cartesian[3];

        // eccentricity squared, Fukushima's E, Claessens' c3 = 1-c2`
        let es = self.eccentricity_squared();
        let a = self.semimajor_axis();
        let b = self.semiminor_axis();
        let ra = 1. / a;

        // b/a: Fukushima's ec, Claessens' c4
        let ar = b * ra;
        // 1.5 times the fourth power of the eccentricity
        let ce4 = 1.5 * es * es;
        // if we're closer than this to the Z axis, we force latitude to one of the poles
        let cutoff = a * 1e-16;

        let lam = Y.atan2(X);
        let p = X.hypot(Y);

        // Close to the Z-axis the full algorithm breaks down, but there
        // the latitude is close to one of the poles anyway
        if p < cutoff {
            let phi = FRAC_PI_2.copysign(Z);
            let h = Z.abs() - b;
            return Coor4D::raw(lam, phi, h, t);
        }

        let P = ra * p;
        let S0 = ra * Z;
        let C0 = ar * P;

        let A = S0.hypot(C0);
        let F = P * A * A * A - es * C0 * C0 * C0;
        let B = ce4 * S0 * S0 * C0 * C0 * P * (A - ar);

        let S1 = (ar * S0 * A * A * A + es * S0 * S0 * S0) * F - B * S0;
        let C1 = F * F - B * C0;
        let CC = ar * C1;

        let phi = S1.atan2(CC);
        let h = (p * CC.abs() + Z.abs() * S1.abs() - a * CC.hypot(ar * S1)) / CC.hypot(S1);
        Coor4D::raw(lam, phi, h, t)
    }
}

// ----- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let ellps = Ellipsoid::named("GRS80")?;
        let geo = Coor4D::geo(55., 12., 100., 0.);
        let cart = ellps.cartesian(&geo);
        let back = ellps.geographic(&cart);
        assert!((back[0] - geo[0]).abs() < 1e-12);
        assert!((back[1] - geo[1]).abs() < 1e-12);
        assert!((back[2] - geo[2]).abs() < 1e-6);

        // On the equator, at the prime meridian, X is the semimajor axis
        let cart = ellps.cartesian(&Coor4D::origin());
        assert_eq!(cart, Coor4D::raw(6378137., 0., 0., 0.));

        // And at the pole, we get the semiminor axis
        let pole = ellps.geographic(&Coor4D::raw(0., 0., ellps.semiminor_axis() + 10., 0.));
        assert_eq!(pole[1], FRAC_PI_2);
        assert!((pole[2] - 10.).abs() < 1e-9);
        Ok(())
    }
}
