/// The exponential of the negated isometric latitude, exp(-𝜓), as
/// needed by the Mercator family. PROJ calls this `pj_tsfn`.
///
/// Takes the (sin 𝜙, cos 𝜙) pair of the geographic latitude and the
/// eccentricity, e. The branch on the sign of sin 𝜙 selects the
/// numerically stable form of exp(-asinh(tan 𝜙)).
pub fn ts(sincos: (f64, f64), e: f64) -> f64 {
    let factor = if sincos.0 > 0. {
        sincos.1 / (1. + sincos.0)
    } else {
        (1. - sincos.0) / sincos.1
    };
    (e * (e * sincos.0).atanh()).exp() * factor
}

/// The radius of the parallel at 𝜙, in units of the semimajor axis
/// (Snyder eq. 14-15, PROJ's `pj_msfn`)
pub fn pj_msfn(sincos: (f64, f64), es: f64) -> f64 {
    sincos.1 / (1. - sincos.0 * sincos.0 * es).sqrt()
}

/// Inverse of [`ts`]: the geographic latitude from exp(-𝜓)
pub fn pj_phi2(ts0: f64, e: f64) -> f64 {
    sinhpsi_to_tanphi((1. / ts0 - ts0) / 2., e).atan()
}

/// Newton iteration for tan 𝜙 given sinh 𝜓, after Karney (2011).
/// Converges in at most two iterations for all practical ellipsoids.
pub fn sinhpsi_to_tanphi(taup: f64, e: f64) -> f64 {
    const MAX_ITER: usize = 5;

    let rooteps: f64 = f64::EPSILON.sqrt();
    let tol: f64 = rooteps / 10.;
    let tmax: f64 = 2. / rooteps;

    let e2m = 1. - e * e;
    let stol = tol * taup.abs().max(1.0);

    // 70 corresponds to chi = 89.18 deg
    let mut tau = if taup.abs() > 70. {
        taup * (e * e.atanh()).exp()
    } else {
        taup / e2m
    };

    // +/-inf, nan, and e = 1
    if (tau.abs() >= tmax) || tau.is_nan() {
        return tau;
    }

    for _ in 0..MAX_ITER {
        let tau1 = (1. + tau * tau).sqrt();
        let sig = (e * (e * tau / tau1).atanh()).sinh();
        let taupa = (1. + sig * sig).sqrt() * tau - sig * tau1;
        let dtau =
            (taup - taupa) * (1. + e2m * (tau * tau)) / (e2m * tau1 * (1. + taupa * taupa).sqrt());
        tau += dtau;

        if (dtau.abs() < stol) || tau.is_nan() {
            return tau;
        }
    }
    f64::NAN
}

// ----- Tests ---------------------------------------------------------------------
