use crate::authoring::*;

mod cartesians;
mod latitudes;

/// Representation of a biaxial ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    a: f64,
    f: f64,
}

/// GRS80 is the default ellipsoid.
impl Default for Ellipsoid {
    fn default() -> Ellipsoid {
        Ellipsoid::new(6_378_137.0, 1. / 298.257_222_100_882_7)
    }
}

impl Ellipsoid {
    /// User defined ellipsoid
    #[must_use]
    pub fn new(semimajor_axis: f64, flattening: f64) -> Ellipsoid {
        Ellipsoid {
            a: semimajor_axis,
            f: flattening,
        }
    }

    /// User defined ellipsoid, given by its squared eccentricity
    #[must_use]
    pub fn from_eccentricity_squared(semimajor_axis: f64, es: f64) -> Ellipsoid {
        Ellipsoid::new(semimajor_axis, 1. - (1. - es).sqrt())
    }

    /// Predefined ellipsoid; built-in or defined in asset collections
    pub fn named(name: &str) -> Result<Ellipsoid, Error> {
        // Is it one of the few builtins?
        match name {
            "GRS80" => Ok(Ellipsoid::new(6_378_137.0, 1. / 298.257_222_100_882_7)),
            "WGS84" => Ok(Ellipsoid::new(6_378_137.0, 1. / 298.257_223_563)),
            "intl" => Ok(Ellipsoid::new(6_378_388.0, 1. / 297.0)),
            "Helmert" => Ok(Ellipsoid::new(6_378_200.0, 1. / 298.3)),
            "clrk66" => Ok(Ellipsoid::new(6_378_206.4, 1. / 294.978_698_2)),
            "clrk80" => Ok(Ellipsoid::new(6_378_249.145, 1. / 293.465)),
            "bessel" => Ok(Ellipsoid::new(6_377_397.155, 1. / 299.152_812_8)),
            "sphere" => Ok(Ellipsoid::new(6_370_997.0, 0.)),
            _ => Err(Error::NotFound(
                String::from(name),
                ": Ellipsoid".to_string(),
            )),
        }
    }

    // ----- Eccentricities --------------------------------------------------------

    /// The squared eccentricity *e² = (a² - b²) / a²*.
    #[must_use]
    pub fn eccentricity_squared(&self) -> f64 {
        self.f * (2_f64 - self.f)
    }

    /// The eccentricity *e*
    #[must_use]
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity_squared().sqrt()
    }

    /// The squared second eccentricity *e'² = (a² - b²) / b² = e² / (1 - e²)*
    #[must_use]
    pub fn second_eccentricity_squared(&self) -> f64 {
        let es = self.eccentricity_squared();
        es / (1.0 - es)
    }

    // ----- Axes and flattening ---------------------------------------------------

    /// The semimajor axis, *a*
    #[must_use]
    pub fn semimajor_axis(&self) -> f64 {
        self.a
    }

    /// The semiminor axis, *b*
    #[must_use]
    pub fn semiminor_axis(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// The flattening, *f = (a - b)/a*
    #[must_use]
    pub fn flattening(&self) -> f64 {
        self.f
    }

    // ----- Curvatures ------------------------------------------------------------

    /// The radius of curvature in the prime vertical, *N*
    #[must_use]
    pub fn prime_vertical_radius_of_curvature(&self, latitude: f64) -> f64 {
        if self.f == 0.0 {
            return self.a;
        }
        self.a / (1.0 - latitude.sin().powi(2) * self.eccentricity_squared()).sqrt()
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn shape_and_size() -> Result<(), Error> {
        let ellps = Ellipsoid::named("GRS80")?;
        assert_eq!(ellps, Ellipsoid::default());
        assert_eq!(ellps.semimajor_axis(), 6378137.0);
        assert_float_eq!(ellps.semiminor_axis(), 6_356_752.314_140_348, abs <= 1e-6);
        assert_float_eq!(ellps.eccentricity_squared(), 0.006_694_380_022_903_417, abs <= 1e-14);

        let from_es = Ellipsoid::from_eccentricity_squared(6378137.0, ellps.eccentricity_squared());
        assert_float_eq!(from_es.flattening(), ellps.flattening(), abs <= 1e-15);

        assert!(matches!(Ellipsoid::named("foo"), Err(Error::NotFound(_, _))));
        assert_eq!(Ellipsoid::named("sphere")?.eccentricity_squared(), 0.);
        Ok(())
    }

    #[test]
    fn curvatures() -> Result<(), Error> {
        let ellps = Ellipsoid::named("GRS80")?;
        assert_eq!(ellps.prime_vertical_radius_of_curvature(0.), 6378137.0);
        let n = ellps.prime_vertical_radius_of_curvature(90f64.to_radians());
        assert_float_eq!(n, 6_399_593.625_864_032, abs <= 1e-6);
        Ok(())
    }
}
