use super::*;
use std::ops::{Add, Index, IndexMut, Sub};

/// Generic 4D coordinate tuple, with no fixed interpretation of the elements.
///
/// Depending on the unit system at hand, the elements are read as
/// (longitude, latitude, height, time) in radians, as cartesian (x, y, z, t),
/// or simply as `v[0..4]`. All views alias the same four numbers.
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct Coor4D(pub [f64; 4]);

// ----- O P E R A T O R   T R A I T S -------------------------------------------------

impl Index<usize> for Coor4D {
    type Output = f64;
    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl IndexMut<usize> for Coor4D {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.0[i]
    }
}

impl Add for Coor4D {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Coor4D([
            self.0[0] + other.0[0],
            self.0[1] + other.0[1],
            self.0[2] + other.0[2],
            self.0[3] + other.0[3],
        ])
    }
}

impl Sub for Coor4D {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Coor4D([
            self.0[0] - other.0[0],
            self.0[1] - other.0[1],
            self.0[2] - other.0[2],
            self.0[3] - other.0[3],
        ])
    }
}

// ----- A N G U L A R   U N I T S -------------------------------------------

impl AngularUnits for Coor4D {
    /// Transform the first two elements of a `Coor4D` from degrees to radians
    #[must_use]
    fn to_radians(self) -> Self {
        Coor4D::raw(self[0].to_radians(), self[1].to_radians(), self[2], self[3])
    }

    /// Transform the first two elements of a `Coor4D` from radians to degrees
    #[must_use]
    fn to_degrees(self) -> Self {
        Coor4D::raw(self[0].to_degrees(), self[1].to_degrees(), self[2], self[3])
    }

    /// Transform the internal lon/lat/h/t-in-radians to lat/lon/h/t-in-degrees
    #[must_use]
    fn to_geo(self) -> Self {
        Coor4D::raw(self[1].to_degrees(), self[0].to_degrees(), self[2], self[3])
    }
}

// ----- C O N S T R U C T O R S ---------------------------------------------

/// Constructors
impl Coor4D {
    /// A `Coor4D` from latitude/longitude/height/time, with the angular input in degrees
    #[must_use]
    pub fn geo(latitude: f64, longitude: f64, height: f64, time: f64) -> Coor4D {
        Coor4D([longitude.to_radians(), latitude.to_radians(), height, time])
    }

    /// A `Coor4D` from longitude/latitude/height/time, with the angular input in degrees
    #[must_use]
    pub fn gis(longitude: f64, latitude: f64, height: f64, time: f64) -> Coor4D {
        Coor4D([longitude.to_radians(), latitude.to_radians(), height, time])
    }

    /// A `Coor4D` from longitude/latitude/height/time, with the angular input in radians
    #[must_use]
    pub fn raw(first: f64, second: f64, third: f64, fourth: f64) -> Coor4D {
        Coor4D([first, second, third, fourth])
    }

    /// A `Coor4D` consisting of 4 `NaN`s
    #[must_use]
    pub fn nan() -> Coor4D {
        Coor4D([f64::NAN, f64::NAN, f64::NAN, f64::NAN])
    }

    /// A `Coor4D` consisting of 4 `0`s
    #[must_use]
    pub fn origin() -> Coor4D {
        Coor4D([0., 0., 0., 0.])
    }

    /// The error coordinate: All elements set to positive infinity
    #[must_use]
    pub fn error() -> Coor4D {
        Coor4D([HUGE, HUGE, HUGE, HUGE])
    }
}

// ----- V I E W S ---------------------------------------------------------------------

impl Coor4D {
    /// True if the first element carries the error sentinel
    #[must_use]
    pub fn is_error(&self) -> bool {
        self[0] == HUGE
    }

    /// The first two elements: (λ, φ) or (x, y)
    #[must_use]
    pub fn xy(&self) -> Coor2D {
        Coor2D([self[0], self[1]])
    }

    /// The first three elements: (λ, φ, h) or (x, y, z)
    #[must_use]
    pub fn xyz(&self) -> Coor3D {
        Coor3D([self[0], self[1], self[2]])
    }

    /// Overwrite the first two elements, leaving the rest untouched
    pub fn set_xy(&mut self, xy: Coor2D) {
        self[0] = xy[0];
        self[1] = xy[1];
    }

    /// Overwrite the first three elements, leaving the time untouched
    pub fn set_xyz(&mut self, xyz: Coor3D) {
        self[0] = xyz[0];
        self[1] = xyz[1];
        self[2] = xyz[2];
    }

    /// Euclidean distance between two points in the plane
    #[must_use]
    pub fn hypot2(&self, other: &Self) -> f64 {
        (self[0] - other[0]).hypot(self[1] - other[1])
    }

    /// Euclidean distance between two points in the 3D space.
    #[must_use]
    pub fn hypot3(&self, other: &Self) -> f64 {
        (self[0] - other[0])
            .hypot(self[1] - other[1])
            .hypot(self[2] - other[2])
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coor4d() {
        let c = Coor4D::raw(12., 55., 100., 0.).to_radians();
        let d = Coor4D::gis(12., 55., 100., 0.);
        assert_eq!(c, d);
        assert_eq!(d[0], 12f64.to_radians());
        let e = d.to_degrees();
        assert_eq!(e[0], c.to_degrees()[0]);
        assert_eq!(Coor4D::geo(55., 12., 100., 0.), d);
        assert_eq!(d.to_geo()[0], 55.);

        assert!(Coor4D::error().is_error());
        assert!(!Coor4D::nan().is_error());
        assert_eq!(Coor4D::raw(0., 0., 7., 0.).hypot2(&Coor4D::raw(3., 4., 0., 0.)), 5.);
        assert!(!Coor4D::origin().is_error());
    }

    #[test]
    fn views() {
        let mut c = Coor4D::raw(1., 2., 3., 4.);
        assert_eq!(c.xy(), Coor2D::raw(1., 2.));
        assert_eq!(c.xyz(), Coor3D::raw(1., 2., 3.));
        c.set_xy(Coor2D::raw(5., 6.));
        assert_eq!(c, Coor4D::raw(5., 6., 3., 4.));
        c.set_xyz(Coor3D::raw(7., 8., 9.));
        assert_eq!(c, Coor4D::raw(7., 8., 9., 4.));
        assert_eq!(c - Coor4D::raw(7., 8., 9., 4.), Coor4D::origin());
        assert_eq!(Coor4D::origin() + c, c);
        assert_eq!(c.hypot3(&Coor4D::raw(7., 8., 0., 0.)), 9.);
    }
}
