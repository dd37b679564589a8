use super::*;
use std::ops::{Index, IndexMut};

/// Generic 2D coordinate tuple: (λ, φ) or (x, y)
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct Coor2D(pub [f64; 2]);

impl Index<usize> for Coor2D {
    type Output = f64;
    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl IndexMut<usize> for Coor2D {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.0[i]
    }
}

impl AngularUnits for Coor2D {
    #[must_use]
    fn to_radians(self) -> Self {
        Coor2D([self[0].to_radians(), self[1].to_radians()])
    }

    #[must_use]
    fn to_degrees(self) -> Self {
        Coor2D([self[0].to_degrees(), self[1].to_degrees()])
    }

    #[must_use]
    fn to_geo(self) -> Self {
        Coor2D([self[1].to_degrees(), self[0].to_degrees()])
    }
}

impl Coor2D {
    /// A `Coor2D` from latitude/longitude in degrees
    #[must_use]
    pub fn geo(latitude: f64, longitude: f64) -> Coor2D {
        Coor2D([longitude.to_radians(), latitude.to_radians()])
    }

    /// A `Coor2D` from longitude/latitude in degrees
    #[must_use]
    pub fn gis(longitude: f64, latitude: f64) -> Coor2D {
        Coor2D([longitude.to_radians(), latitude.to_radians()])
    }

    #[must_use]
    pub fn raw(first: f64, second: f64) -> Coor2D {
        Coor2D([first, second])
    }

    #[must_use]
    pub fn origin() -> Coor2D {
        Coor2D([0., 0.])
    }

    #[must_use]
    pub fn error() -> Coor2D {
        Coor2D([HUGE, HUGE])
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self[0] == HUGE
    }
}
