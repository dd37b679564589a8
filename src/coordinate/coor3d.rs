use super::*;
use std::ops::{Index, IndexMut};

/// Generic 3D coordinate tuple: (λ, φ, h) or (x, y, z)
#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct Coor3D(pub [f64; 3]);

impl Index<usize> for Coor3D {
    type Output = f64;
    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

impl IndexMut<usize> for Coor3D {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.0[i]
    }
}

impl AngularUnits for Coor3D {
    #[must_use]
    fn to_radians(self) -> Self {
        Coor3D([self[0].to_radians(), self[1].to_radians(), self[2]])
    }

    #[must_use]
    fn to_degrees(self) -> Self {
        Coor3D([self[0].to_degrees(), self[1].to_degrees(), self[2]])
    }

    #[must_use]
    fn to_geo(self) -> Self {
        Coor3D([self[1].to_degrees(), self[0].to_degrees(), self[2]])
    }
}

impl Coor3D {
    /// A `Coor3D` from latitude/longitude/height, with the angular input in degrees
    #[must_use]
    pub fn geo(latitude: f64, longitude: f64, height: f64) -> Coor3D {
        Coor3D([longitude.to_radians(), latitude.to_radians(), height])
    }

    /// A `Coor3D` from longitude/latitude/height, with the angular input in degrees
    #[must_use]
    pub fn gis(longitude: f64, latitude: f64, height: f64) -> Coor3D {
        Coor3D([longitude.to_radians(), latitude.to_radians(), height])
    }

    #[must_use]
    pub fn raw(first: f64, second: f64, third: f64) -> Coor3D {
        Coor3D([first, second, third])
    }

    #[must_use]
    pub fn origin() -> Coor3D {
        Coor3D([0., 0., 0.])
    }

    #[must_use]
    pub fn error() -> Coor3D {
        Coor3D([HUGE, HUGE, HUGE])
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self[0] == HUGE
    }
}
