use crate::prelude::*;
pub mod coor2d;
pub mod coor3d;
pub mod coor4d;

/// Methods for changing the coordinate representation of angles.
/// Dimensionality untold, the methods operate on the first two
/// dimensions only.
pub trait AngularUnits {
    /// Transform the first two elements of a coordinate tuple from degrees to radians
    fn to_radians(self) -> Self;

    /// Transform the first two elements of a coordinate tuple from radians to degrees
    fn to_degrees(self) -> Self;

    /// Transform the internal lon/lat(/h/t)-in-radians to lat/lon(/h/t)-in-degrees
    fn to_geo(self) -> Self;
}

/// The positive infinity sentinel marking an undefined coordinate element.
/// Only the first element is inspected when checking for errors.
pub(crate) const HUGE: f64 = f64::INFINITY;

/// CoordinateSet is the fundamental coordinate access interface.
///
/// It is implemented simply as an accessor trait, that allows us to
/// access any user provided data model by iterating over its elements,
/// represented as a `Coor4D`. Missing dimensions read as 0.
pub trait CoordinateSet {
    /// Number of coordinate tuples in the set
    fn len(&self) -> usize;
    /// Access the `index`th coordinate tuple
    fn get_coord(&self, index: usize) -> Coor4D;
    /// Overwrite the `index`th coordinate tuple
    fn set_coord(&mut self, index: usize, value: &Coor4D);
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ----- CoordinateSet implementations for some Coor2D containers ------------

impl<const N: usize> CoordinateSet for [Coor2D; N] {
    fn len(&self) -> usize {
        N
    }
    fn get_coord(&self, index: usize) -> Coor4D {
        Coor4D([self[index][0], self[index][1], 0., 0.])
    }
    fn set_coord(&mut self, index: usize, value: &Coor4D) {
        self[index] = value.xy();
    }
}

impl CoordinateSet for Vec<Coor2D> {
    fn len(&self) -> usize {
        self.len()
    }
    fn get_coord(&self, index: usize) -> Coor4D {
        Coor4D([self[index][0], self[index][1], 0., 0.])
    }
    fn set_coord(&mut self, index: usize, value: &Coor4D) {
        self[index] = value.xy();
    }
}

// ----- CoordinateSet implementations for some Coor3D containers ------------

impl<const N: usize> CoordinateSet for [Coor3D; N] {
    fn len(&self) -> usize {
        N
    }
    fn get_coord(&self, index: usize) -> Coor4D {
        Coor4D([self[index][0], self[index][1], self[index][2], 0.])
    }
    fn set_coord(&mut self, index: usize, value: &Coor4D) {
        self[index] = value.xyz();
    }
}

impl CoordinateSet for Vec<Coor3D> {
    fn len(&self) -> usize {
        self.len()
    }
    fn get_coord(&self, index: usize) -> Coor4D {
        Coor4D([self[index][0], self[index][1], self[index][2], 0.])
    }
    fn set_coord(&mut self, index: usize, value: &Coor4D) {
        self[index] = value.xyz();
    }
}

// ----- CoordinateSet implementations for some Coor4D containers ------------

impl<const N: usize> CoordinateSet for [Coor4D; N] {
    fn len(&self) -> usize {
        N
    }
    fn get_coord(&self, index: usize) -> Coor4D {
        self[index]
    }
    fn set_coord(&mut self, index: usize, value: &Coor4D) {
        self[index] = *value;
    }
}

impl CoordinateSet for Vec<Coor4D> {
    fn len(&self) -> usize {
        self.len()
    }
    fn get_coord(&self, index: usize) -> Coor4D {
        self[index]
    }
    fn set_coord(&mut self, index: usize, value: &Coor4D) {
        self[index] = *value;
    }
}

// ----- T E S T S ---------------------------------------------------------------------
