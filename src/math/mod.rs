//! Miscellaneous math functions for general use

/// Free functions used in more than one module of the crate.
pub mod ancillary;

/// Free functions for handling and converting between
/// different representations of angles.
pub mod angular;
