//! *An explicit-stack execution engine for geodetic transformations*.
//!
//! Operators (projections, datum shifts, unit conversions...) are
//! configured from PROJ style definition strings, and chained into
//! pipelines. Execution never recurses natively: every delegation to
//! a sub-operation is a frame pushed onto a small, bounded stack of
//! resumable state machines, drained by a single loop.
//!
//! Failure is signalled by the error coordinate (all elements positive
//! infinity) plus an out-of-band error code, [`Errno`], kept by the
//! [`Context`](crate::prelude::Context).

mod context;
mod coordinate;
mod dispatch;
mod ellipsoid;
mod exec;
mod inner_op;
mod math;
mod op;
mod token;

/// The bread-and-butter, shrink-wrapped and ready to use
pub mod prelude {
    pub use crate::context::Context;
    pub use crate::context::Minimal;
    #[cfg(feature = "with_plain")]
    pub use crate::context::Plain;
    pub use crate::coordinate::coor2d::Coor2D;
    pub use crate::coordinate::coor3d::Coor3D;
    pub use crate::coordinate::coor4d::Coor4D;
    pub use crate::coordinate::AngularUnits;
    pub use crate::coordinate::CoordinateSet;
    pub use crate::ellipsoid::Ellipsoid;
    pub use crate::op::IoUnits;
    pub use crate::op::OpHandle;
    pub use crate::Direction;
    pub use crate::Direction::Fwd;
    pub use crate::Direction::Inv;
    pub use crate::Errno;
    pub use crate::Error;

    #[cfg(test)]
    pub use crate::test_data;
}

/// Preamble for authoring operators and context providers
pub mod authoring {
    pub use crate::prelude::*;

    pub use crate::context::apply_with_errno;
    pub use crate::context::step_definitions;
    pub use crate::context::step_of;
    pub use crate::context::trans_with_errno;

    pub use crate::dispatch::CoroutineId;
    pub use crate::dispatch::Fwd2dId;
    pub use crate::dispatch::Fwd3dId;
    pub use crate::dispatch::Inv2dId;
    pub use crate::dispatch::Inv3dId;
    pub use crate::dispatch::OperatorId;

    pub use crate::exec::Dispatched;
    pub use crate::exec::Workspace;
    pub use crate::exec::STACK_CAPACITY;
    pub use crate::exec::VALUE_STACK_CAPACITY;

    pub use crate::inner_op::OpConstructor;

    pub use crate::op::Auxiliary;
    pub use crate::op::Common;
    pub use crate::op::Op;
    pub use crate::op::OpDescriptor;
    pub use crate::op::OpParameter;
    pub use crate::op::ParsedParameters;
    pub use crate::op::RawParameters;
    pub use crate::op::Step;

    pub use crate::math::angular;
    pub use crate::token::Tokenize;

    pub use log::debug;
    pub use log::error;
    pub use log::info;
    pub use log::trace;
    pub use log::warn;

    pub use std::collections::BTreeMap;
    pub use std::collections::BTreeSet;
}

/// The low level execution entry points, for callers managing their own
/// [`Workspace`](crate::exec::Workspace)
pub mod execution {
    pub use crate::exec::fwd;
    pub use crate::exec::fwd3d;
    pub use crate::exec::fwd4d;
    pub use crate::exec::inv;
    pub use crate::exec::inv3d;
    pub use crate::exec::inv4d;
    pub use crate::exec::trans;
    pub use crate::exec::trans_2d;
    pub use crate::exec::trans_3d;
    pub use crate::exec::Dispatched;
    pub use crate::exec::Workspace;
    pub use crate::math::angular::adjlon;
}

/// The *Rust Geodesy* style error messaging, carried over to construction time
/// failures. Transformation time failures are reported through [`Errno`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("i/o error")]
    Io(#[from] std::io::Error),

    #[error("General error: '{0}'")]
    General(&'static str),

    #[error("Syntax error: '{0}'")]
    Syntax(String),

    #[error("{0}: {1}")]
    NotFound(String, String),

    #[error("Recursion too deep for {0}, at {1}")]
    Recursion(String, String),

    #[error("Attempt to invert a non-invertible item: {0}")]
    NonInvertible(String),

    #[error("Missing required parameter {0}")]
    MissingParam(String),

    #[error("Malformed value for parameter {0}: {1}")]
    BadParam(String, String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Unit mismatch between pipeline steps {0} and {1}")]
    UnitMismatch(String, String),

    #[error("Cannot construct operator: {0}")]
    Construction(String),
}

/// The error codes set by the execution machinery, retrievable from
/// the context after a transformation has returned the error coordinate
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Errno {
    #[error("invalid coordinate")]
    InvalidCoord,

    #[error("coordinate outside projection domain")]
    OutsideProjectionDomain,

    #[error("no such operation")]
    NoOperation,

    #[error("no inverse operation available")]
    NoInverseOp,

    #[error("execution stack capacity exceeded")]
    Capacity,
}

/// `Fwd`: Indicate that a two-way operator, function, or method,
/// should run in the *forward* direction.
/// `Inv`: Indicate that a two-way operator, function, or method,
/// should run in the *inverse* direction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Fwd,
    Inv,
}

impl Direction {
    #[must_use]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Fwd => Direction::Inv,
            Direction::Inv => Direction::Fwd,
        }
    }
}

// ----- T E S T   D A T A -------------------------------------------------------------


// ----- T E S T S ---------------------------------------------------------------------
