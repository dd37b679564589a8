//! The execution engine.
//!
//! Transformations never recurse natively. Each routine that needs to
//! delegate to a sub-operation (the prepare/finalize stages, the dimension
//! drivers, and the pipeline coroutines) is a resumable state machine. To
//! delegate, it records where to resume, and hands a child [`Frame`] back
//! to the scheduler, which pushes it onto a small, bounded stack. When the
//! child completes, its coordinate is copied into the parent, which is then
//! resumed. A failure anywhere clears the entire stack.
//!
//! Numeric kernels (the actual projection/transformation formulae) never
//! delegate, and are run inline through the [dispatcher](crate::dispatch).

use crate::authoring::*;

mod driver;
mod stack;
mod stages;

pub(crate) use stack::{Frame, Resume};

/// Maximum depth of the execution stack
pub const STACK_CAPACITY: usize = 16;

/// Capacity of each of the four value stacks of a pipeline
pub const VALUE_STACK_CAPACITY: usize = 128;

// ----- R O U T I N E S ---------------------------------------------------------------

/// Dimensionality of a dimension driver or pipeline coroutine
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Dim {
    D2,
    D3,
    D4,
}

/// Resume points of the forward prepare stage
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum FwdPrepare {
    Start,
    AfterHgridshift,
    AfterCartWgs84,
    AfterHelmert,
    AfterCart,
    AfterVgridshift,
    AfterCartesianHelmert,
}

/// Resume points of the forward finalize stage
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum FwdFinalize {
    Start,
    AfterCart,
    AfterAxisswap,
}

/// Resume points of the inverse prepare stage
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum InvPrepare {
    Start,
    AfterAxisswap,
    AfterCart,
}

/// Resume points of the inverse finalize stage
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum InvFinalize {
    Start,
    AfterVgridshift,
    AfterHgridshift,
    AfterCart,
    AfterHelmert,
    AfterCartWgs84,
}

/// Resume points of the dimension drivers
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum DriverAt {
    Start,
    Prepared,
    Transformed,
    Finalized,
}

/// Resume points of the pipeline coroutines: before the first step, or
/// after delegating to the step with the given index
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum PipelineAt {
    Start,
    Resumed(usize),
}

/// The resumable routines, each with its resume point and private scratch
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Routine {
    FwdPrepare(FwdPrepare),
    FwdFinalize(FwdFinalize),
    InvPrepare(InvPrepare),
    InvFinalize(InvFinalize),
    Driver {
        direction: Direction,
        dim: Dim,
        at: DriverAt,
        last_errno: Option<Errno>,
    },
    Pipeline {
        direction: Direction,
        dim: Dim,
        at: PipelineAt,
    },
}

// ----- W O R K S P A C E -------------------------------------------------------------

/// What the dispatcher was asked to run. Recorded by traced workspaces.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Dispatched {
    Fwd2d(Fwd2dId),
    Inv2d(Inv2dId),
    Fwd3d(Fwd3dId),
    Inv3d(Inv3dId),
    Operator(OperatorId),
    Coroutine(CoroutineId),
}

/// The four bounded value stacks of a running pipeline, used by the
/// `push` and `pop` operators to stash coordinate elements
#[derive(Debug, Default)]
pub(crate) struct ValueStacks([Vec<f64>; 4]);

impl ValueStacks {
    /// Silently ignored when full
    pub fn push(&mut self, index: usize, value: f64) {
        let stack = &mut self.0[index];
        if stack.len() < VALUE_STACK_CAPACITY {
            stack.push(value);
        }
    }

    pub fn pop(&mut self, index: usize) -> Option<f64> {
        self.0[index].pop()
    }
}

/// The mutable state of one logical transformation call: the error code
/// slot, the value stacks of the pipelines currently running, and an
/// optional trace of the kernels dispatched.
///
/// A `Workspace` is not shared between concurrent calls. The contexts
/// create one per call to `apply`/`trans`, seeded with (and afterwards
/// returning) their own error code.
#[derive(Debug, Default)]
pub struct Workspace {
    errno: Option<Errno>,
    pub(crate) stacks: Vec<ValueStacks>,
    trace: Option<Vec<Dispatched>>,
}

impl Workspace {
    /// A workspace carrying over the error code of an earlier call
    pub fn new(errno: Option<Errno>) -> Workspace {
        Workspace {
            errno,
            ..Default::default()
        }
    }

    /// A workspace recording the dispatch of every kernel and coroutine
    pub fn traced(errno: Option<Errno>) -> Workspace {
        Workspace {
            errno,
            trace: Some(Vec::new()),
            ..Default::default()
        }
    }

    pub fn errno(&self) -> Option<Errno> {
        self.errno
    }

    pub fn set_errno(&mut self, errno: Errno) {
        self.errno = Some(errno);
    }

    /// Clear the error code, returning its former value
    pub fn reset_errno(&mut self) -> Option<Errno> {
        self.errno.take()
    }

    pub(crate) fn restore_errno(&mut self, errno: Option<Errno>) {
        self.errno = errno;
    }

    /// The dispatches recorded so far (empty unless traced)
    pub fn trace(&self) -> &[Dispatched] {
        self.trace.as_deref().unwrap_or_default()
    }

    pub(crate) fn record(&mut self, what: Dispatched) {
        if let Some(trace) = &mut self.trace {
            trace.push(what);
        }
    }
}

// ----- E N T R Y   P O I N T S -------------------------------------------------------

fn execute(op: &Op, direction: Direction, dim: Dim, coord: Coor4D, ws: &mut Workspace) -> Coor4D {
    stack::run(Frame::driver(op, direction, dim, coord), ws)
}

/// The 2D forward driver. Does not take operator inversion into account.
pub fn fwd(op: &Op, coord: Coor2D, ws: &mut Workspace) -> Coor2D {
    let coord = Coor4D::raw(coord[0], coord[1], 0., 0.);
    execute(op, Fwd, Dim::D2, coord, ws).xy()
}

/// The 2D inverse driver. Does not take operator inversion into account.
pub fn inv(op: &Op, coord: Coor2D, ws: &mut Workspace) -> Coor2D {
    let coord = Coor4D::raw(coord[0], coord[1], 0., 0.);
    execute(op, Inv, Dim::D2, coord, ws).xy()
}

/// The 3D forward driver. Does not take operator inversion into account.
pub fn fwd3d(op: &Op, coord: Coor3D, ws: &mut Workspace) -> Coor3D {
    let coord = Coor4D::raw(coord[0], coord[1], coord[2], 0.);
    execute(op, Fwd, Dim::D3, coord, ws).xyz()
}

/// The 3D inverse driver. Does not take operator inversion into account.
pub fn inv3d(op: &Op, coord: Coor3D, ws: &mut Workspace) -> Coor3D {
    let coord = Coor4D::raw(coord[0], coord[1], coord[2], 0.);
    execute(op, Inv, Dim::D3, coord, ws).xyz()
}

/// The 4D forward driver. Does not take operator inversion into account.
pub fn fwd4d(op: &Op, coord: Coor4D, ws: &mut Workspace) -> Coor4D {
    execute(op, Fwd, Dim::D4, coord, ws)
}

/// The 4D inverse driver. Does not take operator inversion into account.
pub fn inv4d(op: &Op, coord: Coor4D, ws: &mut Workspace) -> Coor4D {
    execute(op, Inv, Dim::D4, coord, ws)
}

/// Apply `op` in `direction`, taking inversion into account, and
/// preferring the highest dimensional implementation available
pub fn trans(op: &Op, direction: Direction, coord: Coor4D, ws: &mut Workspace) -> Coor4D {
    stack::run(Frame::trans(op, direction, Dim::D4, coord), ws)
}

/// As [`trans`], but preferring the 2D implementation. Height and time
/// are zeroed in the result.
pub fn trans_2d(op: &Op, direction: Direction, coord: Coor4D, ws: &mut Workspace) -> Coor4D {
    let mut result = stack::run(Frame::trans(op, direction, Dim::D2, coord), ws);
    result[2] = 0.;
    result[3] = 0.;
    result
}

/// As [`trans`], but preferring the 3D implementation. Time is zeroed
/// in the result.
pub fn trans_3d(op: &Op, direction: Direction, coord: Coor4D, ws: &mut Workspace) -> Coor4D {
    let mut result = stack::run(Frame::trans(op, direction, Dim::D3, coord), ws);
    result[3] = 0.;
    result
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn workspace() {
        let mut ws = Workspace::new(Some(Errno::InvalidCoord));
        assert_eq!(ws.errno(), Some(Errno::InvalidCoord));
        assert_eq!(ws.reset_errno(), Some(Errno::InvalidCoord));
        assert_eq!(ws.errno(), None);
        ws.record(Dispatched::Operator(OperatorId::Noop));
        assert!(ws.trace().is_empty());

        let mut stacks = ValueStacks::default();
        for i in 0..VALUE_STACK_CAPACITY + 10 {
            stacks.push(2, i as f64);
        }
        assert_eq!(stacks.pop(2), Some((VALUE_STACK_CAPACITY - 1) as f64));
        assert_eq!(stacks.pop(0), None);
    }

    #[test]
    fn drivers() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=addone", &ctx)?;
        let mut ws = Workspace::new(None);

        assert_eq!(fwd(&op, Coor2D::raw(1., 2.), &mut ws), Coor2D::raw(2., 2.));
        assert_eq!(inv(&op, Coor2D::raw(1., 2.), &mut ws), Coor2D::raw(0., 2.));
        assert_eq!(fwd3d(&op, Coor3D::raw(1., 2., 3.), &mut ws), Coor3D::raw(2., 2., 3.));
        assert_eq!(inv3d(&op, Coor3D::raw(1., 2., 3.), &mut ws), Coor3D::raw(0., 2., 3.));
        let c = Coor4D::raw(1., 2., 3., 4.);
        assert_eq!(fwd4d(&op, c, &mut ws), Coor4D::raw(2., 2., 3., 4.));
        assert_eq!(inv4d(&op, c, &mut ws), Coor4D::raw(0., 2., 3., 4.));

        // The approximating entry points zero the unused dimensions
        assert_eq!(trans_2d(&op, Fwd, c, &mut ws), Coor4D::raw(2., 2., 0., 0.));
        assert_eq!(trans_3d(&op, Fwd, c, &mut ws), Coor4D::raw(2., 2., 3., 0.));
        assert_eq!(ws.errno(), None);

        // The raw drivers ignore inversion, while trans does not
        let op = Op::new("proj=addone inv", &ctx)?;
        assert_eq!(fwd4d(&op, c, &mut ws), Coor4D::raw(2., 2., 3., 4.));
        assert_eq!(trans(&op, Fwd, c, &mut ws), Coor4D::raw(0., 2., 3., 4.));
        Ok(())
    }

    #[test]
    fn projection() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=merc lon_0=9 x_0=500000 units=km", &ctx)?;
        let mut ws = Workspace::new(None);

        let geo = Coor2D::gis(12., 55.);
        let projected = fwd(&op, geo, &mut ws);
        // Central meridian, false easting and units are handled by the stages
        assert!(projected[0] > 500. && projected[0] < 1000.);
        let back = inv(&op, projected, &mut ws);
        assert_float_eq!(back.0, geo.0, abs_all <= 1e-12);
        assert_eq!(ws.errno(), None);
        Ok(())
    }
}
