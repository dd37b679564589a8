//! The dimension drivers: prepare, transform through the most fitting
//! implementation available, and finalize.

use super::*;
use crate::coordinate::HUGE;
use crate::dispatch;

/// The implementations to try, in order of preference, for a driver of
/// the given dimensionality
fn preference(dim: Dim) -> [Dim; 3] {
    match dim {
        Dim::D2 => [Dim::D2, Dim::D3, Dim::D4],
        Dim::D3 => [Dim::D3, Dim::D4, Dim::D2],
        Dim::D4 => [Dim::D4, Dim::D3, Dim::D2],
    }
}

/// Is a kernel of dimensionality `dim` available, and which coroutine (if any)?
fn slots(desc: &OpDescriptor, direction: Direction, dim: Dim) -> (bool, CoroutineId) {
    match (direction, dim) {
        (Fwd, Dim::D2) => (desc.fwd.is_valid(), desc.co_fwd),
        (Inv, Dim::D2) => (desc.inv.is_valid(), desc.co_inv),
        (Fwd, Dim::D3) => (desc.fwd3d.is_valid(), desc.co_fwd3d),
        (Inv, Dim::D3) => (desc.inv3d.is_valid(), desc.co_inv3d),
        (Fwd, Dim::D4) => (desc.fwd4d.is_valid(), desc.co_fwd4d),
        (Inv, Dim::D4) => (desc.inv4d.is_valid(), desc.co_inv4d),
    }
}

/// Run the kernel of dimensionality `dim` inline. Elements beyond `dim`
/// are left untouched.
fn kernel(op: &Op, direction: Direction, dim: Dim, coord: &mut Coor4D, ws: &mut Workspace) {
    let desc = &op.descriptor;
    let (xy, xyz) = (coord.xy(), coord.xyz());
    match (direction, dim) {
        (Fwd, Dim::D2) => coord.set_xy(dispatch::fwd_2d(desc.fwd, op, ws, xy)),
        (Inv, Dim::D2) => coord.set_xy(dispatch::inv_2d(desc.inv, op, ws, xy)),
        (Fwd, Dim::D3) => coord.set_xyz(dispatch::fwd_3d(desc.fwd3d, op, ws, xyz)),
        (Inv, Dim::D3) => coord.set_xyz(dispatch::inv_3d(desc.inv3d, op, ws, xyz)),
        (Fwd, Dim::D4) => *coord = dispatch::operator(desc.fwd4d, op, ws, *coord),
        (Inv, Dim::D4) => *coord = dispatch::operator(desc.inv4d, op, ws, *coord),
    }
}

pub(super) fn resume<'a>(
    frame: &mut Frame<'a>,
    direction: Direction,
    dim: Dim,
    at: DriverAt,
    last_errno: Option<Errno>,
    ws: &mut Workspace,
) -> Resume<'a> {
    let op: &'a Op = frame.op;
    let desc = &op.descriptor;
    let mut at = at;
    let mut last_errno = last_errno;

    loop {
        let suspended = move |at| Routine::Driver {
            direction,
            dim,
            at,
            last_errno,
        };

        match at {
            DriverAt::Start => {
                // Errors are reported per call: stash the old one
                last_errno = ws.reset_errno();
                let skip = match direction {
                    Fwd => desc.skip_fwd_prepare,
                    Inv => desc.skip_inv_prepare,
                };
                at = DriverAt::Prepared;
                if !skip {
                    frame.routine = Routine::Driver {
                        direction,
                        dim,
                        at,
                        last_errno,
                    };
                    let prepare = match direction {
                        Fwd => Routine::FwdPrepare(FwdPrepare::Start),
                        Inv => Routine::InvPrepare(InvPrepare::Start),
                    };
                    return Resume::Call(Frame::new(prepare, op, frame.coord));
                }
            }

            DriverAt::Prepared => {
                let coord = &frame.coord;
                let incomplete = match dim {
                    Dim::D2 => coord[0] == HUGE || coord[1] == HUGE,
                    _ => coord[0] == HUGE,
                };
                if incomplete {
                    return Resume::Fail;
                }

                let Some((chosen, co)) = preference(dim).into_iter().find_map(|d| {
                    let (kernel, co) = slots(desc, direction, d);
                    (kernel || co.is_valid()).then_some((d, co))
                }) else {
                    warn!("{}: no {direction:?} implementation", op.params.name);
                    ws.set_errno(Errno::NoInverseOp);
                    return Resume::Fail;
                };

                at = DriverAt::Transformed;
                if co.is_valid() {
                    let Some(routine) = dispatch::coroutine(co, ws) else {
                        return Resume::Fail;
                    };
                    frame.routine = suspended(at);
                    return Resume::Call(Frame::new(routine, op, frame.coord));
                }
                kernel(op, direction, chosen, &mut frame.coord, ws);
            }

            DriverAt::Transformed => {
                if frame.coord[0] == HUGE {
                    return Resume::Fail;
                }
                let skip = match direction {
                    Fwd => desc.skip_fwd_finalize,
                    Inv => desc.skip_inv_finalize,
                };
                at = DriverAt::Finalized;
                if !skip {
                    frame.routine = suspended(at);
                    let finalize = match direction {
                        Fwd => Routine::FwdFinalize(FwdFinalize::Start),
                        Inv => Routine::InvFinalize(InvFinalize::Start),
                    };
                    return Resume::Call(Frame::new(finalize, op, frame.coord));
                }
            }

            DriverAt::Finalized => {
                // Anything going wrong during this call invalidates the result.
                // Otherwise, the error code of earlier calls is restored.
                if ws.errno().is_some() {
                    let error = Coor4D::error();
                    match dim {
                        Dim::D2 => frame.coord.set_xy(error.xy()),
                        Dim::D3 => frame.coord.set_xyz(error.xyz()),
                        Dim::D4 => frame.coord = error,
                    }
                } else {
                    ws.restore_errno(last_errno);
                }
                return Resume::Done;
            }
        }
    }
}

// ----- T E S T S ---------------------------------------------------------------------
