//! Kernels and coroutines are referenced by plain enum ids, stored in the
//! [`OpDescriptor`](crate::op::OpDescriptor), and resolved here, at
//! execution time. No function pointers are kept in the operator
//! representation.
//!
//! Every id type has an `Invalid` default, meaning "not implemented".
//! Dispatching `Invalid` yields the error coordinate, and sets
//! [`Errno::NoOperation`].

use crate::authoring::*;
use crate::exec::{Dim, PipelineAt, Routine};
use crate::inner_op::{
    addone, affine, axisswap, cart, eqc, geocent, geogoffset, helmert, merc, noop, pushpop,
    unitconvert,
};

// ----- I D S -------------------------------------------------------------------------

/// Forward 2D kernels
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Fwd2dId {
    #[default]
    Invalid,
    AddOne,
    Affine,
    Axisswap,
    Eqc,
    Geocent,
    Merc,
    MercSpherical,
    Unitconvert,
}

/// Inverse 2D kernels
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Inv2dId {
    #[default]
    Invalid,
    AddOne,
    Affine,
    Axisswap,
    Eqc,
    Geocent,
    Merc,
    MercSpherical,
    Unitconvert,
}

/// Forward 3D kernels
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Fwd3dId {
    #[default]
    Invalid,
    Affine,
    Axisswap,
    Cart,
    Helmert,
    Unitconvert,
}

/// Inverse 3D kernels
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Inv3dId {
    #[default]
    Invalid,
    Affine,
    Axisswap,
    Cart,
    Helmert,
    Unitconvert,
}

/// Generic 4D kernels ("operators"). These serve both directions, so
/// forward and inverse variants are distinct ids.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum OperatorId {
    #[default]
    Invalid,
    Noop,
    AffineFwd,
    AffineInv,
    AxisswapFwd,
    AxisswapInv,
    GeogoffsetFwd,
    GeogoffsetInv,
    HelmertFwd,
    HelmertInv,
    UnitconvertFwd,
    UnitconvertInv,
    Push,
    Pop,
}

/// Coroutines: routines that delegate to sub-operations through the
/// execution stack, rather than computing directly
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum CoroutineId {
    #[default]
    Invalid,
    PipelineFwd,
    PipelineInv,
    PipelineFwd3d,
    PipelineInv3d,
    PipelineFwd4d,
    PipelineInv4d,
}

impl Fwd2dId {
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}
impl Inv2dId {
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}
impl Fwd3dId {
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}
impl Inv3dId {
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}
impl OperatorId {
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}
impl CoroutineId {
    pub fn is_valid(self) -> bool {
        self != Self::Invalid
    }
}

// ----- D I S P A T C H ---------------------------------------------------------------

fn no_operation(ws: &mut Workspace) {
    warn!("Dispatch of unset kernel id");
    ws.set_errno(Errno::NoOperation);
}

pub(crate) fn fwd_2d(id: Fwd2dId, op: &Op, ws: &mut Workspace, coord: Coor2D) -> Coor2D {
    ws.record(Dispatched::Fwd2d(id));
    match id {
        Fwd2dId::Invalid => {
            no_operation(ws);
            Coor2D::error()
        }
        Fwd2dId::AddOne => addone::fwd(op, ws, coord),
        Fwd2dId::Affine => affine::fwd_2d(op, ws, coord),
        Fwd2dId::Axisswap => axisswap::fwd_2d(op, ws, coord),
        Fwd2dId::Eqc => eqc::fwd(op, ws, coord),
        Fwd2dId::Geocent => geocent::fwd(op, ws, coord),
        Fwd2dId::Merc => merc::e_fwd(op, ws, coord),
        Fwd2dId::MercSpherical => merc::s_fwd(op, ws, coord),
        Fwd2dId::Unitconvert => unitconvert::fwd_2d(op, ws, coord),
    }
}

pub(crate) fn inv_2d(id: Inv2dId, op: &Op, ws: &mut Workspace, coord: Coor2D) -> Coor2D {
    ws.record(Dispatched::Inv2d(id));
    match id {
        Inv2dId::Invalid => {
            no_operation(ws);
            Coor2D::error()
        }
        Inv2dId::AddOne => addone::inv(op, ws, coord),
        Inv2dId::Affine => affine::inv_2d(op, ws, coord),
        Inv2dId::Axisswap => axisswap::inv_2d(op, ws, coord),
        Inv2dId::Eqc => eqc::inv(op, ws, coord),
        Inv2dId::Geocent => geocent::inv(op, ws, coord),
        Inv2dId::Merc => merc::e_inv(op, ws, coord),
        Inv2dId::MercSpherical => merc::s_inv(op, ws, coord),
        Inv2dId::Unitconvert => unitconvert::inv_2d(op, ws, coord),
    }
}

pub(crate) fn fwd_3d(id: Fwd3dId, op: &Op, ws: &mut Workspace, coord: Coor3D) -> Coor3D {
    ws.record(Dispatched::Fwd3d(id));
    match id {
        Fwd3dId::Invalid => {
            no_operation(ws);
            Coor3D::error()
        }
        Fwd3dId::Affine => affine::fwd_3d(op, ws, coord),
        Fwd3dId::Axisswap => axisswap::fwd_3d(op, ws, coord),
        Fwd3dId::Cart => cart::fwd(op, ws, coord),
        Fwd3dId::Helmert => helmert::fwd_3d(op, ws, coord),
        Fwd3dId::Unitconvert => unitconvert::fwd_3d(op, ws, coord),
    }
}

pub(crate) fn inv_3d(id: Inv3dId, op: &Op, ws: &mut Workspace, coord: Coor3D) -> Coor3D {
    ws.record(Dispatched::Inv3d(id));
    match id {
        Inv3dId::Invalid => {
            no_operation(ws);
            Coor3D::error()
        }
        Inv3dId::Affine => affine::inv_3d(op, ws, coord),
        Inv3dId::Axisswap => axisswap::inv_3d(op, ws, coord),
        Inv3dId::Cart => cart::inv(op, ws, coord),
        Inv3dId::Helmert => helmert::inv_3d(op, ws, coord),
        Inv3dId::Unitconvert => unitconvert::inv_3d(op, ws, coord),
    }
}

pub(crate) fn operator(id: OperatorId, op: &Op, ws: &mut Workspace, coord: Coor4D) -> Coor4D {
    ws.record(Dispatched::Operator(id));
    match id {
        OperatorId::Invalid => {
            no_operation(ws);
            Coor4D::error()
        }
        OperatorId::Noop => noop::noop(op, ws, coord),
        OperatorId::AffineFwd => affine::fwd_4d(op, ws, coord),
        OperatorId::AffineInv => affine::inv_4d(op, ws, coord),
        OperatorId::AxisswapFwd => axisswap::fwd_4d(op, ws, coord),
        OperatorId::AxisswapInv => axisswap::inv_4d(op, ws, coord),
        OperatorId::GeogoffsetFwd => geogoffset::fwd(op, ws, coord),
        OperatorId::GeogoffsetInv => geogoffset::inv(op, ws, coord),
        OperatorId::HelmertFwd => helmert::fwd_4d(op, ws, coord),
        OperatorId::HelmertInv => helmert::inv_4d(op, ws, coord),
        OperatorId::UnitconvertFwd => unitconvert::fwd_4d(op, ws, coord),
        OperatorId::UnitconvertInv => unitconvert::inv_4d(op, ws, coord),
        OperatorId::Push => pushpop::push(op, ws, coord),
        OperatorId::Pop => pushpop::pop(op, ws, coord),
    }
}

/// The initial state of the routine implementing coroutine `id`, or
/// `None` (with [`Errno::NoOperation`] set) if the id is unset
pub(crate) fn coroutine(id: CoroutineId, ws: &mut Workspace) -> Option<Routine> {
    ws.record(Dispatched::Coroutine(id));
    let (direction, dim) = match id {
        CoroutineId::Invalid => {
            no_operation(ws);
            return None;
        }
        CoroutineId::PipelineFwd => (Fwd, Dim::D2),
        CoroutineId::PipelineInv => (Inv, Dim::D2),
        CoroutineId::PipelineFwd3d => (Fwd, Dim::D3),
        CoroutineId::PipelineInv3d => (Inv, Dim::D3),
        CoroutineId::PipelineFwd4d => (Fwd, Dim::D4),
        CoroutineId::PipelineInv4d => (Inv, Dim::D4),
    };
    Some(Routine::Pipeline {
        direction,
        dim,
        at: PipelineAt::Start,
    })
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_ids() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=noop", &ctx)?;
        let mut ws = Workspace::traced(None);

        assert!(fwd_2d(Fwd2dId::Invalid, &op, &mut ws, Coor2D::origin()).is_error());
        assert_eq!(ws.errno(), Some(Errno::NoOperation));

        let mut ws = Workspace::new(None);
        assert!(inv_3d(Inv3dId::Invalid, &op, &mut ws, Coor3D::origin()).is_error());
        assert!(operator(OperatorId::Invalid, &op, &mut ws, Coor4D::origin()).is_error());
        assert!(coroutine(CoroutineId::Invalid, &mut ws).is_none());
        assert_eq!(ws.errno(), Some(Errno::NoOperation));
        Ok(())
    }

    #[test]
    fn kernels() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=addone", &ctx)?;
        let mut ws = Workspace::traced(None);

        let c = fwd_2d(Fwd2dId::AddOne, &op, &mut ws, Coor2D::raw(1., 2.));
        assert_eq!(c, Coor2D::raw(2., 2.));
        let c = inv_2d(Inv2dId::AddOne, &op, &mut ws, c);
        assert_eq!(c, Coor2D::raw(1., 2.));
        assert_eq!(ws.errno(), None);
        assert_eq!(
            ws.trace(),
            [Dispatched::Fwd2d(Fwd2dId::AddOne), Dispatched::Inv2d(Inv2dId::AddOne)]
        );

        assert!(matches!(
            coroutine(CoroutineId::PipelineInv3d, &mut ws),
            Some(Routine::Pipeline { direction: Inv, dim: Dim::D3, .. })
        ));
        Ok(())
    }
}
