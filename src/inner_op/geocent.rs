/// Geocentric cartesian output. The operator itself is the identity: the
/// conversion to cartesian coordinates is done by the auxiliary `cart`
/// operator, run by the finalize stage (and its inverse by the prepare
/// stage), so units, datum shifts and axis order come for free
use crate::authoring::*;

// ----- F O R W A R D   A N D   I N V E R S E -----------------------------------------

pub(crate) fn fwd(_op: &Op, _ws: &mut Workspace, lp: Coor2D) -> Coor2D {
    lp
}

pub(crate) fn inv(_op: &Op, _ws: &mut Workspace, xy: Coor2D) -> Coor2D {
    xy
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 0] = [
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Radians, IoUnits::Cartesian);
    descriptor.fwd = Fwd2dId::Geocent;
    descriptor.inv = Inv2dId::Geocent;
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;
    op.common.is_geocent = true;
    // No false origin in geocentric space
    op.common.x0 = 0.;
    op.common.y0 = 0.;
    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------
