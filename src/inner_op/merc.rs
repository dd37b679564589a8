//! Mercator, ellipsoidal and spherical. The kernels work on the unit
//! ellipsoid: scaling by the semimajor axis, and the false origin, are
//! left to the finalize stage
use crate::authoring::*;
use crate::math::ancillary;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

const EPS10: f64 = 1e-10;

// Points at (or numerically indistinguishable from) the poles map to infinity
fn at_pole(op: &Op, ws: &mut Workspace, phi: f64) -> bool {
    if (phi.abs() - FRAC_PI_2).abs() > EPS10 {
        return false;
    }
    warn!("{}: latitude at the pole", op.params.name);
    ws.set_errno(Errno::OutsideProjectionDomain);
    true
}

// ----- E L L I P S O I D A L ---------------------------------------------------------

pub(crate) fn e_fwd(op: &Op, ws: &mut Workspace, lp: Coor2D) -> Coor2D {
    if at_pole(op, ws, lp[1]) {
        return Coor2D::error();
    }
    let k0 = op.common.k0;
    let e = op.common.ellps.eccentricity();
    let x = k0 * lp[0];
    let y = -k0 * ancillary::ts(lp[1].sin_cos(), e).ln();
    Coor2D::raw(x, y)
}

pub(crate) fn e_inv(op: &Op, _ws: &mut Workspace, xy: Coor2D) -> Coor2D {
    let k0 = op.common.k0;
    let e = op.common.ellps.eccentricity();
    let phi = ancillary::sinhpsi_to_tanphi((xy[1] / k0).sinh(), e).atan();
    Coor2D::raw(xy[0] / k0, phi)
}

// ----- S P H E R I C A L -------------------------------------------------------------

pub(crate) fn s_fwd(op: &Op, ws: &mut Workspace, lp: Coor2D) -> Coor2D {
    if at_pole(op, ws, lp[1]) {
        return Coor2D::error();
    }
    let k0 = op.common.k0;
    Coor2D::raw(k0 * lp[0], k0 * (FRAC_PI_4 + 0.5 * lp[1]).tan().ln())
}

pub(crate) fn s_inv(op: &Op, _ws: &mut Workspace, xy: Coor2D) -> Coor2D {
    let k0 = op.common.k0;
    Coor2D::raw(xy[0] / k0, (xy[1] / k0).sinh().atan())
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 1] = [
    OpParameter::Real { key: "lat_ts", default: Some(f64::NAN) },
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let descriptor = OpDescriptor::new(IoUnits::Radians, IoUnits::Classic);
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;
    if op.common.es == 0. {
        op.descriptor.fwd = Fwd2dId::MercSpherical;
        op.descriptor.inv = Inv2dId::MercSpherical;
    } else {
        op.descriptor.fwd = Fwd2dId::Merc;
        op.descriptor.inv = Inv2dId::Merc;
    }

    // lat_ts trumps k_0
    let lat_ts = op.params.real("lat_ts")?;
    if !lat_ts.is_nan() {
        if lat_ts.abs() >= 90. {
            error!("merc: |lat_ts| should be < 90°, got {lat_ts}");
            return Err(Error::BadParam("lat_ts".to_string(), lat_ts.to_string()));
        }
        let sc = lat_ts.to_radians().sin_cos();
        op.common.k0 = ancillary::pj_msfn(sc, op.common.es);
    }
    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------
