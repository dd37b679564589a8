//! The prepare and finalize stages wrapped around every operator: input
//! validation, unit scaling, false origins, central meridian, and the
//! auxiliary sub-operations (axis swapping and datum shift).
//!
//! Each stage is a resumable routine. Delegating to an auxiliary
//! sub-operation records the resume point in the frame, and returns
//! [`Resume::Call`]. Missing sub-operations are simply skipped.

use super::*;
use crate::coordinate::HUGE;
use crate::math::angular::adjlon;
use crate::op::IoUnits;
use std::f64::consts::FRAC_PI_2;

/// Tolerance for latitudes slightly beyond the poles
const EPS_LAT: f64 = 1e-12;

/// Suspend `frame` at `next`, and delegate to the sub-operation `sub`
fn call<'a>(frame: &mut Frame<'a>, next: Routine, sub: &'a Op, direction: Direction) -> Resume<'a> {
    frame.routine = next;
    Resume::Call(Frame::trans(sub, direction, Dim::D4, frame.coord))
}

fn is_huge(coord: &Coor4D, elements: usize) -> bool {
    coord.0[..elements].iter().any(|&v| v == HUGE)
}

// ----- F O R W A R D -----------------------------------------------------------------

pub(super) fn fwd_prepare<'a>(frame: &mut Frame<'a>, at: FwdPrepare, ws: &mut Workspace) -> Resume<'a> {
    let op: &'a Op = frame.op;
    let common = &op.common;
    let aux = &op.aux;
    let datum_shift = aux.helmert.is_some() || (aux.cart_wgs84.is_some() && aux.cart.is_some());
    let mut at = at;

    loop {
        let coord = &mut frame.coord;
        match at {
            FwdPrepare::Start => {
                if is_huge(coord, 3) {
                    return Resume::Fail;
                }

                // The datum shift needs a sensible time coordinate
                if coord[3] == HUGE && aux.helmert.is_some() {
                    coord[3] = 0.;
                }

                match op.descriptor.left {
                    IoUnits::Radians => {}
                    IoUnits::Cartesian => {
                        if let Some(helmert) = aux.helmert.as_deref() {
                            let next = Routine::FwdPrepare(FwdPrepare::AfterCartesianHelmert);
                            return call(frame, next, helmert, Inv);
                        }
                        return Resume::Done;
                    }
                    _ => return Resume::Done,
                }

                if coord[1].abs() - FRAC_PI_2 > EPS_LAT {
                    warn!("{}: invalid latitude: {}", op.params.name, coord[1]);
                    ws.set_errno(Errno::InvalidCoord);
                    return Resume::Fail;
                }
                if coord[0].abs() > 10. {
                    warn!("{}: invalid longitude: {}", op.params.name, coord[0]);
                    ws.set_errno(Errno::InvalidCoord);
                    return Resume::Fail;
                }
                coord[1] = coord[1].clamp(-FRAC_PI_2, FRAC_PI_2);

                // Geocentric input latitude: convert to geographic
                if common.geoc {
                    coord[1] = common.ellps.geocentric_latitude(coord[1], Inv);
                }
                if !common.over {
                    coord[0] = adjlon(coord[0]);
                }

                if let Some(hgridshift) = aux.hgridshift.as_deref() {
                    let next = Routine::FwdPrepare(FwdPrepare::AfterHgridshift);
                    return call(frame, next, hgridshift, Inv);
                }
                if datum_shift {
                    if let Some(cart_wgs84) = aux.cart_wgs84.as_deref() {
                        let next = Routine::FwdPrepare(FwdPrepare::AfterCartWgs84);
                        return call(frame, next, cart_wgs84, Fwd);
                    }
                    at = FwdPrepare::AfterCartWgs84;
                    continue;
                }
                at = FwdPrepare::AfterCart;
            }

            FwdPrepare::AfterCartWgs84 => {
                // Into the local datum
                if let Some(helmert) = aux.helmert.as_deref() {
                    let next = Routine::FwdPrepare(FwdPrepare::AfterHelmert);
                    return call(frame, next, helmert, Inv);
                }
                at = FwdPrepare::AfterHelmert;
            }

            FwdPrepare::AfterHelmert => {
                // Back to angular, on the local ellipsoid
                if let Some(cart) = aux.cart.as_deref() {
                    let next = Routine::FwdPrepare(FwdPrepare::AfterCart);
                    return call(frame, next, cart, Inv);
                }
                at = FwdPrepare::AfterCart;
            }

            FwdPrepare::AfterHgridshift | FwdPrepare::AfterCart => {
                if coord[0] == HUGE {
                    return Resume::Done;
                }
                if let Some(vgridshift) = aux.vgridshift.as_deref() {
                    let next = Routine::FwdPrepare(FwdPrepare::AfterVgridshift);
                    return call(frame, next, vgridshift, Fwd);
                }
                at = FwdPrepare::AfterVgridshift;
            }

            FwdPrepare::AfterVgridshift => {
                // Distance from the central meridian, counted from the prime meridian
                coord[0] = (coord[0] - common.from_greenwich) - common.lam0;
                if !common.over {
                    coord[0] = adjlon(coord[0]);
                }
                return Resume::Done;
            }

            FwdPrepare::AfterCartesianHelmert => return Resume::Done,
        }
    }
}

pub(super) fn fwd_finalize<'a>(frame: &mut Frame<'a>, at: FwdFinalize, _ws: &mut Workspace) -> Resume<'a> {
    let op: &'a Op = frame.op;
    let common = &op.common;
    let mut at = at;

    loop {
        let coord = &mut frame.coord;
        match at {
            FwdFinalize::Start => {
                if coord[0] == HUGE {
                    return Resume::Fail;
                }
                match op.descriptor.right {
                    IoUnits::Cartesian => {
                        if common.is_geocent {
                            if let Some(cart) = op.aux.cart.as_deref() {
                                let next = Routine::FwdFinalize(FwdFinalize::AfterCart);
                                return call(frame, next, cart, Fwd);
                            }
                        }
                        at = FwdFinalize::AfterCart;
                        continue;
                    }

                    // Classic projections work on the unit sphere/ellipsoid
                    IoUnits::Classic => {
                        coord[0] *= common.a;
                        coord[1] *= common.a;
                        projected(coord, common);
                    }
                    IoUnits::Projected => projected(coord, common),

                    IoUnits::Radians => {
                        coord[2] = common.vfr_meter * (coord[2] + common.z0);
                        if let Some(center) = common.long_wrap_center {
                            if coord[0] != HUGE {
                                coord[0] = center + adjlon(coord[0] - center);
                            }
                        }
                    }

                    IoUnits::Whatever | IoUnits::Degrees => {}
                }
                return swap_axes(frame);
            }

            FwdFinalize::AfterCart => {
                coord[0] *= common.fr_meter;
                coord[1] *= common.fr_meter;
                coord[2] *= common.fr_meter;
                return swap_axes(frame);
            }

            FwdFinalize::AfterAxisswap => return Resume::Done,
        }
    }
}

fn swap_axes<'a>(frame: &mut Frame<'a>) -> Resume<'a> {
    let op: &'a Op = frame.op;
    match op.aux.axisswap.as_deref() {
        Some(axisswap) => {
            let next = Routine::FwdFinalize(FwdFinalize::AfterAxisswap);
            call(frame, next, axisswap, Fwd)
        }
        None => Resume::Done,
    }
}

// False origin and linear units
fn projected(coord: &mut Coor4D, common: &Common) {
    coord[0] = common.fr_meter * (coord[0] + common.x0);
    coord[1] = common.fr_meter * (coord[1] + common.y0);
    coord[2] = common.vfr_meter * (coord[2] + common.z0);
}

// ----- I N V E R S E -----------------------------------------------------------------

pub(super) fn inv_prepare<'a>(frame: &mut Frame<'a>, at: InvPrepare, ws: &mut Workspace) -> Resume<'a> {
    let op: &'a Op = frame.op;
    let common = &op.common;
    let mut at = at;

    loop {
        let coord = &mut frame.coord;
        match at {
            InvPrepare::Start => {
                if is_huge(coord, 3) {
                    ws.set_errno(Errno::OutsideProjectionDomain);
                    return Resume::Fail;
                }
                if coord[3] == HUGE && op.aux.helmert.is_some() {
                    coord[3] = 0.;
                }
                if let Some(axisswap) = op.aux.axisswap.as_deref() {
                    let next = Routine::InvPrepare(InvPrepare::AfterAxisswap);
                    return call(frame, next, axisswap, Inv);
                }
                at = InvPrepare::AfterAxisswap;
            }

            InvPrepare::AfterAxisswap => {
                match op.descriptor.right {
                    IoUnits::Cartesian => {
                        coord[0] *= common.to_meter;
                        coord[1] *= common.to_meter;
                        coord[2] *= common.to_meter;
                        if common.is_geocent {
                            if let Some(cart) = op.aux.cart.as_deref() {
                                let next = Routine::InvPrepare(InvPrepare::AfterCart);
                                return call(frame, next, cart, Inv);
                            }
                        }
                    }

                    IoUnits::Projected | IoUnits::Classic => {
                        coord[0] = common.to_meter * coord[0] - common.x0;
                        coord[1] = common.to_meter * coord[1] - common.y0;
                        coord[2] = common.vto_meter * coord[2] - common.z0;
                        // Back to the unit sphere/ellipsoid
                        if op.descriptor.right == IoUnits::Classic {
                            coord[0] *= common.ra;
                            coord[1] *= common.ra;
                        }
                    }

                    IoUnits::Radians => {
                        coord[2] = common.vto_meter * coord[2] - common.z0;
                    }

                    IoUnits::Whatever | IoUnits::Degrees => {}
                }
                return Resume::Done;
            }

            InvPrepare::AfterCart => return Resume::Done,
        }
    }
}

pub(super) fn inv_finalize<'a>(frame: &mut Frame<'a>, at: InvFinalize, ws: &mut Workspace) -> Resume<'a> {
    let op: &'a Op = frame.op;
    let common = &op.common;
    let aux = &op.aux;
    let datum_shift = aux.helmert.is_some() || (aux.cart_wgs84.is_some() && aux.cart.is_some());
    let mut at = at;

    loop {
        let coord = &mut frame.coord;
        match at {
            InvFinalize::Start => {
                if coord[0] == HUGE {
                    ws.set_errno(Errno::OutsideProjectionDomain);
                    return Resume::Fail;
                }
                if op.descriptor.left != IoUnits::Radians {
                    return Resume::Done;
                }

                coord[0] = coord[0] + common.from_greenwich + common.lam0;
                if !common.over {
                    coord[0] = adjlon(coord[0]);
                }
                if let Some(vgridshift) = aux.vgridshift.as_deref() {
                    let next = Routine::InvFinalize(InvFinalize::AfterVgridshift);
                    return call(frame, next, vgridshift, Inv);
                }
                at = InvFinalize::AfterVgridshift;
            }

            InvFinalize::AfterVgridshift => {
                if coord[0] == HUGE {
                    return Resume::Done;
                }
                if let Some(hgridshift) = aux.hgridshift.as_deref() {
                    let next = Routine::InvFinalize(InvFinalize::AfterHgridshift);
                    return call(frame, next, hgridshift, Fwd);
                }
                if datum_shift {
                    // Cartesian, in the local datum
                    if let Some(cart) = aux.cart.as_deref() {
                        let next = Routine::InvFinalize(InvFinalize::AfterCart);
                        return call(frame, next, cart, Fwd);
                    }
                    at = InvFinalize::AfterCart;
                    continue;
                }
                at = InvFinalize::AfterHgridshift;
            }

            InvFinalize::AfterCart => {
                // Into WGS84
                if let Some(helmert) = aux.helmert.as_deref() {
                    let next = Routine::InvFinalize(InvFinalize::AfterHelmert);
                    return call(frame, next, helmert, Fwd);
                }
                at = InvFinalize::AfterHelmert;
            }

            InvFinalize::AfterHelmert => {
                if let Some(cart_wgs84) = aux.cart_wgs84.as_deref() {
                    let next = Routine::InvFinalize(InvFinalize::AfterCartWgs84);
                    return call(frame, next, cart_wgs84, Inv);
                }
                at = InvFinalize::AfterCartWgs84;
            }

            InvFinalize::AfterHgridshift | InvFinalize::AfterCartWgs84 => {
                if coord[0] == HUGE {
                    return Resume::Done;
                }
                // Back to geocentric latitude, if that is what we got
                if common.geoc {
                    coord[1] = common.ellps.geocentric_latitude(coord[1], Fwd);
                }
                return Resume::Done;
            }
        }
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn invalid_input() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=merc", &ctx)?;

        // Latitude beyond the pole
        let mut ws = Workspace::new(None);
        assert!(fwd(&op, Coor2D::raw(0., 1.6), &mut ws).is_error());
        assert_eq!(ws.errno(), Some(Errno::InvalidCoord));

        // Longitude way off
        let mut ws = Workspace::new(None);
        assert!(fwd(&op, Coor2D::raw(11., 0.), &mut ws).is_error());
        assert_eq!(ws.errno(), Some(Errno::InvalidCoord));

        // Sentinel input aborts the forward prepare stage, without setting errno
        let mut ws = Workspace::new(None);
        assert!(fwd(&op, Coor2D::error(), &mut ws).is_error());
        assert_eq!(ws.errno(), None);

        // ...while the inverse reports it as outside the projection domain
        assert!(inv(&op, Coor2D::error(), &mut ws).is_error());
        assert_eq!(ws.errno(), Some(Errno::OutsideProjectionDomain));
        Ok(())
    }

    #[test]
    fn longitudes() -> Result<(), Error> {
        let ctx = Minimal::default();

        // Input longitudes are reduced to ±π, unless "over" is given
        let op = Op::new("proj=eqc", &ctx)?;
        let mut ws = Workspace::new(None);
        let c = fwd(&op, Coor2D::gis(270., 0.), &mut ws);
        assert_float_eq!(c[0], -90f64.to_radians() * op.common.a, abs <= 1e-6);

        let op = Op::new("proj=eqc over", &ctx)?;
        let c = fwd(&op, Coor2D::gis(270., 0.), &mut ws);
        assert_float_eq!(c[0], 270f64.to_radians() * op.common.a, abs <= 1e-6);

        // Output longitudes wrapped around lon_wrap
        let op = Op::new("proj=eqc lon_wrap=180", &ctx)?;
        let c = inv(&op, Coor2D::raw(-90f64.to_radians() * op.common.a, 0.), &mut ws);
        assert_float_eq!(c[0], 270f64.to_radians(), abs <= 1e-12);

        // Prime meridian offset
        let op = Op::new("proj=eqc pm=10", &ctx)?;
        let c = fwd(&op, Coor2D::gis(10., 0.), &mut ws);
        assert_float_eq!(c[0], 0., abs <= 1e-9);
        assert_eq!(ws.errno(), None);
        Ok(())
    }

    #[test]
    fn geocentric_latitude() -> Result<(), Error> {
        let ctx = Minimal::default();
        let plain = Op::new("proj=eqc", &ctx)?;
        let geoc = Op::new("proj=eqc geoc", &ctx)?;
        let mut ws = Workspace::new(None);

        // Geocentric input latitudes are poleward-shifted to geographic ones
        let input = Coor2D::gis(0., 45.);
        let a = fwd(&plain, input, &mut ws);
        let b = fwd(&geoc, input, &mut ws);
        assert!(b[1] > a[1]);

        // And shifted back on the way out
        let back = inv(&geoc, b, &mut ws);
        assert_float_eq!(back[1], input[1], abs <= 1e-12);
        Ok(())
    }

    #[test]
    fn axis_swapping() -> Result<(), Error> {
        let ctx = Minimal::default();
        let enu = Op::new("proj=merc", &ctx)?;
        let neu = Op::new("proj=merc axis=neu", &ctx)?;
        let mut ws = Workspace::new(None);

        let geo = Coor2D::gis(12., 55.);
        let a = fwd(&enu, geo, &mut ws);
        let b = fwd(&neu, geo, &mut ws);
        assert_eq!(a[0], b[1]);
        assert_eq!(a[1], b[0]);

        let back = inv(&neu, b, &mut ws);
        assert_float_eq!(back.0, geo.0, abs_all <= 1e-12);
        Ok(())
    }

    #[test]
    fn datum_shift() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=eqc ellps=intl towgs84=-87,-98,-121", &ctx)?;
        let mut ws = Workspace::new(None);

        // The datum shift moves the point by some tens of metres, and returns
        let geo = Coor2D::gis(12., 55.);
        let shifted = fwd(&op, geo, &mut ws);
        let unshifted = fwd(&Op::new("proj=eqc ellps=intl", &ctx)?, geo, &mut ws);
        let dist = (shifted[0] - unshifted[0]).hypot(shifted[1] - unshifted[1]);
        assert!(dist > 10. && dist < 500., "{dist}");

        let back = inv(&op, shifted, &mut ws);
        assert_float_eq!(back.0, geo.0, abs_all <= 1e-9);
        assert_eq!(ws.errno(), None);
        Ok(())
    }

    #[test]
    fn grid_shifts() -> Result<(), Error> {
        let ctx = Minimal::default();
        let plain = Op::new("proj=eqc", &ctx)?;

        // Grid shift slots, filled by offset operators standing in for grids
        let mut op = Op::new("proj=eqc", &ctx)?;
        let mut hgridshift = Op::new("proj=geogoffset dlon=3600", &ctx)?;
        let mut vgridshift = Op::new("proj=geogoffset dh=10", &ctx)?;
        hgridshift.descriptor.skip_all();
        vgridshift.descriptor.skip_all();
        op.aux.hgridshift = Some(Box::new(hgridshift));
        op.aux.vgridshift = Some(Box::new(vgridshift));

        // The horizontal shift is applied inversely on the way in,
        // the vertical one forward
        let mut ws = Workspace::traced(None);
        let geo = Coor4D::gis(12., 55., 0., 0.);
        let projected = fwd4d(&op, geo, &mut ws);
        let expected = fwd(&plain, Coor2D::gis(11., 55.), &mut ws);
        assert_float_eq!(projected[0], expected[0], abs <= 1e-6);
        assert_float_eq!(projected[1], expected[1], abs <= 1e-6);
        assert_float_eq!(projected[2], 10., abs <= 1e-12);
        assert!(ws.trace().contains(&Dispatched::Operator(OperatorId::GeogoffsetInv)));
        assert!(ws.trace().contains(&Dispatched::Operator(OperatorId::GeogoffsetFwd)));

        // ...and the other way round in the inverse finalize stage
        let back = inv4d(&op, projected, &mut ws);
        assert_float_eq!(back[0], geo[0], abs <= 1e-12);
        assert_float_eq!(back[1], geo[1], abs <= 1e-12);
        assert_float_eq!(back[2], 0., abs <= 1e-9);
        assert_eq!(ws.errno(), None);
        Ok(())
    }
}
