/// Equidistant Cylindrical (Plate Carrée). Spherical formulas only: the
/// ellipsoid is still used by the datum shift machinery, but not here
use crate::authoring::*;

// ----- F O R W A R D -----------------------------------------------------------------

pub(crate) fn fwd(op: &Op, _ws: &mut Workspace, lp: Coor2D) -> Coor2D {
    let rc = op.params.real("rc").unwrap_or(1.);
    Coor2D::raw(rc * lp[0], lp[1] - op.common.phi0)
}

// ----- I N V E R S E -----------------------------------------------------------------

pub(crate) fn inv(op: &Op, _ws: &mut Workspace, xy: Coor2D) -> Coor2D {
    let rc = op.params.real("rc").unwrap_or(1.);
    Coor2D::raw(xy[0] / rc, xy[1] + op.common.phi0)
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 1] = [
    OpParameter::Real { key: "lat_ts", default: Some(0_f64) },
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Radians, IoUnits::Classic);
    descriptor.fwd = Fwd2dId::Eqc;
    descriptor.inv = Inv2dId::Eqc;
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;

    let rc = op.params.angle("lat_ts")?.cos();
    if rc <= 0. {
        let lat_ts = op.params.real("lat_ts")?;
        error!("eqc: |lat_ts| should be <= 90°, got {lat_ts}");
        return Err(Error::BadParam("lat_ts".to_string(), lat_ts.to_string()));
    }
    op.params.real.insert("rc", rc);
    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn eqc() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=eqc R=6400000")?;

        let geo = [Coor4D::gis(2., 1., 0., 0.)];
        let mut data = geo;
        ctx.apply(op, Fwd, &mut data)?;
        assert_float_eq!(data[0][0], 223402.144255274, abs <= 1e-6);
        assert_float_eq!(data[0][1], 111701.072127637, abs <= 1e-6);

        ctx.apply(op, Inv, &mut data)?;
        assert_float_eq!(data[0].0, geo[0].0, abs_all <= 1e-12);
        Ok(())
    }

    #[test]
    fn latitude_of_true_scale() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=eqc R=6400000 lat_ts=60 lat_0=1")?;

        let mut data = [Coor4D::gis(2., 1., 0., 0.)];
        ctx.apply(op, Fwd, &mut data)?;
        assert_float_eq!(data[0][0], 223402.144255274 / 2., abs <= 1e-6);
        assert_float_eq!(data[0][1], 0., abs <= 1e-9);

        assert!(matches!(ctx.op("proj=eqc lat_ts=100"), Err(Error::BadParam(_, _))));
        Ok(())
    }
}
