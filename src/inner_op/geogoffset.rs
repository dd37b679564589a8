/// Geographic offsets: shift longitude and latitude by a given number of
/// arcseconds, and the height by a given number of metres
use crate::authoring::*;

fn offsets(op: &Op) -> [f64; 3] {
    let get = |key| op.params.real(key).unwrap_or(0.);
    [get("dlon"), get("dlat"), get("dh")]
}

// ----- F O R W A R D -----------------------------------------------------------------

pub(crate) fn fwd(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    let [dlon, dlat, dh] = offsets(op);
    Coor4D::raw(c[0] + dlon, c[1] + dlat, c[2] + dh, c[3])
}

// ----- I N V E R S E -----------------------------------------------------------------

pub(crate) fn inv(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    let [dlon, dlat, dh] = offsets(op);
    Coor4D::raw(c[0] - dlon, c[1] - dlat, c[2] - dh, c[3])
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 3] = [
    OpParameter::Real { key: "dlon", default: Some(0_f64) },
    OpParameter::Real { key: "dlat", default: Some(0_f64) },
    OpParameter::Real { key: "dh",   default: Some(0_f64) },
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Radians, IoUnits::Radians);
    descriptor.fwd4d = OperatorId::GeogoffsetFwd;
    descriptor.inv4d = OperatorId::GeogoffsetInv;
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;

    // Angular offsets are given in arcsec, and applied in radians
    for key in ["dlon", "dlat"] {
        let arcsec = op.params.real(key)?;
        op.params.real.insert(key, angular::arcsec_to_radians(arcsec));
    }
    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn offsets() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=geogoffset dlon=3600 dlat=-1800 dh=10")?;

        let geo = [Coor4D::gis(12., 55., 100., 0.)];
        let mut data = geo;
        ctx.apply(op, Fwd, &mut data)?;
        assert_float_eq!(data[0][0], 13f64.to_radians(), abs <= 1e-12);
        assert_float_eq!(data[0][1], 54.5f64.to_radians(), abs <= 1e-12);
        assert_float_eq!(data[0][2], 110., abs <= 1e-9);

        ctx.apply(op, Inv, &mut data)?;
        assert_float_eq!(data[0].0, geo[0].0, abs_all <= 1e-12);
        Ok(())
    }
}
