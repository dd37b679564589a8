/// The no-operation. Does nothing, and is good at it.
///
/// The geographic aliases (`latlong` etc.) take angular coordinates, so
/// the prepare/finalize stages apply datum shifts (`towgs84`) and axis
/// swapping around them.
use crate::authoring::*;

// ----- F O R W A R D   A N D   I N V E R S E -----------------------------------------

pub(crate) fn noop(_op: &Op, _ws: &mut Workspace, coord: Coor4D) -> Coor4D {
    coord
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 0] = [
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    descriptor.fwd4d = OperatorId::Noop;
    descriptor.inv4d = OperatorId::Noop;
    Op::plain(parameters, descriptor, &GAMUT, ctx)
}

pub fn latlong(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Radians, IoUnits::Radians);
    descriptor.fwd4d = OperatorId::Noop;
    descriptor.inv4d = OperatorId::Noop;
    Op::plain(parameters, descriptor, &GAMUT, ctx)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    const GDA94: Coor4D = Coor4D([-4052051.7643, 4212836.2017, -2545106.0245, 0.0]);

    #[test]
    fn no_change() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=noop")?;
        let mut operands = [GDA94];

        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0], GDA94);

        ctx.apply(op, Inv, &mut operands)?;
        assert_eq!(operands[0], GDA94);

        // The geographic aliases are noops as well, in any dimensionality
        let op = ctx.op("proj=latlong")?;
        let mut operands = [Coor2D::gis(12., 55.)];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0].0, Coor2D::gis(12., 55.).0, abs_all <= 1e-15);
        Ok(())
    }

    #[test]
    fn datum_shift() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let ed50 = [Coor4D::gis(12., 55., 0., 0.)];

        // From ED50 to WGS84, the long way round...
        let op = ctx.op("proj=pipeline step proj=cart ellps=intl step proj=helmert x=-87 y=-96 z=-120 step proj=cart inv ellps=WGS84")?;
        let mut wgs84 = ed50;
        ctx.apply(op, Fwd, &mut wgs84)?;

        // ...and back through the datum shift of the prepare stage
        let op = ctx.op("proj=latlong ellps=intl towgs84=-87,-96,-120")?;
        let mut operands = wgs84;
        ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0].0, ed50[0].0, abs_all <= 1e-9);

        ctx.apply(op, Inv, &mut operands)?;
        assert_float_eq!(operands[0].0, wgs84[0].0, abs_all <= 1e-9);
        Ok(())
    }
}
