/// Add one to the first coordinate element. Mostly for testing the
/// machinery around the operators
use crate::authoring::*;

// ----- F O R W A R D -----------------------------------------------------------------

pub(crate) fn fwd(_op: &Op, _ws: &mut Workspace, coord: Coor2D) -> Coor2D {
    Coor2D::raw(coord[0] + 1., coord[1])
}

// ----- I N V E R S E -----------------------------------------------------------------

pub(crate) fn inv(_op: &Op, _ws: &mut Workspace, coord: Coor2D) -> Coor2D {
    Coor2D::raw(coord[0] - 1., coord[1])
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 0] = [
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    descriptor.fwd = Fwd2dId::AddOne;
    descriptor.inv = Inv2dId::AddOne;
    Op::plain(parameters, descriptor, &GAMUT, ctx)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addone() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=addone")?;
        let mut data = test_data::coor4d();
        assert_eq!(data[0][0], 55.);
        assert_eq!(data[1][0], 59.);

        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 56.);
        assert_eq!(data[1][0], 60.);

        // Only the first element is touched, even through the 4D driver
        assert_eq!(data[0], Coor4D::raw(56., 12., 0., 0.));

        ctx.apply(op, Inv, &mut data)?;
        assert_eq!(data[0][0], 55.);
        assert_eq!(data[1][0], 59.);
        Ok(())
    }
}
