/// Geographical to cartesian (and v.v.) conversion
use crate::authoring::*;

// ----- F O R W A R D -----------------------------------------------------------------

pub(crate) fn fwd(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    let geographic = Coor4D::raw(c[0], c[1], c[2], 0.);
    op.common.ellps.cartesian(&geographic).xyz()
}

// ----- I N V E R S E -----------------------------------------------------------------

pub(crate) fn inv(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    let cartesian = Coor4D::raw(c[0], c[1], c[2], 0.);
    op.common.ellps.geographic(&cartesian).xyz()
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

// The ellipsoid is handled by the common parameters
#[rustfmt::skip]
pub const GAMUT: [OpParameter; 0] = [
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Radians, IoUnits::Cartesian);
    descriptor.fwd3d = Fwd3dId::Cart;
    descriptor.inv3d = Inv3dId::Cart;
    Op::plain(parameters, descriptor, &GAMUT, ctx)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn roundtrip() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=cart")?;

        let geo = [
            Coor4D::geo(85., 0., 100000., 0.),
            Coor4D::geo(55., 10., -100000., 0.),
            Coor4D::geo(25., 20., 0., 0.),
            Coor4D::geo(0., -20., 0., 0.),
        ];

        let cart = [
            Coor4D::raw(566_462.633_537_476_8, 0.0, 6_432_020.333_690_127, 0.0),
            Coor4D::raw(3_554_403.475_871_930_4, 626_737.233_120_170_7, 5_119_468.318_659_256, 0.),
            Coor4D::raw(5_435_195.382_145_216, 1_978_249.336_521_975_5, 2_679_074.462_877_277_8, 0.),
            Coor4D::raw(5_993_488.273_261_571, -2_181_451.330_890_750_5, 0., 0.),
        ];

        // Forward
        let mut operands = geo;
        ctx.apply(op, Fwd, &mut operands)?;
        for i in 0..4 {
            assert!(operands[i].hypot3(&cart[i]) < 20e-9);
        }

        // Inverse
        ctx.apply(op, Inv, &mut operands)?;
        for i in 0..4 {
            assert_float_eq!(operands[i].0, geo[i].0, abs_all <= 1e-8);
        }
        Ok(())
    }

    #[test]
    fn ellipsoid() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let grs80 = ctx.op("proj=cart")?;
        let intl = ctx.op("proj=cart ellps=intl")?;
        let sphere = ctx.op("proj=cart R=6400000")?;

        let mut a = [Coor4D::gis(0., 0., 0., 0.)];
        let mut b = a;
        let mut c = a;
        ctx.apply(grs80, Fwd, &mut a)?;
        ctx.apply(intl, Fwd, &mut b)?;
        ctx.apply(sphere, Fwd, &mut c)?;
        assert_eq!(a[0][0], 6378137.);
        assert_eq!(b[0][0], 6378388.);
        assert_eq!(c[0][0], 6400000.);
        Ok(())
    }
}
