/// Affine transformation: an offset, and a 3x3 scaling/rotation matrix
/// for the spatial coordinates, plus an independent scaling of time
use crate::authoring::*;

// Offsets, and matrix (row major) followed by the time scale
struct Affine<'a> {
    offset: &'a [f64],
    matrix: &'a [f64],
}

impl<'a> Affine<'a> {
    fn get(op: &'a Op, matrix: &str) -> Affine<'a> {
        // Both are installed by the constructor
        let offset = op.params.series("OFFSET").unwrap_or(&[0.; 4]);
        let matrix = op.params.series(matrix).unwrap_or(&IDENTITY);
        Affine { offset, matrix }
    }

    fn fwd(&self, c: Coor4D) -> Coor4D {
        let (o, m) = (self.offset, self.matrix);
        Coor4D::raw(
            o[0] + m[0] * c[0] + m[1] * c[1] + m[2] * c[2],
            o[1] + m[3] * c[0] + m[4] * c[1] + m[5] * c[2],
            o[2] + m[6] * c[0] + m[7] * c[1] + m[8] * c[2],
            o[3] + m[9] * c[3],
        )
    }

    fn inv(&self, c: Coor4D) -> Coor4D {
        let (o, m) = (self.offset, self.matrix);
        let (x, y, z) = (c[0] - o[0], c[1] - o[1], c[2] - o[2]);
        Coor4D::raw(
            m[0] * x + m[1] * y + m[2] * z,
            m[3] * x + m[4] * y + m[5] * z,
            m[6] * x + m[7] * y + m[8] * z,
            m[9] * (c[3] - o[3]),
        )
    }
}

#[rustfmt::skip]
const IDENTITY: [f64; 10] = [
    1., 0., 0.,
    0., 1., 0.,
    0., 0., 1.,
    1.,
];

// ----- F O R W A R D -----------------------------------------------------------------

pub(crate) fn fwd_4d(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    Affine::get(op, "FWD").fwd(c)
}

// Lower dimensional kernels see zero for the missing coordinates
pub(crate) fn fwd_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    let c = Affine::get(op, "FWD").fwd(Coor4D::raw(c[0], c[1], c[2], 0.));
    Coor3D::raw(c[0], c[1], c[2])
}

pub(crate) fn fwd_2d(op: &Op, _ws: &mut Workspace, c: Coor2D) -> Coor2D {
    let c = Affine::get(op, "FWD").fwd(Coor4D::raw(c[0], c[1], 0., 0.));
    Coor2D::raw(c[0], c[1])
}

// ----- I N V E R S E -----------------------------------------------------------------

pub(crate) fn inv_4d(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    Affine::get(op, "INV").inv(c)
}

pub(crate) fn inv_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    let c = Affine::get(op, "INV").inv(Coor4D::raw(c[0], c[1], c[2], 0.));
    Coor3D::raw(c[0], c[1], c[2])
}

pub(crate) fn inv_2d(op: &Op, _ws: &mut Workspace, c: Coor2D) -> Coor2D {
    let c = Affine::get(op, "INV").inv(Coor4D::raw(c[0], c[1], 0., 0.));
    Coor2D::raw(c[0], c[1])
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 14] = [
    OpParameter::Real { key: "xoff",   default: Some(0_f64) },
    OpParameter::Real { key: "yoff",   default: Some(0_f64) },
    OpParameter::Real { key: "zoff",   default: Some(0_f64) },
    OpParameter::Real { key: "toff",   default: Some(0_f64) },
    OpParameter::Real { key: "s11",    default: Some(1_f64) },
    OpParameter::Real { key: "s12",    default: Some(0_f64) },
    OpParameter::Real { key: "s13",    default: Some(0_f64) },
    OpParameter::Real { key: "s21",    default: Some(0_f64) },
    OpParameter::Real { key: "s22",    default: Some(1_f64) },
    OpParameter::Real { key: "s23",    default: Some(0_f64) },
    OpParameter::Real { key: "s31",    default: Some(0_f64) },
    OpParameter::Real { key: "s32",    default: Some(0_f64) },
    OpParameter::Real { key: "s33",    default: Some(1_f64) },
    OpParameter::Real { key: "tscale", default: Some(1_f64) },
];

const MATRIX: [&str; 10] = [
    "s11", "s12", "s13", "s21", "s22", "s23", "s31", "s32", "s33", "tscale",
];

/// The inverse of the forward matrix, by way of the adjugate. `None` if
/// the matrix is singular, or the time scale is zero
fn inverse(m: &[f64]) -> Option<Vec<f64>> {
    let [a, b, c, d, e, f, g, h, i, tscale] = m else {
        return None;
    };
    let adjugate = [
        e * i - f * h,
        -(b * i - c * h),
        b * f - c * e,
        -(d * i - f * g),
        a * i - c * g,
        -(a * f - c * d),
        d * h - e * g,
        -(a * h - b * g),
        a * e - b * d,
    ];
    let det = a * adjugate[0] + b * adjugate[3] + c * adjugate[6];
    if det == 0. || *tscale == 0. {
        return None;
    }
    let mut inv: Vec<f64> = adjugate.iter().map(|v| v / det).collect();
    inv.push(1. / tscale);
    Some(inv)
}

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    descriptor.fwd = Fwd2dId::Affine;
    descriptor.fwd3d = Fwd3dId::Affine;
    descriptor.fwd4d = OperatorId::AffineFwd;
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;

    let mut offset = Vec::with_capacity(4);
    for key in ["xoff", "yoff", "zoff", "toff"] {
        offset.push(op.params.real(key)?);
    }
    let mut forward = Vec::with_capacity(10);
    for key in MATRIX {
        forward.push(op.params.real(key)?);
    }

    // A singular matrix leaves us with a forward-only operator
    match inverse(&forward) {
        Some(reverse) => {
            op.descriptor.inv = Inv2dId::Affine;
            op.descriptor.inv3d = Inv3dId::Affine;
            op.descriptor.inv4d = OperatorId::AffineInv;
            op.params.series.insert("INV", reverse);
        }
        None => debug!("affine: matrix not invertible"),
    }

    op.params.series.insert("OFFSET", offset);
    op.params.series.insert("FWD", forward);
    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn offsets_and_scaling() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=affine xoff=1 yoff=2 zoff=3 toff=4 s11=2 s22=3 s33=4 tscale=5")?;

        let mut data = [Coor4D::raw(1., 1., 1., 1.)];
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0], Coor4D::raw(3., 5., 7., 9.));
        ctx.apply(op, Inv, &mut data)?;
        assert_float_eq!(data[0].0, [1., 1., 1., 1.], abs_all <= 1e-14);
        Ok(())
    }

    #[test]
    fn full_matrix() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op(
            "proj=affine xoff=10 s11=2 s12=1 s13=0 s21=0 s22=1 s23=1 s31=1 s32=0 s33=3",
        )?;

        let mut data = [Coor4D::raw(1., 2., 3., 0.)];
        ctx.apply(op, Fwd, &mut data)?;
        assert_float_eq!(data[0].0, [14., 5., 10., 0.], abs_all <= 1e-14);
        ctx.apply(op, Inv, &mut data)?;
        assert_float_eq!(data[0].0, [1., 2., 3., 0.], abs_all <= 1e-12);
        Ok(())
    }

    #[test]
    fn two_dim() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=affine xoff=1 s13=100 toff=7", &ctx)?;

        // The 2D kernel knows nothing about z and t
        let mut ws = Workspace::new(None);
        let c = crate::execution::fwd(&op, Coor2D::raw(1., 2.), &mut ws);
        assert_eq!(c, Coor2D::raw(2., 2.));
        Ok(())
    }

    #[test]
    fn singular() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=affine s11=0")?;

        let mut data = [Coor4D::raw(1., 2., 3., 4.)];
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0], Coor4D::raw(0., 2., 3., 4.));

        assert!(matches!(ctx.op("proj=affine s11=0 inv"), Err(Error::NonInvertible(_))));
        assert!(matches!(ctx.op("proj=affine tscale=0 inv"), Err(Error::NonInvertible(_))));
        Ok(())
    }
}
