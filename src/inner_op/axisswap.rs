//! Axis swapping and sign changes. The axis order is given either
//! numerically (`order=2,1,-3`), or by compass directions relative to
//! the east-north-up default (`axis=neu`)
use crate::authoring::*;

// The axis order, as (source index, sign) pairs for each output element
fn order(op: &Op) -> [(usize, f64); 4] {
    let mut order = [(0, 1.), (1, 1.), (2, 1.), (3, 1.)];
    if let Ok(given) = op.params.series("order") {
        for (index, value) in given.iter().enumerate().take(4) {
            order[index] = ((value.abs() - 1.) as usize, 1_f64.copysign(*value));
        }
    }
    order
}

fn swap<const N: usize>(op: &Op, inp: [f64; N], direction: Direction) -> [f64; N] {
    let mut out = inp;
    for (index, (pos, sgn)) in order(op).into_iter().enumerate().take(N) {
        // Only reached for orders closed under the first N axes
        if pos >= N {
            continue;
        }
        match direction {
            Fwd => out[index] = inp[pos] * sgn,
            Inv => out[pos] = inp[index] * sgn,
        }
    }
    out
}

// ----- K E R N E L S -----------------------------------------------------------------

pub(crate) fn fwd_2d(op: &Op, _ws: &mut Workspace, c: Coor2D) -> Coor2D {
    Coor2D(swap(op, c.0, Fwd))
}

pub(crate) fn inv_2d(op: &Op, _ws: &mut Workspace, c: Coor2D) -> Coor2D {
    Coor2D(swap(op, c.0, Inv))
}

pub(crate) fn fwd_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    Coor3D(swap(op, c.0, Fwd))
}

pub(crate) fn inv_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    Coor3D(swap(op, c.0, Inv))
}

pub(crate) fn fwd_4d(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    Coor4D(swap(op, c.0, Fwd))
}

pub(crate) fn inv_4d(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    Coor4D(swap(op, c.0, Inv))
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 2] = [
    OpParameter::Series { key: "order", default: Some("") },
    OpParameter::Text   { key: "axis",  default: Some("") },
];

// Compass directions to signed axis indices
fn axis_to_order(axis: &str) -> Option<Vec<f64>> {
    axis.chars()
        .map(|c| match c {
            'e' => Some(1.),
            'w' => Some(-1.),
            'n' => Some(2.),
            's' => Some(-2.),
            'u' => Some(3.),
            'd' => Some(-3.),
            _ => None,
        })
        .collect()
}

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;

    let axis = op.params.text("axis")?;
    if !axis.is_empty() {
        if op.params.series("order").is_ok() {
            error!("axisswap: 'order' and 'axis' are mutually exclusive");
            return Err(Error::BadParam("axis".to_string(), axis));
        }
        let Some(order) = axis_to_order(&axis) else {
            return Err(Error::BadParam("axis".to_string(), axis));
        };
        op.params.series.insert("order", order);
    }

    let order = op.params.series("order").unwrap_or(&[1., 2., 3., 4.]).to_vec();
    if order.len() > 4 {
        return Err(Error::BadParam(
            "order".to_string(),
            "More than 4 indices given".to_string(),
        ));
    }

    // While the Series type returns a Vec<f64>, the elements must be convertible to i64
    // and further to (x.abs() as usize) for use as array indices
    for &o in &order {
        let i = o as i64;
        if (i as f64) != o || i == 0 || (i.unsigned_abs() as usize) > order.len() {
            return Err(Error::BadParam("order".to_string(), o.to_string()));
        }
    }

    // PROJ does not allow duplicate axes, and neither do we
    for o in 1_u64..5 {
        if order.iter().filter(|x| (x.abs() as u64) == o).count() > 1 {
            return Err(Error::BadParam(
                "order".to_string(),
                "duplicate axis specified".to_string(),
            ));
        }
    }

    // A kernel of dimension N is only valid if the order does not mix
    // the first N axes with the remaining ones
    let closed = |n: usize| order.iter().take(n).all(|o| (o.abs() as usize) <= n);
    let d = &mut op.descriptor;
    if closed(2) {
        d.fwd = Fwd2dId::Axisswap;
        d.inv = Inv2dId::Axisswap;
    }
    if closed(3) {
        d.fwd3d = Fwd3dId::Axisswap;
        d.inv3d = Inv3dId::Axisswap;
    }
    d.fwd4d = OperatorId::AxisswapFwd;
    d.inv4d = OperatorId::AxisswapInv;
    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_dim() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=axisswap order=2,1,-3,-4")?;

        let mut operands = [Coor4D([1., 2., 3., 4.])];

        // Forward
        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0], Coor4D([2., 1., -3., -4.]));

        // Inverse + roundtrip
        ctx.apply(op, Inv, &mut operands)?;
        assert_eq!(operands[0], Coor4D([1., 2., 3., 4.]));
        Ok(())
    }

    #[test]
    fn default_order() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=axisswap")?;

        let mut operands = [Coor4D([1., 2., 3., 4.])];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0], Coor4D([1., 2., 3., 4.]));
        ctx.apply(op, Inv, &mut operands)?;
        assert_eq!(operands[0], Coor4D([1., 2., 3., 4.]));
        Ok(())
    }

    #[test]
    fn two_dim() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        let op = ctx.op("proj=axisswap order=2,-1")?;
        let mut operands = [Coor4D([1., 2., 3., 4.])];

        // Forward
        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0], Coor4D([2., -1., 3., 4.]));

        // Inverse + roundtrip
        ctx.apply(op, Inv, &mut operands)?;
        assert_eq!(operands[0], Coor4D([1., 2., 3., 4.]));
        Ok(())
    }

    #[test]
    fn compass_directions() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        let op = ctx.op("proj=axisswap axis=swu")?;
        let mut operands = [Coor3D([1., 2., 3.])];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0], Coor3D([-2., -1., 3.]));
        ctx.apply(op, Inv, &mut operands)?;
        assert_eq!(operands[0], Coor3D([1., 2., 3.]));

        assert!(matches!(ctx.op("proj=axisswap axis=nex"), Err(Error::BadParam(_, _))));
        assert!(matches!(ctx.op("proj=axisswap axis=ne order=2,1"), Err(Error::BadParam(_, _))));
        Ok(())
    }

    #[test]
    fn dimensionality() -> Result<(), Error> {
        let ctx = Minimal::default();

        // Swapping x and z leaves no 2D kernel
        let op = Op::new("proj=axisswap order=3,2,1", &ctx)?;
        assert!(!op.descriptor.fwd.is_valid());
        assert!(op.descriptor.fwd3d.is_valid());

        let mut ws = Workspace::traced(None);
        let c = crate::execution::fwd(&op, Coor2D::raw(1., 2.), &mut ws);
        assert_eq!(c, Coor2D::raw(0., 2.));
        assert!(ws.trace().contains(&Dispatched::Fwd3d(Fwd3dId::Axisswap)));
        Ok(())
    }

    #[test]
    fn bad_parameters() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        // Too many indices
        let op = ctx.op("proj=axisswap order=4,4,4,2,-1");
        assert!(matches!(op, Err(Error::BadParam(_, _))));

        // Repeated indices
        let op = ctx.op("proj=axisswap order=4,-4,2,-1");
        assert!(matches!(op, Err(Error::BadParam(_, _))));

        // Index exceeding dimensionality
        let op = ctx.op("proj=axisswap order=2,5");
        assert!(matches!(op, Err(Error::BadParam(_, _))));

        // Missing indices ('order' becomes a flag)
        let op = ctx.op("proj=axisswap order");
        assert!(matches!(op, Err(Error::BadParam(_, _))));

        // Missing all args: axisswap succeeds and becomes a no-op
        let op = ctx.op("proj=axisswap");
        assert!(op.is_ok());
        Ok(())
    }
}
