use crate::authoring::*;
use crate::coordinate::HUGE;
use crate::exec::{Dim, Frame, PipelineAt, Resume, Routine, ValueStacks};
use crate::op::MAX_PIPELINE_DEPTH;

// ----- C O R O U T I N E -------------------------------------------------------------

/// The pipeline coroutine, in all three dimensionalities: run the steps
/// one by one (in reverse order for the inverse), skipping the omitted
/// ones, and stopping early if a step returns the error coordinate.
pub(crate) fn resume<'a>(
    frame: &mut Frame<'a>,
    direction: Direction,
    dim: Dim,
    at: PipelineAt,
    ws: &mut Workspace,
) -> Resume<'a> {
    let op: &'a Op = frame.op;
    let steps = &op.steps;

    // The first step index to consider, counting upwards in the forward
    // case, and (exclusively) downwards in the inverse
    let from = match at {
        PipelineAt::Start => {
            ws.stacks.push(ValueStacks::default());
            match dim {
                Dim::D2 => {
                    frame.coord[2] = 0.;
                    frame.coord[3] = 0.;
                }
                Dim::D3 => frame.coord[3] = 0.,
                Dim::D4 => {}
            }
            match direction {
                Fwd => 0,
                Inv => steps.len(),
            }
        }
        PipelineAt::Resumed(i) => {
            if frame.coord[0] == HUGE {
                ws.stacks.pop();
                return Resume::Done;
            }
            match direction {
                Fwd => i + 1,
                Inv => i,
            }
        }
    };

    let next = match direction {
        Fwd => (from..steps.len()).find(|&i| !steps[i].omit_fwd),
        Inv => (0..from).rev().find(|&i| !steps[i].omit_inv),
    };

    let Some(i) = next else {
        ws.stacks.pop();
        return Resume::Done;
    };
    frame.routine = Routine::Pipeline {
        direction,
        dim,
        at: PipelineAt::Resumed(i),
    };
    Resume::Call(Frame::trans(&steps[i].op, direction, dim, frame.coord))
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

// The pipeline itself only takes the common parameters
#[rustfmt::skip]
pub const GAMUT: [OpParameter; 0] = [
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    if parameters.pipeline_too_deep() {
        error!("Pipeline: too deep recursion: {}", parameters.invocation);
        return Err(Error::Syntax(format!(
            "pipelines nested more than {MAX_PIPELINE_DEPTH} levels deep"
        )));
    }

    // Syntactical sanity checks: exactly one `proj=pipeline`, and every
    // `step` after it
    let args = parameters.definition.split_into_args();
    let mut start = None;
    let mut step_positions = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        if arg == "step" {
            if start.is_none() {
                error!("Pipeline: step before proj=pipeline");
                return Err(Error::Syntax("'step' before 'proj=pipeline'".to_string()));
            }
            step_positions.push(i);
            continue;
        }
        if arg == "proj=pipeline" {
            if start.is_some() {
                error!("Pipeline: nesting only allowed through init= resources");
                return Err(Error::Syntax(
                    "nested pipelines must be wrapped in init= resources".to_string(),
                ));
            }
            start = Some(i);
        }
    }
    let Some(start) = start else {
        return Err(Error::Syntax("missing 'proj=pipeline'".to_string()));
    };
    let Some(&first_step) = step_positions.first() else {
        error!("Pipeline: no steps in {}", parameters.definition);
        return Err(Error::Syntax("pipeline without steps".to_string()));
    };

    // The global arguments are appended to the arguments of every step
    let globals = args[start + 1..first_step].join(" ");
    step_positions.push(args.len());

    let mut steps = Vec::with_capacity(step_positions.len() - 1);
    for (i, pair) in step_positions.windows(2).enumerate() {
        let local = args[pair[0] + 1..pair[1]].join(" ");
        let definition = format!("{local} {globals}");
        trace!("Pipeline: step {i}: {}", definition.trim());
        let op = Op::op(parameters.step(&definition), ctx)?;
        steps.push(Step::new(op));
    }

    // The pipeline level parameters: everything before the first step
    let head = RawParameters {
        definition: args[..first_step].join(" "),
        ..parameters.clone()
    };
    let mut op = assemble(steps, &head, parameters)?;

    // Only inversion flags given before `proj=pipeline` invert the
    // pipeline: those after it are passed on to the steps
    let inversions = args[..start].iter().filter(|arg| *arg == "inv").count();
    if inversions % 2 == 1 {
        if !op.descriptor.has_inverse() {
            error!("Cannot invert {}", parameters.definition);
            return Err(Error::NonInvertible(parameters.definition.clone()));
        }
        op.descriptor.inverted = true;
    }
    Ok(op)
}

/// Build a pipeline from already instantiated operators
pub(crate) fn from_steps(ops: Vec<Op>, ctx: &dyn Context) -> Result<Op, Error> {
    if ops.is_empty() {
        return Err(Error::Syntax("pipeline without steps".to_string()));
    }
    let parameters = RawParameters::new("proj=pipeline", &ctx.globals());
    let steps = ops.into_iter().map(Step::new).collect();
    assemble(steps, &parameters, &parameters)
}

impl Step {
    fn new(op: Op) -> Step {
        Step {
            omit_fwd: op.params.boolean("omit_fwd"),
            omit_inv: op.params.boolean("omit_inv"),
            op,
        }
    }
}

fn assemble(mut steps: Vec<Step>, head: &RawParameters, parameters: &RawParameters) -> Result<Op, Error> {
    // Require a forward path through the pipeline
    if let Some(step) = steps.iter().find(|s| !s.op.descriptor.has_forward_path()) {
        let name = &step.op.params.name;
        error!("Pipeline: a forward operation couldn't be constructed ({name})");
        return Err(Error::Construction(format!("no forward path through {name}")));
    }

    infer_units(&mut steps);

    // Check that units between each steps match each other
    for (i, pair) in steps.windows(2).enumerate() {
        let output = pair[0].op.descriptor.pj_right();
        let input = pair[1].op.descriptor.pj_left();
        if output == IoUnits::Whatever || input == IoUnits::Whatever || output == input {
            continue;
        }
        error!("Pipeline: mismatched units between step {} ({output:?}) and {} ({input:?})", i + 1, i + 2);
        return Err(Error::UnitMismatch(
            format!("{} ({})", i + 1, pair[0].op.params.name),
            format!("{} ({})", i + 2, pair[1].op.params.name),
        ));
    }

    let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
        return Err(Error::Syntax("pipeline without steps".to_string()));
    };
    let mut descriptor = OpDescriptor::new(first.op.descriptor.pj_left(), last.op.descriptor.pj_right());
    descriptor.co_fwd = CoroutineId::PipelineFwd;
    descriptor.co_inv = CoroutineId::PipelineInv;
    descriptor.co_fwd3d = CoroutineId::PipelineFwd3d;
    descriptor.co_inv3d = CoroutineId::PipelineInv3d;
    descriptor.co_fwd4d = CoroutineId::PipelineFwd4d;
    descriptor.co_inv4d = CoroutineId::PipelineInv4d;

    // The pipeline driver is a raw bit mover: the steps do their own
    // prepare/finalize work
    descriptor.skip_all();

    // A single non-invertible step makes the pipeline non-invertible
    if steps.iter().any(|s| !s.op.descriptor.has_inverse()) {
        descriptor.clear_inverse();
    }

    descriptor.invoked_as = parameters.invocation.clone();
    descriptor.instantiated_as = parameters.definition.clone();

    let params = ParsedParameters::new(head, &GAMUT)?;
    let common = Common::new(&params)?;
    debug!("Pipeline: {} steps, {:?} -> {:?}", steps.len(), descriptor.left, descriptor.right);

    Ok(Op {
        descriptor,
        params,
        common,
        aux: Auxiliary::default(),
        steps,
        id: OpHandle::new(),
    })
}

/// Steps with unspecified units on both sides (e.g. unit conversions and
/// axis swaps) inherit the units of their neighbours: first from the
/// right, then from the left
fn infer_units(steps: &mut [Step]) {
    let n = steps.len();

    for i in (0..n.saturating_sub(1)).rev() {
        let neighbour = &steps[i + 1].op.descriptor;
        let (left, right) = (neighbour.pj_left(), neighbour.pj_right());
        let desc = &mut steps[i].op.descriptor;
        if desc.pj_left() == IoUnits::Whatever
            && desc.pj_right() == IoUnits::Whatever
            && (left != right || left != IoUnits::Whatever)
        {
            debug!("Pipeline: step {} gets units {left:?} from the right", i + 1);
            desc.left = left;
            desc.right = left;
        }
    }

    for i in 1..n {
        let neighbour = &steps[i - 1].op.descriptor;
        let (left, right) = (neighbour.pj_left(), neighbour.pj_right());
        let desc = &mut steps[i].op.descriptor;
        if desc.pj_left() == IoUnits::Whatever
            && desc.pj_right() == IoUnits::Whatever
            && (left != right || right != IoUnits::Whatever)
        {
            debug!("Pipeline: step {} gets units {right:?} from the left", i + 1);
            desc.left = right;
            desc.right = right;
        }
    }
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn pipeline() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=pipeline step proj=addone step proj=addone step proj=addone")?;
        let mut data = test_data::coor2d();
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 58.);
        assert_eq!(data[1][0], 62.);
        ctx.apply(op, Inv, &mut data)?;
        assert_eq!(data[0][0], 55.);
        assert_eq!(data[1][0], 59.);

        let op = ctx.op("proj=pipeline step proj=addone step proj=addone inv step proj=addone")?;
        let mut data = test_data::coor2d();
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 56.);
        assert_eq!(data[1][0], 60.);
        ctx.apply(op, Inv, &mut data)?;
        assert_eq!(data[0][0], 55.);
        assert_eq!(data[1][0], 59.);

        // Try to invoke garbage as a pipeline step
        assert!(matches!(
            ctx.op("proj=pipeline step proj=addone step proj=_garbage"),
            Err(Error::NotFound(_, _))
        ));
        Ok(())
    }

    #[test]
    fn syntax() {
        let ctx = Minimal::default();
        for definition in [
            "step proj=addone proj=pipeline step proj=addone",
            "proj=pipeline step proj=pipeline step proj=addone",
            "proj=pipeline",
            "proj=pipeline ellps=intl",
        ] {
            assert!(
                matches!(Op::new(definition, &ctx), Err(Error::Syntax(_))),
                "{definition}"
            );
        }
    }

    #[test]
    fn inversion() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        // inv before proj=pipeline inverts the pipeline as a whole...
        let op = ctx.op("inv proj=pipeline step proj=addone step proj=affine xoff=10")?;
        let mut data = test_data::coor2d();
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 44.);

        // ...while inv among the global arguments inverts every step
        let op = ctx.op("proj=pipeline inv step proj=addone step proj=addone inv")?;
        let mut data = test_data::coor2d();
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 55.);
        let op = ctx.op("proj=pipeline inv step proj=addone step proj=addone")?;
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 53.);

        // A single forward-only step makes the pipeline forward-only
        let op = ctx.op("proj=pipeline step proj=addone step proj=affine s11=0")?;
        let desc = ctx.descriptor(op, None)?;
        assert!(!desc.has_inverse());
        assert!(matches!(
            ctx.op("inv proj=pipeline step proj=addone step proj=affine s11=0"),
            Err(Error::NonInvertible(_))
        ));
        Ok(())
    }

    #[test]
    fn omissions() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=pipeline step proj=addone omit_fwd step proj=addone step proj=addone omit_inv")?;

        let mut data = test_data::coor2d();
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 57.);
        ctx.apply(op, Inv, &mut data)?;
        assert_eq!(data[0][0], 55.);
        Ok(())
    }

    #[test]
    fn globals() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        // The global ellipsoid is passed on to the steps, where local
        // arguments take precedence
        let op = ctx.op("proj=pipeline ellps=intl step proj=cart step proj=cart inv ellps=GRS80")?;
        let steps = ctx.steps(op)?;
        assert_eq!(steps.len(), 2);
        assert_eq!(ctx.params(op, Some(0))?.text("ellps")?, "intl");
        assert_eq!(ctx.params(op, Some(1))?.text("ellps")?, "GRS80");
        assert_eq!(ctx.params(op, None)?.text("ellps")?, "intl");

        // Going to cartesian space on one ellipsoid, and back on another
        let mut data = [Coor4D::gis(12., 55., 0., 0.)];
        ctx.apply(op, Fwd, &mut data)?;
        assert_float_eq!(data[0][0], 12f64.to_radians(), abs <= 1e-12);
        assert!(data[0][1] != 55f64.to_radians());
        Ok(())
    }

    #[test]
    fn units() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        // Unit kinds are inferred for the bit movers...
        let op = ctx.op("proj=pipeline step proj=axisswap order=2,1 step proj=merc step proj=addone")?;
        assert_eq!(ctx.descriptor(op, Some(0))?.left, IoUnits::Radians);
        assert_eq!(ctx.descriptor(op, Some(2))?.left, IoUnits::Projected);
        let desc = ctx.descriptor(op, None)?;
        assert_eq!((desc.left, desc.right), (IoUnits::Radians, IoUnits::Projected));

        // ...and checked for the rest
        assert!(matches!(
            ctx.op("proj=pipeline step proj=merc step proj=merc"),
            Err(Error::UnitMismatch(_, _))
        ));
        assert!(ctx.op("proj=pipeline step proj=merc step proj=merc inv").is_ok());
        Ok(())
    }

    #[test]
    fn too_deep() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        ctx.register_resource("deep:0", "proj=pipeline step proj=addone");
        for i in 1..8 {
            let definition = format!("proj=pipeline step init=deep:{}", i - 1);
            ctx.register_resource(&format!("deep:{i}"), &definition);
        }

        // Five levels of pipelines are fine...
        let op = ctx.op("init=deep:4")?;
        let mut data = test_data::coor2d();
        ctx.apply(op, Fwd, &mut data)?;
        assert_eq!(data[0][0], 56.);

        // ...six are not
        assert!(matches!(ctx.op("init=deep:5"), Err(Error::Syntax(_))));
        Ok(())
    }
}
