use crate::authoring::*;

mod common;
mod op_descriptor;
mod parameter;
mod parsed_parameters;
mod raw_parameters;

pub use common::Auxiliary;
pub use common::Common;
pub use common::COMMON_GAMUT;
pub use op_descriptor::OpDescriptor;
pub use parameter::OpParameter;
pub use parsed_parameters::ParsedParameters;
pub use raw_parameters::RawParameters;
pub use raw_parameters::MAX_PIPELINE_DEPTH;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct OpHandle(uuid::Uuid);
impl OpHandle {
    pub fn new() -> Self {
        OpHandle(uuid::Uuid::new_v4())
    }
}
impl Default for OpHandle {
    fn default() -> Self {
        OpHandle(uuid::Uuid::new_v4())
    }
}

/// The kind of coordinates an operator expects on input (`left`), or
/// delivers on output (`right`)
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum IoUnits {
    /// Unspecified: no unit handling in prepare/finalize
    #[default]
    Whatever,
    /// Projected, in units of the semimajor axis (scaled by `a` in finalize)
    Classic,
    /// Projected, linear units
    Projected,
    /// Geocentric cartesian
    Cartesian,
    Radians,
    Degrees,
}

impl IoUnits {
    /// Seen from the outside, classic units are just projected units
    pub fn unclassic(self) -> IoUnits {
        match self {
            IoUnits::Classic => IoUnits::Projected,
            units => units,
        }
    }
}

/// A pipeline step: an operator, and the directions in which it is skipped
#[derive(Debug)]
pub struct Step {
    pub op: Op,
    pub omit_fwd: bool,
    pub omit_inv: bool,
}

/// The defining parameters and functions for an operator
#[derive(Debug)]
pub struct Op {
    pub descriptor: OpDescriptor,
    pub params: ParsedParameters,
    pub common: Common,
    pub aux: Auxiliary,
    pub steps: Vec<Step>,
    pub id: OpHandle,
}

impl Op {
    /// Operate fwd/inv on a set of coordinates, taking operator inversion
    /// into account. Returns the number of successfully transformed
    /// coordinates; the rest are set to the error coordinate.
    pub fn apply(
        &self,
        ws: &mut Workspace,
        operands: &mut dyn CoordinateSet,
        direction: Direction,
    ) -> usize {
        let mut successes = 0;
        for i in 0..operands.len() {
            let coord = crate::exec::trans(self, direction, operands.get_coord(i), ws);
            if !coord.is_error() {
                successes += 1;
            }
            operands.set_coord(i, &coord);
        }
        successes
    }

    pub fn new(definition: &str, ctx: &dyn Context) -> Result<Op, Error> {
        let globals = ctx.globals();
        let parameters = RawParameters::new(definition, &globals);
        Self::op(parameters, ctx)
    }

    /// A pipeline of already instantiated operators. Unlike pipelines
    /// given by definition, these may be nested to any depth.
    pub fn chain(ops: Vec<Op>, ctx: &dyn Context) -> Result<Op, Error> {
        crate::inner_op::pipeline::from_steps(ops, ctx)
    }

    /// Helper for the operator constructors: Instantiate an `Op` from its
    /// descriptor, for the common case where the constructor needs no
    /// other parameters than those given by the definition.
    pub fn plain(
        parameters: &RawParameters,
        mut descriptor: OpDescriptor,
        gamut: &[OpParameter],
        _ctx: &dyn Context,
    ) -> Result<Op, Error> {
        let params = ParsedParameters::new(parameters, gamut)?;
        let common = Common::new(&params)?;
        descriptor.invoked_as = parameters.invocation.clone();
        descriptor.instantiated_as = parameters.definition.clone();

        Ok(Op {
            descriptor,
            params,
            common,
            aux: Auxiliary::default(),
            steps: Vec::new(),
            id: OpHandle::new(),
        })
    }

    /// Instantiate the actual operator, taking into account the relative
    /// order of precedence between resource expansion, pipelines, user
    /// defined operators, and built-in operators
    #[allow(clippy::self_named_constructors)]
    pub fn op(parameters: RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
        if parameters.nesting_too_deep() {
            error!("Recursion too deep: {}", parameters.invocation);
            return Err(Error::Recursion(
                parameters.invocation,
                parameters.definition,
            ));
        }

        // A resource? Prepend the local arguments to the resource definition,
        // so they override the defaults provided by the resource
        if let Some(resource) = parameters.definition.split_into_parameters().get("init") {
            let body = ctx.get_resource(resource)?;
            let mut definition: Vec<String> = parameters
                .definition
                .split_into_args()
                .into_iter()
                .filter(|arg| !arg.starts_with("init="))
                .collect();
            definition.push(body);
            return Op::op(parameters.next(&definition.join(" ")), ctx);
        }

        // A pipeline?
        if parameters.definition.is_pipeline() {
            return crate::inner_op::pipeline::new(&parameters, ctx);
        }

        // A user defined operator, or a built in one?
        let name = parameters.definition.operator_name("");
        let constructor = match ctx.get_op(&name) {
            Ok(constructor) => constructor,
            Err(_) => crate::inner_op::builtin(&name).map_err(|_| {
                Error::NotFound(name.clone(), ": ".to_string() + &parameters.definition)
            })?,
        };

        let mut op = constructor.0(&parameters, ctx)?;
        op.aux = Auxiliary::new(&op.params, &op.common, &parameters, ctx)?;
        op.handle_inversion(&parameters)
    }

    /// An odd number of `inv` flags inverts the operator
    pub(crate) fn handle_inversion(mut self, parameters: &RawParameters) -> Result<Op, Error> {
        if parameters.definition.count_flag("inv") % 2 == 0 {
            return Ok(self);
        }
        if !self.descriptor.has_inverse() {
            error!("Cannot invert {}", parameters.definition);
            return Err(Error::NonInvertible(parameters.definition.clone()));
        }
        self.descriptor.inverted = !self.descriptor.inverted;
        Ok(self)
    }
}

// ----- T E S T S ---------------------------------------------------------------------
