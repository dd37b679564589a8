use crate::authoring::*;

// ----- B U I L T I N   O P E R A T O R S ---------------------------------------------

// Install new builtin operators by adding them in the `mod` and
// `BUILTIN_OPERATORS` blocks below, and their kernels in the dispatcher

pub(crate) mod addone;
pub(crate) mod affine;
pub(crate) mod axisswap;
pub(crate) mod cart;
pub(crate) mod eqc;
pub(crate) mod geocent;
pub(crate) mod geogoffset;
pub(crate) mod helmert;
pub(crate) mod merc;
pub(crate) mod noop;
pub(crate) mod pipeline;
pub(crate) mod pushpop;
pub(crate) mod unitconvert;
pub(crate) mod units;

#[rustfmt::skip]
const BUILTIN_OPERATORS: [(&str, OpConstructor); 18] = [
    ("addone",       OpConstructor(addone::new)),
    ("affine",       OpConstructor(affine::new)),
    ("axisswap",     OpConstructor(axisswap::new)),
    ("cart",         OpConstructor(cart::new)),
    ("eqc",          OpConstructor(eqc::new)),
    ("geocent",      OpConstructor(geocent::new)),
    ("geogoffset",   OpConstructor(geogoffset::new)),
    ("helmert",      OpConstructor(helmert::new)),
    ("merc",         OpConstructor(merc::new)),
    ("unitconvert",  OpConstructor(unitconvert::new)),

    // Pipeline handlers
    ("pipeline",     OpConstructor(pipeline::new)),
    ("pop",          OpConstructor(pushpop::pop_new)),
    ("push",         OpConstructor(pushpop::push_new)),

    // The noop, and its geographic aliases
    ("noop",         OpConstructor(noop::new)),
    ("longlat",      OpConstructor(noop::latlong)),
    ("latlon",       OpConstructor(noop::latlong)),
    ("latlong",      OpConstructor(noop::latlong)),
    ("lonlat",       OpConstructor(noop::latlong)),
];
// A BTreeMap would have been a better choice for BUILTIN_OPERATORS, except
// for the annoying fact that it cannot be compile-time const-constructed.

/// Handle instantiation of built-in operators, as defined in
/// `BUILTIN_OPERATORS` above.
pub(crate) fn builtin(name: &str) -> Result<OpConstructor, Error> {
    for p in BUILTIN_OPERATORS {
        if p.0 == name {
            return Ok(p.1);
        }
    }
    Err(Error::NotFound(name.to_string(), String::default()))
}

// ----- S T R U C T   O P C O N S T R U C T O R ---------------------------------------

/// Blueprint for the overall instantiation of an operator.
///
/// OpConstructor needs to be a newtype, rather than a type alias,
/// since we must implement the Debug-trait for OpConstructor (to
/// make auto derive of the Debug-trait work for any derived type).
#[derive(Clone, Copy)]
pub struct OpConstructor(pub fn(args: &RawParameters, ctx: &dyn Context) -> Result<Op, Error>);

// Cannot autoderive the Debug trait
impl core::fmt::Debug for OpConstructor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "OpConstructor")
    }
}

// ----- T E S T S ---------------------------------------------------------------------
