/// The `OpParameter` enumeration describes the parameters accepted by
/// an operator, their types, and whether they are *required* (default
/// `None`) or *optional* (default given).
///
/// A `Flag` is true if present and false if not, so it takes no default.
///
/// The set of parameters accepted by an operator is called its *gamut*.
/// Every operator also accepts the descriptor level parameters listed in
/// [`COMMON_GAMUT`](crate::op::COMMON_GAMUT). Anything else given is ignored,
/// with a warning.
#[derive(Debug)]
pub enum OpParameter {
    /// A flag is a boolean that is true if present, false if not
    Flag { key: &'static str },
    /// Reals (𝐑 in math terms)
    Real {
        key: &'static str,
        default: Option<f64>,
    },
    /// A comma separated series of reals (𝐑ⁿ in math terms)
    Series {
        key: &'static str,
        default: Option<&'static str>,
    },
    /// Any kind of text
    Text {
        key: &'static str,
        default: Option<&'static str>,
    },
}

impl OpParameter {
    pub fn key(&self) -> &'static str {
        match self {
            OpParameter::Flag { key } => key,
            OpParameter::Real { key, .. } => key,
            OpParameter::Series { key, .. } => key,
            OpParameter::Text { key, .. } => key,
        }
    }
}
