use super::*;
use crate::inner_op::units;
use std::f64::consts::PI;

/// Parameters accepted by every operator. They configure the
/// prepare/finalize stages rather than the operator itself.
#[rustfmt::skip]
pub const COMMON_GAMUT: [OpParameter; 28] = [
    OpParameter::Flag   { key: "inv" },
    OpParameter::Flag   { key: "geoc" },
    OpParameter::Flag   { key: "over" },
    OpParameter::Flag   { key: "omit_fwd" },
    OpParameter::Flag   { key: "omit_inv" },

    OpParameter::Text   { key: "ellps",      default: Some("GRS80") },
    OpParameter::Real   { key: "R",          default: Some(f64::NAN) },
    OpParameter::Real   { key: "a",          default: Some(f64::NAN) },
    OpParameter::Real   { key: "rf",         default: Some(f64::NAN) },
    OpParameter::Real   { key: "f",          default: Some(f64::NAN) },
    OpParameter::Real   { key: "es",         default: Some(f64::NAN) },

    OpParameter::Real   { key: "lon_0",      default: Some(0.) },
    OpParameter::Real   { key: "lat_0",      default: Some(0.) },
    OpParameter::Real   { key: "x_0",        default: Some(0.) },
    OpParameter::Real   { key: "y_0",        default: Some(0.) },
    OpParameter::Real   { key: "z_0",        default: Some(0.) },
    OpParameter::Real   { key: "k_0",        default: Some(f64::NAN) },
    OpParameter::Real   { key: "k",          default: Some(f64::NAN) },

    OpParameter::Text   { key: "units",      default: Some("") },
    OpParameter::Text   { key: "to_meter",   default: Some("") },
    OpParameter::Text   { key: "vunits",     default: Some("") },
    OpParameter::Text   { key: "vto_meter",  default: Some("") },
    OpParameter::Text   { key: "pm",         default: Some("") },
    OpParameter::Real   { key: "lon_wrap",   default: Some(f64::NAN) },

    OpParameter::Series { key: "towgs84",    default: Some("") },
    OpParameter::Text   { key: "axis",       default: Some("enu") },
    OpParameter::Text   { key: "nadgrids",   default: Some("") },
    OpParameter::Text   { key: "geoidgrids", default: Some("") },
];

// Prime meridians, in degrees east of Greenwich
#[rustfmt::skip]
const PRIME_MERIDIANS: [(&str, f64); 14] = [
    ("greenwich",     0.0),
    ("lisbon",       -9.131_906_111),
    ("paris",         2.337_229_167),
    ("bogota",      -74.080_916_667),
    ("madrid",       -3.687_375),
    ("rome",         12.452_333_333),
    ("bern",          7.439_583_333),
    ("jakarta",     106.807_719_444),
    ("ferro",       -17.666_666_667),
    ("brussels",      4.367_975),
    ("stockholm",    18.058_277_778),
    ("athens",       23.716_337_5),
    ("oslo",         10.722_916_667),
    ("copenhagen",   12.577_88),
];

/// The descriptor level parameters, as used by the prepare/finalize stages
/// wrapped around every operator: ellipsoid, false origin, central meridian,
/// unit scaling, and longitude handling.
#[derive(Debug, Clone)]
pub struct Common {
    pub ellps: Ellipsoid,
    /// Semimajor axis and its reciprocal
    pub a: f64,
    pub ra: f64,
    /// Squared eccentricity, 1 - es, and its reciprocal
    pub es: f64,
    pub one_es: f64,
    pub rone_es: f64,

    pub lam0: f64,
    pub phi0: f64,
    pub x0: f64,
    pub y0: f64,
    pub z0: f64,
    pub k0: f64,

    pub to_meter: f64,
    pub fr_meter: f64,
    pub vto_meter: f64,
    pub vfr_meter: f64,

    pub from_greenwich: f64,
    pub long_wrap_center: Option<f64>,

    pub over: bool,
    pub geoc: bool,
    pub is_geocent: bool,
}

impl Default for Common {
    fn default() -> Common {
        Common::from_ellipsoid(Ellipsoid::default())
    }
}

impl Common {
    fn from_ellipsoid(ellps: Ellipsoid) -> Common {
        let a = ellps.semimajor_axis();
        let es = ellps.eccentricity_squared();
        Common {
            ellps,
            a,
            ra: 1. / a,
            es,
            one_es: 1. - es,
            rone_es: 1. / (1. - es),
            lam0: 0.,
            phi0: 0.,
            x0: 0.,
            y0: 0.,
            z0: 0.,
            k0: 1.,
            to_meter: 1.,
            fr_meter: 1.,
            vto_meter: 1.,
            vfr_meter: 1.,
            from_greenwich: 0.,
            long_wrap_center: None,
            over: false,
            geoc: false,
            is_geocent: false,
        }
    }

    pub fn new(params: &ParsedParameters) -> Result<Common, Error> {
        let mut common = Common::from_ellipsoid(ellipsoid(params)?);

        common.lam0 = params.angle("lon_0")?;
        common.phi0 = params.angle("lat_0")?;
        if common.phi0.abs() > PI / 2. {
            return Err(bad("lat_0", params));
        }

        common.x0 = params.real("x_0")?;
        common.y0 = params.real("y_0")?;
        common.z0 = params.real("z_0")?;

        let k_0 = params.real("k_0")?;
        let k = params.real("k")?;
        common.k0 = match (k_0.is_nan(), k.is_nan()) {
            (false, _) => k_0,
            (true, false) => k,
            (true, true) => 1.,
        };
        if common.k0 <= 0. {
            return Err(bad("k_0", params));
        }

        common.to_meter = linear_factor(params, "to_meter", "units")?;
        common.fr_meter = 1. / common.to_meter;
        common.vto_meter = linear_factor(params, "vto_meter", "vunits")?;
        common.vfr_meter = 1. / common.vto_meter;

        common.from_greenwich = prime_meridian(params)?;

        let center = params.real("lon_wrap")?;
        if !center.is_nan() {
            let center = center.to_radians();
            if center.abs() >= 4. * PI {
                return Err(bad("lon_wrap", params));
            }
            common.long_wrap_center = Some(center);
        }

        // Geocentric latitudes are meaningless on the sphere
        common.geoc = params.boolean("geoc") && common.es != 0.;
        common.over = params.boolean("over");
        Ok(common)
    }
}

fn bad(key: &str, params: &ParsedParameters) -> Error {
    let value = params.given.get(key).cloned().unwrap_or_default();
    error!("{}: Bad value for '{key}': '{value}'", params.name);
    Error::BadParam(key.to_string(), value)
}

// R trumps a (+ rf, f, es), which trumps ellps
fn ellipsoid(params: &ParsedParameters) -> Result<Ellipsoid, Error> {
    let r = params.real("R")?;
    if !r.is_nan() {
        if r <= 0. {
            return Err(bad("R", params));
        }
        return Ok(Ellipsoid::new(r, 0.));
    }

    let named = Ellipsoid::named(&params.text("ellps")?)?;
    let a = params.real("a")?;
    if a.is_nan() {
        return Ok(named);
    }
    if a <= 0. {
        return Err(bad("a", params));
    }

    let rf = params.real("rf")?;
    if !rf.is_nan() {
        if rf <= 1. {
            return Err(bad("rf", params));
        }
        return Ok(Ellipsoid::new(a, 1. / rf));
    }

    let f = params.real("f")?;
    if !f.is_nan() {
        if !(0. ..1.).contains(&f) {
            return Err(bad("f", params));
        }
        return Ok(Ellipsoid::new(a, f));
    }

    let es = params.real("es")?;
    if !es.is_nan() {
        if !(0. ..1.).contains(&es) {
            return Err(bad("es", params));
        }
        return Ok(Ellipsoid::from_eccentricity_squared(a, es));
    }

    // Only the size given: keep the shape of the named ellipsoid
    Ok(Ellipsoid::new(a, named.flattening()))
}

// Explicit factor (possibly a fraction, like "1/3") trumps named unit
fn linear_factor(params: &ParsedParameters, factor: &str, name: &str) -> Result<f64, Error> {
    let given = params.text(factor)?;
    if !given.is_empty() {
        let value = match given.split_once('/') {
            Some((n, d)) => match (n.parse::<f64>(), d.parse::<f64>()) {
                (Ok(n), Ok(d)) => n / d,
                _ => f64::NAN,
            },
            None => given.parse::<f64>().unwrap_or(f64::NAN),
        };
        if !(value > 0. && value.is_finite()) {
            return Err(bad(factor, params));
        }
        return Ok(value);
    }

    let unit = params.text(name)?;
    if unit.is_empty() {
        return Ok(1.);
    }
    match units::linear(&unit) {
        Some(unit) => Ok(unit.multiplier()),
        None => Err(bad(name, params)),
    }
}

fn prime_meridian(params: &ParsedParameters) -> Result<f64, Error> {
    let pm = params.text("pm")?;
    if pm.is_empty() {
        return Ok(0.);
    }
    if let Some((_, degrees)) = PRIME_MERIDIANS.iter().find(|(name, _)| *name == pm) {
        return Ok(degrees.to_radians());
    }
    match pm.parse::<f64>() {
        Ok(degrees) => Ok(degrees.to_radians()),
        Err(_) => Err(bad("pm", params)),
    }
}

// ----- A U X I L I A R Y   O P E R A T O R S -----------------------------------------

/// Sub-operations owned by an operator, and run by its prepare/finalize
/// stages: axis swapping, datum shift (through geocentric cartesian space),
/// and grid shifts.
#[derive(Debug, Default)]
pub struct Auxiliary {
    pub axisswap: Option<Box<Op>>,
    pub cart: Option<Box<Op>>,
    pub cart_wgs84: Option<Box<Op>>,
    pub helmert: Option<Box<Op>>,
    pub hgridshift: Option<Box<Op>>,
    pub vgridshift: Option<Box<Op>>,
}

impl Auxiliary {
    /// Set up the sub-operations implied by the `axis`, `towgs84`, `nadgrids`
    /// and `geoidgrids` parameters of the operator
    pub fn new(
        params: &ParsedParameters,
        common: &Common,
        parameters: &RawParameters,
        ctx: &dyn Context,
    ) -> Result<Auxiliary, Error> {
        let mut aux = Auxiliary::default();

        for grids in ["nadgrids", "geoidgrids"] {
            let value = params.text(grids)?;
            if !value.is_empty() {
                error!("{}: grid files are not supported ({grids}={value})", params.name);
                return Err(Error::Unsupported(format!("{grids}={value}")));
            }
        }

        // The axisswap operator consumes the axis parameter itself
        let axis = params.text("axis")?;
        if axis != "enu" && params.name != "axisswap" {
            let def = format!("proj=axisswap axis={axis}");
            aux.axisswap = Some(sub_op(&def, parameters, ctx)?);
        }

        if let Ok(towgs84) = params.series("towgs84") {
            if towgs84.iter().any(|&v| v != 0.) {
                let def = helmert_definition(towgs84, params)?;
                aux.helmert = Some(sub_op(&def, parameters, ctx)?);
            }
        }

        if common.is_geocent || aux.helmert.is_some() {
            let def = format!("proj=cart a={} es={}", common.a, common.es);
            aux.cart = Some(sub_op(&def, parameters, ctx)?);
        }

        if aux.helmert.is_some() && !common.is_geocent {
            aux.cart_wgs84 = Some(sub_op("proj=cart ellps=WGS84", parameters, ctx)?);
        }

        Ok(aux)
    }
}

fn helmert_definition(towgs84: &[f64], params: &ParsedParameters) -> Result<String, Error> {
    const KEYS: [&str; 7] = ["x", "y", "z", "rx", "ry", "rz", "s"];
    if towgs84.len() != 3 && towgs84.len() != 7 {
        return Err(bad("towgs84", params));
    }
    let mut def = String::from("proj=helmert exact convention=position_vector");
    for (key, value) in KEYS.iter().zip(towgs84) {
        def += &format!(" {key}={value}");
    }
    Ok(def)
}

// Auxiliary operators are instantiated directly from the builtins, and
// get no prepare/finalize stages (nor auxiliaries) of their own
fn sub_op(definition: &str, parameters: &RawParameters, ctx: &dyn Context) -> Result<Box<Op>, Error> {
    let parameters = parameters.next(definition);
    let name = definition.operator_name("");
    let constructor = crate::inner_op::builtin(&name)?;
    let mut op = constructor.0(&parameters, ctx)?;
    op.descriptor.skip_all();
    debug!("Auxiliary operator: {definition}");
    Ok(Box::new(op))
}

// ----- T E S T S ---------------------------------------------------------------------
