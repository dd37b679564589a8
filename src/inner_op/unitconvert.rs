/// The unit conversion operator.
/// It has a subset of the conversions supported by PROJ.
/// NB: If no units are specified, the default is the pivot unit.
///
/// Conversions are performed by means of a pivot unit.
/// For horizontal conversions, the pivot unit is meters for linear units and radians for angular units.
/// Vertical units always pivot around meters, and time units around the modified julian date.
/// Unit_A => (meters || radians || mjd) => Unit_B
use super::units;
use crate::authoring::*;

// ----- T I M E -----------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum TimeUnit {
    Mjd,
    DecimalYear,
    GpsWeek,
}

impl TimeUnit {
    fn named(name: &str) -> Option<TimeUnit> {
        match name {
            "mjd" => Some(TimeUnit::Mjd),
            "decimalyear" => Some(TimeUnit::DecimalYear),
            "gps_week" => Some(TimeUnit::GpsWeek),
            _ => None,
        }
    }

    fn to_mjd(self, t: f64) -> f64 {
        match self {
            TimeUnit::Mjd => t,
            TimeUnit::DecimalYear => decimalyear_to_mjd(t),
            TimeUnit::GpsWeek => GPS_EPOCH_MJD + 7. * t,
        }
    }

    fn mjd_into(self, mjd: f64) -> f64 {
        match self {
            TimeUnit::Mjd => mjd,
            TimeUnit::DecimalYear => mjd_to_decimalyear(mjd),
            TimeUnit::GpsWeek => (mjd - GPS_EPOCH_MJD) / 7.,
        }
    }
}

// 1980-01-06
const GPS_EPOCH_MJD: f64 = 44244.;
// 1970-01-01
const UNIX_EPOCH_MJD: i64 = 40587;

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_year(year: i64) -> f64 {
    if is_leap_year(year) {
        366.
    } else {
        365.
    }
}

// Days from 1970-01-01 to the first of January, proleptic Gregorian calendar
fn days_to_new_year(year: i64) -> i64 {
    let y = year - 1;
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    // The first of January is day 306 of a March based year
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + 306;
    era * 146_097 + doe - 719_468
}

fn mjd_of_new_year(year: i64) -> f64 {
    (days_to_new_year(year) + UNIX_EPOCH_MJD) as f64
}

fn decimalyear_to_mjd(decimalyear: f64) -> f64 {
    if !decimalyear.is_finite() {
        return decimalyear;
    }
    let year = decimalyear.floor();
    let fraction = decimalyear - year;
    let year = year as i64;
    mjd_of_new_year(year) + fraction * days_in_year(year)
}

fn mjd_to_decimalyear(mjd: f64) -> f64 {
    if !mjd.is_finite() {
        return mjd;
    }
    let mut year = 1970 + ((mjd - UNIX_EPOCH_MJD as f64) / 365.2425).floor() as i64;
    while mjd < mjd_of_new_year(year) {
        year -= 1;
    }
    while mjd >= mjd_of_new_year(year + 1) {
        year += 1;
    }
    year as f64 + (mjd - mjd_of_new_year(year)) / days_in_year(year)
}

fn convert_time(op: &Op, t: f64, direction: Direction) -> f64 {
    let unit = |key: &str| op.params.text.get(key).and_then(|name| TimeUnit::named(name));
    let (Some(t_in), Some(t_out)) = (unit("t_in"), unit("t_out")) else {
        return t;
    };
    if t_in == t_out {
        return t;
    }
    match direction {
        Fwd => t_out.mjd_into(t_in.to_mjd(t)),
        Inv => t_in.mjd_into(t_out.to_mjd(t)),
    }
}

// ----- K E R N E L S -----------------------------------------------------------------

fn factor(op: &Op, key: &str) -> f64 {
    op.params.real(key).unwrap_or(1.)
}

pub(crate) fn fwd_2d(op: &Op, _ws: &mut Workspace, c: Coor2D) -> Coor2D {
    let f = factor(op, "xy_factor");
    Coor2D::raw(c[0] * f, c[1] * f)
}

pub(crate) fn inv_2d(op: &Op, _ws: &mut Workspace, c: Coor2D) -> Coor2D {
    let f = factor(op, "xy_factor");
    Coor2D::raw(c[0] / f, c[1] / f)
}

pub(crate) fn fwd_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    let f = factor(op, "xy_factor");
    Coor3D::raw(c[0] * f, c[1] * f, c[2] * factor(op, "z_factor"))
}

pub(crate) fn inv_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    let f = factor(op, "xy_factor");
    Coor3D::raw(c[0] / f, c[1] / f, c[2] / factor(op, "z_factor"))
}

pub(crate) fn fwd_4d(op: &Op, ws: &mut Workspace, c: Coor4D) -> Coor4D {
    let mut c = c;
    c.set_xyz(fwd_3d(op, ws, c.xyz()));
    c[3] = convert_time(op, c[3], Fwd);
    c
}

pub(crate) fn inv_4d(op: &Op, ws: &mut Workspace, c: Coor4D) -> Coor4D {
    let mut c = c;
    c.set_xyz(inv_3d(op, ws, c.xyz()));
    c[3] = convert_time(op, c[3], Inv);
    c
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 6] = [
    OpParameter::Text { key: "xy_in",  default: Some("") },
    OpParameter::Text { key: "xy_out", default: Some("") },
    OpParameter::Text { key: "z_in",   default: Some("") },
    OpParameter::Text { key: "z_out",  default: Some("") },
    OpParameter::Text { key: "t_in",   default: Some("") },
    OpParameter::Text { key: "t_out",  default: Some("") },
];

// Conversion factor to the pivot unit, and whether the unit is angular.
// Unnamed linear units may be given as a plain factor
fn horizontal_unit(key: &str, name: &str) -> Result<(f64, bool), Error> {
    if let Some(unit) = units::linear(name) {
        return Ok((unit.multiplier(), false));
    }
    if let Some(unit) = units::angular(name) {
        return Ok((unit.multiplier(), true));
    }
    match name.parse::<f64>() {
        Ok(f) if f > 0. && f.is_finite() => Ok((f, false)),
        _ => {
            error!("unitconvert: unknown unit '{name}' for {key}");
            Err(Error::BadParam(key.to_string(), name.to_string()))
        }
    }
}

fn vertical_unit(key: &str, name: &str) -> Result<f64, Error> {
    if name.is_empty() {
        return Ok(1.);
    }
    match horizontal_unit(key, name)? {
        (f, false) => Ok(f),
        (_, true) => {
            error!("unitconvert: {key} must be a linear unit, got '{name}'");
            Err(Error::BadParam(key.to_string(), name.to_string()))
        }
    }
}

// Only radians and degrees are recognized by the prepare/finalize stages
fn io_units(name: &str) -> IoUnits {
    match name {
        "rad" => IoUnits::Radians,
        "deg" => IoUnits::Degrees,
        _ => IoUnits::Whatever,
    }
}

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Whatever, IoUnits::Whatever);
    descriptor.fwd = Fwd2dId::Unitconvert;
    descriptor.inv = Inv2dId::Unitconvert;
    descriptor.fwd3d = Fwd3dId::Unitconvert;
    descriptor.inv3d = Inv3dId::Unitconvert;
    descriptor.fwd4d = OperatorId::UnitconvertFwd;
    descriptor.inv4d = OperatorId::UnitconvertInv;
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;
    let params = &mut op.params;

    // Horizontal: a missing unit defaults to the pivot of the other side
    let mut xy_in = params.text("xy_in")?;
    let mut xy_out = params.text("xy_out")?;
    if !xy_in.is_empty() || !xy_out.is_empty() {
        let angular = |name: &str| units::angular(name).is_some();
        if xy_in.is_empty() {
            xy_in = if angular(&xy_out) { "rad" } else { "m" }.to_string();
        }
        if xy_out.is_empty() {
            xy_out = if angular(&xy_in) { "rad" } else { "m" }.to_string();
        }
        let (f_in, angular_in) = horizontal_unit("xy_in", &xy_in)?;
        let (f_out, angular_out) = horizontal_unit("xy_out", &xy_out)?;
        if angular_in != angular_out {
            error!("unitconvert: cannot convert between {xy_in} and {xy_out}");
            return Err(Error::BadParam("xy_out".to_string(), xy_out));
        }
        params.real.insert("xy_factor", f_in / f_out);
        if angular_in {
            op.descriptor.left = io_units(&xy_in);
            op.descriptor.right = io_units(&xy_out);
        }
    }

    let z_in = vertical_unit("z_in", &params.text("z_in")?)?;
    let z_out = vertical_unit("z_out", &params.text("z_out")?)?;
    params.real.insert("z_factor", z_in / z_out);

    // Time units come in pairs, or not at all
    let t_in = params.text("t_in")?;
    let t_out = params.text("t_out")?;
    if t_in.is_empty() != t_out.is_empty() {
        error!("unitconvert: t_in and t_out must be given together");
        return Err(Error::MissingParam(if t_in.is_empty() { "t_in" } else { "t_out" }.to_string()));
    }
    for (key, name) in [("t_in", &t_in), ("t_out", &t_out)] {
        if !name.is_empty() && TimeUnit::named(name).is_none() {
            error!("unitconvert: unknown time unit '{name}'");
            return Err(Error::BadParam(key.to_string(), name.clone()));
        }
    }

    Ok(op)
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn xyz_default_units() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=unitconvert xy_in=us-ft z_in=us-ft")?;

        let mut operands = [Coor4D::raw(5., 5., 5., 1.)];

        // Forward
        let successes = ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0][0], 1.524003048, abs_all <= 1e-9);
        assert_float_eq!(operands[0][1], 1.524003048, abs_all <= 1e-9);
        assert_float_eq!(operands[0][2], 1.524003048, abs_all <= 1e-9);
        assert_float_eq!(operands[0][3], 1., abs_all <= 1e-9);
        assert_eq!(successes, 1);

        // Inverse + roundtrip
        ctx.apply(op, Inv, &mut operands)?;
        assert_float_eq!(operands[0].0, [5., 5., 5., 1.], abs_all <= 1e-9);
        Ok(())
    }

    #[test]
    fn xy_yd_to_m() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=unitconvert xy_in=us-yd xy_out=m")?;

        let mut operands = [Coor4D::raw(1000., 1000., 500., 1.)];

        let successes = ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0].0, [914.40182880, 914.40182880, 500., 1.], abs_all <= 1e-5);
        assert_eq!(successes, 1);

        ctx.apply(op, Inv, &mut operands)?;
        assert_float_eq!(operands[0].0, [1000., 1000., 500., 1.], abs_all <= 1e-9);
        Ok(())
    }

    #[test]
    fn xy_grad_to_deg() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=unitconvert xy_in=grad xy_out=deg")?;

        let mut operands = [Coor4D::raw(135.0, 40., 500., 1.)];

        let successes = ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0].0, [121.5, 36.0, 500., 1.], abs_all <= 1e-9);
        assert_eq!(successes, 1);

        ctx.apply(op, Inv, &mut operands)?;
        assert_float_eq!(operands[0].0, [135.0, 40., 500., 1.], abs_all <= 1e-9);
        Ok(())
    }

    #[test]
    fn angular_io_units() -> Result<(), Error> {
        let ctx = Minimal::default();
        let op = Op::new("proj=unitconvert xy_in=deg xy_out=rad", &ctx)?;
        assert_eq!(op.descriptor.left, IoUnits::Degrees);
        assert_eq!(op.descriptor.right, IoUnits::Radians);

        // The missing side defaults to the pivot unit of the given one
        let op = Op::new("proj=unitconvert xy_out=deg", &ctx)?;
        assert_eq!(op.descriptor.left, IoUnits::Radians);

        let op = Op::new("proj=unitconvert xy_in=km", &ctx)?;
        assert_eq!(op.descriptor.left, IoUnits::Whatever);
        assert_eq!(op.params.real("xy_factor")?, 1000.);
        Ok(())
    }

    #[test]
    fn time() -> Result<(), Error> {
        let mut ctx = Minimal::default();

        let op = ctx.op("proj=unitconvert t_in=decimalyear t_out=mjd")?;
        let mut operands = [Coor4D::raw(5., 5., 5., 2017.5)];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0][3], 57936.5, abs <= 1e-9);
        ctx.apply(op, Inv, &mut operands)?;
        assert_float_eq!(operands[0][3], 2017.5, abs <= 1e-9);

        // Leap year
        let op = ctx.op("proj=unitconvert t_in=decimalyear t_out=mjd")?;
        let mut operands = [Coor4D::raw(0., 0., 0., 2020.5)];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0][3], 58849. + 183., abs <= 1e-9);

        // The GPS epoch, one week later
        let op = ctx.op("proj=unitconvert t_in=gps_week t_out=mjd")?;
        let mut operands = [Coor4D::raw(0., 0., 0., 1.)];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0][3], 44251., abs <= 1e-9);

        let op = ctx.op("proj=unitconvert t_in=gps_week t_out=decimalyear")?;
        let mut operands = [Coor4D::raw(0., 0., 0., 0.)];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_float_eq!(operands[0][3], 1980. + 5. / 366., abs <= 1e-12);
        Ok(())
    }

    #[test]
    fn bad_units() {
        let ctx = Minimal::default();
        for def in [
            "proj=unitconvert xy_in=unknown xy_out=deg",
            "proj=unitconvert xy_in=m xy_out=deg",
            "proj=unitconvert z_in=deg",
            "proj=unitconvert t_in=mjd t_out=fortnight",
        ] {
            assert!(matches!(Op::new(def, &ctx), Err(Error::BadParam(_, _))), "{def}");
        }
        assert!(matches!(
            Op::new("proj=unitconvert t_in=mjd", &ctx),
            Err(Error::MissingParam(_))
        ));
    }
}
