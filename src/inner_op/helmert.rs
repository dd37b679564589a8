#![allow(non_snake_case)]
/// The Helmert transform performs reference frame shifts. It operates in the 3D cartesian
/// space, transforming 3D cartesian coordinates between static and/or dynamic reference
/// frames, e.g. from global reference frames to local static frames.
///
/// The 3D kernels ignore the time coordinate, and use the parameters as given
/// (or as evolved to `t_obs`, when given). The 4D kernels evolve the parameters
/// to the time coordinate of each point.
use crate::authoring::*;

/// Translation, rotation matrix, and scale at a given observation time
struct Helmert {
    T: [f64; 3],
    ROT: [[f64; 3]; 3],
    S: f64,
}

fn triple(params: &ParsedParameters, key: &str) -> [f64; 3] {
    match params.series(key) {
        Ok(&[a, b, c]) => [a, b, c],
        _ => [0.; 3],
    }
}

impl Helmert {
    // The parameters as precomputed by the constructor
    fn fixed(op: &Op) -> Helmert {
        let p = &op.params;
        let ROT = match p.series("ROTFLAT") {
            Ok(&[r11, r12, r13, r21, r22, r23, r31, r32, r33]) => {
                [[r11, r12, r13], [r21, r22, r23], [r31, r32, r33]]
            }
            _ => [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]],
        };
        Helmert {
            T: triple(p, "T"),
            ROT,
            S: p.real("S").unwrap_or(1.),
        }
    }

    // The parameters evolved from the epoch to time `t`
    fn at(op: &Op, t: f64) -> Helmert {
        let p = &op.params;
        if !p.boolean("dynamic") || p.boolean("fixed_time") || !t.is_finite() {
            return Helmert::fixed(op);
        }

        let dt = t - p.real("t_epoch").unwrap_or(t);
        let (T, DT) = (triple(p, "T"), triple(p, "DT"));
        let (R, DR) = (triple(p, "R"), triple(p, "DR"));
        let S = p.real("S").unwrap_or(1.) + dt * p.real("DS").unwrap_or(0.);

        let T = [T[0] + dt * DT[0], T[1] + dt * DT[1], T[2] + dt * DT[2]];
        let ROT = if p.boolean("rotated") {
            let R = [R[0] + dt * DR[0], R[1] + dt * DR[1], R[2] + dt * DR[2]];
            rotation_matrix(&R, p.boolean("exact"), p.boolean("position_vector"))
        } else {
            Helmert::fixed(op).ROT
        };
        Helmert { T, ROT, S }
    }

    fn fwd(&self, c: [f64; 3]) -> [f64; 3] {
        let (ROT, T, S) = (&self.ROT, &self.T, self.S);
        let x = c[0] * ROT[0][0] + c[1] * ROT[0][1] + c[2] * ROT[0][2];
        let y = c[0] * ROT[1][0] + c[1] * ROT[1][1] + c[2] * ROT[1][2];
        let z = c[0] * ROT[2][0] + c[1] * ROT[2][1] + c[2] * ROT[2][2];
        [S * x + T[0], S * y + T[1], S * z + T[2]]
    }

    fn inv(&self, c: [f64; 3]) -> [f64; 3] {
        let (ROT, T, S) = (&self.ROT, &self.T, self.S);

        // Deoffset and unscale
        let x = (c[0] - T[0]) / S;
        let y = (c[1] - T[1]) / S;
        let z = (c[2] - T[2]) / S;

        // Inverse rotation by transposed multiplication
        [
            x * ROT[0][0] + y * ROT[1][0] + z * ROT[2][0],
            x * ROT[0][1] + y * ROT[1][1] + z * ROT[2][1],
            x * ROT[0][2] + y * ROT[1][2] + z * ROT[2][2],
        ]
    }
}

// ----- K E R N E L S -----------------------------------------------------------------

pub(crate) fn fwd_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    Coor3D(Helmert::fixed(op).fwd(c.0))
}

pub(crate) fn inv_3d(op: &Op, _ws: &mut Workspace, c: Coor3D) -> Coor3D {
    Coor3D(Helmert::fixed(op).inv(c.0))
}

pub(crate) fn fwd_4d(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    let mut c = c;
    c.set_xyz(Coor3D(Helmert::at(op, c[3]).fwd(c.xyz().0)));
    c
}

pub(crate) fn inv_4d(op: &Op, _ws: &mut Workspace, c: Coor4D) -> Coor4D {
    let mut c = c;
    c.set_xyz(Coor3D(Helmert::at(op, c[3]).inv(c.xyz().0)));
    c
}

// ----- C O N S T R U C T O R ---------------------------------------------------------

#[rustfmt::skip]
pub const GAMUT: [OpParameter; 18] = [
    // Translation
    OpParameter::Real { key: "x", default: Some(0f64) },
    OpParameter::Real { key: "y", default: Some(0f64) },
    OpParameter::Real { key: "z", default: Some(0f64) },

    // Time evolution of translation
    OpParameter::Real { key: "dx", default: Some(0f64) },
    OpParameter::Real { key: "dy", default: Some(0f64) },
    OpParameter::Real { key: "dz", default: Some(0f64) },

    // Rotation
    OpParameter::Real { key: "rx", default: Some(0f64) },
    OpParameter::Real { key: "ry", default: Some(0f64) },
    OpParameter::Real { key: "rz", default: Some(0f64) },

    // Time evolution of rotation
    OpParameter::Real { key: "drx", default: Some(0f64) },
    OpParameter::Real { key: "dry", default: Some(0f64) },
    OpParameter::Real { key: "drz", default: Some(0f64) },

    // Handling of rotation
    OpParameter::Text { key: "convention", default: Some("") },
    OpParameter::Flag { key: "exact" },

    // Scale (ppm) and its time evolution
    OpParameter::Real { key: "s",  default: Some(0f64) },
    OpParameter::Real { key: "ds", default: Some(0f64) },

    // Epoch - "beginning of time for this transformation"
    OpParameter::Real { key: "t_epoch", default: Some(f64::NAN) },

    // Fixed observation time - ignore the fourth coordinate.
    OpParameter::Real { key: "t_obs", default: Some(f64::NAN) },
];

pub fn new(parameters: &RawParameters, ctx: &dyn Context) -> Result<Op, Error> {
    let mut descriptor = OpDescriptor::new(IoUnits::Cartesian, IoUnits::Cartesian);
    descriptor.fwd3d = Fwd3dId::Helmert;
    descriptor.inv3d = Inv3dId::Helmert;
    descriptor.fwd4d = OperatorId::HelmertFwd;
    descriptor.inv4d = OperatorId::HelmertInv;
    let mut op = Op::plain(parameters, descriptor, &GAMUT, ctx)?;
    let params = &mut op.params;

    // Translation, and its time evolution
    let mut T = [params.real("x")?, params.real("y")?, params.real("z")?];
    let DT = [params.real("dx")?, params.real("dy")?, params.real("dz")?];

    // Rotations are given in arcsec, and handled in radians
    let arcsec = |key: &str| -> Result<f64, Error> { Ok(angular::arcsec_to_radians(params.real(key)?)) };
    let mut R = [arcsec("rx")?, arcsec("ry")?, arcsec("rz")?];
    let DR = [arcsec("drx")?, arcsec("dry")?, arcsec("drz")?];

    // Handling of rotations: position vector vs. coordinate frame conventions.
    let convention = params.text("convention")?;
    let rotated = !(R == [0., 0., 0.] && DR == [0., 0., 0.]);
    let mut position_vector = true;
    if rotated {
        if !["position_vector", "coordinate_frame"].contains(&convention.as_str()) {
            error!("helmert: rotations need a convention, got '{convention}'");
            return Err(Error::BadParam("convention".to_string(), convention));
        }
        if "coordinate_frame" == convention {
            position_vector = false;
        }
        params.boolean.insert("rotated");
    }
    if position_vector {
        params.boolean.insert("position_vector");
    }

    // Scale and its time evolution
    let mut S = 1.0 + params.real("s")? * 1e-6;
    let DS = params.real("ds")? * 1e-6;

    let dynamic = !(DT == [0., 0., 0.] && DR == [0., 0., 0.] && DS == 0.);
    if dynamic {
        params.boolean.insert("dynamic");

        let epoch = params.real("t_epoch")?;
        if epoch.is_nan() {
            error!("helmert: time dependent parameters need t_epoch");
            return Err(Error::MissingParam("t_epoch".to_string()));
        }

        // Fixed observation time: compute the parameters once and for all
        let t_obs = params.real("t_obs")?;
        if !t_obs.is_nan() {
            params.boolean.insert("fixed_time");
            let dt = t_obs - epoch;
            for i in 0..3_usize {
                T[i] += DT[i] * dt;
                R[i] += DR[i] * dt;
            }
            S += DS * dt;
        }
    }

    let exact = params.boolean("exact");
    params.series.insert("T", Vec::from(T));
    params.series.insert("DT", Vec::from(DT));
    params.series.insert("R", Vec::from(R));
    params.series.insert("DR", Vec::from(DR));
    params.real.insert("S", S);
    params.real.insert("DS", DS);

    // Flattened row by row, to fit into the series store
    let ROT = rotation_matrix(&R, exact, position_vector);
    params.series.insert("ROTFLAT", ROT.concat());

    Ok(op)
}

// ----- R O T A T I O N   M A T R I X   B U I L D E R ---------------------------------

// Optional small-angle approximation, and selection between the
// "position vector" and "coordinate frame" rotation conventions.
//
// TO' = scale * [ROTZ * ROTY * ROTX] * FROM' + [translation x, y, z]'
//
//        | cz sz 0 |           | cy 0 -sy |           | 1   0  0 |
// ROTZ = |-sz cz 0 |,   ROTY = | 0  1   0 |,   ROTX = | 0  cx sx |
//        |  0  0 1 |           | sy 0  cy |           | 0 -sx cx |
//
fn rotation_matrix(r: &[f64; 3], exact: bool, position_vector: bool) -> [[f64; 3]; 3] {
    let [rx, ry, rz] = *r;

    // Small-angle approximations: sx = sin(rx) = rx,  cx = cos(rx) = 1,  etc.
    let (mut sx, mut sy, mut sz) = (rx, ry, rz);
    let (mut cx, mut cy, mut cz) = (1.0, 1.0, 1.0);

    if exact {
        (sx, cx) = rx.sin_cos();
        (sy, cy) = ry.sin_cos();
        (sz, cz) = rz.sin_cos();
    }

    let r11 = cy * cz;
    let mut r12 = cx * sz;
    let mut r13 = -cx * sy * cz;

    let r21 = -cy * sz;
    let mut r22 = cx * cz;
    let mut r23 = sx * cz;

    let r31 = sy;
    let r32 = -sx * cy;
    let r33 = cx * cy;

    // Second order terms only in the exact case
    if exact {
        r12 += sx * sy * cz;
        r13 += sx * sz;

        r22 -= sx * sy * sz;
        r23 += cx * sy * sz;
    }

    if position_vector {
        return [[r11, r21, r31], [r12, r22, r32], [r13, r23, r33]];
    }
    [[r11, r12, r13], [r21, r22, r23], [r31, r32, r33]]
}

// ----- T E S T S ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    const GDA94: Coor4D = Coor4D([-4052051.7643, 4212836.2017, -2545106.0245, 0.0]);
    const GDA2020A: Coor4D = Coor4D([-4052052.7379, 4212835.9897, -2545104.5898, 0.0]);
    const GDA2020B: Coor4D = Coor4D([-4052052.7373, 4212835.9835, -2545104.5867, 2020.0]);
    const ITRF2014: Coor4D = Coor4D([-4052052.6588, 4212835.9938, -2545104.6946, 2018.0]);

    #[test]
    fn translation() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let op = ctx.op("proj=helmert x=-87 y=-96 z=-120")?;

        // EPSG:1134 - 3 parameter, ED50/WGS84, s = sqrt(27) m
        let mut operands = [Coor4D::origin()];

        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0][0], -87.);
        assert_eq!(operands[0][1], -96.);
        assert_eq!(operands[0][2], -120.);

        ctx.apply(op, Inv, &mut operands)?;
        assert_eq!(operands[0][0], 0.);
        assert_eq!(operands[0][1], 0.);
        assert_eq!(operands[0][2], 0.);

        // Through the 3D kernels
        let mut operands = [Coor3D::origin()];
        ctx.apply(op, Fwd, &mut operands)?;
        assert_eq!(operands[0], Coor3D::raw(-87., -96., -120.));
        Ok(())
    }

    // Test case from "Intergovernmental Committee on Surveying and Mapping (ICSM)
    // Permanent Committee on Geodesy (PCG)": Geocentric Datum of Australia 2020,
    // Technical Manual Version 1.0, 25 July 2017.
    // Transformation from GDA94 to GDA2020.
    #[test]
    fn translation_rotation_and_scale() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let definition = "
            proj=helmert convention = coordinate_frame
            x =  0.06155  rx = -0.0394924
            y = -0.01087  ry = -0.0327221
            z = -0.04019  rz = -0.0328979
            s = -0.009994 exact
        ";
        let op = ctx.op(definition)?;

        // The forward transformation should hit closer than 75 um
        let mut operands = [GDA94];
        ctx.apply(op, Fwd, &mut operands)?;
        assert!(GDA2020A.hypot3(&operands[0]) < 75e-6);

        // ... and an even better roundtrip
        ctx.apply(op, Inv, &mut operands)?;
        assert!(GDA94.hypot3(&operands[0]) < 75e-7);
        Ok(())
    }

    // A time varying example from the same source: ITRF2014@2018 to GDA2020,
    // Test point ALIC (Alice Springs)
    #[test]
    fn dynamic() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let definition = "
            proj=helmert  exact    convention = coordinate_frame
            drx = 0.00150379  dry = 0.00118346  drz = 0.00120716
            t_epoch = 2020.0
        ";
        let op = ctx.op(definition)?;

        // The forward transformation should hit closer than 40 um
        let mut operands = [ITRF2014];
        ctx.apply(op, Fwd, &mut operands)?;
        assert!(GDA2020B.hypot3(&operands[0]) < 40e-6);

        // ... and even closer on the way back
        ctx.apply(op, Inv, &mut operands)?;
        assert!(ITRF2014.hypot3(&operands[0]) < 40e-8);
        Ok(())
    }

    // Same as above, but with fixed time `t_obs` option
    #[test]
    fn fixed_dynamic() -> Result<(), Error> {
        let mut ctx = Minimal::default();
        let definition = "
            proj=helmert  exact    convention = coordinate_frame
            drx = 0.00150379  dry = 0.00118346  drz = 0.00120716
            t_epoch = 2020.0  t_obs = 2018
        ";
        let mut operands = [ITRF2014];
        operands[0][3] = 2030.;

        let op = ctx.op(definition)?;
        ctx.apply(op, Fwd, &mut operands)?;
        assert!(GDA2020B.hypot3(&operands[0]) < 40e-6);
        ctx.apply(op, Inv, &mut operands)?;
        assert!(ITRF2014.hypot3(&operands[0]) < 40e-8);
        Ok(())
    }

    #[test]
    fn bad_parameters() {
        let ctx = Minimal::default();
        // Rotations without a convention
        let op = Op::new("proj=helmert rx=1", &ctx);
        assert!(matches!(op, Err(Error::BadParam(_, _))));
        // Time evolution without an epoch
        let op = Op::new("proj=helmert dx=1", &ctx);
        assert!(matches!(op, Err(Error::MissingParam(_))));
    }
}
