//! Koordinatprocessering: transform coordinates read from files or stdin
use clap::Parser;
use geoexec::prelude::*;
use log::{debug, trace, warn};
use std::io::BufRead;
use std::path::PathBuf;

/// KP: Transform whitespace separated coordinates (up to four numbers per
/// line) read from files or standard input. Angular input and output is in
/// degrees, ordered as the operator expects: `proj=merc` takes longitude first.
#[derive(Parser, Debug)]
#[command(name = "kp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The operation to carry out, e.g. "proj=merc lon_0=9"
    operation: String,

    /// Inverse operation
    #[arg(long = "inv")]
    inverse: bool,

    /// Specify a fixed height for all coordinates
    #[arg(short = 'z', long)]
    height: Option<f64>,

    /// Specify a fixed observation time for all coordinates
    #[arg(short = 't', long)]
    time: Option<f64>,

    /// Number of decimals in output
    #[arg(short = 'd', long)]
    decimals: Option<usize>,

    /// Report fwd-inv roundtrip deviation
    #[arg(short, long)]
    roundtrip: bool,

    /// Echo input to output
    #[arg(short, long)]
    echo: bool,

    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// The files to operate on (stdin if none given)
    args: Vec<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    let options = Cli::parse();
    env_logger::Builder::new()
        .filter_level(options.verbose.log_level_filter())
        .init();
    trace!("This is KP");
    debug!("{options:#?}");

    let mut ctx = Plain::new();
    let op = ctx.op(&options.operation)?;
    let direction = if options.inverse { Inv } else { Fwd };

    // Input and output units, as seen from the direction of travel
    let descriptor = ctx.descriptor(op, None)?;
    let (left, right) = (descriptor.pj_left(), descriptor.pj_right());
    let (input, output) = match direction {
        Fwd => (left, right),
        Inv => (right, left),
    };
    debug!("Input: {input:?}, output: {output:?}");

    if options.args.is_empty() {
        let stdin = std::io::stdin();
        transform(&options, &ctx, op, direction, (input, output), stdin.lock())?;
        return Ok(());
    }
    for path in &options.args {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        transform(&options, &ctx, op, direction, (input, output), reader)?;
    }
    Ok(())
}

fn transform(
    options: &Cli,
    ctx: &Plain,
    op: OpHandle,
    direction: Direction,
    (input, output): (IoUnits, IoUnits),
    reader: impl BufRead,
) -> Result<(), anyhow::Error> {
    for line in reader.lines() {
        let line = line?;
        let data = line.split('#').next().unwrap_or_default().trim();
        if data.is_empty() {
            continue;
        }

        let Some(mut coord) = parse(data, options) else {
            warn!("Cannot parse '{data}'");
            continue;
        };
        if input == IoUnits::Radians {
            coord[0] = coord[0].to_radians();
            coord[1] = coord[1].to_radians();
        }

        ctx.reset_errno();
        let result = ctx.trans(op, direction, coord)?;
        if options.echo {
            println!("# {line}");
        }
        if result.is_error() {
            println!("inf inf inf inf");
            if let Some(errno) = ctx.errno() {
                eprintln!("kp: {errno}: {data}");
            }
            continue;
        }

        let mut text = format_coord(&result, output, options.decimals);
        if options.roundtrip {
            let back = ctx.trans(op, direction.opposite(), result)?;
            let deviation = match input {
                // Roughly metres on the Earth's surface
                IoUnits::Radians => back.hypot2(&coord) * 6_371_000.,
                _ => back.hypot3(&coord),
            };
            text += &format!("  {deviation:.6e}");
        }
        println!("{text}");
    }
    Ok(())
}

// Up to four numbers, padded with zeros. Fixed height and time override the input
fn parse(data: &str, options: &Cli) -> Option<Coor4D> {
    let mut args = Vec::new();
    for item in data.split_whitespace() {
        args.push(item.parse::<f64>().ok()?);
    }
    if args.is_empty() || args.len() > 4 {
        return None;
    }
    args.resize(4, 0.);
    if let Some(height) = options.height {
        args[2] = height;
    }
    if let Some(time) = options.time {
        args[3] = time;
    }
    Some(Coor4D([args[0], args[1], args[2], args[3]]))
}

fn format_coord(coord: &Coor4D, units: IoUnits, decimals: Option<usize>) -> String {
    let angular = units == IoUnits::Radians;
    let (mut x, mut y) = (coord[0], coord[1]);
    if angular {
        x = x.to_degrees();
        y = y.to_degrees();
    }
    // Angles get more decimals than metres, to match in resolution
    let d = decimals.unwrap_or(if angular { 10 } else { 5 });
    let z = decimals.unwrap_or(5);
    format!(
        "{x:.d$} {y:.d$} {:.z$} {:.z$}",
        coord[2],
        coord[3],
        d = d,
        z = z
    )
}
