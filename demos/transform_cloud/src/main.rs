use argh::FromArgs;
use std::path::PathBuf;

use lidarpost::l3d::io::las::LasReadOptions;
use lidarpost::l3d::io::metadata::DEFAULT_HIGHRES_INCREMENT;
use lidarpost::workflows::{self, TransformOptions};

#[derive(FromArgs)]
/// Transform a LAS/LAZ point cloud with the matrix stored next to it,
/// e.g. `transform_cloud 161113_000123.laz 161113_000123_trafo.laz`
struct Args {
    /// path to the input point cloud
    #[argh(positional)]
    input: PathBuf,

    /// path to the output point cloud
    #[argh(positional)]
    output: PathBuf,

    /// path to the scan metadata, defaults to `<input stem>_meta.txt`
    #[argh(option)]
    meta: Option<PathBuf>,

    /// path to the transformation matrix, defaults to `<input stem>_trafomat.txt`
    #[argh(option)]
    trafomat: Option<PathBuf>,

    /// angular increment of the high resolution scan setting
    #[argh(option, default = "DEFAULT_HIGHRES_INCREMENT")]
    highres_increment: f64,

    /// keep every n-th point only
    #[argh(option, default = "1")]
    use_every: usize,

    /// do not carry the point attributes over to the output
    #[argh(switch)]
    no_attributes: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let options = TransformOptions {
        metadata: args.meta,
        trafomat: args.trafomat,
        highres_increment: args.highres_increment,
        read: LasReadOptions {
            with_attributes: !args.no_attributes,
            use_every: args.use_every,
        },
    };

    log::info!("transforming {}", args.input.display());
    let report = workflows::transform_las_file(&args.input, &args.output, &options)?;

    println!("Transformed {}", args.input.display());
    if report.metadata.highres() {
        println!("\tHigh resolution scan");
    } else {
        println!("\tLow resolution scan");
    }
    println!("\tangular resolution: {:.3}", report.metadata.phi_incr());
    println!("\t{} points read", report.points_read);
    println!(
        "\tOutput point cloud written to: {}",
        report.output.display()
    );

    Ok(())
}
