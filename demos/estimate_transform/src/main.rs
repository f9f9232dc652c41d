use argh::FromArgs;
use std::path::PathBuf;

use lidarpost::workflows;

#[derive(FromArgs)]
/// Estimate the affine transform between two picking lists of corresponding
/// points and save it as a 4x4 matrix
struct Args {
    /// picking list in the source frame, e.g. `picking_list_livox.txt`
    #[argh(positional)]
    source: PathBuf,

    /// picking list in the target frame, e.g. `picking_list_riegl.txt`
    #[argh(positional)]
    target: PathBuf,

    /// path to store the transformation matrix
    #[argh(positional)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let fit = workflows::compute_transformation_matrix(&args.source, &args.target, &args.output)?;
    log::info!("singular values: {:?}", fit.singular_values);

    println!("Transformation matrix (rank {}):", fit.rank);
    for row in fit.transform.to_homogeneous().iter() {
        println!("\t{:>12.6} {:>12.6} {:>12.6} {:>12.6}", row[0], row[1], row[2], row[3]);
    }
    println!("\tfit rmse: {:.6}", fit.rmse);
    println!("Matrix written to: {}", args.output.display());

    Ok(())
}
