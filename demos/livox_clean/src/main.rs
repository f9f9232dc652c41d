use argh::FromArgs;
use std::path::PathBuf;

use lidarpost::workflows;

#[derive(FromArgs)]
/// Remove the (0, 0, 0) points Livox sensors record for missing returns from
/// every LAS/LAZ file of a directory, writing `<stem>_corr.<ext>` next to each
struct Args {
    /// directory holding the point clouds
    #[argh(positional)]
    data_path: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    if !args.data_path.is_dir() {
        return Err(format!("{} does not exist", args.data_path.display()).into());
    }

    let cleaned = workflows::clean_directory(&args.data_path)?;

    let mut num_failed = 0;
    for file in cleaned.iter() {
        match &file.result {
            Ok(output) => println!(
                "Converted {} -> {}",
                file.input.display(),
                output.display()
            ),
            Err(err) => {
                num_failed += 1;
                println!("Failed to convert {}: {}", file.input.display(), err);
            }
        }
    }

    log::info!(
        "cleaned {} of {} point clouds",
        cleaned.len() - num_failed,
        cleaned.len()
    );

    if num_failed > 0 {
        return Err(format!("{num_failed} point clouds could not be cleaned").into());
    }

    Ok(())
}
