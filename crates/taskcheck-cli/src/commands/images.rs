//! `taskcheck images` — List every image on the service.

use clap::Args;
use taskcheck_harness::ImportHarness;

use crate::output::or_dash;

/// Arguments for the `images` command.
#[derive(Args, Debug)]
pub struct ImagesArgs {
    /// Print image IDs only.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Executes the `images` command.
///
/// # Errors
///
/// Returns an error if any listing page cannot be fetched.
pub fn execute(harness: &ImportHarness, args: ImagesArgs) -> anyhow::Result<()> {
    let images = harness.list_all_images()?;

    if args.quiet {
        for image in &images {
            println!("{}", image.id);
        }
        return Ok(());
    }

    if images.is_empty() {
        println!("No images found.");
        return Ok(());
    }

    println!("{:<38} {:<30} {:<10}", "IMAGE ID", "NAME", "STATUS");
    for image in &images {
        println!(
            "{:<38} {:<30} {:<10}",
            image.id.as_str(),
            or_dash(image.name.as_deref()),
            or_dash(image.status.as_deref()),
        );
    }
    Ok(())
}
