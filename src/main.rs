use anyhow::{bail, Context};
use blockprint::{Layout, Template};
use clap::Parser;
use std::path::PathBuf;

/// Render every record of a JSON template into PNG images
#[derive(Parser, Debug)]
#[command(name = "blockprint", version, about)]
struct Args {
    /// Path to the template (.json)
    template: PathBuf,

    /// Write images here instead of the template's SaveFilePath
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log every block-level decision
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if args.template.extension().and_then(|ext| ext.to_str()) != Some("json") {
        bail!("{} is not a .json template", args.template.display());
    }

    let template = Template::from_path(&args.template)
        .with_context(|| format!("failed to read template {}", args.template.display()))?;
    let mut layout = Layout::from_template(&template.layout)?;
    if let Some(dir) = args.output_dir {
        layout.set_save_path(dir);
    }

    let summary = layout.run_batch(&template.images);
    log::info!(
        "{} of {} images saved",
        summary.saved.len(),
        template.images.len()
    );
    if !summary.failed.is_empty() {
        bail!("failed to save: {}", summary.failed.join(", "));
    }
    Ok(())
}
