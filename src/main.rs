use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use signview::config::{AnnotateArgs, Cli, Command, ServeArgs};
use signview::web::{self, AppState};
use signview::{ClassNameTable, ImageOutcome, LabelFont, SignAnnotator, StyleOptions, UploadBatch, UploadedImage, YoloDetector};

fn init_logging(verbose: bool) {
    let default = if verbose { "signview=debug,tower_http=debug" } else { "signview=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load model, class table and font; model and table are required
fn build_annotator(cli: &Cli) -> anyhow::Result<SignAnnotator> {
    let detector = YoloDetector::load(&cli.model)?.with_input_size(cli.input_size);

    let classes = ClassNameTable::load(&cli.classes)
        .with_context(|| format!("Failed to load class names from {}", cli.classes.display()))?;
    tracing::info!(classes = classes.len(), path = %cli.classes.display(), "class table loaded");

    let font = LabelFont::load(cli.font.as_deref());

    Ok(SignAnnotator::new(Arc::new(detector), Arc::new(classes), Arc::new(font)))
}

async fn run_serve(annotator: SignAnnotator, args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState {
        annotator,
        about_path: args.about,
        max_files: args.max_files,
    };
    web::serve(args.listen, state, args.body_limit_mib * 1024 * 1024).await
}

fn run_annotate(annotator: SignAnnotator, args: AnnotateArgs) -> anyhow::Result<()> {
    let style = StyleOptions::from(args.style);
    style.validate()?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    let mut uploads = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        uploads.push(UploadedImage::new(path.display().to_string(), bytes));
    }

    let count = uploads.len();
    let report = annotator.process_batch(UploadBatch::new(uploads, count), &style);

    for image in &report.images {
        println!("\n=== Image {}/{}: {} ===", image.index, image.total, image.file_name);

        match &image.outcome {
            ImageOutcome::Failed(err) => println!("  Error: {}", err),
            ImageOutcome::Annotated { result, .. } => {
                let stem = Path::new(&image.file_name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("image_{}", image.index));
                let out_path = args.out_dir.join(format!("{}_annotated.png", stem));
                result
                    .image
                    .save(&out_path)
                    .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", out_path.display(), e))?;
                println!("  Saved {}", out_path.display());

                match image.warning() {
                    Some(warning) => println!("  {}", warning),
                    None => {
                        println!("  Detected road signs:");
                        for line in image.summary_lines() {
                            println!("  {}", line);
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let annotator = build_annotator(&cli)?;

    match cli.command {
        Command::Serve(args) => run_serve(annotator, args).await,
        Command::Annotate(args) => tokio::task::spawn_blocking(move || run_annotate(annotator, args)).await?,
    }
}
