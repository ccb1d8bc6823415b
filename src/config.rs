use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::models::{LabelPosition, StyleOptions};
use crate::pipeline::DEFAULT_MAX_FILES;

#[derive(Parser, Debug)]
#[command(name = "signview")]
#[command(about = "Visualise traffic-sign detections from a pretrained YOLO model")]
pub struct Cli {
    /// Path to the detection model (.rten)
    #[arg(long, env = "SIGNVIEW_MODEL", default_value = "models/best.rten", global = true)]
    pub model: PathBuf,

    /// Class id to name table (TOML, `[names]` section)
    #[arg(long, env = "SIGNVIEW_CLASSES", default_value = "classes.toml", global = true)]
    pub classes: PathBuf,

    /// TrueType font for labels; a built-in font is used if it can't be read
    #[arg(long, env = "SIGNVIEW_FONT", global = true)]
    pub font: Option<PathBuf>,

    /// Model input size in pixels
    #[arg(long, default_value_t = 640, global = true)]
    pub input_size: u32,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the browser demo
    Serve(ServeArgs),
    /// Annotate image files and print the detections
    Annotate(AnnotateArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SIGNVIEW_LISTEN", default_value = "127.0.0.1:8501")]
    pub listen: SocketAddr,

    /// Informational document shown above the upload form
    #[arg(long, env = "SIGNVIEW_ABOUT", default_value = "README_for_App.md")]
    pub about: PathBuf,

    /// Most images processed per request
    #[arg(long, default_value_t = DEFAULT_MAX_FILES)]
    pub max_files: usize,

    /// Request body limit in MiB
    #[arg(long, default_value_t = 64)]
    pub body_limit_mib: usize,
}

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Input image files
    #[arg(value_name = "IMAGE", required = true)]
    pub images: Vec<PathBuf>,

    /// Directory for annotated copies (created if missing)
    #[arg(long, value_name = "DIR", default_value = "annotated")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StyleArgs {
    /// Minimum confidence for a detection to be shown
    #[arg(long, default_value_t = 0.5)]
    pub confidence: f32,

    /// Hide confidence values in labels
    #[arg(long)]
    pub hide_confidence: bool,

    /// Label position: above, below, left, right or inside
    #[arg(long, default_value = "above")]
    pub label_position: LabelPosition,

    /// Box outline thickness in pixels
    #[arg(long, default_value_t = 3)]
    pub box_thickness: u32,

    /// Label font size in pixels
    #[arg(long, default_value_t = 20)]
    pub font_size: u32,
}

impl From<StyleArgs> for StyleOptions {
    fn from(args: StyleArgs) -> Self {
        StyleOptions {
            confidence_threshold: args.confidence,
            show_confidence: !args.hide_confidence,
            label_position: args.label_position,
            box_thickness: args.box_thickness,
            font_size: args.font_size,
        }
    }
}
