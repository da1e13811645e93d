//! Command line arguments backing the `uidetect` binary.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "uidetect",
    about = "Detect and classify UI components in a screenshot",
    version
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect components and print them as JSON
    Detect {
        /// Screenshot to analyse
        image: PathBuf,

        /// Directory holding (or receiving) `ip/<image stem>.json` region artifacts
        #[arg(long, default_value = "output")]
        output_root: PathBuf,

        /// Region detector to run; without it existing artifacts are read
        #[arg(long)]
        detector: Option<PathBuf>,

        /// Extra argument passed to the detector before the image path
        #[arg(long = "detector-arg", requires = "detector")]
        detector_args: Vec<String>,

        /// Recorded OCR output to use for the image
        #[arg(long, conflicts_with = "ocr")]
        ocr_json: Option<PathBuf>,

        /// OCR program to run on the image
        #[arg(long)]
        ocr: Option<PathBuf>,

        /// Extra argument passed to the OCR program
        #[arg(long = "ocr-arg", requires = "ocr")]
        ocr_args: Vec<String>,

        /// OCR languages, comma separated
        #[arg(long, value_delimiter = ',')]
        langs: Option<Vec<String>>,

        /// TOML configuration file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Give each text span to at most one component
        #[arg(long)]
        exclusive: bool,

        /// Write a copy of the screenshot with component outlines
        #[arg(long)]
        annotate: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Classify a single box without running detection
    Classify {
        #[arg(long)]
        width: i32,

        #[arg(long)]
        height: i32,

        /// Text associated with the box
        #[arg(long, default_value = "")]
        text: String,

        /// TOML configuration file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// Print the ordered classification rules
    Rules {
        /// TOML configuration file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}
