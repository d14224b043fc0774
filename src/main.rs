use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::error;

use isometric_tools::{Axis, COS_30, COS_30_INV, PlaneOptions, PlaneType, SvgDocument};

#[derive(Parser)]
#[command(name = "isometric-tools")]
#[command(about = "Map flat SVG artwork onto isometric planes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Files {
    /// SVG file to read
    #[arg(value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,

    /// Where to write the transformed SVG
    #[arg(value_hint = clap::ValueHint::FilePath)]
    output: PathBuf,

    /// Id of a top-level element to transform; repeatable. Defaults to everything.
    #[arg(short, long = "select", value_name = "ID")]
    select: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Map the selection onto an isometric face
    Plane {
        #[command(flatten)]
        files: Files,

        /// left, right, topLeft or topRight
        #[arg(short, long, value_parser = parse_plane)]
        plane: PlaneType,

        /// Keep the originals and append transformed copies
        #[arg(short, long)]
        duplicate: bool,

        /// Use this x coordinate as the shared origin instead of the selection's left edge
        #[arg(long, allow_hyphen_values = true)]
        zero_offset: Option<f64>,
    },

    /// Skew the selection vertically about its left edge
    Skew {
        #[command(flatten)]
        files: Files,

        /// Skew angle in degrees
        #[arg(short, long, allow_hyphen_values = true)]
        angle: f64,

        #[arg(long, allow_hyphen_values = true)]
        zero_offset: Option<f64>,
    },

    /// Scale the selection along one axis
    Scale {
        #[command(flatten)]
        files: Files,

        /// x or y
        #[arg(long, value_parser = parse_axis)]
        axis: Axis,

        /// A number, or cos30 / cos30-inv
        #[arg(short, long, value_parser = parse_factor, allow_hyphen_values = true)]
        factor: f64,
    },
}

fn parse_plane(s: &str) -> Result<PlaneType, String> {
    s.parse().map_err(|e: isometric_tools::IsometricError| e.to_string())
}

fn parse_axis(s: &str) -> Result<Axis, String> {
    s.parse().map_err(|e: isometric_tools::IsometricError| e.to_string())
}

fn parse_factor(s: &str) -> Result<f64, String> {
    match s.to_ascii_lowercase().as_str() {
        "cos30" => Ok(COS_30),
        "cos30-inv" | "cos30inv" => Ok(COS_30_INV),
        other => other
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number, cos30 or cos30-inv")),
    }
}

fn read_document(files: &Files) -> SvgDocument {
    let content = match fs::read_to_string(&files.input) {
        Ok(content) => content,
        Err(e) => {
            error!("reading input file '{}': {}", files.input.display(), e);
            process::exit(2);
        }
    };

    match SvgDocument::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            error!("parsing '{}': {}", files.input.display(), e);
            process::exit(3);
        }
    }
}

fn write_document(files: &Files, doc: &SvgDocument, count: usize) {
    match fs::write(&files.output, doc.to_svg()) {
        Ok(_) => {
            println!(
                "Transformed {} element(s) from '{}' into '{}'",
                count,
                files.input.display(),
                files.output.display()
            );
        }
        Err(e) => {
            error!("writing output file '{}': {}", files.output.display(), e);
            process::exit(4);
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let env = Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Plane {
            files,
            plane,
            duplicate,
            zero_offset,
        } => {
            let mut doc = read_document(&files);
            let options = PlaneOptions {
                duplicate,
                zero_offset,
            };
            let count = doc.make_plane(&files.select, plane, &options);
            write_document(&files, &doc, count);
        }
        Commands::Skew {
            files,
            angle,
            zero_offset,
        } => {
            let mut doc = read_document(&files);
            let count = doc.skew_y(&files.select, angle, zero_offset);
            write_document(&files, &doc, count);
        }
        Commands::Scale {
            files,
            axis,
            factor,
        } => {
            let mut doc = read_document(&files);
            let count = doc.scale(&files.select, axis, factor);
            write_document(&files, &doc, count);
        }
    }
}
