//! Command-line parsing and execution.
//!
//! ```text
//! hexmerge -o fw.bin [-b 0x08000000] [-p 0xFF] app.hex boot.bin@0x08000000 cfg.bin@0x0800FC00
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use hexmerge::{
    FsProvider, ImageOptions, ImageOutcome, InputSpec, Pipeline, PipelineResult, parse_byte,
    parse_number,
};

/// Merge Intel-HEX and raw binary files into one flat binary image.
#[derive(Debug, Parser)]
#[command(name = "hexmerge", version, about)]
pub struct Args {
    /// Input files. Raw binaries need a load address, e.g. `boot.bin@0x08000000`.
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<InputSpec>,

    /// Output binary file.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Base address of the output image; gaps below the first data are padded.
    #[arg(
        short,
        long,
        value_name = "ADDRESS",
        default_value = "0x08000000",
        value_parser = parse_number
    )]
    pub base: u64,

    /// Byte used to fill gaps.
    #[arg(short, long, value_name = "BYTE", default_value = "0xFF", value_parser = parse_byte)]
    pub pad: u8,

    /// Do not print the summary report.
    #[arg(short, long)]
    pub quiet: bool,

    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Write the error message of a failed run to FILE.
    #[arg(short = 'E', long, value_name = "FILE")]
    pub error_log: Option<PathBuf>,
}

impl Args {
    pub fn image_options(&self) -> ImageOptions {
        ImageOptions {
            base_address: self.base,
            pad: self.pad,
        }
    }

    pub fn execute(&self) -> Result<PipelineResult, hexmerge::Error> {
        let pipeline = Pipeline::new(self.inputs.clone(), self.image_options());
        pipeline.execute_to_file(&FsProvider, &self.output)
    }
}

pub fn run() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(ref path) = args.error_log {
        let _ = std::fs::write(path, "");
    }

    match args.execute() {
        Ok(result) => {
            if !args.quiet {
                print_summary(&args, &result);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(ref path) = args.error_log {
                let _ = std::fs::write(path, format!("{e}"));
            }
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_summary(args: &Args, result: &PipelineResult) {
    let size = match result.outcome {
        ImageOutcome::Empty => 0,
        ImageOutcome::Written(report) => {
            println!(
                "image range {} (size = {} bytes, crc32 = {:#010X})",
                report.range, report.size, report.crc32
            );
            report.size
        }
    };
    println!("wrote {} ({} bytes)", args.output.display(), size);
    if !result.skipped.is_empty() {
        println!("skipped {} input(s)", result.skipped.len());
    }
}
