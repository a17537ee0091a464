use clap::Parser;
use dicom_redactor::{RedactionMap, Redactor, RunError};
use env_logger::Builder;
use log::{error, Level, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Redact DICOM metadata tags
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// DICOM file or directory holding one series
    #[arg(value_name = "INPUT_PATH")]
    input: PathBuf,

    /// JSON file of "gggg|eeee": "replacement value" pairs
    #[arg(value_name = "CONFIG_PATH")]
    config: PathBuf,

    /// Directory under which output names are created
    #[arg(short, long, value_name = "OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the metadata dictionary before and after redaction
    #[arg(short, long)]
    dump: bool,

    /// Show more verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };

    let mut builder = Builder::from_default_env();
    builder
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "Error",
                Level::Warn => "Warning",
                Level::Info => "Info",
                Level::Debug => "Debug",
                Level::Trace => "Trace",
            };
            writeln!(buf, "{}: {}", level, record.args())
        })
        .filter(None, log_level);
    builder.init();

    let map = match RedactionMap::from_path(&args.config) {
        Ok(map) => map,
        Err(err) => {
            let err = RunError::from(err);
            error!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    let redactor = Redactor::new(map)
        .with_output_base(args.output_dir)
        .with_dump(args.dump);

    match redactor.run(&args.input) {
        Ok(output) => {
            println!("{}", output.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
