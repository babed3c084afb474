use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::{LevelFilter, error, info};
use vero_sfnt::{DecodeOptions, Font, PartialFont, endian::ByteOrder};

mod print;

/// Print the header, table directory and cmap encoding records of a font.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to a TrueType or OpenType font file
    font: PathBuf,

    /// Don't read the cmap table
    #[arg(long)]
    no_cmap: bool,

    /// Log more, repeat for trace output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = DecodeOptions {
        walk_cmap: !args.no_cmap,
    };

    info!("Reading file: {}", args.font.display());
    let result = Font::open(&args.font, options);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Err(err) = report(&mut out, &result) {
        error!("failed to write report: {err}");
        return ExitCode::FAILURE;
    }

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(partial) => {
            error!("{partial}: {}", partial.error);
            ExitCode::FAILURE
        }
    }
}

/// Prints whatever was decoded, whether or not decoding finished.
fn report(out: &mut impl Write, result: &Result<Font, PartialFont>) -> io::Result<()> {
    print::print_host_order(out, ByteOrder::host())?;
    writeln!(out)?;

    let (header, directory, cmap) = match result {
        Ok(font) => (Some(&font.header), Some(&font.directory), font.cmap.as_ref()),
        Err(partial) => (partial.header.as_ref(), partial.directory.as_ref(), None),
    };

    if let Some(header) = header {
        print::print_header(out, header)?;
        writeln!(out)?;
    }
    if let Some(directory) = directory {
        print::print_directory(out, directory)?;
        writeln!(out)?;
    }
    if let Some(cmap) = cmap {
        print::print_cmap(out, cmap)?;
    }

    Ok(())
}
