//! Main entry point for the packfile CLI application.
//!
//! This binary lists and extracts the contents of id Software PACK archives
//! from the local filesystem or from remote HTTP URLs.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use packfile::cli::{Action, ExtractArgs, ListArgs, is_http_url};
use packfile::{
    Cli, ExitCode, HttpRangeReader, LocalFileReader, PackEntry, PackError, PackReader, ReadAt,
};

/// Application entry point.
///
/// Parses command-line arguments, installs logging and dispatches to the
/// requested action. Every failure is mapped to a distinct exit status.
fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = ExitCode::from_clap(err.kind());
            let _ = err.print();
            return code.into();
        }
    };

    init_logging(match &cli.action {
        Action::List(args) => args.verbose,
        Action::Extract(args) => args.verbose,
    });

    let code = match cli.action {
        Action::List(args) => list(&args),
        Action::Extract(args) => extract(&args),
    };

    code.into()
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise only warnings are shown, or debug
/// events from this crate when `verbose` is set.
fn init_logging(verbose: bool) {
    let default = if verbose { "packfile=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status for an error bubbled up from the library.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PackError>())
        .map_or(ExitCode::IoError, |pack| pack.kind().into())
}

/// An opened archive, plus the HTTP source when it is remote so transfer
/// statistics can be reported afterwards.
struct Opened {
    reader: PackReader<dyn ReadAt>,
    remote: Option<Arc<HttpRangeReader>>,
}

/// Open a PACK archive, picking the byte source from the shape of `path`.
fn open(path: &str) -> Result<Opened> {
    if is_http_url(path) {
        let remote = Arc::new(HttpRangeReader::new(path.to_string()).map_err(PackError::from)?);
        let reader = PackReader::new(remote.clone() as Arc<dyn ReadAt>)?;
        Ok(Opened {
            reader,
            remote: Some(remote),
        })
    } else {
        let local = LocalFileReader::new(Path::new(path)).map_err(PackError::from)?;
        let reader = PackReader::new(Arc::new(local) as Arc<dyn ReadAt>)?;
        Ok(Opened {
            reader,
            remote: None,
        })
    }
}

/// Open `path`, run `f` on it and report network usage for remote archives.
fn with_reader<T>(
    path: &str,
    verbose: bool,
    f: impl FnOnce(&PackReader<dyn ReadAt>) -> Result<T>,
) -> Result<T> {
    let opened = open(path)?;
    let result = f(&opened.reader);

    if let Some(remote) = opened.remote.filter(|_| verbose) {
        eprintln!(
            "Total bytes transferred: {}",
            format_size(remote.transferred_bytes())
        );
    }

    result
}

/// List the files in each archive.
///
/// Simple format prints one name per line. Verbose format prints
/// `index: name size bytes @ 0xoffset`. A failure on one archive is reported
/// and the remaining archives are still listed.
fn list(args: &ListArgs) -> ExitCode {
    let mut code = ExitCode::Ok;

    for path in &args.packs {
        let result = with_reader(path, args.verbose, |reader| {
            for file in reader.files()? {
                if args.verbose {
                    println!(
                        "{:>4}: {} {} bytes @ 0x{:08x}",
                        file.position(),
                        file.display_name(),
                        file.size(),
                        file.offset()
                    );
                } else {
                    println!("{}", file.display_name());
                }
            }
            Ok(())
        });

        if let Err(err) = result {
            eprintln!("Failed reading file \"{}\": {:#}", path, err);
            code = exit_code_for(&err);
        }
    }

    code
}

/// Extract the requested files.
///
/// With a single file, the destination is the output file. With more than
/// one, it is a directory and each file's archive name is appended to it;
/// names that would resolve outside that directory are refused.
fn extract(args: &ExtractArgs) -> ExitCode {
    let (names, destination) = match args.targets() {
        Ok(targets) => targets,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::InvalidArgument;
        }
    };

    let total = args.total_extractions();
    let output_path = |entry: &PackEntry| -> Result<PathBuf> {
        if total > 1 {
            Ok(Path::new(destination).join(entry.relative_path()?))
        } else {
            Ok(PathBuf::from(destination))
        }
    };

    let result = with_reader(&args.pack, args.verbose, |reader| {
        if args.verbose {
            summarise(args, names, destination);
        }

        for name in names {
            let entry = reader.entry(name.as_str())?;
            let out = output_path(entry)?;
            if args.verbose {
                println!(
                    "Extracting {} bytes from offset {} of file \"{}\" to \"{}\"",
                    entry.size(),
                    entry.offset(),
                    name,
                    out.display()
                );
            }
            reader
                .extract_to(entry.position(), &out)
                .with_context(|| format!("extracting \"{}\"", name))?;
        }

        for &index in &args.indices {
            let entry = reader.entry(index)?;
            let out = output_path(entry)?;
            if args.verbose {
                println!(
                    "Extracting {} bytes from offset {} of file #{} (\"{}\") to \"{}\"",
                    entry.size(),
                    entry.offset(),
                    index,
                    entry.display_name(),
                    out.display()
                );
            }
            reader
                .extract_to(index, &out)
                .with_context(|| format!("extracting file #{}", index))?;
        }

        Ok(())
    });

    match result {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            eprintln!("Failed extracting from PACK file \"{}\": {:#}", args.pack, err);
            exit_code_for(&err)
        }
    }
}

/// Describe what an extraction is about to do.
fn summarise(args: &ExtractArgs, names: &[String], destination: &str) {
    let total = args.total_extractions();
    let mut line = format!(
        "Extracting {} file{} ",
        total,
        if total == 1 { "" } else { "s" }
    );

    for name in names {
        line.push_str(&format!("\"{}\", ", name));
    }
    for index in &args.indices {
        line.push_str(&format!("{}, ", index));
    }

    println!("{}from \"{}\" to \"{}\"", line, args.pack, destination);
}

/// Byte count for the transfer summary, in binary units.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
