use clap::{Args, Parser, Subcommand};

use crate::pack::ErrorKind;

#[derive(Parser, Debug)]
#[command(name = "packfile")]
#[command(version)]
#[command(about = "Process id Software PACK (.pak) files", long_about = None)]
#[command(subcommand_required = true)]
#[command(after_help = "Examples:\n  \
  packfile list -v pak0.pak                         list files with sizes and offsets\n  \
  packfile extract pak0.pak default.cfg out.cfg     extract one file to out.cfg\n  \
  packfile extract pak0.pak -n 0 -n 3 outdir        extract files #0 and #3 into outdir\n  \
  packfile list https://example.com/pak0.pak        list files from a remote archive")]
pub struct Cli {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// List the files in one or more PACK files
    List(ListArgs),

    /// Extract files from a PACK file
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print index, size and offset of each file
    #[arg(short, long)]
    pub verbose: bool,

    /// PACK file paths or HTTP URLs
    #[arg(value_name = "PACKFILE", required = true)]
    pub packs: Vec<String>,
}

#[derive(Args, Debug)]
#[command(after_help = "If more than one file is extracted, DESTINATION is a directory to which each \
  extracted file's name is appended.\nIf a single file is extracted, DESTINATION is the name of the \
  file to save it to.")]
pub struct ExtractArgs {
    /// Print verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// PACK file path or HTTP URL
    #[arg(value_name = "PACKFILE")]
    pub pack: String,

    /// Index of a file to extract (repeatable)
    #[arg(short = 'n', value_name = "INDEX")]
    pub indices: Vec<usize>,

    /// Names of files to extract, followed by the destination
    #[arg(value_name = "FILE... DESTINATION")]
    pub paths: Vec<String>,
}

impl ExtractArgs {
    /// Split the trailing positionals into the files to extract and the
    /// destination, checking that there is something to extract.
    pub fn targets(&self) -> Result<(&[String], &str), String> {
        let Some((destination, names)) = self.paths.split_last() else {
            return Err(
                "Destination for extracted file(s) must be given as the last command-line argument."
                    .to_string(),
            );
        };

        if names.is_empty() && self.indices.is_empty() {
            return Err(
                "No files to extract - did you forget to specify the destination?".to_string(),
            );
        }

        Ok((names, destination))
    }

    pub fn total_extractions(&self) -> usize {
        self.paths.len().saturating_sub(1) + self.indices.len()
    }
}

/// Whether an archive argument should be fetched over HTTP
pub fn is_http_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Process exit statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    MissingAction = 1,
    UnrecognisedAction = 2,
    MissingArgument = 50,
    InvalidArgument = 51,
    FormatError = 60,
    TruncatedArchive = 61,
    IoError = 62,
    LookupError = 63,
}

impl ExitCode {
    /// Exit status for a command-line parsing failure
    pub fn from_clap(kind: clap::error::ErrorKind) -> Self {
        use clap::error::ErrorKind as K;
        match kind {
            K::DisplayHelp | K::DisplayVersion => ExitCode::Ok,
            K::MissingSubcommand | K::DisplayHelpOnMissingArgumentOrSubcommand => {
                ExitCode::MissingAction
            }
            K::InvalidSubcommand => ExitCode::UnrecognisedAction,
            K::MissingRequiredArgument => ExitCode::MissingArgument,
            _ => ExitCode::InvalidArgument,
        }
    }
}

impl From<ErrorKind> for ExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Format => ExitCode::FormatError,
            ErrorKind::Truncated => ExitCode::TruncatedArchive,
            ErrorKind::Io => ExitCode::IoError,
            ErrorKind::Lookup => ExitCode::LookupError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
