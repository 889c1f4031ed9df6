//! refconf cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; refconf ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    /// Configuration file to operate on
    #[clap(short = 'c', long = "config", default_value = "config.yml", global(true))]
    pub config: PathBuf,

    /// Fail if the configuration file does not exist
    ///
    /// Without this flag a missing file is treated as empty
    /// and created on the first write.
    #[clap(long = "must-exist", global(true))]
    pub must_exist: bool,

    /// Encoding of the configuration files
    #[arg(long = "format", default_value_t, global(true))]
    pub format: DocumentFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at a dotted path
    Get(GetCommand),

    /// Test if a dotted path exists
    ///
    /// Prints `true` or `false`
    Exists(ExistsCommand),

    /// Store a value at a dotted path and write the configuration
    Set(SetCommand),

    /// Print the resolved configuration
    Dump(DumpCommand),

    /// Aggregate all files matching a glob into a single file
    Build(BuildCommand),
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// Dotted path, e.g. `server.listen.0.port`
    pub key: String,
}

#[derive(Parser, Debug)]
pub struct ExistsCommand {
    /// Dotted path, e.g. `server.listen.0.port`
    pub key: String,
}

#[derive(Parser, Debug)]
pub struct SetCommand {
    /// Dotted path, e.g. `server.listen.0.port`
    pub key: String,

    /// New value, parsed as YAML (`8080`, `true`, `[a, b]`, `{k: v}`, ...)
    pub value: String,
}

#[derive(Parser, Debug)]
pub struct DumpCommand {
    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct BuildCommand {
    /// Key the aggregated list is stored under
    #[clap(short = 'n', long = "name")]
    pub name: String,

    /// Files to aggregate, relative to the directory of TARGET
    ///
    /// Defaults to all files of the document format below that directory
    #[clap(short = 'g', long = "glob")]
    pub glob: Option<String>,

    /// File to generate
    pub target: PathBuf,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum DocumentFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Json => f.write_str("json"),
            DocumentFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl From<DocumentFormat> for refconf::Format {
    fn from(value: DocumentFormat) -> Self {
        match value {
            DocumentFormat::Json => refconf::Format::Json,
            DocumentFormat::Yaml => refconf::Format::Yaml,
        }
    }
}
