use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "base-hist",
    version,
    about = "Per-file and total character histograms for FASTA-like files"
)]
pub struct Cli {
    /// Log debug detail, including stage timings
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count characters in every matching file under DIR
    Run(RunArgs),
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[arg(default_value = "data")]
    pub dir: PathBuf,

    /// File extension to match, without the dot (repeatable)
    #[arg(long = "ext", default_value = "fa")]
    pub extensions: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Lines starting with this character are headers and not counted
    #[arg(long, default_value_t = '>')]
    pub marker: char,

    #[arg(long, default_value_t = num_cpus::get(), conflicts_with = "unbounded")]
    pub threads: usize,

    /// One worker thread per source
    #[arg(long, default_value_t = false)]
    pub unbounded: bool,

    #[arg(long, value_enum, default_value_t = OnErrorArg::Abort)]
    pub on_error: OnErrorArg,

    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Order report lines by character
    #[arg(long, default_value_t = false)]
    pub sort: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OnErrorArg {
    #[value(name = "abort")]
    Abort,
    #[value(name = "collect")]
    Collect,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "tsv")]
    Tsv,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
