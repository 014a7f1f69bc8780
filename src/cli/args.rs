//! Command-line argument parsing for commonlib
//!
//! This module defines the CLI structure using clap derive macros. Each
//! subcommand exercises one library component.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::bitmap::{CompressOption, PixelFormat};

/// commonlib - grid spacing, HTTP and image utilities
#[derive(Parser, Debug)]
#[command(
    name = "commonlib",
    version,
    about = "Grid spacing, HTTP client and image loading utilities",
    long_about = "Command-line front end for the commonlib utilities.
Computes grid item margins, runs requests through the logging interceptor chain,
loads and compresses images through the cached image loader and shows cache directories."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the margins of every item in a grid
    Grid(GridArgs),

    /// GET a URL through the interceptor chain
    Fetch(FetchArgs),

    /// Load an image and write a compressed copy
    Image(ImageArgs),

    /// Show the resolved cache directories
    Dirs(DirsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the grid command
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Number of columns (rows for --horizontal)
    #[arg(short, long)]
    pub columns: i32,

    /// Container width in pixels (height for --horizontal)
    #[arg(short, long)]
    pub extent: i32,

    /// Number of items
    #[arg(short, long)]
    pub items: i32,

    /// Gap between columns
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub h_gap: i32,

    /// Gap between rows
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub v_gap: i32,

    /// Gap before the first row
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub first_row: i32,

    /// Gap after the last row
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub last_row: i32,

    /// Gap before the first column
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub first_col: i32,

    /// Gap after the last column
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub last_col: i32,

    /// Lay items out in a horizontally scrolling grid
    #[arg(long)]
    pub horizontal: bool,
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// URL to fetch
    #[arg(value_name = "URL")]
    pub url: String,

    /// Send `logRequest: false` so the exchange is not logged
    #[arg(long)]
    pub no_log: bool,

    /// Refuse plain http URLs
    #[arg(long)]
    pub https_only: bool,

    /// Print the response body
    #[arg(long)]
    pub body: bool,
}

/// Output pixel format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Argb8888,
    Rgb565,
    Argb4444,
    Alpha8,
}

impl From<FormatArg> for PixelFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Argb8888 => PixelFormat::Argb8888,
            FormatArg::Rgb565 => PixelFormat::Rgb565,
            FormatArg::Argb4444 => PixelFormat::Argb4444,
            FormatArg::Alpha8 => PixelFormat::Alpha8,
        }
    }
}

/// Arguments for the image command
#[derive(Args, Debug, Clone)]
pub struct ImageArgs {
    /// Local path or http(s) URL of the image
    #[arg(value_name = "PATH_OR_URL")]
    pub source: String,

    /// Output file; the extension is replaced to match the encoding
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,

    /// Maximum output width (0 = unconstrained)
    #[arg(long, default_value = "0")]
    pub max_width: i32,

    /// Maximum output height (0 = unconstrained)
    #[arg(long, default_value = "0")]
    pub max_height: i32,

    /// Maximum output size in KB (0 = unconstrained, PNG output)
    #[arg(long, default_value = "0")]
    pub max_kb: i64,

    /// Pixel format
    #[arg(long, value_enum, default_value = "argb8888")]
    pub format: FormatArg,

    /// Clamp width and height independently
    #[arg(long)]
    pub no_lock_ratio: bool,
}

impl ImageArgs {
    /// Compression options described by the arguments
    pub fn compress_option(&self) -> CompressOption {
        CompressOption {
            max_width: self.max_width,
            max_height: self.max_height,
            max_size_kb: self.max_kb,
            config: self.format.into(),
            lock_ratio: !self.no_lock_ratio,
        }
    }
}

/// Arguments for the dirs command
#[derive(Args, Debug, Clone)]
pub struct DirsArgs {
    /// Package name to resolve directories for (defaults to the config value)
    #[arg(long)]
    pub package: Option<String>,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Where to write it (defaults to the user config directory)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}
