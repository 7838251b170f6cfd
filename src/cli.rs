use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub dry_run: bool,  // global --dry-run
}

#[derive(Parser)]
#[command(name = "skyj")]
#[command(
    about = "Turn tab-delimited astronomy observation logs into journals indexed by date, target and constellation"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress bars and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Show what would be done without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            dry_run: self.dry_run,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse raw reports and summarize what was found
    Import(ImportArgs),

    /// Write the journals (by date, target, constellation and plain text)
    Export(ExportArgs),

    /// Show the catalog category of target identifiers
    Classify(ClassifyArgs),

    /// Initialize a skyjournal.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where reports come from and where journals go.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Config file (defaults to skyjournal.toml in the working directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override `files_location` from the config
    #[arg(long, value_name = "DIR")]
    pub files_location: Option<String>,

    /// Also read reports in sub-folders of the raw report folder
    #[arg(long)]
    pub recursive: bool,
}

#[derive(Debug, Parser)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Parse these files instead of the raw report folder
    pub files: Vec<PathBuf>,

    /// Print reports and warnings as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only write these journals (repeatable; default: all)
    #[arg(long, value_enum)]
    pub only: Vec<JournalKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JournalKind {
    /// LaTeX journal ordered by observation date
    Date,
    /// LaTeX journal grouped by target and catalog
    Target,
    /// LaTeX journal grouped by constellation
    Constellation,
    /// Plain-text journal ordered by date
    Text,
}

impl JournalKind {
    pub const ALL: [JournalKind; 4] = [
        JournalKind::Date,
        JournalKind::Target,
        JournalKind::Constellation,
        JournalKind::Text,
    ];
}

#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    /// Target identifiers or unit keys (e.g. M42, NGC7000_Cyg, Jupiter)
    #[arg(required = true)]
    pub identifiers: Vec<String>,

    /// List identifiers in journal order instead of input order
    #[arg(long)]
    pub sort: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
