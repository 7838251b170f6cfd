//! **skyjournal** - Turn tab-delimited astronomy observation logs into journals
//!
//! Tolerant report parsing, catalog-aware target ordering, and LaTeX/plain-text
//! journals indexed by date, target and constellation.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Parsing, classification and export pipeline
pub mod core {
    /// Report, header and target entry data model
    pub mod report;
    pub use report::{HeaderField, Report, ReportHeader, TargetEntry};

    /// Field splitting for TAB-delimited report lines
    pub mod tokenize;

    /// Tolerant line-oriented report parser
    pub mod parser;
    pub use parser::{ParseWarning, ParseWarningKind, ReportParser, parse_reports};

    /// Folder import with file-name ordering and parallel parsing
    pub mod import;
    pub use import::{ImportSummary, ReportCollection, import_folder, run as import_run};

    /// Catalog classification and journal ordering of target identifiers
    pub mod catalog;
    pub use catalog::{Category, classify, run as classify_run, sort_identifiers};

    /// Target-type statistics for the by-target journal
    pub mod stats;
    pub use stats::TargetStatistics;

    /// Journal exporters (by date, target, constellation, plain text)
    pub mod export;
    pub use export::{ExportSummary, Exporter, run as export_run};
}

/// Infrastructure - Configuration, I/O, and report discovery
pub mod infra {
    /// Configuration management with TOML support and env overrides
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped reads and unit/journal writers
    pub mod io;
    pub use io::{FileContent, read_file_smart};

    /// Raw report folder listing
    pub mod walk;
    pub use walk::ReportWalker;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{classify_run, export_run, import_run};
pub use infra::{Config, ReportWalker, load_config};

// Core types for external consumers
pub use core::{Category, Report, TargetEntry};
