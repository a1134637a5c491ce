//! biblioruler - export reference-manager libraries
//!
//! Reads a Papers3, Zotero or Mendeley Desktop database and writes it as
//! Zotero RDF, BibTeX or a JSON dump.

mod commands;

use biblioruler_sources::BiblioConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Export bibliographic libraries
#[derive(Parser, Debug)]
#[command(name = "biblioruler", version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Print debug information
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (default: ~/.biblioruler/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Papers3 database (Database.papersdb)
    #[arg(long, global = true)]
    papers3_db: Option<PathBuf>,

    /// Directory Papers3 file paths are relative to
    #[arg(long, global = true)]
    papers3_filebase: Option<PathBuf>,

    /// Also read Papers3 smart collections
    #[arg(long, global = true)]
    papers3_virtual: bool,

    /// Zotero database (zotero.sqlite)
    #[arg(long, global = true)]
    zotero_db: Option<PathBuf>,

    /// Base directory of Zotero relative attachments
    #[arg(long, global = true)]
    zotero_filebase: Option<PathBuf>,

    /// Read a copy of the Zotero database
    #[arg(long, global = true)]
    zotero_copy: bool,

    /// Mendeley Desktop database
    #[arg(long, global = true)]
    mendeley_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a source library
    Export {
        /// Source database: papers3, zotero or mendeley
        source: String,
        /// Output format: zotero_rdf, bibtex or json
        exporter: String,
        /// Output path without extension
        path: PathBuf,
        /// Write annotations into copies of the PDFs (RDF only)
        #[arg(long)]
        embed_annotations: bool,
    },

    /// Synchronize two libraries (not implemented)
    Sync { source: String, destination: String },

    /// List the sources and their configured databases
    Sources,
}

impl Cli {
    /// Configuration file, then discovery, then command-line overrides
    fn configuration(&self) -> Result<BiblioConfig, biblioruler_sources::SourceError> {
        let mut config = BiblioConfig::load(self.config.as_deref())?.with_discovery();
        if let Some(path) = &self.papers3_db {
            config.papers3.dbpath = Some(path.clone());
        }
        if let Some(path) = &self.papers3_filebase {
            config.papers3.filebase = Some(path.clone());
        }
        if self.papers3_virtual {
            config.papers3.include_virtual = true;
        }
        if let Some(path) = &self.zotero_db {
            config.zotero.dbpath = Some(path.clone());
        }
        if let Some(path) = &self.zotero_filebase {
            config.zotero.filebase = Some(path.clone());
        }
        if self.zotero_copy {
            config.zotero.copy = true;
        }
        if let Some(path) = &self.mendeley_db {
            config.mendeley.dbpath = Some(path.clone());
        }
        Ok(config)
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    tracing::debug!(command = ?cli.command, "Calling command");
    let config = cli.configuration()?;
    match &cli.command {
        Commands::Export {
            source,
            exporter,
            path,
            embed_annotations,
        } => {
            let written = commands::export(&config, source, exporter, path, *embed_annotations)?;
            println!("{}", written.display());
        }
        Commands::Sync { source, destination } => commands::sync(source, destination)?,
        Commands::Sources => commands::sources(&config, &mut std::io::stdout())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_arguments() {
        let cli = Cli::try_parse_from([
            "biblioruler",
            "--debug",
            "export",
            "papers3",
            "zotero_rdf",
            "/tmp/library",
            "--zotero-copy",
        ])
        .unwrap();
        assert!(cli.debug);
        assert!(cli.zotero_copy);
        match cli.command {
            Commands::Export { source, exporter, path, embed_annotations } => {
                assert_eq!(source, "papers3");
                assert_eq!(exporter, "zotero_rdf");
                assert_eq!(path, PathBuf::from("/tmp/library"));
                assert!(!embed_annotations);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[papers3]\ndbpath = \"/from/file.papersdb\"\n").unwrap();
        let config_arg = config_path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "biblioruler",
            "--config",
            config_arg.as_str(),
            "--papers3-db",
            "/from/cli.papersdb",
            "--mendeley-db",
            "/m.sqlite",
            "sources",
        ])
        .unwrap();
        let config = cli.configuration().unwrap();
        assert_eq!(config.papers3.dbpath, Some(PathBuf::from("/from/cli.papersdb")));
        assert_eq!(config.mendeley.dbpath, Some(PathBuf::from("/m.sqlite")));
    }

    #[test]
    fn test_missing_command_is_rejected() {
        assert!(Cli::try_parse_from(["biblioruler"]).is_err());
    }
}
