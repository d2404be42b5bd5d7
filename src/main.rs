use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use form_export::{Artifact, Error, ExportConfig, Exporter, JsonFileSource, ViewStrategy};

#[derive(Parser)]
#[command(version, about = "Render extracted form data as PDF reports and XLSX workbooks")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output directory
    #[arg(short, long, global = true, default_value = ".")]
    output: PathBuf,

    /// Leave out the table of contents
    #[arg(long, global = true)]
    no_toc: bool,

    /// Export saved data as-is instead of filling in template fields
    #[arg(long, global = true)]
    no_template_fill: bool,

    /// Sheet views to emit (comma separated)
    #[arg(long, global = true, value_enum, value_delimiter = ',')]
    view: Vec<ViewStrategy>,
}

#[derive(Subcommand)]
enum Command {
    /// Export one form as a PDF report
    Pdf {
        /// Payload file, or a directory of `<form_id>.json` payloads
        source: PathBuf,
        form_id: Option<String>,
    },
    /// Export one form as an XLSX workbook
    Xlsx {
        source: PathBuf,
        form_id: Option<String>,
    },
    /// Export every form as one XLSX workbook
    All {
        /// Payload file, or a directory holding `all_forms.json`
        source: PathBuf,
    },
}

fn run(cli: Cli) -> Result<PathBuf, Error> {
    let mut config = ExportConfig {
        include_toc: !cli.no_toc,
        complete_with_template: !cli.no_template_fill,
        ..ExportConfig::default()
    };

    let artifact: Artifact = match cli.command {
        Command::Pdf { source, form_id } => {
            Exporter::new(JsonFileSource::open(source), config)
                .export_form_pdf(&form_id.unwrap_or_default())?
        }
        Command::Xlsx { source, form_id } => {
            if !cli.view.is_empty() {
                config.form_views = cli.view;
            }
            Exporter::new(JsonFileSource::open(source), config)
                .export_form_xlsx(&form_id.unwrap_or_default())?
        }
        Command::All { source } => {
            if !cli.view.is_empty() {
                config.all_forms_views = cli.view;
            }
            Exporter::new(JsonFileSource::open(source), config).export_all_forms_xlsx()?
        }
    };

    artifact
        .write_to(&cli.output)
        .inspect_err(|e| log::error!("Writing {} failed: {e}", artifact.file_name))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(path) => {
            println!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        // Already logged where it happened.
        Err(_) => ExitCode::FAILURE,
    }
}
