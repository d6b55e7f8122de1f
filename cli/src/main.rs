//! paperdoc CLI - academic manuscript toolkit

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use paperdoc::{
    ConvertOptions, Converter, FormatOptions, FormatReport, PandocTranslator, TemplateConfig,
    TemplateRegistry, TranslatorRegistry,
};

#[derive(Parser)]
#[command(name = "paperdoc")]
#[command(version)]
#[command(about = "Create, convert, and format academic manuscripts as Word documents", long_about = None)]
struct Cli {
    /// JSON file with additional journal templates
    #[arg(long, global = true, value_name = "FILE", env = "PAPERDOC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new manuscript from a journal template
    Init {
        /// Manuscript title
        #[arg(value_name = "TITLE")]
        title: String,

        /// Output file
        #[arg(value_name = "PATH", default_value = "paper.docx")]
        path: PathBuf,

        /// Journal template
        #[arg(short, long, value_name = "NAME")]
        template: Option<String>,
    },

    /// Convert a LaTeX, Markdown, or Word source to a formatted Word document
    Convert {
        /// Source file (.tex, .md, .docx)
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Output file (SOURCE with a .docx extension if not specified)
        #[arg(value_name = "DEST")]
        dest: Option<PathBuf>,

        /// Journal template
        #[arg(short, long, value_name = "NAME")]
        template: Option<String>,

        /// Bibliography database (library.bib beside the source if present)
        #[arg(short, long, value_name = "FILE")]
        bibliography: Option<PathBuf>,

        /// pandoc executable
        #[arg(long, value_name = "PATH", env = "PAPERDOC_PANDOC")]
        pandoc: Option<PathBuf>,

        /// Give up on pandoc after this many seconds
        #[arg(long, value_name = "SECS", default_value = "300")]
        timeout: u64,

        /// Only classify paragraphs by their styles
        #[arg(long)]
        no_heuristics: bool,
    },

    /// Apply a journal template to an existing Word document
    Format {
        /// Source .docx file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Output file (overwrites SOURCE if not specified)
        #[arg(value_name = "DEST")]
        dest: Option<PathBuf>,

        /// Journal template
        #[arg(short, long, value_name = "NAME")]
        template: Option<String>,

        /// Only classify paragraphs by their styles
        #[arg(long)]
        no_heuristics: bool,

        /// Leave tables and captions as they are
        #[arg(long)]
        no_tables: bool,
    },

    /// List available journal templates
    Templates {
        /// Print templates as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_templates(cli.config.as_deref()).and_then(|templates| match cli.command {
        Commands::Init {
            title,
            path,
            template,
        } => cmd_init(&templates, &title, &path, template.as_deref()),
        Commands::Convert {
            source,
            dest,
            template,
            bibliography,
            pandoc,
            timeout,
            no_heuristics,
        } => cmd_convert(
            &templates,
            &source,
            dest.as_deref(),
            template.as_deref(),
            bibliography,
            pandoc,
            timeout,
            no_heuristics,
        ),
        Commands::Format {
            source,
            dest,
            template,
            no_heuristics,
            no_tables,
        } => cmd_format(
            &templates,
            &source,
            dest.as_deref(),
            template.as_deref(),
            FormatOptions::new()
                .with_heuristics(!no_heuristics)
                .with_table_style(!no_tables),
        ),
        Commands::Templates { json } => cmd_templates(&templates, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e.to_string().red());
        process::exit(exit_code(e.as_ref()));
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Exit status for an error, by library error kind.
fn exit_code(err: &(dyn std::error::Error + 'static)) -> i32 {
    match err.downcast_ref::<paperdoc::Error>() {
        Some(e) => e.kind().exit_code(),
        None => 1,
    }
}

fn load_templates(config: Option<&Path>) -> Result<TemplateRegistry, Box<dyn std::error::Error>> {
    let mut templates = TemplateRegistry::builtin();
    if let Some(path) = config {
        templates.load_file(path)?;
        log::debug!("Templates available: {}", templates.names().join(", "));
    }
    Ok(templates)
}

/// Resolve a template name, warning when it falls back to the default.
fn resolve<'r>(templates: &'r TemplateRegistry, name: Option<&str>) -> &'r TemplateConfig {
    if let Some(name) = name {
        if !templates.contains(name) {
            eprintln!(
                "{} unknown template '{}', using '{}' (available: {})",
                "Warning:".yellow().bold(),
                name,
                templates.default_config().key,
                templates.names().join(", ")
            );
        }
    }
    templates.resolve(name)
}

fn cmd_init(
    templates: &TemplateRegistry,
    title: &str,
    path: &Path,
    template: Option<&str>,
) -> CmdResult {
    let config = resolve(templates, template);
    println!(
        "{} {} ({})",
        "Creating".cyan().bold(),
        path.display(),
        config.name
    );

    let report = paperdoc::create(title, path, config)?;

    println!("{} {}", "Title:".bold(), title);
    println!("{} {}", "Sections:".bold(), report.sections);
    print_settings(config);
    println!("\n{} {}", "Saved to".green(), report.path.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_convert(
    templates: &TemplateRegistry,
    source: &Path,
    dest: Option<&Path>,
    template: Option<&str>,
    bibliography: Option<PathBuf>,
    pandoc: Option<PathBuf>,
    timeout: u64,
    no_heuristics: bool,
) -> CmdResult {
    let config = resolve(templates, template);
    let dest = dest
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source.with_extension("docx"));

    let mut options = ConvertOptions::new()
        .with_timeout(Duration::from_secs(timeout))
        .with_format_options(FormatOptions::new().with_heuristics(!no_heuristics));
    if let Some(bib) = bibliography {
        options = options.with_bibliography(bib);
    }
    let mut translators = TranslatorRegistry::with_defaults();
    if let Some(program) = pandoc {
        translators.register(std::sync::Arc::new(PandocTranslator::with_program(program)));
    }

    println!("{} {}", "Input: ".bold(), source.display());
    println!("{} {}", "Output:".bold(), dest.display());
    if let Some(bib) = options.bibliography_for(source) {
        println!("{} {}", "Bibliography:".bold(), bib.display());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Converting and applying '{}'...", config.key));

    let converted = Converter::new()
        .with_translators(translators)
        .with_options(options)
        .convert(source, &dest, config);
    let report = match converted {
        Ok(report) => {
            pb.finish_with_message("Done!");
            report
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };

    print_report(&report.format);
    println!("\n{} {}", "Saved to".green(), report.output.display());
    Ok(())
}

fn cmd_format(
    templates: &TemplateRegistry,
    source: &Path,
    dest: Option<&Path>,
    template: Option<&str>,
    options: FormatOptions,
) -> CmdResult {
    let config = resolve(templates, template);
    let dest = dest.unwrap_or(source);

    println!("{} {}", "Input: ".bold(), source.display());
    println!("{} {}", "Output:".bold(), dest.display());

    let report = paperdoc::format_file_with_options(source, dest, config, options)?;

    print_report(&report);
    print_settings(config);
    println!("\n{} {}", "Saved to".green(), dest.display());
    Ok(())
}

fn cmd_templates(templates: &TemplateRegistry, json: bool) -> CmdResult {
    if json {
        let all: Vec<&TemplateConfig> = templates.iter().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("{}", "Available Templates".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for config in templates.iter() {
        println!("\n{} {}", config.key.bold(), format!("({})", config.name).dimmed());
        for line in template_summary(config) {
            println!("  {}", line);
        }
    }
    println!();
    println!(
        "Usage: {}",
        "paperdoc init \"Title\" paper.docx --template NAME".dimmed()
    );
    Ok(())
}

/// Effective settings of a template, one line each.
fn template_summary(config: &TemplateConfig) -> Vec<String> {
    vec![
        format!(
            "{} {}pt, {}x spacing, {} paper",
            config.font, config.font_size, config.line_spacing, config.paper_size
        ),
        format!(
            "title {}pt, headings {}/{}/{}pt",
            config.title_size(),
            config.heading1_size(),
            config.heading2_size(),
            config.heading3_size()
        ),
        format!("margins {}", config.margins),
        format!("{} citations, {}", config.citation_style, config.language),
    ]
}

fn print_settings(config: &TemplateConfig) {
    println!();
    println!("{}", "Formatting".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {} ({})", "Template".bold(), config.name, config.key);
    println!("{}: {} {}pt", "Font".bold(), config.font, config.font_size);
    println!("{}: {}", "Line spacing".bold(), config.line_spacing);
    println!("{}: {}", "Margins".bold(), config.margins);
    println!("{}: {}", "Paper".bold(), config.paper_size);
    println!("{}: {}", "Language".bold(), config.language);
}

fn print_report(report: &FormatReport) {
    println!();
    println!("{}", "Applied".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Paragraphs".bold(), report.paragraphs);
    println!("{}: {}", "Titles".bold(), report.titles);
    println!("{}: {}", "Headings".bold(), report.headings);
    println!("{}: {}", "Tables".bold(), report.tables);
    println!("{}: {}", "Captions".bold(), report.captions);
    println!("{}: {}", "Sections".bold(), report.sections);
    if report.inferred > 0 {
        println!(
            "{}",
            format!("{} paragraph role(s) inferred from appearance", report.inferred).dimmed()
        );
    }
}

fn cmd_version() {
    println!("{} {}", "paperdoc".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Academic manuscript toolkit");
    println!();
    println!("Conversions use {}", "pandoc".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_by_kind() {
        let err: Box<dyn std::error::Error> =
            Box::new(paperdoc::Error::ToolUnavailable("pandoc".into()));
        assert_eq!(exit_code(err.as_ref()), 4);

        let err: Box<dyn std::error::Error> = "plain failure".into();
        assert_eq!(exit_code(err.as_ref()), 1);
    }

    #[test]
    fn test_load_templates_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"{"key": "thesis", "name": "University Thesis", "font": "Georgia", "font_size": 12, "line_spacing": 2}"#,
        )
        .unwrap();

        let templates = load_templates(Some(&path)).unwrap();
        assert!(templates.contains("thesis"));
        assert_eq!(resolve(&templates, Some("Thesis")).font, "Georgia");
    }

    #[test]
    fn test_load_templates_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_templates(Some(&dir.path().join("absent.json"))).is_err());
    }

    #[test]
    fn test_template_summary_shows_effective_settings() {
        let templates = TemplateRegistry::builtin();
        let lines = template_summary(templates.resolve(Some("agu")));
        assert_eq!(lines[0], "Times New Roman 12pt, 2x spacing, letter paper");
        assert_eq!(lines[1], "title 16pt, headings 14/12/12pt");
        assert_eq!(lines[2], "margins 1in");
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "paperdoc", "convert", "paper.tex", "-t", "agu", "--timeout", "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert {
                source,
                dest,
                template,
                timeout,
                ..
            } => {
                assert_eq!(source, PathBuf::from("paper.tex"));
                assert!(dest.is_none());
                assert_eq!(template.as_deref(), Some("agu"));
                assert_eq!(timeout, 30);
            }
            _ => panic!("expected convert"),
        }
    }
}
