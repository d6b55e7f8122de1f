//! Markup translation through the pandoc command-line tool.

use super::{ConvertOptions, Translator};
use crate::detect::SourceFormat;
use crate::docx::Docx;
use crate::error::{Error, Result};
use crate::template::TemplateConfig;
use std::ffi::OsString;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running pandoc process is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Translator for LaTeX and Markdown sources.
///
/// Each call runs `pandoc` once into a scratch directory; the intermediate
/// file is read back into memory and removed with the directory.
#[derive(Debug, Clone)]
pub struct PandocTranslator {
    program: PathBuf,
}

impl Default for PandocTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl PandocTranslator {
    /// Use `pandoc` from the search path.
    pub fn new() -> Self {
        Self::with_program("pandoc")
    }

    /// Use a specific pandoc executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this translator runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Probe the executable and return the first line of `--version`.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| self.unavailable(e))?;
        if !output.status.success() {
            return Err(Error::ToolUnavailable(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or("pandoc").trim().to_string())
    }

    fn unavailable(&self, err: std::io::Error) -> Error {
        Error::ToolUnavailable(format!("cannot run {} ({})", self.program.display(), err))
    }

    /// Run pandoc with `args`, killing it once `timeout` has passed.
    fn run(&self, args: &[OsString], timeout: Duration) -> Result<()> {
        let stderr = tempfile::tempfile()?;
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .map_err(|e| self.unavailable(e))?;

        log::debug!("Spawned {} (pid {})", self.program.display(), child.id());
        let started = Instant::now();
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if started.elapsed() >= timeout => {
                    log::warn!("pandoc did not finish in {}s, killing it", timeout.as_secs());
                    // The process may exit between the check and the kill.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::ConversionTimeout(timeout));
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };
        log::debug!(
            "pandoc exited with {} after {:.1}s",
            status,
            started.elapsed().as_secs_f64()
        );

        if status.success() {
            Ok(())
        } else {
            Err(failure(status, stderr))
        }
    }
}

fn failure(status: ExitStatus, mut stderr: std::fs::File) -> Error {
    let mut captured = Vec::new();
    if stderr.seek(SeekFrom::Start(0)).is_ok() {
        let _ = stderr.read_to_end(&mut captured);
    }
    let captured = String::from_utf8_lossy(&captured);
    let captured = captured.trim();
    if captured.is_empty() {
        Error::ConversionFailed(format!("pandoc exited with {}", status))
    } else {
        Error::ConversionFailed(format!("pandoc exited with {}: {}", status, captured))
    }
}

/// Command line for one conversion.
///
/// Citations are processed only when a bibliography is given.
pub(crate) fn build_args(
    source: &Path,
    output: &Path,
    bibliography: Option<&Path>,
    csl: &str,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        source.into(),
        "-s".into(),
        "-o".into(),
        output.into(),
    ];
    if let Some(bib) = bibliography {
        args.push("--bibliography".into());
        args.push(bib.into());
        args.push("--citeproc".into());
        if !csl.is_empty() {
            args.push("--csl".into());
            args.push(csl.into());
        }
    }
    // Figures are referenced relative to the source file.
    if let Some(dir) = source.parent().filter(|d| !d.as_os_str().is_empty()) {
        let mut resource_path = OsString::from("--resource-path=");
        resource_path.push(dir);
        args.push(resource_path);
    }
    args
}

impl Translator for PandocTranslator {
    fn supported_extensions(&self) -> &[&str] {
        SourceFormat::markup_extensions()
    }

    fn name(&self) -> &str {
        "pandoc"
    }

    fn translate(
        &self,
        source: &Path,
        options: &ConvertOptions,
        config: &TemplateConfig,
    ) -> Result<Docx> {
        let version = self.version()?;
        log::debug!("Using {}", version);

        let bibliography = options.bibliography_for(source);
        if let Some(ref bib) = bibliography {
            if !bib.is_file() {
                return Err(Error::InputNotFound(bib.clone()));
            }
        }

        let scratch = tempfile::Builder::new().prefix("paperdoc-").tempdir()?;
        let output = scratch.path().join("intermediate.docx");
        let args = build_args(source, &output, bibliography.as_deref(), &config.csl_style);
        self.run(&args, options.timeout)?;

        if !output.is_file() {
            return Err(Error::ConversionFailed(
                "pandoc exited successfully but wrote no document".to_string(),
            ));
        }
        let docx = Docx::open(&output)?;
        log::info!(
            "Translated {} ({} paragraphs, {} tables)",
            source.display(),
            docx.document.paragraph_count(),
            docx.document.table_count()
        );
        Ok(docx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateRegistry;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_build_args_without_bibliography() {
        let args = build_args(Path::new("paper.tex"), Path::new("/tmp/out.docx"), None, "apa.csl");
        assert_eq!(strings(&args), vec!["paper.tex", "-s", "-o", "/tmp/out.docx"]);
    }

    #[test]
    fn test_build_args_with_bibliography() {
        let args = build_args(
            Path::new("drafts/paper.tex"),
            Path::new("/tmp/out.docx"),
            Some(Path::new("drafts/library.bib")),
            "https://www.zotero.org/styles/nature",
        );
        assert_eq!(
            strings(&args),
            vec![
                "drafts/paper.tex",
                "-s",
                "-o",
                "/tmp/out.docx",
                "--bibliography",
                "drafts/library.bib",
                "--citeproc",
                "--csl",
                "https://www.zotero.org/styles/nature",
                "--resource-path=drafts",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_tool_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.tex");
        std::fs::write(&source, "\\documentclass{article}").unwrap();

        let translator = PandocTranslator::with_program(dir.path().join("no-pandoc-here"));
        let templates = TemplateRegistry::builtin();
        let err = translator
            .translate(&source, &ConvertOptions::new(), templates.default_config())
            .unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable(_)));
    }

    #[test]
    fn test_supported_extensions() {
        let translator = PandocTranslator::new();
        assert!(translator.supports_extension("LTX"));
        assert!(translator.supports_extension("markdown"));
        assert!(!translator.supports_extension("docx"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-pandoc");
        std::fs::write(
            &script,
            "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo 'pandoc 3.1'; exit 0; fi\n\
             echo 'Error at line 3: unknown command' >&2\nexit 43\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let translator = PandocTranslator::with_program(&script);
        assert_eq!(translator.version().unwrap(), "pandoc 3.1");

        let err = translator
            .run(&[OsString::from("paper.tex")], Duration::from_secs(10))
            .unwrap_err();
        match err {
            Error::ConversionFailed(message) => assert!(message.contains("unknown command")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_program_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-pandoc");
        std::fs::write(&script, "#!/bin/sh\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let translator = PandocTranslator::with_program(&script);
        let err = translator
            .run(&[], Duration::from_millis(200))
            .unwrap_err();
        assert!(matches!(err, Error::ConversionTimeout(_)));
        assert_eq!(err.kind(), crate::ErrorKind::ConversionFailed);
    }
}
