//! Host-visible outputs for a GitHub Actions runner.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` when the runner
//! provides one, otherwise through the legacy `::set-output` command on
//! stdout. A failed run is signalled with an `::error::` annotation; the
//! binary also exits non-zero.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use ssm_run_engine::report::RunReport;

/// Sink for the values a run publishes to its host.
pub trait HostOutput {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()>;

    fn set_failed(&mut self, message: &str) -> io::Result<()>;
}

/// Publish a finished run. Called exactly once, after the verdict.
pub fn publish_report(report: &RunReport, host: &mut dyn HostOutput) -> io::Result<()> {
    host.set_output("status", report.status().as_str())?;

    if let Some(error) = report.error() {
        host.set_output("error", &error)?;
    }

    if let Some(response) = &report.response {
        host.set_output("response", &serde_json::to_string(response)?)?;
    }

    if let Some(message) = report.failure_message() {
        host.set_failed(&message)?;
    }

    Ok(())
}

/// [`HostOutput`] following the GitHub Actions runner conventions.
pub struct GithubOutput<W: Write> {
    output_file: Option<PathBuf>,
    stdout: W,
}

impl GithubOutput<io::Stdout> {
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            io::stdout(),
        )
    }
}

impl<W: Write> GithubOutput<W> {
    pub fn new(output_file: Option<PathBuf>, stdout: W) -> Self {
        Self { output_file, stdout }
    }

    pub fn into_inner(self) -> W {
        self.stdout
    }
}

impl<W: Write> HostOutput for GithubOutput<W> {
    fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
                let entry = file_command_entry(name, value, &delimiter)?;
                let mut file = OpenOptions::new().append(true).create(true).open(path)?;
                file.write_all(entry.as_bytes())
            }
            None => writeln!(
                self.stdout,
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            ),
        }
    }

    fn set_failed(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.stdout, "::error::{}", escape_data(message))
    }
}

/// Heredoc-style entry for a runner file command.
pub fn file_command_entry(name: &str, value: &str, delimiter: &str) -> io::Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output '{name}' contains the delimiter {delimiter}"),
        ));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// Escape a workflow command's message so it stays on one line.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value.
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
