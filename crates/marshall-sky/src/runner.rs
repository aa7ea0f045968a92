//! Piping queries into the SKY client.

use crate::error::{Error, Result};
use crate::query::SkyQuery;
use std::io::{ErrorKind, Write};
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};

/// Runs an external program with a query on its standard input.
///
/// The program's own output goes straight to this process's stdout and
/// stderr. Its exit status is handed back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRunner {
    program: String,
    args: Vec<String>,
}

impl Default for QueryRunner {
    fn default() -> Self {
        Self::new("sky")
    }
}

impl QueryRunner {
    /// A runner for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument passed to the program.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Serialize `query` and feed it to the program.
    pub fn run(&self, query: &SkyQuery) -> Result<ExitStatus> {
        self.run_text(&query.to_xml_string()?)
    }

    /// Feed already serialized query text to the program.
    pub fn run_text(&self, text: &str) -> Result<ExitStatus> {
        debug!(program = %self.program, args = ?self.args, "Starting query program");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let io_error = |source: std::io::Error| Error::Io {
            program: self.program.clone(),
            source,
        };

        // Dropping stdin closes the pipe so the program sees end of input.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait().map_err(io_error)?;

        match written {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "Query program closed its input early");
            }
            Err(err) => return Err(io_error(err)),
        }
        info!(program = %self.program, %status, "Query program finished");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program() {
        let runner = QueryRunner::default();
        assert_eq!(runner.program(), "sky");
        assert!(runner.args().is_empty());
    }

    #[test]
    fn test_missing_program() {
        let runner = QueryRunner::new("marshall-no-such-program");
        let err = runner.run_text("<requestCollection/>").unwrap_err();
        assert!(matches!(
            err,
            Error::Spawn { ref program, .. } if program == "marshall-no-such-program"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_query_is_written_to_stdin() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("received.xml");

        let mut query = SkyQuery::new().unwrap();
        query.set_database("roma").unwrap();

        let status = QueryRunner::new("sh")
            .arg("-c")
            .arg(format!("cat > '{}'", out.display()))
            .run(&query)
            .unwrap();
        assert!(status.success());
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            query.to_xml_string().unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_returned() {
        let status = QueryRunner::new("sh")
            .arg("-c")
            .arg("cat > /dev/null; exit 3")
            .run_text("<requestCollection/>")
            .unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_status_survives_unread_input() {
        let input = "x".repeat(1 << 20);
        let status = QueryRunner::new("sh")
            .arg("-c")
            .arg("exit 3")
            .run_text(&input)
            .unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
