//! 外部 clingo プロセスのバックエンド

use crate::program::{Atom, Program};
use crate::solver::{AnswerSet, SolveOptions, Solver};
use crate::SolverError;
use serde::Deserialize;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// `clingo --outf=2` JSON report (only the parts we read)
#[derive(Debug, Deserialize)]
struct ClingoReport {
    #[serde(rename = "Result")]
    result: String,
    #[serde(rename = "Call", default)]
    calls: Vec<ClingoCall>,
}

#[derive(Debug, Deserialize)]
struct ClingoCall {
    #[serde(rename = "Witnesses", default)]
    witnesses: Vec<ClingoWitness>,
}

#[derive(Debug, Deserialize)]
struct ClingoWitness {
    #[serde(rename = "Value", default)]
    value: Vec<String>,
}

/// Runs an external `clingo` executable, feeding the program on stdin
#[derive(Debug, Clone)]
pub struct ClingoSolver {
    path: PathBuf,
    args: Vec<String>,
}

impl Default for ClingoSolver {
    fn default() -> Self {
        Self::new("clingo")
    }
}

impl ClingoSolver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
        }
    }

    /// Extra command-line arguments passed before the program
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn parse_report(stdout: &str, timeout: Option<Duration>) -> Result<Vec<AnswerSet>, SolverError> {
        let report: ClingoReport = serde_json::from_str(stdout)
            .map_err(|e| SolverError::Output(format!("invalid clingo JSON: {}", e)))?;

        let mut models = Vec::new();
        for witness in report.calls.iter().flat_map(|call| &call.witnesses) {
            let atoms = witness
                .value
                .iter()
                .map(|text| text.parse::<Atom>())
                .collect::<Result<Vec<_>, _>>()?;
            models.push(AnswerSet::new(atoms));
        }

        match report.result.as_str() {
            "SATISFIABLE" | "UNSATISFIABLE" | "OPTIMUM FOUND" => Ok(models),
            // the time limit fired before the search concluded
            "UNKNOWN" if models.is_empty() => Err(SolverError::Timeout(timeout.unwrap_or_default())),
            "UNKNOWN" => {
                warn!("clingo stopped early; returning {} partial answer sets", models.len());
                Ok(models)
            }
            other => Err(SolverError::Output(format!("unexpected clingo result '{}'", other))),
        }
    }
}

impl Solver for ClingoSolver {
    fn name(&self) -> &'static str {
        "clingo"
    }

    fn solve(&self, program: &Program, options: &SolveOptions) -> Result<Vec<AnswerSet>, SolverError> {
        let start = Instant::now();
        let mut command = Command::new(&self.path);
        command
            .arg("--outf=2")
            .arg(format!("--models={}", options.max_models))
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(timeout) = options.timeout {
            command.arg(format!("--time-limit={}", timeout.as_secs().max(1)));
        }

        let mut child = command.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => SolverError::Unavailable(format!(
                "clingo executable '{}' not found",
                self.path.display()
            )),
            _ => SolverError::Io(e),
        })?;
        debug!("Started {} (pid {})", self.path.display(), child.id());

        let text = program.to_string();
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SolverError::Unavailable("failed to open clingo stdin".to_string()))?;
        let writer = thread::spawn(move || stdin.write_all(text.as_bytes()));

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SolverError::Unavailable("failed to open clingo stdout".to_string()))?;
        let stdout_reader = thread::spawn(move || {
            let mut buffer = String::new();
            stdout.read_to_string(&mut buffer).map(|_| buffer)
        });
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SolverError::Unavailable("failed to open clingo stderr".to_string()))?;
        let stderr_reader = thread::spawn(move || {
            let mut buffer = String::new();
            stderr.read_to_string(&mut buffer).map(|_| buffer)
        });

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if options.cancel.is_cancelled() {
                child.kill()?;
                child.wait()?;
                return Err(SolverError::Cancelled);
            }
            if let Some(deadline) = options.deadline(start) {
                // clingo's own limit has one-second granularity; enforce the exact budget here
                if Instant::now() >= deadline {
                    child.kill()?;
                    child.wait()?;
                    return Err(SolverError::Timeout(options.timeout.unwrap_or_default()));
                }
            }
            thread::sleep(POLL_INTERVAL);
        };

        let join_failed = |what: &str| SolverError::Output(format!("clingo {} thread panicked", what));
        // a closed pipe only means clingo rejected input early; its exit status tells the story
        if let Err(e) = writer.join().map_err(|_| join_failed("writer"))? {
            debug!("Writing program to clingo failed: {}", e);
        }
        let stdout = stdout_reader.join().map_err(|_| join_failed("stdout"))??;
        let stderr = stderr_reader.join().map_err(|_| join_failed("stderr"))??;

        // exit codes 10/20/30 report SAT/UNSAT/exhausted; bits 32 and up are errors
        let code = status.code().unwrap_or(-1);
        if !(0..32).contains(&code) {
            return Err(SolverError::Crashed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let models = Self::parse_report(&stdout, options.timeout)?;
        debug!("clingo returned {} answer sets in {:?}", models.len(), start.elapsed());
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_satisfiable_report() {
        let json = r#"{
            "Solver": "clingo version 5.6.2",
            "Call": [ { "Witnesses": [
                { "Value": [ "a(x)", "-b(x)" ] },
                { "Value": [ "c_A(\"http://e.org/a\")" ] }
            ] } ],
            "Result": "SATISFIABLE"
        }"#;
        let models = ClingoSolver::parse_report(json, None).unwrap();
        assert_eq!(models.len(), 2);
        assert!(models[0].contains(&Atom::strong_negation("b", vec!["x".into()])));
        assert_eq!(models[1].atoms.iter().next().unwrap().args[0], "\"http://e.org/a\"");
    }

    #[test]
    fn test_parse_unsat_and_unknown() {
        let unsat = r#"{ "Call": [ {} ], "Result": "UNSATISFIABLE" }"#;
        assert!(ClingoSolver::parse_report(unsat, None).unwrap().is_empty());

        let unknown = r#"{ "Call": [ {} ], "Result": "UNKNOWN" }"#;
        assert!(matches!(
            ClingoSolver::parse_report(unknown, Some(Duration::from_secs(3))),
            Err(SolverError::Timeout(d)) if d == Duration::from_secs(3)
        ));
    }

    #[test]
    fn test_missing_executable_is_unavailable() {
        let solver = ClingoSolver::new("/nonexistent/kitsune-test-clingo");
        let result = solver.solve(&Program::new(), &SolveOptions::default());
        assert!(matches!(result, Err(SolverError::Unavailable(_))));
    }
}
