//! External-engine boundary: serialize out, subprocess in between, verdict
//! back. Two dialects exist in the wild for the engines this crate targets;
//! each gets one adapter and both normalize to [`Verdict`].

use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{Error, Result};

/// Normalized engine answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Satisfying assignment, variable id to value. Unconstrained variables
    /// may be absent.
    Sat(HashMap<u32, bool>),
    Unsat,
}

/// One satisfiability engine behind one invocation dialect.
///
/// Implementations differ only in how the instance text is delivered and how
/// the verdict is read back; the capability flag decides whether parity
/// clauses may appear in the instance at all, since neither dialect accepts
/// the other's clause syntax.
pub trait SolverAdapter {
    fn name(&self) -> &str;

    /// Whether the engine accepts `x`-prefixed parity clauses.
    fn supports_xor(&self) -> bool;

    /// Run the engine on serialized instance text. Blocks until the
    /// subprocess exits.
    fn solve(&self, dimacs: &str) -> Result<Verdict>;
}

fn transport(msg: impl Into<String>) -> Error {
    Error::SolverTransport(msg.into())
}

/// Collect signed-integer assignment tokens into the model. A `0` token ends
/// the assignment.
fn parse_assignment(tokens: &str, model: &mut HashMap<u32, bool>) -> Result<()> {
    for tok in tokens.split_whitespace() {
        let n: i64 = tok
            .parse()
            .map_err(|_| transport(format!("bad literal in assignment: {tok:?}")))?;
        if n == 0 {
            break;
        }
        model.insert(n.unsigned_abs() as u32, n > 0);
    }
    Ok(())
}

/// Stream-dialect engine (cryptominisat and friends): instance over stdin,
/// `s`-status and `v`-assignment lines on stdout. Accepts parity clauses.
pub struct StreamSolver {
    command: String,
    args: Vec<String>,
}

impl StreamSolver {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for StreamSolver {
    fn default() -> Self {
        Self::new("cryptominisat")
    }
}

impl SolverAdapter for StreamSolver {
    fn name(&self) -> &str {
        &self.command
    }

    fn supports_xor(&self) -> bool {
        true
    }

    fn solve(&self, dimacs: &str) -> Result<Verdict> {
        debug!(command = %self.command, "launching stream-dialect engine");
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| transport(format!("failed to launch {}: {e}", self.command)))?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| transport("engine stdin unavailable"))?;
        stdin
            .write_all(dimacs.as_bytes())
            .map_err(|e| transport(format!("failed to write instance: {e}")))?;
        drop(stdin);
        let output = child
            .wait_with_output()
            .map_err(|e| transport(format!("failed to read engine output: {e}")))?;
        // Engines signal sat/unsat through the exit code as well (10/20 by
        // convention); only the output grammar is authoritative here.
        parse_stream_output(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_stream_output(out: &str) -> Result<Verdict> {
    let mut sat = false;
    let mut model = HashMap::new();
    for line in out.lines() {
        let line = line.trim();
        if let Some(status) = line.strip_prefix("s ") {
            match status.trim() {
                "SATISFIABLE" => sat = true,
                "UNSATISFIABLE" => return Ok(Verdict::Unsat),
                other => return Err(transport(format!("unrecognized status line: s {other}"))),
            }
        } else if let Some(assignment) = line.strip_prefix("v ") {
            parse_assignment(assignment, &mut model)?;
        }
    }
    if sat {
        Ok(Verdict::Sat(model))
    } else {
        Err(transport("no status line in engine output"))
    }
}

/// File-dialect engine: instance written to a temporary file whose path is
/// passed as an argument together with a flag requesting a model; output is
/// a bare `sat`/`unsat` token and, when sat, one assignment line. No parity
/// clauses.
pub struct FileSolver {
    command: String,
    model_flag: String,
}

impl FileSolver {
    pub fn new(command: impl Into<String>, model_flag: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model_flag: model_flag.into(),
        }
    }
}

impl SolverAdapter for FileSolver {
    fn name(&self) -> &str {
        &self.command
    }

    fn supports_xor(&self) -> bool {
        false
    }

    fn solve(&self, dimacs: &str) -> Result<Verdict> {
        let mut file = NamedTempFile::new()
            .map_err(|e| transport(format!("failed to create instance file: {e}")))?;
        file.write_all(dimacs.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| transport(format!("failed to write instance file: {e}")))?;
        debug!(command = %self.command, path = %file.path().display(), "launching file-dialect engine");
        let output = Command::new(&self.command)
            .arg(&self.model_flag)
            .arg(file.path())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| transport(format!("failed to launch {}: {e}", self.command)))?;
        parse_file_output(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_file_output(out: &str) -> Result<Verdict> {
    let mut lines = out.lines().map(str::trim).filter(|l| !l.is_empty());
    match lines.next() {
        Some("sat") => {
            let assignment = lines
                .next()
                .ok_or_else(|| transport("sat verdict without an assignment line"))?;
            let mut model = HashMap::new();
            parse_assignment(assignment, &mut model)?;
            Ok(Verdict::Sat(model))
        }
        Some("unsat") => Ok(Verdict::Unsat),
        Some(other) => Err(transport(format!("unrecognized verdict: {other:?}"))),
        None => Err(transport("engine produced no output")),
    }
}
