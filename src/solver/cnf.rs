use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::backend::{SolverAdapter, StreamSolver, Verdict};
use super::error::{Error, Result};

/// A boolean variable id with a polarity. Ids are 1-based, as in DIMACS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    var: u32,
    negated: bool,
}

impl Literal {
    pub fn var(self) -> u32 {
        self.var
    }

    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// Same variable, flipped polarity. Pure; touches no instance state.
    pub fn negate(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }

    /// Signed-integer form: positive for an asserted variable, negative for
    /// a negated one.
    pub fn to_dimacs(self) -> i64 {
        if self.negated {
            -i64::from(self.var)
        } else {
            i64::from(self.var)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    /// At least one literal true.
    Or,
    /// An odd number of literals true. Only serialized for backends whose
    /// dialect accepts parity clauses.
    Xor,
}

/// An immutable constraint over literals. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub kind: ClauseKind,
    pub literals: Vec<Literal>,
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// The accumulating satisfiability problem: variable allocation, the clause
/// list, the backend adapter, and (after a successful solve) the model.
///
/// An instance is built up through one problem session and consumed by one
/// [`solve`](Instance::solve) call; afterwards it is read-only. Words built
/// in one instance must not be used with another; every word operation
/// checks this and fails with [`Error::ForeignWord`].
pub struct Instance {
    id: u64,
    next_var: u32,
    clauses: Vec<Clause>,
    model: Option<HashMap<u32, bool>>,
    adapter: Box<dyn SolverAdapter>,
}

impl Instance {
    /// Instance wired to the default stream-dialect engine.
    pub fn new() -> Self {
        Self::with_adapter(Box::new(StreamSolver::default()))
    }

    /// Instance wired to a specific backend. The backend choice is fixed for
    /// the instance lifetime; it decides, among other things, which XOR
    /// encoding [`Word::bitwise_xor`](super::Word::bitwise_xor) emits.
    pub fn with_adapter(adapter: Box<dyn SolverAdapter>) -> Self {
        Self {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            next_var: 1,
            clauses: Vec::new(),
            model: None,
            adapter,
        }
    }

    /// Process-unique handle identity, used by words to detect cross-instance
    /// use.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the configured backend accepts parity clauses.
    pub fn supports_xor(&self) -> bool {
        self.adapter.supports_xor()
    }

    /// Count of variables allocated so far.
    pub fn num_vars(&self) -> u32 {
        self.next_var - 1
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Fresh positive literal with a strictly increasing id.
    pub fn allocate_variable(&mut self) -> Literal {
        let var = self.next_var;
        self.next_var += 1;
        Literal {
            var,
            negated: false,
        }
    }

    /// Append an OR clause: at least one of `literals` must hold.
    pub fn add_or(&mut self, literals: &[Literal]) -> Result<()> {
        self.add_clause(ClauseKind::Or, literals)
    }

    /// Append an XOR clause: an odd number of `literals` must hold. Only
    /// meaningful with a backend whose dialect accepts parity clauses; the
    /// word operators never emit one otherwise.
    pub fn add_xor(&mut self, literals: &[Literal]) -> Result<()> {
        self.add_clause(ClauseKind::Xor, literals)
    }

    fn add_clause(&mut self, kind: ClauseKind, literals: &[Literal]) -> Result<()> {
        if literals.is_empty() {
            return Err(Error::EmptyClause);
        }
        self.clauses.push(Clause {
            kind,
            literals: literals.to_vec(),
        });
        Ok(())
    }

    /// DIMACS text: `p cnf <max_var> <clauses>` header, one `0`-terminated
    /// line per clause, XOR clauses prefixed with `x`.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "p cnf {} {}", self.num_vars(), self.clauses.len());
        for clause in &self.clauses {
            if clause.kind == ClauseKind::Xor {
                out.push('x');
            }
            for lit in &clause.literals {
                let _ = write!(out, "{} ", lit.to_dimacs());
            }
            out.push_str("0\n");
        }
        out
    }

    /// Serialize, hand the instance to the backend, and store the model.
    ///
    /// An unsatisfiable verdict is [`Error::Unsatisfiable`] — a definitive
    /// answer, terminal for this instance. Engine invocation or output
    /// problems are [`Error::SolverTransport`].
    pub fn solve(&mut self) -> Result<()> {
        let dimacs = self.serialize();
        debug!(
            vars = self.num_vars(),
            clauses = self.clauses.len(),
            backend = self.adapter.name(),
            "handing instance to solver"
        );
        match self.adapter.solve(&dimacs)? {
            Verdict::Sat(model) => {
                debug!(assigned = model.len(), "model received");
                self.model = Some(model);
                Ok(())
            }
            Verdict::Unsat => Err(Error::Unsatisfiable),
        }
    }

    /// Model value of a variable. Variables the engine left unassigned
    /// (allocated but never constrained) read as `false`.
    pub fn read(&self, var: u32) -> Result<bool> {
        let model = self.model.as_ref().ok_or(Error::ModelNotReady)?;
        Ok(model.get(&var).copied().unwrap_or(false))
    }

    /// Model value of a literal, polarity applied.
    pub fn value_of(&self, lit: Literal) -> Result<bool> {
        Ok(self.read(lit.var())? ^ lit.is_negated())
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Scripted backend: "unsat", "fail", or a bit string assigning
    /// variables 1.. in order.
    pub(crate) struct FixedVerdict(pub &'static str);

    impl SolverAdapter for FixedVerdict {
        fn name(&self) -> &str {
            "fixed"
        }

        fn supports_xor(&self) -> bool {
            true
        }

        fn solve(&self, _dimacs: &str) -> Result<Verdict> {
            match self.0 {
                "unsat" => Ok(Verdict::Unsat),
                "fail" => Err(Error::SolverTransport("scripted failure".into())),
                bits => {
                    let mut model = HashMap::new();
                    for (i, c) in bits.chars().enumerate() {
                        model.insert(i as u32 + 1, c == '1');
                    }
                    Ok(Verdict::Sat(model))
                }
            }
        }
    }

    #[test]
    fn variable_ids_are_dense_from_one() {
        let mut inst = Instance::new();
        let a = inst.allocate_variable();
        let b = inst.allocate_variable();
        assert_eq!(a.var(), 1);
        assert_eq!(b.var(), 2);
        assert!(!a.is_negated());
        assert_eq!(inst.num_vars(), 2);
    }

    #[test]
    fn negation_is_pure() {
        let mut inst = Instance::new();
        let a = inst.allocate_variable();
        let n = a.negate();
        assert_eq!(n.var(), a.var());
        assert!(n.is_negated());
        assert_eq!(n.negate(), a);
        assert_eq!(inst.num_vars(), 1);
    }

    #[test]
    fn dimacs_literal_form() {
        let mut inst = Instance::new();
        let a = inst.allocate_variable();
        assert_eq!(a.to_dimacs(), 1);
        assert_eq!(a.negate().to_dimacs(), -1);
    }

    #[test]
    fn serialize_or_and_xor_lines() {
        let mut inst = Instance::new();
        let a = inst.allocate_variable();
        let b = inst.allocate_variable();
        inst.add_or(&[a, b.negate()]).unwrap();
        inst.add_xor(&[a.negate(), b]).unwrap();
        assert_eq!(inst.serialize(), "p cnf 2 2\n1 -2 0\nx-1 2 0\n");
    }

    #[test]
    fn empty_clause_is_rejected() {
        let mut inst = Instance::new();
        assert!(matches!(inst.add_or(&[]), Err(Error::EmptyClause)));
        assert!(matches!(inst.add_xor(&[]), Err(Error::EmptyClause)));
        assert!(inst.clauses().is_empty());
    }

    #[test]
    fn read_before_solve_fails() {
        let mut inst = Instance::new();
        let a = inst.allocate_variable();
        assert!(matches!(inst.read(a.var()), Err(Error::ModelNotReady)));
    }

    #[test]
    fn solve_stores_model() {
        let mut inst = Instance::with_adapter(Box::new(FixedVerdict("101")));
        let a = inst.allocate_variable();
        let b = inst.allocate_variable();
        let c = inst.allocate_variable();
        inst.add_or(&[a, b, c]).unwrap();
        inst.solve().unwrap();
        assert!(inst.read(a.var()).unwrap());
        assert!(!inst.read(b.var()).unwrap());
        assert!(inst.value_of(b.negate()).unwrap());
    }

    #[test]
    fn unassigned_variables_read_false() {
        let mut inst = Instance::with_adapter(Box::new(FixedVerdict("1")));
        let _a = inst.allocate_variable();
        let dangling = inst.allocate_variable();
        inst.solve().unwrap();
        assert!(!inst.read(dangling.var()).unwrap());
    }

    #[test]
    fn unsat_is_an_error_not_a_model() {
        let mut inst = Instance::with_adapter(Box::new(FixedVerdict("unsat")));
        let a = inst.allocate_variable();
        inst.add_or(&[a]).unwrap();
        assert!(matches!(inst.solve(), Err(Error::Unsatisfiable)));
        assert!(matches!(inst.read(a.var()), Err(Error::ModelNotReady)));
    }

    #[test]
    fn transport_failure_is_distinguished_from_unsat() {
        let mut inst = Instance::with_adapter(Box::new(FixedVerdict("fail")));
        let a = inst.allocate_variable();
        inst.add_or(&[a]).unwrap();
        assert!(matches!(inst.solve(), Err(Error::SolverTransport(_))));
    }
}
