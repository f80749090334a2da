//! Bit-blasting compiler for fixed-width integer circuits.
//!
//! Arithmetic and bitwise operations on [`Word`]s are compiled, gate by
//! gate, into CNF clauses collected in an [`Instance`]. Solving delegates to
//! an external SAT engine through a [`SolverAdapter`]; a satisfying
//! assignment decodes back into integer values for every word in the
//! circuit. The intended use is inversion: pin the outputs of a circuit to
//! known constants and read the inputs off the model.
//!
//! ```no_run
//! use bitblast::{Instance, Word};
//!
//! # fn main() -> bitblast::Result<()> {
//! let mut inst = Instance::new();
//! let a = Word::fresh(&mut inst, 4);
//! let b = Word::constant(&mut inst, 4, 3)?;
//! let c = a.add(&mut inst, &b)?;
//! c.must_be(&mut inst, 7)?;
//! inst.solve()?;
//! assert_eq!(a.decode(&inst)?, 4);
//! # Ok(())
//! # }
//! ```

pub mod solver;

pub use solver::{
    Clause, ClauseKind, Error, FileSolver, Instance, Literal, LookupTable, Result, ShiftAmount,
    SolverAdapter, StreamSolver, Verdict, Word,
};
