pub mod backend;
pub mod cnf;
pub mod error;
pub mod table;
pub mod word;

pub use backend::{FileSolver, SolverAdapter, StreamSolver, Verdict};
pub use cnf::{Clause, ClauseKind, Instance, Literal};
pub use error::{Error, Result};
pub use table::LookupTable;
pub use word::{ShiftAmount, Word};
