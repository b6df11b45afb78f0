/*!
## Machine module

The tree-walking runtime for BASIC: values, variable and array memory,
built-in functions, the program store, and the executor.

*/

mod function;
mod io;
mod operation;
mod program;
mod rng;
mod runtime;
mod value;
mod var;

pub use function::Function;
pub use io::{Console, DiskFs, FileSystem, StdConsole};
pub use operation::Operation;
pub use program::{CompiledLine, CompiledProgram, Program, ProgramCounter};
pub use rng::Rng;
pub use runtime::{ForFrame, Runtime};
pub use value::Val;
pub use var::{Arrays, Var};

/// Tolerance for `=`/`<>` on doubles and for FOR-loop continuation.
pub const EPSILON: f64 = 1e-9;
