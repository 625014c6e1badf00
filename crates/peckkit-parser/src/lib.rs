//! # PeckKit Parser
//!
//! Finds drilling cycles in NC programs.
//!
//! - **Scanner**: one pass tracking tool changes and spindle speeds
//! - **Diameter**: tool diameter lookup near a tool change
//! - **Extractor**: `G66 P9131` and `G83` word extraction, triple grouping and
//!   default peck values
//! - **Tokens**: the word patterns shared by the above

pub mod diameter;
pub mod extractor;
pub mod scanner;
pub mod tokens;

pub use diameter::resolve_diameter;
pub use extractor::{
    default_q, depth_based_ijk, extract_fixed, extract_macro, macro_groups, TripleAccumulator,
};
pub use scanner::{ProgramScanner, ScanResult};
