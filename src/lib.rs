//! Convert HOSE codes (Hierarchically Ordered Spherical Environment
//! codes) into SMILES fragments describing the same neighbourhood.
//!
//! ```
//! use hose_smiles::{central_atom_from_nucleus, convert};
//!
//! let central = central_atom_from_nucleus("C-4");
//! assert_eq!(convert("HHHC", central).as_deref(), Some("CC"));
//! ```

use tracing_subscriber::filter::LevelFilter;

mod element;
pub use element::*;

pub mod parse;

mod tree;
pub use tree::*;

mod smiles;
pub use smiles::*;

mod convert;
pub use convert::*;

pub mod database;

/// Install a global `tracing` subscriber that prints events at `level`
/// and above. Unknown levels fall back to `info`. Calling this more than
/// once keeps the first subscriber.
pub fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .try_init();
}
