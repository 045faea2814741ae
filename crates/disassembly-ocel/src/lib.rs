//! Disassembly OCEL -- converts simulator tables to an OCEL 2.0 JSON event log
//! and back.
//!
//! Events and components become OCEL events and objects; workstations become
//! attribute-less objects. Relationships carry fixed qualifiers:
//!
//! | From      | To        | Qualifier            |
//! |-----------|-----------|----------------------|
//! | event     | object    | `Input component`    |
//! | event     | object    | `Output component`   |
//! | event     | station   | `Station`            |
//! | object    | object    | `Parent component`   |
//!
//! [`build_ocel`] validates the document before returning it; dangling
//! references and duplicate ids are errors, never repaired.
//! [`extract_tables`] reverses the conversion.

pub mod builder;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod validate;

pub use builder::build_ocel;
pub use error::OcelError;
pub use extract::{extract_tables, ExtractedTables};
pub use io::{read_ocel, write_ocel};
pub use model::*;
pub use validate::validate;
