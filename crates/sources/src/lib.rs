pub mod cost;
pub mod error;
pub mod oplog;

pub use cost::{CostSource, NoteFileSource, SessionLogSource, SessionsApiSource};
pub use error::{Result, SourceError};
pub use oplog::{parse_line, read_tail};
