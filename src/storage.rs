/// The file-backed request directory.
pub mod directory;
mod record;
mod source;

pub use directory::{AddRequestError, DecideError, Directory, DirectoryLoadError, InitError};
pub use record::{LoadError, RequestRecord};
pub use source::{RequestSource, SourceError};
