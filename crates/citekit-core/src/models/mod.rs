pub mod language;
pub mod metadata;
pub mod reference;
pub mod statistics;
pub mod style;

pub use language::*;
pub use metadata::*;
pub use reference::*;
pub use statistics::*;
pub use style::*;
