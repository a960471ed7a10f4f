// Image source abstraction — where image identifiers are resolved and read from.

pub mod dir_source;
pub mod traits;
