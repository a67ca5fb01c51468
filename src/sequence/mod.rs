pub mod artifact;
pub mod catalog;
pub mod conversion;
pub mod definition;

pub use artifact::*;
pub use catalog::*;
pub use conversion::*;
pub use definition::*;
