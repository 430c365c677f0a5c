//! Safe SQL builder: identifiers from config or introspection only, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
