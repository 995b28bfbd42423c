pub mod builder;
pub mod directory;
pub mod header;

pub use builder::{CfbBuilder, ROOT_DID};
