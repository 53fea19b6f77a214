pub mod group;
pub mod timeline;


pub use group::*;
pub use timeline::*;
