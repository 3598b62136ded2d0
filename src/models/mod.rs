//! Hub resource types.

mod bom;
mod codelocation;
mod component;
mod policy;
mod project;
mod report;
mod role;
mod user;
mod version;

pub use bom::*;
pub use codelocation::*;
pub use component::*;
pub use policy::*;
pub use project::*;
pub use report::*;
pub use role::*;
pub use user::*;
pub use version::*;
