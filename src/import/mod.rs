//! Import pipelines
//!
//! Two ways icons enter a project:
//!
//! - [`import_pack`] turns an icon pack folder into a brand new project where
//!   every icon is finished.
//! - [`import_request`] merges a request archive into an open project, adding
//!   its icons as requested.
//!
//! Both read the same `appfilter.xml` manifest through [`crate::manifest`].

mod pack;
mod request;

pub use pack::import_pack;
pub use request::{import_request, RequestImport};
