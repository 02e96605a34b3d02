//! Controller-side modules: endpoint addressing and command fan-out.

pub mod dispatcher;
pub mod endpoint;
