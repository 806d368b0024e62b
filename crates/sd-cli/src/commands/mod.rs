//! CLI command implementations

pub(crate) mod apply;
pub(crate) mod common;
pub(crate) mod create;
pub(crate) mod drop;
pub(crate) mod load;
pub(crate) mod migrate;
pub(crate) mod reset;
