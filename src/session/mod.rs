pub(crate) mod config;
pub(crate) mod director;
pub(crate) mod prepare;
pub(crate) mod reconcile;
pub(crate) mod store;
pub(crate) mod viewer;
