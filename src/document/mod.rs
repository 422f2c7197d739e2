pub(crate) mod model;
pub(crate) mod output;
pub(crate) mod store;
