pub(crate) mod classify;
pub(crate) mod select;
