pub(crate) mod feedback;
pub(crate) mod gate;
pub(crate) mod judge;
