pub(crate) mod projection;
pub(crate) mod recording;
pub(crate) mod surface;
