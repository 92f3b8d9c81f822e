mod fs;
mod polygon;
mod table;

pub(crate) use fs::*;
pub(crate) use polygon::*;
pub(crate) use table::*;
