mod csv;
mod shp;

pub use csv::write_table;
pub use shp::{read_layer, write_layer};
