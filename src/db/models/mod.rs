mod db_models;
mod params;
mod responses;

pub use db_models::*;
pub use params::*;
pub use responses::*;
