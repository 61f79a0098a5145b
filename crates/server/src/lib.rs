pub mod routes;
pub mod render;
pub mod startup;
pub mod errors;

pub use startup::run;
