pub mod geometry;
pub mod ident;
pub mod model;
