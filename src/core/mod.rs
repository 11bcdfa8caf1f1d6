pub mod discover;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod io;
pub mod model;
