pub mod ofx;
pub mod snapshot;
