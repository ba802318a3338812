pub mod knowledge;
pub mod proposal;
pub mod session;
