//! Transport, ghost exchange and the relaxation stencil.

pub mod communicator;
pub mod halo;
pub mod stencil;
pub mod wire;

pub use halo::exchange_halo;
pub use stencil::sweep;
