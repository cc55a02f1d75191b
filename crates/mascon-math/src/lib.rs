//! Mathematical primitives for SCPN Mascon Kernels.

pub mod gauss;
pub mod legendre;
pub mod linalg;
