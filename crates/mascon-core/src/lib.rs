// ─────────────────────────────────────────────────────────────────────
// SCPN Mascon Kernels — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
pub mod design;
pub mod factors;
pub mod index;
pub mod kernel;
pub mod love;
pub mod ocean;
pub mod reassemble;
pub mod solver;
pub mod synthesis;
