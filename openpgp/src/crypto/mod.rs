//! Cryptographic value types.
//!
//! This module holds the typed representations of the algorithm
//! dependent material that appears inside key and signature packets:
//! multi precision integers, curve object identifiers, and the
//! per-algorithm component sets built from them.  The actual
//! public-key math is out of scope; consumers hand the material to a
//! crypto provider of their choice.

pub mod mpi;
