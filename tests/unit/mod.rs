//! Unit test suite for lambda-local
//!
//! Exercises the library API (template model, intrinsic resolution and the
//! function builder) through its public surface, without the binary.
//!
//! ```bash
//! cargo test --test unit
//! ```

mod extraction;
mod intrinsics;
