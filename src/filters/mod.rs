//! Filter modules for image processing.
//!
//! ## Supported Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255, row-major, no row padding |
//!
//! ## Architecture
//!
//! - **Caller-owned buffers** - the slice entry points never allocate
//! - **Alpha preservation** - alpha is copied, never computed
//! - **No logging** - outcomes are reported through return values only;
//!   the bindings decide what to log

pub mod grayscale;
