//! Credential hashing for the journal lock screen.
//!
//! # Module Structure
//!
//! - `pin`: PIN digest, constant-time comparison and format checks
//!
//! # Example
//!
//! ```
//! use daybook::crypto::{hash_pin, verify_pin};
//!
//! let stored = hash_pin("2580");
//! assert!(verify_pin("2580", &stored));
//! assert!(!verify_pin("0852", &stored));
//! ```

pub mod pin;

pub use self::pin::{digests_match, hash_pin, validate_pin_format, verify_pin};
