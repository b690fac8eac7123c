//! Mail route module.
//!
//! Address list parsing, header sanitization, message composition, body
//! templates and mail transports.
//!
//! # Examples
//!
//! ```rust
//! use dmf::mail::{ComposeInput, compose};
//!
//! let input = ComposeInput::new("Forms <forms@example.com>", "sales@example.com", "New lead");
//! let message = compose(&input, "Hello", "", Vec::new()).unwrap();
//! assert_eq!(message.to()[0].address(), "sales@example.com");
//! ```

pub use dmf_mail::*;
