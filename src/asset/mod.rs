//! Delegated asset transformations.
//!
//! Thin wrappers around the third-party crates doing the real work:
//!
//! | Module      | Delegates to                               |
//! |-------------|--------------------------------------------|
//! | `source`    | `glob` (source sets, glob bases)           |
//! | `style`     | `grass` (SCSS), `lightningcss` (prefix/min)|
//! | `script`    | `oxc` (transpile, minify)                  |
//! | `lower`     | ES2015 rewrites on the oxc AST             |
//! | `sourcemap` | map file placement + annotations           |
//!
//! Functions here are pure transformations or plain file writes; ordering,
//! error policy and logging live in `crate::task`.

mod error;
mod lower;
pub mod script;
pub mod source;
pub mod sourcemap;
pub mod style;

pub use error::AssetError;
pub use source::{SourceFile, SourceSet, glob_base};
