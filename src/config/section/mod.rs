//! Configuration section definitions.
//!
//! | Section        | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `[paths]`      | Source and output roots                        |
//! | `[assets.*]`   | Per-kind source glob and destination           |
//! | `[styles]`     | Vendor stylesheets and sass load paths         |
//! | `[vendor]`     | Vendor scripts copied in load order            |
//! | `[compat]`     | Browser list and transpiler presets            |
//! | `[sourcemaps]` | Source map toggles and directories             |
//! | `[serve]`      | Dev server and live reload                     |

mod assets;
mod compat;
mod paths;
mod serve;
mod sourcemap;
mod styles;

pub use assets::{AssetKind, AssetsConfig};
pub use compat::{CompatConfig, Preset};
pub use paths::PathsConfig;
pub use serve::ServeConfig;
pub use sourcemap::{SourcemapEntry, SourcemapsConfig};
pub use styles::{StylesConfig, VendorConfig};
