//! # comfy-nodekit
//!
//! Small, stateless utility nodes for generative-image node graphs: dimension
//! scaling on the 8-pixel grid, model-native resolution presets, seed
//! bookkeeping, sampler/scheduler validation, batch image saving and XYZ
//! parameter grids.
//!
//! Every node registers a descriptor (inputs, outputs, category, entry point)
//! in a [`NodeRegistry`] which the host queries and executes through.
//!
//! ## Example
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use comfy_nodekit::{Config, NodeRegistry, Value};
//!
//! # fn main() -> comfy_nodekit::Result<()> {
//! let registry = NodeRegistry::with_builtin_nodes()?;
//!
//! let inputs = HashMap::from([(
//!     "preset".to_string(),
//!     Value::from("1024×1024 — 1:1 — 1.0MP — SDXL"),
//! )]);
//! let outputs = registry.execute("PresetResolution", inputs, &Config::default())?;
//! assert_eq!(outputs[0], Value::Int(1024));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dimensions;
pub mod error;
pub mod grid;
pub mod image;
pub mod node;
pub mod nodes;
pub mod presets;
pub mod sampler;
pub mod seed;

pub use config::Config;
pub use dimensions::Dimensions;
pub use error::{Error, Result};
pub use node::{NodeDescriptor, NodeRegistry, Value};
