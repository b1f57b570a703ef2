//! Node descriptors and the registry the host discovers them through.

mod registry;
mod schema;
mod value;

pub use registry::{EntryPoint, NodeDescriptor, NodeInputs, NodeRegistry};
pub use schema::{InputSpec, OutputSpec};
pub use value::{Scalar, Value, ValueType};
