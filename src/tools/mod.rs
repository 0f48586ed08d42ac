//! Tool system - descriptors, the slug registry, and renderer dispatch

mod descriptor;
mod dispatch;
mod registry;

pub use descriptor::{ModelParameters, RequestFormat, TemperatureRange, ToolCategory, ToolDescriptor};
pub use dispatch::{Mount, ToolDispatcher};
pub use registry::{ToolRegistry, builtin_descriptors};
