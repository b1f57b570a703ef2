//! The tool nodes shipped with this crate.

mod dimensions;
mod grid;
mod preset;
mod sampler;
mod save;
mod seed;

use crate::node::NodeDescriptor;

pub const CATEGORY_DIMENSIONS: &str = "nodekit/dimensions";
pub const CATEGORY_SAMPLING: &str = "nodekit/sampling";
pub const CATEGORY_IMAGE: &str = "nodekit/image";
pub const CATEGORY_UTILS: &str = "nodekit/utils";

/// Descriptors of every built-in node.
#[must_use]
pub fn builtin_nodes() -> Vec<NodeDescriptor> {
    vec![
        dimensions::image_dimensions(),
        dimensions::scale_dimensions(),
        preset::preset_resolution(),
        seed::seed_generator(),
        sampler::sampler_scheduler_combo(),
        save::save_image_batch(),
        grid::xyz_grid_info(),
    ]
}
