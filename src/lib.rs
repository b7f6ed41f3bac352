pub mod archive;
pub mod assets;
pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod tools;
pub mod transform;

pub use archive::{pack, unpack, unpack_app};
pub use assets::{parse_image_name, AssetKind, ImageDescriptor};
pub use error::{IpamarkError, Result};
pub use pipeline::{PipelineConfig, RunReport, WorkDir};
pub use transform::{rescale_saturation, stamp_status_dot, TransformOp};
