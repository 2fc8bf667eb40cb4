pub mod font;
pub mod resource;

pub use font::{FontDescriptor, FontMetrics, InMemoryFontMetrics, KerningPair};
pub use resource::{
    FilesystemResourceProvider, InMemoryResourceProvider, ResourceError, ResourceProvider,
    SharedResourceData,
};
