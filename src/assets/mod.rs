//! Asset boundary: reading files, decoding them and encoding exports.

pub mod exporters;
pub mod io;
pub mod loaders;

pub use exporters::{ExportArtifact, ExportFormat, ExportOptions, ExportPayload, ExportSerializer};
pub use io::{
    AssetReader, ClipSource, FileAssetReader, MemoryAssetReader, file_base_name, write_artifact,
};
pub use loaders::AssetLoader;
