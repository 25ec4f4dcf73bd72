pub mod error;
pub mod index;
pub mod output;
pub mod plist;
pub mod walk;

// Re-export commonly used utilities
pub use error::OutputError;
pub use index::{IndexRecord, IndexSink, MemoryIndex, SqliteIndex};
pub use output::DocsetWriter;
pub use walk::collect_files;
