pub mod array_store;
pub mod byte_cursor;
pub mod error;
pub mod flat_buffer;
pub mod hier_store;
pub mod loader;
pub mod segment_index;
pub mod shape_transform;

pub use array_store::{ArrayStore, MemArrayStore, NodeGuard, StoreNode};
pub use byte_cursor::ByteCursor;
pub use error::{FormatError, LoadError, LoadResult, SegmentError, SeriesError, StructuralError};
pub use loader::{decode, load_file, DataSource, LoadedSeries, PlotData, SeriesRetriever};
pub use segment_index::SegmentIndex;
pub use shape_transform::expand_points;
