//! market_data_loader
//!
//! 將磁碟上的兩種時間序列表示（平面緩衝區 / 階層式陣列儲存）載入為
//! 已驗證、無空檔、可以緻密索引定址的繪圖資料：精確定點數值、整數
//! 奈秒時間運算、交易時段到連續索引的壓縮，以及逐序列的形狀展開。

// 模組定義
pub mod api;
pub mod data_ingestion;
pub mod domain_types;

pub use data_ingestion::{
    decode, load_file, ArrayStore, DataSource, FormatError, LoadError, LoadResult, LoadedSeries,
    MemArrayStore, NodeGuard, PlotData, SegmentError, SegmentIndex, SeriesError, SeriesRetriever,
    StoreNode, StructuralError,
};
pub use domain_types::{Decimal, Interval, PlotPoint, RawPoint, Segment, Shape, Timestamp};
