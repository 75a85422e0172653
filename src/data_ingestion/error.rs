//! 載入錯誤定義
//!
//! 所有錯誤都在單次載入過程中同步偵測，不重試；載入器要麼完整有效
//! （至少一個時段、至少一個可用序列），要麼整體無效，呼叫端不會拿到
//! 部分解析結果。

use thiserror::Error;

use crate::domain_types::{Interval, Timestamp};

/// 平面緩衝區格式錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("輸入資料長度不足: 需要超過 {needed} 位元組，實際只有 {actual} 位元組")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("標頭標記不符，僅接受小端序資料: magic={magic:#010x}")]
    BadMagic { magic: u32 },

    #[error("至少需要一個交易時段")]
    NoSegments,

    #[error("至少需要一個時間序列")]
    NoSeries,

    #[error("時間刻度必須為正值: tick={tick}")]
    NonPositiveTick { tick: Interval },

    #[error("顯示範圍必須為時間刻度的正整數倍: display_range={display_range}, tick={tick}")]
    BadDisplayRange {
        display_range: Interval,
        tick: Interval,
    },

    #[error("輸入資料長度不足以容納 {expected} 個交易時段")]
    TruncatedSegments { expected: u32 },

    #[error("第 {index} 個序列的標頭不完整")]
    TruncatedSeriesHeader { index: u32 },

    #[error("第 {index} 個序列的資料點數量不足")]
    TruncatedSeriesPoints { index: u32 },

    #[error("第 {index} 個序列的名稱不是有效的 UTF-8")]
    BadSeriesName { index: u32 },

    #[error("輸入資料結尾有 {count} 位元組的未知資料")]
    TrailingBytes { count: usize },

    #[error("於位移 {offset} 處讀取 {needed} 位元組越界")]
    UnexpectedEnd { offset: usize, needed: usize },
}

/// 交易時段錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("時間刻度必須為正值: tick={tick}")]
    NonPositiveTick { tick: Interval },

    #[error("交易時段列表不可為空")]
    Empty,

    #[error("第 {index} 個時段的開盤時間必須早於收盤時間: open={open}, close={close}")]
    Inverted {
        index: usize,
        open: Timestamp,
        close: Timestamp,
    },

    #[error("第 {index} 個時段的開盤時間必須不早於前一時段的收盤時間: open={open}, prev_close={prev_close}")]
    Overlapping {
        index: usize,
        open: Timestamp,
        prev_close: Timestamp,
    },

    #[error("第 {index} 個時段的長度必須為時間刻度的整數倍: tick={tick}, open={open}, close={close}")]
    Misaligned {
        index: usize,
        tick: Interval,
        open: Timestamp,
        close: Timestamp,
    },
}

/// 時間序列錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("序列 {series} 的樣本時間必須晚於前一樣本: time={time}, prev={prev}")]
    OutOfOrderSample {
        series: String,
        time: Timestamp,
        prev: Timestamp,
    },

    #[error("序列 {series} 的樣本時間晚於最後一個交易時段: time={time}")]
    AfterLastSegment { series: String, time: Timestamp },

    #[error("序列 {series} 的樣本時間不在任何交易時段內: time={time}")]
    OutsideSegments { series: String, time: Timestamp },

    #[error("序列 {series} 的樣本時間未對齊時間刻度: tick={tick}, time={time}")]
    MisalignedSample {
        series: String,
        tick: Interval,
        time: Timestamp,
    },

    #[error("序列 {series} 的形狀代碼無效: shape={shape}")]
    UnknownShape { series: String, shape: i32 },

    #[error("尖峰形狀的序列 {series} 缺少基準值")]
    MissingCentre { series: String },

    #[error("序列 {series} 沒有可繪製的資料點")]
    EmptySeries { series: String },

    #[error("序列 {series} 的交易日無效: day={day}")]
    BadTradingDay { series: String, day: String },

    #[error("序列 {series} 的交易日必須嚴格遞增: day={day}, prev_day={prev_day}")]
    NonMonotonicTradingDay {
        series: String,
        day: i32,
        prev_day: i32,
    },

    #[error("序列 {series} 交易日 {day} 的資料集長度必須為偶數")]
    OddDataset { series: String, day: i32 },
}

/// 階層式儲存結構錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("無法開啟儲存根節點")]
    MissingRoot,

    #[error("找不到基底群組 'Plot'")]
    MissingPlotGroup,

    #[error("找不到群組: {name}")]
    MissingGroup { name: String },

    #[error("找不到序列群組: group={group}, series={series}")]
    MissingSeriesGroup { group: String, series: String },

    #[error("缺少整數屬性: owner={owner}, name={name}")]
    MissingAttribute { owner: String, name: String },

    #[error("找不到資料集: {name}")]
    MissingDataset { name: String },

    #[error("交易時段資料集長度必須為三的倍數: len={len}")]
    BadSegmentsDataset { len: usize },

    #[error("交易時段的交易日無效: date={date}")]
    BadSegmentDate { date: i32 },

    #[error("找不到任何序列群組")]
    NoSeriesGroups,

    #[error("載入後沒有任何可用序列")]
    NoUsableSeries,

    #[error("顯示範圍屬性必須為正值: value={value}")]
    BadStoreDisplayRange { value: i32 },
}

/// 載入錯誤總和型別
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error("檔案讀取錯誤: {0}")]
    Io(#[from] std::io::Error),
}

/// 載入結果別名
pub type LoadResult<T> = Result<T, LoadError>;
