//! 載入器門面
//!
//! 依輸入型別選擇對應的解碼器（平面緩衝區 / 階層式儲存），並以
//! [`PlotData`] 暴露解碼結果。載入為單執行緒同步過程：建構時完成
//! 全部解析與驗證，成功後的物件不再變動，可供多個讀取者同時讀取。

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::{info, warn};

use crate::domain_types::{Decimal, Interval, PlotPoint, Segment, Shape, Timestamp};

use super::array_store::ArrayStore;
use super::error::LoadResult;
use super::segment_index::SegmentIndex;
use super::{flat_buffer, hier_store};

/// 載入完成的單一序列
///
/// 名稱與群組在平面緩衝區路徑上直接借用輸入緩衝區；需要脫離緩衝區
/// 生命週期時以 [`LoadedSeries::into_owned`] 取得自有版本。
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSeries<'a> {
    pub name: Cow<'a, str>,
    pub group: Cow<'a, str>,
    pub axis_centre: Option<Decimal>,
    pub shape: Shape,
    pub points: Vec<PlotPoint>,
}

impl LoadedSeries<'_> {
    pub fn into_owned(self) -> LoadedSeries<'static> {
        LoadedSeries {
            name: Cow::Owned(self.name.into_owned()),
            group: Cow::Owned(self.group.into_owned()),
            axis_centre: self.axis_centre,
            shape: self.shape,
            points: self.points,
        }
    }
}

/// 序列列舉回呼
pub trait SeriesRetriever {
    fn on_series(
        &mut self,
        name: &str,
        group: &str,
        axis_centre: Option<Decimal>,
        points: &[PlotPoint],
    );
}

/// 載入來源，由工廠依輸入型別選擇解碼器
pub enum DataSource<'a> {
    /// 平面緩衝區（呼叫端提供可讀位元組緩衝區）
    FlatBuffer(&'a [u8]),
    /// 階層式陣列儲存的把手
    Hierarchical(&'a dyn ArrayStore),
}

/// 解碼完成、不再變動的繪圖資料
#[derive(Debug, Clone)]
pub struct PlotData<'a> {
    display_range: i64,
    index: SegmentIndex,
    series: Vec<LoadedSeries<'a>>,
}

impl<'a> PlotData<'a> {
    pub(crate) fn new(display_range: i64, index: SegmentIndex, series: Vec<LoadedSeries<'a>>) -> Self {
        PlotData {
            display_range,
            index,
            series,
        }
    }

    /// 顯示範圍（索引單位）
    pub fn display_range(&self) -> i64 {
        self.display_range
    }

    /// 時間刻度
    pub fn time_tick(&self) -> Interval {
        self.index.time_tick()
    }

    /// 交易時段列表
    pub fn segments(&self) -> &[Segment] {
        self.index.segments()
    }

    /// 累計索引表
    pub fn ranges(&self) -> &[i64] {
        self.index.ranges()
    }

    /// 時段索引表
    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    /// 由實數索引求時間戳（供座標軸標示使用）
    pub fn time_at(&self, index: f64) -> Timestamp {
        self.index.time_at(index)
    }

    /// 載入完成的序列
    pub fn series(&self) -> &[LoadedSeries<'a>] {
        &self.series
    }

    /// 以回呼逐一列舉序列
    pub fn retrieve_series(&self, retriever: &mut dyn SeriesRetriever) {
        for series in &self.series {
            retriever.on_series(
                &series.name,
                &series.group,
                series.axis_centre,
                &series.points,
            );
        }
    }

    /// 轉為不依賴輸入緩衝區生命週期的自有版本
    pub fn into_owned(self) -> PlotData<'static> {
        PlotData {
            display_range: self.display_range,
            index: self.index,
            series: self.series.into_iter().map(LoadedSeries::into_owned).collect(),
        }
    }
}

/// 解碼載入來源
///
/// 成功時回傳完整有效的 [`PlotData`]（至少一個時段與一個可用序列）；
/// 任何驗證失敗都使整個載入失效並回報第一個失敗的具體原因。
pub fn decode(source: DataSource<'_>) -> LoadResult<PlotData<'_>> {
    let result = match source {
        DataSource::FlatBuffer(buffer) => flat_buffer::decode(buffer),
        DataSource::Hierarchical(store) => hier_store::decode(store),
    };

    match &result {
        Ok(plot) => info!(
            segments = plot.segments().len(),
            series = plot.series().len(),
            display_range = plot.display_range(),
            "market data loaded"
        ),
        Err(error) => warn!(%error, "market data load failed"),
    }
    result
}

/// 以記憶體映射讀取平面緩衝區檔案
///
/// 映射只存活於解碼期間，無論成功或失敗都隨作用域釋放；回傳的資料
/// 為自有版本，不再引用檔案內容。
pub fn load_file<P: AsRef<Path>>(path: P) -> LoadResult<PlotData<'static>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|error| {
        warn!(path = %path.display(), %error, "failed to open input data file");
        error
    })?;
    let map = unsafe { Mmap::map(&file)? };
    let plot = decode(DataSource::FlatBuffer(&map))?;
    Ok(plot.into_owned())
}
