//! 繪圖端邊界介面
//!
//! 互動圖表元件不在本 crate 範圍內；這裡定義它消費載入結果所需的
//! 最小介面：索引→時間函數與索引表界線、以索引為單位的顯示範圍、
//! 逐序列的可附加（append）/ 可提交（commit）資料匯，以及全部序列
//! 提交後的顯示觸發。[`present`] 依此協定驅動一次完整的呈現流程。

use crate::data_ingestion::PlotData;
use crate::domain_types::{Decimal, Timestamp};

/// 單一序列的資料匯：逐點附加後提交
pub trait SeriesSink {
    /// 附加一個（緻密索引、數值）點
    fn append(&mut self, index: i64, value: f64);

    /// 序列的點全部附加完成
    fn commit(&mut self);
}

/// 圖表視圖
pub trait ChartView {
    type Sink: SeriesSink;

    /// 提供索引→時間函數與累計索引表（供座標軸標示）
    fn add_segments(&mut self, time_of: &dyn Fn(f64) -> Timestamp, ranges: &[i64]);

    /// 設定水平顯示範圍（索引單位）
    fn set_horizontal_range(&mut self, range: i64);

    /// 建立一個序列並回傳其資料匯
    fn create_series(&mut self, name: &str, group: &str, axis_centre: Option<Decimal>)
        -> Self::Sink;

    /// 全部序列提交後顯示
    fn show(&mut self);
}

/// 將載入完成的資料呈現到圖表視圖
pub fn present<V: ChartView>(plot: &PlotData<'_>, view: &mut V) {
    view.add_segments(&plot.index().time_calculator(), plot.ranges());
    view.set_horizontal_range(plot.display_range());

    for series in plot.series() {
        let mut sink = view.create_series(&series.name, &series.group, series.axis_centre);
        for point in &series.points {
            sink.append(point.index, point.value.to_f64());
        }
        sink.commit();
    }

    view.show();
}
