//! 測試共用工具

#![allow(dead_code)]

use market_data_loader::{Decimal, Interval, MemArrayStore, Timestamp};

/// 平面緩衝區標頭標記
pub const MAGIC: u32 = 0xDEAD_BEEF;

/// 測試用的序列描述
pub struct TestSeries {
    pub centre: i64,
    pub name: Vec<u8>,
    pub group: Vec<u8>,
    pub points: Vec<(i64, i64)>,
}

/// 依線上格式組裝平面緩衝區
pub struct FlatBufferBuilder {
    pub magic: u32,
    pub version: [u8; 4],
    pub time_tick: i64,
    pub display_range: i64,
    pub segments: Vec<(i64, i64)>,
    pub series: Vec<TestSeries>,
    pub segment_count_override: Option<u32>,
    pub series_count_override: Option<u32>,
    pub trailing: Vec<u8>,
}

impl FlatBufferBuilder {
    pub fn new(time_tick: Interval, display_range: Interval) -> Self {
        FlatBufferBuilder {
            magic: MAGIC,
            version: [0, 1, 0, 0],
            time_tick: time_tick.total_nanoseconds(),
            display_range: display_range.total_nanoseconds(),
            segments: Vec::new(),
            series: Vec::new(),
            segment_count_override: None,
            series_count_override: None,
            trailing: Vec::new(),
        }
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    pub fn segment(mut self, open: Timestamp, close: Timestamp) -> Self {
        self.segments.push((open.as_nanos(), close.as_nanos()));
        self
    }

    pub fn series(
        mut self,
        name: &str,
        group: &str,
        centre: Option<Decimal>,
        points: &[(Timestamp, Decimal)],
    ) -> Self {
        self.series.push(TestSeries {
            centre: centre.map_or(i64::MIN, Decimal::repr),
            name: name.as_bytes().to_vec(),
            group: group.as_bytes().to_vec(),
            points: points
                .iter()
                .map(|&(time, value)| (time.as_nanos(), value.repr()))
                .collect(),
        });
        self
    }

    pub fn raw_series(mut self, series: TestSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version);
        let num_segments = self
            .segment_count_override
            .unwrap_or(self.segments.len() as u32);
        let num_series = self
            .series_count_override
            .unwrap_or(self.series.len() as u32);
        out.extend_from_slice(&num_segments.to_le_bytes());
        out.extend_from_slice(&num_series.to_le_bytes());
        out.extend_from_slice(&self.time_tick.to_le_bytes());
        out.extend_from_slice(&self.display_range.to_le_bytes());

        for &(open, close) in &self.segments {
            out.extend_from_slice(&open.to_le_bytes());
            out.extend_from_slice(&close.to_le_bytes());
        }

        for series in &self.series {
            out.extend_from_slice(&series.centre.to_le_bytes());
            out.extend_from_slice(&(series.points.len() as u32).to_le_bytes());
            out.extend_from_slice(&(series.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&(series.group.len() as u16).to_le_bytes());
            out.extend_from_slice(&series.name);
            out.push(0);
            if !series.group.is_empty() {
                out.extend_from_slice(&series.group);
                out.push(0);
            }
            while out.len() % 8 != 0 {
                out.push(0);
            }
            for &(time, value) in &series.points {
                out.extend_from_slice(&time.to_le_bytes());
                out.extend_from_slice(&value.to_le_bytes());
            }
        }

        out.extend_from_slice(&self.trailing);
        out
    }
}

/// 2024-01-02 的指定時刻
pub fn jan_2(hours: i64, minutes: i64) -> Timestamp {
    Timestamp::from_ymd(2024, 1, 2) + Interval::hours(hours) + Interval::minutes(minutes)
}

/// 單一時段（2024-01-02 09:30–16:00、刻度一分鐘）、單一折線序列的
/// 標準緩衝區
pub fn standard_buffer() -> Vec<u8> {
    FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series(
            "close",
            "",
            None,
            &[
                (jan_2(9, 30), Decimal::from(100.0)),
                (jan_2(9, 31), Decimal::from(100.5)),
            ],
        )
        .build()
}

/// 階層式儲存測試佈局的毫秒常數
pub const MS_0930: i32 = (9 * 3_600 + 30 * 60) * 1_000;
pub const MS_1600: i32 = 16 * 3_600 * 1_000;

/// 含一個交易時段（2024-01-02 09:30–16:00）與顯示範圍的 Plot 群組
pub fn standard_store() -> (MemArrayStore, usize) {
    let mut store = MemArrayStore::new();
    let plot = store.add_group(MemArrayStore::ROOT, "Plot");
    store.add_dataset(plot, "TradingSegments", vec![202_401_021, MS_0930, MS_1600]);
    store.set_attribute(plot, "DisplayRange", 60_000);
    (store, plot)
}
