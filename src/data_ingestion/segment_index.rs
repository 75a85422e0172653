//! 交易時段索引壓縮
//!
//! 將帶空檔的交易時曆（依序排列的開收盤時段）壓縮為自零起算的緻密
//! 整數索引軸。索引表為各時段刻度數的前綴和，長度為時段數加一，是
//! 日曆時間與繪圖索引之間唯一的對應，建表後不再變動。

use tracing::debug;

use crate::domain_types::{Interval, Segment, Timestamp};

use super::error::SegmentError;

/// 時段索引表
///
/// `ranges()[i]` 為第 i 個時段的第一個緻密索引，
/// `ranges()[i + 1] - ranges()[i]` 為該時段的刻度數。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentIndex {
    time_tick: Interval,
    segments: Vec<Segment>,
    ranges: Vec<i64>,
}

impl SegmentIndex {
    /// 驗證時段列表並建立索引表
    ///
    /// 依序檢查：刻度為正、列表非空、各時段收盤晚於開盤、開盤不早於
    /// 前一時段收盤、時段長度為刻度的整數倍；任一檢查失敗即回報具體
    /// 原因並中止。
    pub fn build(time_tick: Interval, segments: Vec<Segment>) -> Result<Self, SegmentError> {
        if time_tick <= Interval::ZERO {
            return Err(SegmentError::NonPositiveTick { tick: time_tick });
        }
        if segments.is_empty() {
            return Err(SegmentError::Empty);
        }

        let mut ranges = Vec::with_capacity(segments.len() + 1);
        ranges.push(0i64);
        for (index, segment) in segments.iter().enumerate() {
            if segment.close <= segment.open {
                return Err(SegmentError::Inverted {
                    index,
                    open: segment.open,
                    close: segment.close,
                });
            }

            if index > 0 && segment.open < segments[index - 1].close {
                return Err(SegmentError::Overlapping {
                    index,
                    open: segment.open,
                    prev_close: segments[index - 1].close,
                });
            }

            let duration = segment.close - segment.open;
            if duration % time_tick != Interval::ZERO {
                return Err(SegmentError::Misaligned {
                    index,
                    tick: time_tick,
                    open: segment.open,
                    close: segment.close,
                });
            }
            ranges.push(ranges[ranges.len() - 1] + duration / time_tick);
        }

        debug!(
            segments = segments.len(),
            total_ticks = ranges[ranges.len() - 1],
            "built segment index table"
        );

        Ok(SegmentIndex {
            time_tick,
            segments,
            ranges,
        })
    }

    /// 時間刻度
    pub fn time_tick(&self) -> Interval {
        self.time_tick
    }

    /// 時段列表
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// 累計索引表（長度為時段數加一，嚴格遞增）
    pub fn ranges(&self) -> &[i64] {
        &self.ranges
    }

    /// 時段數量
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// 全部時段的刻度總數
    pub fn total_ticks(&self) -> i64 {
        self.ranges[self.ranges.len() - 1]
    }

    /// 反向對應：由實數索引求時間戳
    ///
    /// 找出第一個嚴格大於索引的表項並回退一格，時段序數夾制在
    /// `[0, 時段數 - 1]`，再於該時段內線性插值。索引表不足兩項時
    /// 回傳遙遠過去哨兵值。
    pub fn time_at(&self, index: f64) -> Timestamp {
        if self.ranges.len() < 2 {
            return Timestamp::DISTANT_PAST;
        }

        let position = self.ranges.partition_point(|&v| v as f64 <= index);
        let segment = (position as i64 - 1).clamp(0, self.segments.len() as i64 - 1) as usize;

        let offset = index - self.ranges[segment] as f64;
        self.segments[segment].open
            + Interval::nanoseconds((offset * self.time_tick.total_nanoseconds() as f64) as i64)
    }

    /// 供繪圖端使用的索引→時間函數
    pub fn time_calculator(&self) -> impl Fn(f64) -> Timestamp + '_ {
        move |index| self.time_at(index)
    }
}
