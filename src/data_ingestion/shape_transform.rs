//! 資料點形狀展開
//!
//! 將單一序列已驗證、時間遞增的原始樣本展開為可直接繪製的
//! （緻密索引、數值）點列。每個樣本先定位所屬交易時段並檢查刻度
//! 對齊，再依宣告的形狀（折線 / 尖峰 / 階梯）產生輸出點。展開為
//! 純函數：相同輸入必得相同輸出，階梯形狀的「前值」是唯一的走訪
//! 狀態。

use crate::domain_types::{Decimal, PlotPoint, RawPoint, Shape};

use super::error::SeriesError;
use super::segment_index::SegmentIndex;

/// 逐樣本驗證並定位：樣本時間必須嚴格遞增、落在某個交易時段內、
/// 且自該時段開盤起算對齊時間刻度。每個合法樣本以
/// （時段序數、時段內刻度位移、數值）回呼。
fn locate_samples(
    index: &SegmentIndex,
    series: &str,
    samples: &[RawPoint],
    mut actor: impl FnMut(usize, i64, Decimal),
) -> Result<(), SeriesError> {
    let segments = index.segments();
    let tick = index.time_tick();

    let mut segment = 0usize;
    for (i, sample) in samples.iter().enumerate() {
        if i > 0 && sample.time <= samples[i - 1].time {
            return Err(SeriesError::OutOfOrderSample {
                series: series.to_string(),
                time: sample.time,
                prev: samples[i - 1].time,
            });
        }

        while segments[segment].close < sample.time {
            segment += 1;
            if segment >= segments.len() {
                return Err(SeriesError::AfterLastSegment {
                    series: series.to_string(),
                    time: sample.time,
                });
            }
        }

        if sample.time < segments[segment].open {
            return Err(SeriesError::OutsideSegments {
                series: series.to_string(),
                time: sample.time,
            });
        }

        let from_open = sample.time - segments[segment].open;
        if from_open % tick != crate::domain_types::Interval::ZERO {
            return Err(SeriesError::MisalignedSample {
                series: series.to_string(),
                tick,
                time: sample.time,
            });
        }

        actor(segment, from_open / tick, sample.value);
    }
    Ok(())
}

/// 依形狀將原始樣本展開為繪圖點列
pub fn expand_points(
    index: &SegmentIndex,
    series: &str,
    shape: Shape,
    centre: Option<Decimal>,
    samples: &[RawPoint],
) -> Result<Vec<PlotPoint>, SeriesError> {
    let ranges = index.ranges();

    match shape {
        Shape::Curve => {
            let mut points = Vec::with_capacity(samples.len());
            locate_samples(index, series, samples, |segment, offset, value| {
                points.push(PlotPoint::new(ranges[segment] + offset, value));
            })?;
            Ok(points)
        }

        Shape::Spike => {
            let centre = centre.ok_or_else(|| SeriesError::MissingCentre {
                series: series.to_string(),
            })?;

            let mut points = Vec::with_capacity(samples.len() * 3);
            locate_samples(index, series, samples, |segment, offset, value| {
                // 與基準值相同的樣本不產生輸出；放不進時段邊界內的
                // 尖峰直接略去，不跨越時段
                if value == centre
                    || offset < 0
                    || ranges.len() < segment + 2
                    || ranges[segment + 1] < ranges[segment] + offset
                {
                    return;
                }

                let offset = offset
                    - (offset != 0) as i64
                    - (ranges[segment] + offset == ranges[segment + 1]) as i64;
                points.push(PlotPoint::new(ranges[segment] + offset, centre));
                points.push(PlotPoint::new(ranges[segment] + offset + 1, value));
                points.push(PlotPoint::new(ranges[segment] + offset + 2, centre));
            })?;
            Ok(points)
        }

        Shape::Step => {
            if samples.is_empty() {
                return Ok(Vec::new());
            }

            let mut previous = samples[0].value;
            let mut points = Vec::with_capacity(samples.len() * 2);
            locate_samples(index, series, samples, |segment, offset, value| {
                let offset = offset - (offset != 0) as i64;
                points.push(PlotPoint::new(ranges[segment] + offset, previous));
                points.push(PlotPoint::new(ranges[segment] + offset + 1, value));
                previous = value;
            })?;
            Ok(points)
        }
    }
}
