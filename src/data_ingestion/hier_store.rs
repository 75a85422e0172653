//! 階層式儲存解碼器
//!
//! 讀取結構為「根 → 'Plot' 群組 → 'TradingSegments' 資料集 + 每個
//! 序列群組一個子群組 → 每個序列一個子群組 → 每個交易日一個資料集」
//! 的陣列儲存。時間刻度固定為一毫秒；交易日資料集必須依日期嚴格
//! 遞增。任何結構異常都中止整個載入並回報具體原因；所有儲存節點
//! 由守衛在每條離開路徑上確定性釋放。

use std::borrow::Cow;

use tracing::debug;

use crate::domain_types::{Decimal, Interval, RawPoint, Segment, Shape, Timestamp};

use super::array_store::{ArrayStore, NodeGuard};
use super::error::{LoadResult, SeriesError, StructuralError};
use super::loader::{LoadedSeries, PlotData};
use super::segment_index::SegmentIndex;
use super::shape_transform::expand_points;

const PLOT_GROUP: &str = "Plot";
const SEGMENTS_DATASET: &str = "TradingSegments";
const CENTRE_ATTRIBUTE: &str = "Centre";
const SHAPE_ATTRIBUTE: &str = "Shape";
const DISPLAY_RANGE_ATTRIBUTE: &str = "DisplayRange";

/// 未設定基準值的屬性標記
const CENTRE_UNSET: i32 = i32::MAX;

/// 「自動計算為觀測值中點」的屬性標記
const CENTRE_AUTO: i32 = i32::MAX - 1;

fn date_midnight(yyyymmdd: i32) -> Timestamp {
    Timestamp::from_ymd(yyyymmdd / 10_000, yyyymmdd / 100 % 100, yyyymmdd % 100)
}

// 交易時段三元組的日期欄位為 YYYYMMDD×10+場次
fn read_segments(plot: &NodeGuard<'_>) -> LoadResult<Vec<Segment>> {
    let raw = plot
        .read_dataset(SEGMENTS_DATASET)
        .ok_or(StructuralError::MissingDataset {
            name: SEGMENTS_DATASET.to_string(),
        })?;

    if raw.len() % 3 != 0 {
        return Err(StructuralError::BadSegmentsDataset { len: raw.len() }.into());
    }

    let mut segments = Vec::with_capacity(raw.len() / 3);
    for triple in raw.chunks_exact(3) {
        let date = date_midnight(triple[0] / 10);
        if date == Timestamp::DISTANT_PAST {
            return Err(StructuralError::BadSegmentDate { date: triple[0] }.into());
        }
        segments.push(Segment::new(
            date + Interval::milliseconds(triple[1] as i64),
            date + Interval::milliseconds(triple[2] as i64),
        ));
    }
    Ok(segments)
}

// 交易日資料集名稱：8 位數字日期，限 19700101..=22000101，且須為
// 有效日曆日
fn parse_trading_day(name: &str) -> Option<i32> {
    if name.len() != 8 || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date: i32 = name.parse().ok()?;
    if !(19_700_101..=22_000_101).contains(&date) {
        return None;
    }
    if date_midnight(date) == Timestamp::DISTANT_PAST {
        return None;
    }
    Some(date)
}

// 基準值屬性：未設定 / 自動計算為觀測值最小最大的中點 / 明確的
// 縮放表示
fn resolve_centre(attribute: i32, samples: &[RawPoint]) -> Option<Decimal> {
    if attribute == CENTRE_UNSET {
        return None;
    }
    if attribute == CENTRE_AUTO {
        let first = samples.first()?;
        let (min, max) = samples.iter().fold((first.value, first.value), |(lo, hi), s| {
            (lo.min(s.value), hi.max(s.value))
        });
        return Some((min + max) / 2);
    }
    Some(Decimal::from_repr(attribute as i64))
}

fn read_series(
    index: &SegmentIndex,
    group_name: &str,
    series_name: &str,
    node: &NodeGuard<'_>,
) -> LoadResult<LoadedSeries<'static>> {
    let centre_attribute =
        node.attribute(CENTRE_ATTRIBUTE)
            .ok_or_else(|| StructuralError::MissingAttribute {
                owner: series_name.to_string(),
                name: CENTRE_ATTRIBUTE.to_string(),
            })?;
    let shape_attribute =
        node.attribute(SHAPE_ATTRIBUTE)
            .ok_or_else(|| StructuralError::MissingAttribute {
                owner: series_name.to_string(),
                name: SHAPE_ATTRIBUTE.to_string(),
            })?;
    let shape = Shape::try_from(shape_attribute).map_err(|code| SeriesError::UnknownShape {
        series: series_name.to_string(),
        shape: code,
    })?;

    // 序列群組與上層群組同名時視為未分組
    let (name, group) = if series_name == group_name {
        (group_name.to_string(), String::new())
    } else {
        (series_name.to_string(), group_name.to_string())
    };

    let mut samples = Vec::new();
    let mut previous_date = -1i32;
    for day_name in node.child_names() {
        let date = parse_trading_day(&day_name).ok_or_else(|| SeriesError::BadTradingDay {
            series: series_name.to_string(),
            day: day_name.clone(),
        })?;

        if date <= previous_date {
            return Err(SeriesError::NonMonotonicTradingDay {
                series: series_name.to_string(),
                day: date,
                prev_day: previous_date,
            }
            .into());
        }
        previous_date = date;

        let data = node
            .read_dataset(&day_name)
            .ok_or_else(|| StructuralError::MissingDataset {
                name: day_name.clone(),
            })?;

        if data.len() % 2 != 0 {
            return Err(SeriesError::OddDataset {
                series: series_name.to_string(),
                day: date,
            }
            .into());
        }

        let day_base = date_midnight(date);
        for pair in data.chunks_exact(2) {
            samples.push(RawPoint::new(
                day_base + Interval::milliseconds(pair[0] as i64),
                Decimal::from_repr(pair[1] as i64),
            ));
        }
    }

    if samples.is_empty() {
        return Err(SeriesError::EmptySeries {
            series: series_name.to_string(),
        }
        .into());
    }

    let axis_centre = resolve_centre(centre_attribute, &samples);
    let points = expand_points(index, series_name, shape, axis_centre, &samples)?;
    if points.is_empty() {
        return Err(SeriesError::EmptySeries {
            series: series_name.to_string(),
        }
        .into());
    }

    Ok(LoadedSeries {
        name: Cow::Owned(name),
        group: Cow::Owned(group),
        axis_centre,
        shape,
        points,
    })
}

/// 解碼階層式儲存
pub fn decode(store: &dyn ArrayStore) -> LoadResult<PlotData<'static>> {
    let root = NodeGuard::root(store).ok_or(StructuralError::MissingRoot)?;
    let plot = root
        .child(PLOT_GROUP)
        .ok_or(StructuralError::MissingPlotGroup)?;

    let segments = read_segments(&plot)?;
    let index = SegmentIndex::build(Interval::milliseconds(1), segments)?;

    let group_names = plot.child_names();
    if group_names.is_empty() {
        return Err(StructuralError::NoSeriesGroups.into());
    }

    let mut series = Vec::new();
    for group_name in &group_names {
        if group_name == SEGMENTS_DATASET {
            continue;
        }

        let group = plot
            .child(group_name)
            .ok_or_else(|| StructuralError::MissingGroup {
                name: group_name.clone(),
            })?;

        for series_name in group.child_names() {
            let series_group =
                group
                    .child(&series_name)
                    .ok_or_else(|| StructuralError::MissingSeriesGroup {
                        group: group_name.clone(),
                        series: series_name.clone(),
                    })?;

            debug!(group = %group_name, series = %series_name, "decoding store series");
            series.push(read_series(&index, group_name, &series_name, &series_group)?);
        }
    }

    if series.is_empty() {
        return Err(StructuralError::NoUsableSeries.into());
    }

    let display_range =
        plot.attribute(DISPLAY_RANGE_ATTRIBUTE)
            .ok_or_else(|| StructuralError::MissingAttribute {
                owner: PLOT_GROUP.to_string(),
                name: DISPLAY_RANGE_ATTRIBUTE.to_string(),
            })?;
    if display_range < 1 {
        return Err(StructuralError::BadStoreDisplayRange {
            value: display_range,
        }
        .into());
    }

    Ok(PlotData::new(display_range as i64, index, series))
}
