//! 平面緩衝區解碼器
//!
//! 解析單一連續位元組緩衝區（僅限小端序）：固定標頭（標記、版本、
//! 時段數、序列數、時間刻度、顯示範圍），接著時段陣列，再接著變長
//! 序列記錄。序列名稱直接借用輸入緩衝區（零複製），緩衝區必須存活
//! 到解碼結果之後。任何驗證失敗都使整個載入失效，不會產生部分序列。

use std::borrow::Cow;

use tracing::debug;

use crate::domain_types::{Decimal, Interval, RawPoint, Segment, Shape, Timestamp};

use super::byte_cursor::ByteCursor;
use super::error::{FormatError, LoadResult, SeriesError};
use super::loader::{LoadedSeries, PlotData};
use super::segment_index::SegmentIndex;
use super::shape_transform::expand_points;

/// 標頭標記，同時用於偵測位元組序
pub const MAGIC: u32 = 0xDEAD_BEEF;

const HEADER_LEN: usize = 32;
const SEGMENT_LEN: usize = 16;
const SERIES_HEADER_LEN: usize = 16;
const POINT_LEN: usize = 16;
const POINT_ALIGNMENT: usize = 8;

// 線上格式的未設定標記：最小或最大可表示值
fn decode_axis_centre(raw: i64) -> Option<Decimal> {
    if raw == i64::MIN || raw == i64::MAX {
        None
    } else {
        Some(Decimal::from_repr(raw))
    }
}

/// 解碼平面緩衝區
///
/// 驗證順序：緩衝區長度、標頭標記、時段 / 序列數量、時間刻度與顯示
/// 範圍、時段陣列長度、時段內容、各序列標頭與資料點長度，最後不得
/// 有剩餘位元組。
pub fn decode(buffer: &[u8]) -> LoadResult<PlotData<'_>> {
    if buffer.len() <= HEADER_LEN {
        return Err(FormatError::BufferTooSmall {
            needed: HEADER_LEN,
            actual: buffer.len(),
        }
        .into());
    }

    let mut cursor = ByteCursor::new(buffer);

    let magic = cursor.read_u32_le()?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic { magic }.into());
    }
    let version = cursor.read_u8_array::<4>()?;
    let num_segments = cursor.read_u32_le()?;
    let num_series = cursor.read_u32_le()?;
    let time_tick = Interval::nanoseconds(cursor.read_i64_le()?);
    let display_range = Interval::nanoseconds(cursor.read_i64_le()?);

    debug!(
        version = ?version,
        num_segments,
        num_series,
        %time_tick,
        %display_range,
        "decoding flat buffer"
    );

    if num_segments == 0 {
        return Err(FormatError::NoSegments.into());
    }
    if num_series == 0 {
        return Err(FormatError::NoSeries.into());
    }
    if time_tick < Interval::nanoseconds(1) {
        return Err(FormatError::NonPositiveTick { tick: time_tick }.into());
    }
    if display_range < Interval::nanoseconds(1) || display_range % time_tick != Interval::ZERO {
        return Err(FormatError::BadDisplayRange {
            display_range,
            tick: time_tick,
        }
        .into());
    }

    if cursor.remaining() < num_segments as usize * SEGMENT_LEN {
        return Err(FormatError::TruncatedSegments {
            expected: num_segments,
        }
        .into());
    }
    let mut segments = Vec::with_capacity(num_segments as usize);
    for _ in 0..num_segments {
        let open = Timestamp::from_nanos(cursor.read_i64_le()?);
        let close = Timestamp::from_nanos(cursor.read_i64_le()?);
        segments.push(Segment::new(open, close));
    }

    let index = SegmentIndex::build(time_tick, segments)?;

    let mut series = Vec::with_capacity(num_series as usize);
    for ordinal in 0..num_series {
        if cursor.remaining() <= SERIES_HEADER_LEN {
            return Err(FormatError::TruncatedSeriesHeader { index: ordinal }.into());
        }
        let centre_raw = cursor.read_i64_le()?;
        let num_points = cursor.read_u32_le()?;
        let name_len = cursor.read_u16_le()? as usize;
        let group_len = cursor.read_u16_le()? as usize;

        // 名稱與結尾位元組、可選的群組與結尾位元組、對齊補白、
        // 資料點陣列，全部都要放得進剩餘空間
        let mut text_len = name_len + 1;
        if group_len > 0 {
            text_len += group_len + 1;
        }
        let text_end = cursor.position() + text_len;
        let padding = (POINT_ALIGNMENT - text_end % POINT_ALIGNMENT) % POINT_ALIGNMENT;
        let required = text_len + padding + num_points as usize * POINT_LEN;
        if cursor.remaining() < required {
            return Err(FormatError::TruncatedSeriesPoints { index: ordinal }.into());
        }

        let name = std::str::from_utf8(cursor.read_bytes(name_len)?)
            .map_err(|_| FormatError::BadSeriesName { index: ordinal })?;
        cursor.skip(1)?;
        let group = if group_len > 0 {
            let group = std::str::from_utf8(cursor.read_bytes(group_len)?)
                .map_err(|_| FormatError::BadSeriesName { index: ordinal })?;
            cursor.skip(1)?;
            group
        } else {
            ""
        };
        cursor.align_to(POINT_ALIGNMENT)?;

        let mut samples = Vec::with_capacity(num_points as usize);
        for _ in 0..num_points {
            let time = Timestamp::from_nanos(cursor.read_i64_le()?);
            let value = Decimal::from_repr(cursor.read_i64_le()?);
            samples.push(RawPoint::new(time, value));
        }

        // 平面格式不帶形狀代碼，序列一律為折線
        let axis_centre = decode_axis_centre(centre_raw);
        let points = expand_points(&index, name, Shape::Curve, axis_centre, &samples)?;
        if points.is_empty() {
            return Err(SeriesError::EmptySeries {
                series: name.to_string(),
            }
            .into());
        }

        series.push(LoadedSeries {
            name: Cow::Borrowed(name),
            group: Cow::Borrowed(group),
            axis_centre,
            shape: Shape::Curve,
            points,
        });
    }

    if !cursor.is_empty() {
        return Err(FormatError::TrailingBytes {
            count: cursor.remaining(),
        }
        .into());
    }

    Ok(PlotData::new(display_range / time_tick, index, series))
}
