//! 平面緩衝區解碼整合測試

mod common;

use std::borrow::Cow;

use assert_matches::assert_matches;
use common::{jan_2, standard_buffer, FlatBufferBuilder, TestSeries};
use market_data_loader::{
    decode, DataSource, Decimal, FormatError, Interval, LoadError, PlotPoint, SegmentError,
    SeriesError, Shape,
};

fn decode_buffer(buffer: &[u8]) -> Result<market_data_loader::PlotData<'_>, LoadError> {
    decode(DataSource::FlatBuffer(buffer))
}

#[test]
fn test_end_to_end_single_segment_curve() {
    let buffer = standard_buffer();
    let plot = decode_buffer(&buffer).unwrap();

    assert_eq!(plot.ranges(), &[0, 390]);
    assert_eq!(plot.time_tick(), Interval::minutes(1));
    assert_eq!(plot.display_range(), 30);
    assert_eq!(plot.segments().len(), 1);

    let series = &plot.series()[0];
    assert_eq!(series.name, "close");
    assert_eq!(series.group, "");
    assert_eq!(series.shape, Shape::Curve);
    assert_eq!(series.axis_centre, None);
    assert_eq!(
        series.points,
        vec![
            PlotPoint::new(0, Decimal::from(100.0)),
            PlotPoint::new(1, Decimal::from(100.5)),
        ]
    );
}

#[test]
fn test_names_borrow_from_buffer() {
    let buffer = standard_buffer();
    let plot = decode_buffer(&buffer).unwrap();
    assert_matches!(&plot.series()[0].name, Cow::Borrowed(_));

    // 自有版本不再引用緩衝區
    let owned = plot.into_owned();
    drop(buffer);
    assert_eq!(owned.series()[0].name, "close");
}

#[test]
fn test_grouped_series_and_explicit_centre() {
    let centre = Some(Decimal::from(100));
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series(
            "bid",
            "depth",
            centre,
            &[(jan_2(9, 30), Decimal::from(99.5))],
        )
        .build();

    let plot = decode_buffer(&buffer).unwrap();
    let series = &plot.series()[0];
    assert_eq!(series.name, "bid");
    assert_eq!(series.group, "depth");
    assert_eq!(series.axis_centre, centre);
}

#[test]
fn test_unset_centre_sentinels_decode_to_none() {
    for sentinel in [i64::MIN, i64::MAX] {
        let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
            .segment(jan_2(9, 30), jan_2(16, 0))
            .raw_series(TestSeries {
                centre: sentinel,
                name: b"close".to_vec(),
                group: Vec::new(),
                points: vec![(jan_2(9, 30).as_nanos(), Decimal::from(1).repr())],
            })
            .build();
        let plot = decode_buffer(&buffer).unwrap();
        assert_eq!(plot.series()[0].axis_centre, None);
    }
}

#[test]
fn test_missing_magic_is_invalid_not_a_crash() {
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .magic(0xFEED_FACE)
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();

    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::BadMagic {
            magic: 0xFEED_FACE
        }))
    );
}

#[test]
fn test_buffer_shorter_than_header() {
    assert_matches!(
        decode_buffer(&[0u8; 32]),
        Err(LoadError::Format(FormatError::BufferTooSmall { .. }))
    );
    assert_matches!(
        decode_buffer(&[]),
        Err(LoadError::Format(FormatError::BufferTooSmall { .. }))
    );
}

#[test]
fn test_zero_counts_are_rejected() {
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::NoSegments))
    );

    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::NoSeries))
    );
}

#[test]
fn test_non_positive_tick_is_rejected() {
    let buffer = FlatBufferBuilder::new(Interval::ZERO, Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::NonPositiveTick { .. }))
    );
}

#[test]
fn test_display_range_must_be_positive_multiple_of_tick() {
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::seconds(90))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::BadDisplayRange { .. }))
    );

    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(-5))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::BadDisplayRange { .. }))
    );
}

#[test]
fn test_truncated_segment_array() {
    let mut builder = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))]);
    builder.segment_count_override = Some(50);

    assert_matches!(
        decode_buffer(&builder.build()),
        Err(LoadError::Format(FormatError::TruncatedSegments {
            expected: 50
        }))
    );
}

#[test]
fn test_truncated_series_header_and_points() {
    let mut builder = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))]);
    builder.series_count_override = Some(2);
    assert_matches!(
        decode_buffer(&builder.build()),
        Err(LoadError::Format(FormatError::TruncatedSeriesHeader {
            index: 1
        }))
    );

    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .raw_series(TestSeries {
            centre: i64::MIN,
            name: b"close".to_vec(),
            group: Vec::new(),
            points: vec![(jan_2(9, 30).as_nanos(), Decimal::from(1).repr())],
        })
        .build();
    // 砍掉最後八個位元組，宣告的點數放不下
    let truncated = &buffer[..buffer.len() - 8];
    assert_matches!(
        decode_buffer(truncated),
        Err(LoadError::Format(FormatError::TruncatedSeriesPoints {
            index: 0
        }))
    );
}

#[test]
fn test_trailing_bytes_are_rejected() {
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .trailing(&[0xAB, 0xCD])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::TrailingBytes { count: 2 }))
    );
}

#[test]
fn test_non_utf8_name_is_rejected() {
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .raw_series(TestSeries {
            centre: i64::MIN,
            name: vec![0xFF, 0xFE],
            group: Vec::new(),
            points: vec![(jan_2(9, 30).as_nanos(), Decimal::from(1).repr())],
        })
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Format(FormatError::BadSeriesName { index: 0 }))
    );
}

#[test]
fn test_segment_validation_failures_propagate() {
    // 開收盤顛倒
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(16, 0), jan_2(9, 30))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Segment(SegmentError::Inverted { .. }))
    );

    // 時段長度未對齊刻度
    let buffer = FlatBufferBuilder::new(Interval::minutes(7), Interval::minutes(7))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Segment(SegmentError::Misaligned { .. }))
    );
}

#[test]
fn test_series_validation_failures_propagate() {
    // 樣本在交易時段之外
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(8, 0), Decimal::from(1))])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Series(SeriesError::OutsideSegments { .. }))
    );

    // 沒有任何資料點的序列
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[])
        .build();
    assert_matches!(
        decode_buffer(&buffer),
        Err(LoadError::Series(SeriesError::EmptySeries { .. }))
    );
}

#[test]
fn test_multiple_series_share_the_index_table() {
    let buffer = FlatBufferBuilder::new(Interval::minutes(1), Interval::minutes(30))
        .segment(jan_2(9, 30), jan_2(16, 0))
        .series("close", "", None, &[(jan_2(9, 30), Decimal::from(100.0))])
        .series(
            "volume",
            "flow",
            None,
            &[
                (jan_2(9, 30), Decimal::from(1_000)),
                (jan_2(10, 30), Decimal::from(2_000)),
            ],
        )
        .build();

    let plot = decode_buffer(&buffer).unwrap();
    assert_eq!(plot.series().len(), 2);
    assert_eq!(plot.series()[1].points[1].index, 60);
}

#[test]
fn test_load_file_round_trip() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&standard_buffer()).unwrap();
    file.flush().unwrap();

    let plot = market_data_loader::load_file(file.path()).unwrap();
    assert_eq!(plot.ranges(), &[0, 390]);
    assert_eq!(plot.series()[0].name, "close");
}

#[test]
fn test_load_file_reports_io_errors() {
    let missing = std::path::Path::new("/no/such/market/data.bin");
    assert_matches!(
        market_data_loader::load_file(missing),
        Err(LoadError::Io(_))
    );
}
