//! 序列資料點與交易時段型別

use serde::{Deserialize, Serialize};

use crate::domain_types::decimal::Decimal;
use crate::domain_types::time::Timestamp;

/// 一個連續的交易時段（開盤、收盤時間對）
///
/// 開盤必須早於收盤；相鄰時段不可重疊，但允許首尾相接。時段之間的
/// 空檔為非交易時間，不佔用緻密索引空間。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub open: Timestamp,
    pub close: Timestamp,
}

impl Segment {
    pub const fn new(open: Timestamp, close: Timestamp) -> Self {
        Segment { open, close }
    }
}

/// 序列的視覺形狀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum Shape {
    /// 折線：每個樣本即一個頂點
    Curve = 1,
    /// 尖峰：偏離基準值的樣本畫成窄豎線
    Spike = 2,
    /// 階梯：前值延伸到新樣本前一格
    Step = 3,
}

impl Shape {
    /// 線上格式使用的整數代碼
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Shape {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        match code {
            1 => Ok(Shape::Curve),
            2 => Ok(Shape::Spike),
            3 => Ok(Shape::Step),
            other => Err(other),
        }
    }
}

/// 尚未轉換的原始樣本（時間、定點數值）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPoint {
    pub time: Timestamp,
    pub value: Decimal,
}

impl RawPoint {
    pub const fn new(time: Timestamp, value: Decimal) -> Self {
        RawPoint { time, value }
    }
}

/// 轉換完成、可直接繪製的資料點（緻密索引、數值）
///
/// 由載入器在單次載入過程中產生，之後不再變動；繪圖端以複製方式取用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub index: i64,
    pub value: Decimal,
}

impl PlotPoint {
    pub const fn new(index: i64, value: Decimal) -> Self {
        PlotPoint { index, value }
    }
}
