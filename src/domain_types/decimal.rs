//! 定點數值型別
//!
//! 以 10^4 縮放的 64 位元整數表示價格類數值。所有運算都在縮放後的整數上
//! 進行，比較為精確比較，不經過浮點數，保證價格比較結果可重現。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// 小數位數
const PRECISION: u32 = 4;

/// 縮放因子（10^PRECISION）
const FACTOR: i64 = 10_000;

/// 定點數值
///
/// 內部表示為 `數值 × 10,000`，固定四位小數。`MIN` 與 `MAX` 保留給
/// 線上格式作為「未設定」標記，不可作為實際資料值使用；crate 內部
/// 一律以 `Option<Decimal>` 表達缺值。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Decimal(i64);

impl Decimal {
    /// 最小可表示值（線上格式的「未設定」標記之一）
    pub const MIN: Decimal = Decimal(i64::MIN);

    /// 最大可表示值（線上格式的「未設定」標記之一）
    pub const MAX: Decimal = Decimal(i64::MAX);

    /// 零值
    pub const ZERO: Decimal = Decimal(0);

    /// 取得小數位數
    pub const fn precision() -> u32 {
        PRECISION
    }

    /// 取得縮放因子
    pub const fn factor() -> i64 {
        FACTOR
    }

    /// 由縮放後的內部表示建立
    pub const fn from_repr(repr: i64) -> Self {
        Decimal(repr)
    }

    /// 取得縮放後的內部表示
    pub const fn repr(self) -> i64 {
        self.0
    }

    /// 絕對值
    pub const fn abs(self) -> Self {
        Decimal(self.0.wrapping_abs())
    }

    /// 截斷為整數部分
    pub const fn to_i64(self) -> i64 {
        self.0 / FACTOR
    }

    /// 轉換為浮點數（僅供繪圖邊界使用，不參與內部運算）
    pub fn to_f64(self) -> f64 {
        (self.0 / FACTOR) as f64 + (self.0 % FACTOR) as f64 / FACTOR as f64
    }

    // 兩段式乘法：先以整數部分相乘，再補上小數部分的貢獻，
    // 避免直接相乘造成 64 位元溢位。輸入為非負數。
    const fn mul_repr(v1: i64, v2: i64) -> i64 {
        v1 / FACTOR * v2 + v2 / FACTOR * (v1 % FACTOR) + (v1 % FACTOR) * (v2 % FACTOR) / FACTOR
    }

    // 兩段式除法：商的整數部分與餘數部分分開縮放。輸入為非負數。
    const fn div_repr(v1: i64, v2: i64) -> i64 {
        v1 / v2 * FACTOR + v1 % v2 * FACTOR / v2
    }

    fn signed(negative: bool, repr: i64) -> Self {
        Decimal(if negative { -repr } else { repr })
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(value * FACTOR)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Decimal(value as i64 * FACTOR)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal(value as i64 * FACTOR)
    }
}

impl From<f64> for Decimal {
    /// 由浮點數建構，四捨五入採 round-half-away-from-zero
    fn from(value: f64) -> Self {
        let bias = if value < 0.0 { -0.5 } else { 0.5 };
        Decimal((value * FACTOR as f64 + bias) as i64)
    }
}

impl From<f32> for Decimal {
    fn from(value: f32) -> Self {
        Decimal::from(value as f64)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        let negative = (self.0 < 0) != (rhs.0 < 0);
        Decimal::signed(negative, Decimal::mul_repr(self.0.abs(), rhs.0.abs()))
    }
}

impl Div for Decimal {
    type Output = Decimal;

    /// 除以零會 panic，與整數除法一致
    fn div(self, rhs: Decimal) -> Decimal {
        let negative = (self.0 < 0) != (rhs.0 < 0);
        Decimal::signed(negative, Decimal::div_repr(self.0.abs(), rhs.0.abs()))
    }
}

impl Mul<i64> for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: i64) -> Decimal {
        self * Decimal::from(rhs)
    }
}

impl Div<i64> for Decimal {
    type Output = Decimal;

    fn div(self, rhs: i64) -> Decimal {
        self / Decimal::from(rhs)
    }
}

impl AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        *self = *self + rhs;
    }
}

impl SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        *self = *self - rhs;
    }
}

impl MulAssign for Decimal {
    fn mul_assign(&mut self, rhs: Decimal) {
        *self = *self * rhs;
    }
}

impl DivAssign for Decimal {
    fn div_assign(&mut self, rhs: Decimal) {
        *self = *self / rhs;
    }
}

impl fmt::Display for Decimal {
    /// 標準字串形式：整數部分加最多四位小數，小數尾端的零會被修剪，
    /// 小數部分為零時完全省略
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let integral = magnitude / FACTOR as u64;
        let fractional = magnitude % FACTOR as u64;

        if self.0 < 0 {
            f.write_str("-")?;
        }

        if fractional == 0 {
            write!(f, "{}", integral)
        } else {
            let mut digits = format!("{:04}", fractional);
            while digits.ends_with('0') {
                digits.pop();
            }
            write!(f, "{}.{}", integral, digits)
        }
    }
}

/// 定點數解析錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalParseError {
    #[error("空字串無法解析為定點數")]
    Empty,

    #[error("無效字元: {text}")]
    InvalidDigit { text: String },

    #[error("數值超出可表示範圍: {text}")]
    Overflow { text: String },
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    /// 解析標準字串形式，超過四位的小數採 round-half-away-from-zero
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        if body.is_empty() {
            return Err(DecimalParseError::Empty);
        }

        let (int_text, frac_text) = match body.split_once('.') {
            Some((i, fr)) => (i, fr),
            None => (body, ""),
        };

        if int_text.is_empty() && frac_text.is_empty() {
            return Err(DecimalParseError::Empty);
        }

        let invalid = || DecimalParseError::InvalidDigit {
            text: text.to_string(),
        };

        let mut repr: i128 = 0;
        for ch in int_text.chars() {
            let digit = ch.to_digit(10).ok_or_else(invalid)? as i128;
            repr = repr * 10 + digit;
        }
        repr *= FACTOR as i128;

        let mut scale = FACTOR as i128 / 10;
        let mut round_up = false;
        for (pos, ch) in frac_text.chars().enumerate() {
            let digit = ch.to_digit(10).ok_or_else(invalid)? as i128;
            if (pos as u32) < PRECISION {
                repr += digit * scale;
                scale /= 10;
            } else if pos as u32 == PRECISION {
                round_up = digit >= 5;
            }
        }
        if round_up {
            repr += 1;
        }

        if negative {
            repr = -repr;
        }

        if repr < i64::MIN as i128 || repr > i64::MAX as i128 {
            return Err(DecimalParseError::Overflow {
                text: text.to_string(),
            });
        }
        Ok(Decimal(repr as i64))
    }
}
