//! 時間戳與時間間隔型別
//!
//! `Interval` 為帶號 64 位元奈秒計數的時間長度；`Timestamp` 為自 POSIX
//! 紀元起算的帶號奈秒計數。日曆分解完全以整數運算完成（世紀 / 四年
//! 週期 / 年 / 月逐層劃分），不依賴外部日曆庫，對 1701–2200 年之外的
//! 日期一律塌縮為「遙遠過去」哨兵值。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign};

const NANOS_PER_SEC: i64 = 1_000_000_000;
const SECS_PER_DAY: i64 = 86_400;
const NANOS_PER_DAY: i64 = SECS_PER_DAY * NANOS_PER_SEC;

/// 時間間隔（帶號奈秒）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Interval(i64);

impl Interval {
    /// 零長度間隔
    pub const ZERO: Interval = Interval(0);

    pub const fn nanoseconds(value: i64) -> Self {
        Interval(value)
    }

    pub const fn microseconds(value: i64) -> Self {
        Interval(value * 1_000)
    }

    pub const fn milliseconds(value: i64) -> Self {
        Interval(value * 1_000_000)
    }

    pub const fn seconds(value: i64) -> Self {
        Interval(value * NANOS_PER_SEC)
    }

    pub const fn minutes(value: i64) -> Self {
        Interval(value * 60 * NANOS_PER_SEC)
    }

    pub const fn hours(value: i64) -> Self {
        Interval(value * 3_600 * NANOS_PER_SEC)
    }

    pub const fn days(value: i64) -> Self {
        Interval(value * NANOS_PER_DAY)
    }

    pub const fn weeks(value: i64) -> Self {
        Interval(value * 7 * NANOS_PER_DAY)
    }

    /// 完整秒數（截斷）
    pub const fn total_seconds(self) -> i64 {
        self.0 / NANOS_PER_SEC
    }

    pub const fn total_milliseconds(self) -> i64 {
        self.0 / 1_000_000
    }

    pub const fn total_microseconds(self) -> i64 {
        self.0 / 1_000
    }

    pub const fn total_nanoseconds(self) -> i64 {
        self.0
    }

    /// 不足一秒的毫秒部分
    pub const fn fractional_milliseconds(self) -> i64 {
        self.0 / 1_000_000 % 1_000
    }

    /// 不足一秒的微秒部分
    pub const fn fractional_microseconds(self) -> i64 {
        self.0 / 1_000 % 1_000_000
    }

    /// 不足一秒的奈秒部分
    pub const fn fractional_nanoseconds(self) -> i64 {
        self.0 % NANOS_PER_SEC
    }
}

impl Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        Interval(-self.0)
    }
}

impl Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        Interval(self.0 + rhs.0)
    }
}

impl Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        Interval(self.0 - rhs.0)
    }
}

impl Mul<i64> for Interval {
    type Output = Interval;

    fn mul(self, rhs: i64) -> Interval {
        Interval(self.0 * rhs)
    }
}

impl Mul<Interval> for i64 {
    type Output = Interval;

    fn mul(self, rhs: Interval) -> Interval {
        rhs * self
    }
}

impl Div<i64> for Interval {
    type Output = Interval;

    fn div(self, rhs: i64) -> Interval {
        Interval(self.0 / rhs)
    }
}

impl Div for Interval {
    type Output = i64;

    /// 間隔除以間隔得到整數刻度數
    fn div(self, rhs: Interval) -> i64 {
        self.0 / rhs.0
    }
}

impl Rem for Interval {
    type Output = Interval;

    fn rem(self, rhs: Interval) -> Interval {
        Interval(self.0 % rhs.0)
    }
}

impl AddAssign for Interval {
    fn add_assign(&mut self, rhs: Interval) {
        *self = *self + rhs;
    }
}

impl SubAssign for Interval {
    fn sub_assign(&mut self, rhs: Interval) {
        *self = *self - rhs;
    }
}

impl MulAssign<i64> for Interval {
    fn mul_assign(&mut self, rhs: i64) {
        *self = *self * rhs;
    }
}

impl DivAssign<i64> for Interval {
    fn div_assign(&mut self, rhs: i64) {
        *self = *self / rhs;
    }
}

impl RemAssign for Interval {
    fn rem_assign(&mut self, rhs: Interval) {
        *self = *self % rhs;
    }
}

impl fmt::Display for Interval {
    /// 緊湊格式，例如 `1d2h3m4s5ms6us7ns`，為零的分量省略
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0s");
        }

        let mut out = String::new();

        let days = self.0 / NANOS_PER_SEC / SECS_PER_DAY;
        if days != 0 {
            write!(out, "{}d", days)?;
        }

        let secs_in_day = self.0 / NANOS_PER_SEC % SECS_PER_DAY;
        if secs_in_day != 0 {
            let hours = secs_in_day / 3_600;
            if hours != 0 {
                write!(out, "{}h", hours)?;
            }
            let minutes = secs_in_day % 3_600 / 60;
            if minutes != 0 {
                write!(out, "{}m", minutes)?;
            }
            let seconds = secs_in_day % 60;
            if seconds != 0 {
                write!(out, "{}s", seconds)?;
            }
        }

        let nanos_in_sec = self.0 % NANOS_PER_SEC;
        if nanos_in_sec != 0 {
            let millis = nanos_in_sec / 1_000_000;
            if millis != 0 {
                write!(out, "{}ms", millis)?;
            }
            let micros = nanos_in_sec / 1_000 % 1_000;
            if micros != 0 {
                write!(out, "{}us", micros)?;
            }
            let nanos = nanos_in_sec % 1_000;
            if nanos != 0 {
                write!(out, "{}ns", nanos)?;
            }
        }

        f.write_str(&out)
    }
}

/// 時間戳（自 POSIX 紀元起算的帶號奈秒）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

// 非閏年中每月之前累計的天數，索引為月份（0 不使用）
const DAYS_BEFORE_MONTH: [i64; 13] = [0, 0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

// 每月天數上限，二月以 29 計，閏年另行檢查
const DAYS_IN_MONTH: [i32; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

const fn is_valid_day(year: i32, month: i32, day: i32) -> bool {
    1700 < year
        && year < 2201
        && 0 < month
        && month < 13
        && 0 < day
        && day <= DAYS_IN_MONTH[month as usize]
        && (month != 2 || day < 29 || is_leap_year(year))
}

// 自紀元（1970-01-01）起算的天數
const fn days_from_epoch(year: i32, month: i32, day: i32) -> i64 {
    let years = (year - 1701) as i64;
    let in_previous_years = years * 365 + years / 4 - years / 100 + (299 < years) as i64 - 98_250;
    let in_year = DAYS_BEFORE_MONTH[month as usize]
        + (is_leap_year(year) && 2 < month) as i64
        + day as i64
        - 1;
    in_previous_years + in_year
}

impl Timestamp {
    /// 遙遠過去：無效日期的哨兵值
    pub const DISTANT_PAST: Timestamp = Timestamp(i64::MIN);

    /// 遙遠未來
    pub const DISTANT_FUTURE: Timestamp = Timestamp(i64::MAX);

    /// POSIX 紀元（1970-01-01 00:00:00）
    pub const EPOCH: Timestamp = Timestamp(0);

    /// 由原始奈秒計數建立
    pub const fn from_nanos(nanos: i64) -> Self {
        Timestamp(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// 由日曆日期建立午夜時間戳；超出 1701–2200 年或月日組合無效時
    /// 回傳 [`Timestamp::DISTANT_PAST`]
    pub const fn from_ymd(year: i32, month: i32, day: i32) -> Self {
        if is_valid_day(year, month, day) {
            Timestamp(days_from_epoch(year, month, day) * NANOS_PER_DAY)
        } else {
            Timestamp::DISTANT_PAST
        }
    }

    /// 是否為有效（非哨兵）時間戳
    pub const fn is_valid(self) -> bool {
        self.0 != i64::MIN && self.0 != i64::MAX
    }

    /// 當日零時起算的時刻
    pub const fn clock_time(self) -> Interval {
        Interval::nanoseconds(self.0 % NANOS_PER_DAY)
    }

    /// 當日零時
    pub const fn date(self) -> Timestamp {
        Timestamp(self.0 - self.0 % NANOS_PER_DAY)
    }

    /// 日曆分解，回傳（年、月、日）
    ///
    /// 以整數運算將紀元天數劃分為世紀、四年週期與年內天數。調整後的
    /// 計數將 2000-02-29 自日曆中剔除並單獨特判，使「可被 4 整除且不可
    /// 被 100 整除」的簡化閏年規則在 1701–2200 區間內一致成立。哨兵值
    /// 分解不會 panic，但結果無日曆意義。
    pub fn ymd(self) -> (i32, i32, i32) {
        const DAYS_PASSED: [i64; 13] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365];

        let num_days = (self - Timestamp::EPOCH) / Interval::days(1);
        if num_days == 11_016 {
            return (2000, 2, 29);
        }

        // 自 1701-01-01 起，已剔除 2000-02-29
        let days = num_days + 98_249 + (num_days < 11_016) as i64;
        let centuries = days / 36_524;
        let day_in_century = days % 36_524;
        let day_in_cycle = day_in_century % 1_461;
        let year_in_century =
            day_in_century / 1_461 * 4 + day_in_cycle / 365 - (day_in_cycle == 1_460) as i64;
        let year = 1_701 + centuries as i32 * 100 + year_in_century as i32;
        let leap = year % 4 == 0 && year % 100 != 0;

        if day_in_cycle == 1_460 {
            return (year, 12, 31);
        }

        let mut day_in_year = day_in_cycle % 365;
        if day_in_year == 59 {
            return if leap { (year, 2, 29) } else { (year, 3, 1) };
        }
        if 59 < day_in_year && leap {
            day_in_year -= 1;
        }

        let mut month = 1usize;
        while month < 13 && DAYS_PASSED[month] <= day_in_year {
            month += 1;
        }
        (
            year,
            month as i32,
            (day_in_year - DAYS_PASSED[month - 1] + 1) as i32,
        )
    }

    /// 僅時刻的字串形式 `HH:MM:SS.NNNNNNNNN`
    pub fn format_clock(self) -> String {
        let clock = self.0 % NANOS_PER_DAY;
        let seconds = clock / NANOS_PER_SEC;
        format!(
            "{:02}:{:02}:{:02}.{:09}",
            seconds / 3_600,
            seconds % 3_600 / 60,
            seconds % 60,
            clock % NANOS_PER_SEC
        )
    }
}

impl Add<Interval> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Interval) -> Timestamp {
        Timestamp(self.0 + rhs.total_nanoseconds())
    }
}

impl Add<Timestamp> for Interval {
    type Output = Timestamp;

    fn add(self, rhs: Timestamp) -> Timestamp {
        rhs + self
    }
}

impl Sub<Interval> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Interval) -> Timestamp {
        Timestamp(self.0 - rhs.total_nanoseconds())
    }
}

impl Sub for Timestamp {
    type Output = Interval;

    fn sub(self, rhs: Timestamp) -> Interval {
        Interval::nanoseconds(self.0 - rhs.0)
    }
}

impl AddAssign<Interval> for Timestamp {
    fn add_assign(&mut self, rhs: Interval) {
        *self = *self + rhs;
    }
}

impl SubAssign<Interval> for Timestamp {
    fn sub_assign(&mut self, rhs: Interval) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Timestamp {
    /// `YYYY-MM-DD HH:MM:SS.NNNNNNNNN`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (year, month, day) = self.ymd();
        write!(
            f,
            "{:04}-{:02}-{:02} {}",
            year,
            month,
            day,
            self.format_clock()
        )
    }
}
