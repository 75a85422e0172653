pub mod data_point;
pub mod decimal;
pub mod time;

pub use data_point::{PlotPoint, RawPoint, Segment, Shape};
pub use decimal::{Decimal, DecimalParseError};
pub use time::{Interval, Timestamp};
