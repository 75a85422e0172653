//! 位元組游標
//!
//! 在唯讀緩衝區上以「基底 + 位移」方式提供帶邊界檢查的小端序讀取，
//! 越界一律回報錯誤而非未定義行為。

use super::error::FormatError;

/// 帶邊界檢查的小端序讀取游標
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        ByteCursor {
            buffer,
            position: 0,
        }
    }

    /// 目前位移
    pub fn position(&self) -> usize {
        self.position
    }

    /// 尚未讀取的位元組數
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < count {
            return Err(FormatError::UnexpectedEnd {
                offset: self.position,
                needed: count,
            });
        }
        let slice = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// 讀取 `count` 位元組並前進
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], FormatError> {
        self.take(count)
    }

    /// 跳過 `count` 位元組
    pub fn skip(&mut self, count: usize) -> Result<(), FormatError> {
        self.take(count).map(|_| ())
    }

    /// 將位移對齊到 `alignment` 的倍數（相對緩衝區起點）
    pub fn align_to(&mut self, alignment: usize) -> Result<(), FormatError> {
        let excess = self.position % alignment;
        if excess != 0 {
            self.skip(alignment - excess)?;
        }
        Ok(())
    }

    pub fn read_u8_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, FormatError> {
        Ok(u16::from_le_bytes(self.read_u8_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.read_u8_array()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64, FormatError> {
        Ok(i64::from_le_bytes(self.read_u8_array()?))
    }
}
