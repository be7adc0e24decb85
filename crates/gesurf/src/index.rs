//! Index buffer reading.
use easyerr::Error;
use zerocopy::{
    FromBytes,
    little_endian::{U16, U32},
};

use crate::vertex::IndexFormat;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("draw is indexed but the vertex type has no index format")]
    MissingFormat,
    #[error("index buffer holds {available} indices but {required} are needed")]
    TooShort { required: usize, available: usize },
}

/// Inclusive range of vertex indices referenced by a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBounds {
    pub lower: u32,
    pub upper: u32,
}

impl IndexBounds {
    /// Bounds of a non-indexed draw of `count` vertices. `count` must not be zero.
    pub fn sequential(count: usize) -> Self {
        Self {
            lower: 0,
            upper: count.saturating_sub(1) as u32,
        }
    }

    /// How many vertices a buffer needs to hold so that every index in bounds is valid.
    #[inline(always)]
    pub fn required_len(&self) -> usize {
        self.upper as usize + 1
    }
}

/// Reads the `i`-th little-endian index of the given format. Returns `None` if the buffer is too
/// short.
#[inline(always)]
pub fn read(indices: &[u8], format: IndexFormat, i: usize) -> Option<u32> {
    let offset = i * format.size();
    let bytes = indices.get(offset..)?;
    match format {
        IndexFormat::None => Some(i as u32),
        IndexFormat::U8 => bytes.first().map(|&x| x as u32),
        IndexFormat::U16 => U16::read_from_prefix(bytes)
            .ok()
            .map(|(x, _)| x.get() as u32),
        IndexFormat::U32 => U32::read_from_prefix(bytes).ok().map(|(x, _)| x.get()),
    }
}

/// Computes the lowest and highest of the first `count` indices in the buffer.
pub fn bounds(
    indices: &[u8],
    format: IndexFormat,
    count: usize,
) -> Result<IndexBounds, IndexError> {
    if format == IndexFormat::None {
        return Err(IndexError::MissingFormat);
    }

    let available = indices.len() / format.size();
    if available < count {
        return Err(IndexError::TooShort {
            required: count,
            available,
        });
    }

    let mut lower = u32::MAX;
    let mut upper = 0;
    for i in 0..count {
        let index = read(indices, format, i).ok_or(IndexError::TooShort {
            required: count,
            available,
        })?;

        lower = lower.min(index);
        upper = upper.max(index);
    }

    Ok(IndexBounds {
        lower: lower.min(upper),
        upper,
    })
}

/// Fills `out` with the first `out.len()` indices of the buffer, or with `0..out.len()` if the
/// draw is not indexed.
pub fn expand(indices: Option<&[u8]>, format: IndexFormat, out: &mut [u32]) -> Result<(), IndexError> {
    let Some(indices) = indices else {
        for (i, value) in out.iter_mut().enumerate() {
            *value = i as u32;
        }

        return Ok(());
    };

    if format == IndexFormat::None {
        return Err(IndexError::MissingFormat);
    }

    let available = indices.len() / format.size();
    for (i, value) in out.iter_mut().enumerate() {
        *value = read(indices, format, i).ok_or(IndexError::TooShort {
            required: i + 1,
            available,
        })?;
    }

    Ok(())
}
