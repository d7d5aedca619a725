use serde::Deserialize;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    /// `None` when `limit` is zero or above [`MAX_PAGE_LIMIT`].
    pub fn new(offset: u32, limit: u32) -> Option<Self> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return None;
        }
        Some(Self { offset, limit })
    }
}
