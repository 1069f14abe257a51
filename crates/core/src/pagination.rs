use crate::SearchError;

pub const DEFAULT_LIMIT: i64 = 50;
pub const DEFAULT_OFFSET: i64 = 0;

/// A validated `from`/`size` window that never reaches past `max_window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: usize,
    pub offset: usize,
    pub max_window: usize,
}

impl PageWindow {
    /// Checks the requested window and shrinks `limit` when `offset + limit` would
    /// overrun `max_window`.
    pub fn validate(limit: i64, offset: i64, max_window: usize) -> Result<Self, SearchError> {
        if offset < 0 {
            return Err(SearchError::NegativeOffset);
        }
        if limit < 0 {
            return Err(SearchError::NegativeLimit);
        }

        let offset =
            usize::try_from(offset).map_err(|_| SearchError::MaximumOffsetReached(max_window))?;
        let limit =
            usize::try_from(limit).map_err(|_| SearchError::MaximumLimitReached(max_window))?;

        if offset >= max_window {
            return Err(SearchError::MaximumOffsetReached(max_window));
        }
        if limit >= max_window {
            return Err(SearchError::MaximumLimitReached(max_window));
        }

        let limit = if offset + limit > max_window {
            max_window - offset
        } else {
            limit
        };

        Ok(Self {
            limit,
            offset,
            max_window,
        })
    }

    /// Parses raw query-string values, falling back to the defaults when absent.
    pub fn from_raw(
        limit: Option<&str>,
        offset: Option<&str>,
        max_window: usize,
    ) -> Result<Self, SearchError> {
        let limit = parse_or(limit, DEFAULT_LIMIT)?;
        let offset = parse_or(offset, DEFAULT_OFFSET)?;
        Self::validate(limit, offset, max_window)
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> Result<i64, SearchError> {
    match raw.filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| SearchError::ParsingQueryParameters),
        None => Ok(default),
    }
}
