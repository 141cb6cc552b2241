//! Display projections over the item collection.
//!
//! # Responsibility
//! - Define the session-only control state (filter, search, sort).
//! - Derive filtered, searched and sorted copies of the collection.
//!
//! # Invariants
//! - Projections never mutate or reorder the owned collection.
//! - Control state is never persisted.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod pipeline;

pub use pipeline::apply;

/// Completion-status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    Pending,
    Done,
}

/// Projection ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Ascending creation time.
    #[default]
    Created,
    /// Case-insensitive name order.
    Name,
    /// Pending items first.
    Status,
}

/// Current user selections that shape the projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewControls {
    pub filter: FilterMode,
    pub search: String,
    pub sort: SortMode,
}

impl ViewControls {
    pub fn new(filter: FilterMode, search: impl Into<String>, sort: SortMode) -> Self {
        Self {
            filter,
            search: search.into(),
            sort,
        }
    }
}

/// Unknown filter or sort token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl Display for ParseModeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported {} `{}`; expected {}",
            self.kind, self.value, self.expected
        )
    }
}

impl Error for ParseModeError {}

impl FilterMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }
}

impl FromStr for FilterMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "done" => Ok(Self::Done),
            _ => Err(ParseModeError {
                kind: "filter",
                value: value.to_string(),
                expected: "all|pending|done",
            }),
        }
    }
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Name => "name",
            Self::Status => "status",
        }
    }
}

impl FromStr for SortMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "name" => Ok(Self::Name),
            "status" => Ok(Self::Status),
            _ => Err(ParseModeError {
                kind: "sort",
                value: value.to_string(),
                expected: "created|name|status",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterMode, SortMode, ViewControls};

    #[test]
    fn defaults_show_everything_by_creation() {
        let controls = ViewControls::default();
        assert_eq!(controls.filter, FilterMode::All);
        assert_eq!(controls.sort, SortMode::Created);
        assert!(controls.search.is_empty());
    }

    #[test]
    fn modes_parse_from_tokens() {
        assert_eq!(" Pending".parse::<FilterMode>().unwrap(), FilterMode::Pending);
        assert_eq!("STATUS".parse::<SortMode>().unwrap(), SortMode::Status);

        let err = "newest".parse::<SortMode>().unwrap_err();
        assert!(err.to_string().contains("created|name|status"));
    }
}
