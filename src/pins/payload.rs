//! Callback data carried by the summary buttons.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const UNPIN_ALL: &str = "$$ALL";
const KEEP_LAST: &str = "$$LAST";
const EXPAND: &str = "$$EXPAND";
const COLLAPSE: &str = "$$COLLAPSE";

/// What a summary button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    UnpinAll,
    KeepLast,
    ExpandButtons,
    CollapseButtons,
    /// Remove one pin. `index` is its position when the button was drawn.
    UnpinOne { id: i32, index: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed button payload: {0:?}")]
pub struct PayloadError(pub String);

impl FromStr for ButtonAction {
    type Err = PayloadError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        match data {
            UNPIN_ALL => Ok(Self::UnpinAll),
            KEEP_LAST => Ok(Self::KeepLast),
            EXPAND => Ok(Self::ExpandButtons),
            COLLAPSE => Ok(Self::CollapseButtons),
            _ => {
                let malformed = || PayloadError(data.to_string());
                let (id, index) = data.split_once(':').ok_or_else(malformed)?;
                Ok(Self::UnpinOne {
                    id: id.parse().map_err(|_| malformed())?,
                    index: index.parse().map_err(|_| malformed())?,
                })
            }
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnpinAll => f.write_str(UNPIN_ALL),
            Self::KeepLast => f.write_str(KEEP_LAST),
            Self::ExpandButtons => f.write_str(EXPAND),
            Self::CollapseButtons => f.write_str(COLLAPSE),
            Self::UnpinOne { id, index } => write!(f, "{}:{}", id, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_control_tokens() {
        assert_eq!("$$ALL".parse(), Ok(ButtonAction::UnpinAll));
        assert_eq!("$$LAST".parse(), Ok(ButtonAction::KeepLast));
        assert_eq!("$$EXPAND".parse(), Ok(ButtonAction::ExpandButtons));
        assert_eq!("$$COLLAPSE".parse(), Ok(ButtonAction::CollapseButtons));
    }

    #[test]
    fn test_parse_unpin_one() {
        assert_eq!(
            "1234:3".parse(),
            Ok(ButtonAction::UnpinOne { id: 1234, index: 3 })
        );
    }

    #[test]
    fn test_format_matches_parse() {
        let action = ButtonAction::UnpinOne { id: 98765, index: 11 };
        assert_eq!(action.to_string(), "98765:11");
        assert_eq!(action.to_string().parse(), Ok(action));
        assert_eq!(ButtonAction::KeepLast.to_string(), "$$LAST");
    }

    #[test]
    fn test_rejects_malformed() {
        for data in ["", "$$NOPE", "12", "12:", ":3", "a:1", "1:b", "1:-2", "1:2:3"] {
            assert_eq!(
                data.parse::<ButtonAction>(),
                Err(PayloadError(data.to_string())),
                "payload {:?}",
                data
            );
        }
    }
}
