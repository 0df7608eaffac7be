//! Pseudo-terminal allocation requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;

/// Terminal parameters sent with a pty allocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PtyRequest {
    /// Terminal type advertised to the remote side (TERM).
    pub term: String,
    /// Width in character cells.
    pub cols: u16,
    /// Height in character cells.
    pub rows: u16,
}

impl PtyRequest {
    /// Request a terminal of the given type at the default 80x24 size.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Request a terminal with explicit dimensions.
    pub fn with_dimensions(term: impl Into<String>, cols: u16, rows: u16) -> Self {
        Self {
            term: term.into(),
            cols,
            rows,
        }
    }
}

impl Default for PtyRequest {
    fn default() -> Self {
        Self {
            term: "xterm".to_string(),
            cols: 80,
            rows: 24,
        }
    }
}

impl fmt::Display for PtyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.term, self.cols, self.rows)
    }
}

impl FromStr for PtyRequest {
    type Err = ChannelError;

    /// Parse `TERM` or `TERM,COLS,ROWS` (for example `xterm,80,24`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(',').map(str::trim);
        let term = match parts.next() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(ChannelError::PtySpec("terminal type is empty".to_string())),
        };
        match (parts.next(), parts.next(), parts.next()) {
            (None, None, None) => Ok(Self::new(term)),
            (Some(cols), Some(rows), None) => {
                let cols = cols
                    .parse::<u16>()
                    .map_err(|e| ChannelError::PtySpec(format!("bad column count '{cols}': {e}")))?;
                let rows = rows
                    .parse::<u16>()
                    .map_err(|e| ChannelError::PtySpec(format!("bad row count '{rows}': {e}")))?;
                if cols == 0 || rows == 0 {
                    return Err(ChannelError::PtySpec(
                        "dimensions must be nonzero".to_string(),
                    ));
                }
                Ok(Self::with_dimensions(term, cols, rows))
            }
            _ => Err(ChannelError::PtySpec(format!(
                "expected TERM or TERM,COLS,ROWS, got '{s}'"
            ))),
        }
    }
}
