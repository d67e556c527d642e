//! The phases of reading a request.
//!
//! A request is read in rounds. The first round reads either the client's own
//! arguments or the contents of a cursor, never both. The second round adds the
//! server's default filters. Every parameter moves the state on before any value
//! is parsed, so that conflicts are found up front.

use crate::translation::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Initial,
    ParsingArguments,
    ParsedArguments,
    ParsingCursor,
    ParsedCursor,
    ParsingDefaults,
    ParsedDefault,
    End,
}

impl ParseState {
    /// A parameter other than the cursor was seen.
    ///
    /// `from_cursor` is set for parameters read out of a cursor.
    pub fn parsed_argument(self, parameter: &str, cursor: &str, from_cursor: bool) -> Result<Self, Error> {
        match (self, from_cursor) {
            (ParseState::Initial | ParseState::ParsingArguments, false) => {
                Ok(ParseState::ParsingArguments)
            }
            (ParseState::ParsingCursor, true) => Ok(ParseState::ParsingCursor),
            (ParseState::ParsingDefaults, false) => Ok(ParseState::ParsingDefaults),
            (ParseState::ParsingCursor | ParseState::ParsedCursor, false) => {
                Err(Error::CursorConflict {
                    parameter: parameter.to_string(),
                    cursor: cursor.to_string(),
                })
            }
            (state, _) => Err(invalid(state, "read an argument")),
        }
    }

    /// The cursor parameter was seen. `previous` is an argument seen before it, if any.
    pub fn parsing_cursor(self, cursor: &str, previous: Option<&str>) -> Result<Self, Error> {
        match self {
            ParseState::Initial => Ok(ParseState::ParsingCursor),
            ParseState::ParsingArguments => Err(Error::CursorConflict {
                parameter: previous.unwrap_or(cursor).to_string(),
                cursor: cursor.to_string(),
            }),
            state => Err(invalid(state, "read a cursor")),
        }
    }

    pub fn finish_round(self) -> Result<Self, Error> {
        match self {
            ParseState::Initial | ParseState::ParsingArguments => Ok(ParseState::ParsedArguments),
            ParseState::ParsingCursor => Ok(ParseState::ParsedCursor),
            ParseState::ParsingDefaults => Ok(ParseState::ParsedDefault),
            state => Err(invalid(state, "finish a round")),
        }
    }

    pub fn start_defaults(self) -> Result<Self, Error> {
        match self {
            ParseState::Initial | ParseState::ParsedArguments | ParseState::ParsedCursor => {
                Ok(ParseState::ParsingDefaults)
            }
            state => Err(invalid(state, "start reading defaults")),
        }
    }

    pub fn end(self) -> Result<Self, Error> {
        match self {
            ParseState::Initial
            | ParseState::ParsedArguments
            | ParseState::ParsedCursor
            | ParseState::ParsedDefault => Ok(ParseState::End),
            state => Err(invalid(state, "end")),
        }
    }
}

fn invalid(state: ParseState, action: &'static str) -> Error {
    Error::InvalidStateTransition { state, action }
}
