/*
 * error.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Feedfetch, a command-line feed reader.
 *
 * Feedfetch is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Feedfetch is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Feedfetch.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Error taxonomy shared by endpoint parsing, transport, HTTP exchange and feed interpretation.
//!
//! Every error has a kind. Kinds form a small refinement tree so callers can match either the
//! specific kind or its general category:
//!
//! ```text
//! Application
//! ├── Argument
//! ├── Url
//! ├── Transport
//! │   └── TransportTimeout
//! └── Protocol
//!     └── UnsupportedStatus
//! ```

use std::io;

use thiserror::Error;

/// Kind of an [`Error`], used for selective matching and exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Application,
    Argument,
    Url,
    Transport,
    TransportTimeout,
    Protocol,
    UnsupportedStatus,
}

impl ErrorKind {
    /// The kind this one refines, or `None` for the root.
    pub fn parent(self) -> Option<ErrorKind> {
        match self {
            ErrorKind::Application => None,
            ErrorKind::TransportTimeout => Some(ErrorKind::Transport),
            ErrorKind::UnsupportedStatus => Some(ErrorKind::Protocol),
            ErrorKind::Argument | ErrorKind::Url | ErrorKind::Transport | ErrorKind::Protocol => {
                Some(ErrorKind::Application)
            }
        }
    }

    /// True if `self` is `other` or refines it (directly or transitively).
    pub fn is_a(self, other: ErrorKind) -> bool {
        let mut kind = Some(self);
        while let Some(k) = kind {
            if k == other {
                return true;
            }
            kind = k.parent();
        }
        false
    }

    /// Process exit code for this kind. Refinements share their parent's code.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Argument => 1,
            ErrorKind::Url => 2,
            ErrorKind::Transport | ErrorKind::TransportTimeout => 3,
            ErrorKind::Protocol | ErrorKind::UnsupportedStatus => 4,
            ErrorKind::Application => 5,
        }
    }
}

/// Errors from any feedfetch operation. Each variant carries a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Any other failure, including a feed list run in which no feed succeeded.
    #[error("{0}")]
    Application(String),

    /// Malformed command-line invocation.
    #[error("{0}")]
    Argument(String),

    /// Malformed endpoint string or out-of-range port.
    #[error("{0}")]
    Url(String),

    /// Connect, handshake, read or write failure; certificate verification failure.
    #[error("{0}")]
    Transport(String),

    /// A readiness wait exceeded its bound.
    #[error("{0}")]
    TransportTimeout(String),

    /// Malformed response framing, error status, unrecognized feed document.
    #[error("{0}")]
    Protocol(String),

    /// Status other than 200 below 400 (redirects are never followed).
    #[error("{0}")]
    UnsupportedStatus(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Application(_) => ErrorKind::Application,
            Error::Argument(_) => ErrorKind::Argument,
            Error::Url(_) => ErrorKind::Url,
            Error::Transport(_) => ErrorKind::Transport,
            Error::TransportTimeout(_) => ErrorKind::TransportTimeout,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::UnsupportedStatus(_) => ErrorKind::UnsupportedStatus,
        }
    }

    /// True if this error's kind is `kind` or refines it.
    pub fn is_a(&self, kind: ErrorKind) -> bool {
        self.kind().is_a(kind)
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Application(m)
            | Error::Argument(m)
            | Error::Url(m)
            | Error::Transport(m)
            | Error::TransportTimeout(m)
            | Error::Protocol(m)
            | Error::UnsupportedStatus(m) => m,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::TimedOut {
            Error::TransportTimeout(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
