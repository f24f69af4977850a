/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::io;

use thiserror::Error;

use super::FtpRawResponseError;
use crate::control::FtpCommand;

/// The final reply of a command exchange, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpReply {
    pub code: u16,
    pub text: String,
}

impl FtpReply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        FtpReply {
            code,
            text: text.into(),
        }
    }
}

impl fmt::Display for FtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}

#[derive(Debug, Error)]
pub enum FtpCommandError {
    #[error("unable to send command: {0:?}")]
    SendFailed(io::Error),
    #[error("unable to recv reply: {0}")]
    RecvFailed(#[from] FtpRawResponseError),
    #[error("service not available: {0}")]
    ServiceNotAvailable(FtpReply),
    #[error("unexpected reply to command {0}: {1}")]
    UnexpectedReply(FtpCommand, FtpReply),
    #[error("invalid reply syntax to command {0}: {1}")]
    InvalidReplySyntax(FtpCommand, FtpReply),
    #[error("file unavailable for command {0}: {1}")]
    FileUnavailable(FtpCommand, FtpReply),
}

impl FtpCommandError {
    pub fn reply(&self) -> Option<&FtpReply> {
        match self {
            FtpCommandError::SendFailed(_) | FtpCommandError::RecvFailed(_) => None,
            FtpCommandError::ServiceNotAvailable(reply)
            | FtpCommandError::UnexpectedReply(_, reply)
            | FtpCommandError::InvalidReplySyntax(_, reply)
            | FtpCommandError::FileUnavailable(_, reply) => Some(reply),
        }
    }
}
