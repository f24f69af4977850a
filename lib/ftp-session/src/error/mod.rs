/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod response;
pub use response::FtpRawResponseError;

mod command;
pub use command::{FtpCommandError, FtpReply};

mod session;
pub use session::{FtpErrorKind, FtpSessionError};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
