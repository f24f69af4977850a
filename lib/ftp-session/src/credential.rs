/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::DEFAULT_FTP_PORT;

const ANONYMOUS_USERNAME: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@";

#[derive(Clone, PartialEq, Eq)]
pub struct FtpPassword(String);

impl FtpPassword {
    pub fn from_original(s: impl Into<String>) -> Self {
        FtpPassword(s.into())
    }

    pub fn as_original(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FtpPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FtpPassword(***)")
    }
}

/// Server address and login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpSessionConfig {
    host: String,
    port: u16,
    username: String,
    password: FtpPassword,
}

impl FtpSessionConfig {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        FtpSessionConfig {
            host: host.to_string(),
            port: DEFAULT_FTP_PORT,
            username: username.to_string(),
            password: FtpPassword::from_original(password),
        }
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[inline]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &FtpPassword {
        &self.password
    }

    /// `anonymous` if no username is set.
    pub(crate) fn login_username(&self) -> &str {
        if self.username.is_empty() {
            ANONYMOUS_USERNAME
        } else {
            &self.username
        }
    }

    /// `anonymous@` if no password is set.
    pub(crate) fn login_password(&self) -> &str {
        if self.password.0.is_empty() {
            ANONYMOUS_PASSWORD
        } else {
            self.password.as_original()
        }
    }
}

/// Guarded holder of the current [`FtpSessionConfig`].
///
/// Replacement is atomic, readers always see either the old or the new
/// config in full.
#[derive(Clone, Default)]
pub struct SharedFtpSessionConfig {
    inner: Arc<ArcSwapOption<FtpSessionConfig>>,
}

impl SharedFtpSessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, host: &str, username: &str, password: &str) {
        self.replace(FtpSessionConfig::new(host, username, password));
    }

    pub fn replace(&self, config: FtpSessionConfig) {
        self.inner.store(Some(Arc::new(config)));
    }

    pub fn is_configured(&self) -> bool {
        self.inner.load().is_some()
    }

    pub fn snapshot(&self) -> Option<Arc<FtpSessionConfig>> {
        self.inner.load_full()
    }
}
