// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Data-driven classification of errors that a wait loop may swallow and retry.

use crate::error::ResourceError;
use std::fmt;

/// Coarse error classes, arranged as a small hierarchy rooted at `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Any,
    /// Any status response returned by the API server
    Api,
    NotFound,
    Conflict,
    Unauthorized,
    Forbidden,
    ServerError,
    /// Transport level failures: connection resets, broken streams, bad HTTP
    Protocol,
    Timeout,
    Other,
}

impl ErrorClass {
    /// Classify an error into its most specific class
    pub fn of(err: &ResourceError) -> Self {
        match err {
            ResourceError::KubeError(kube::Error::Api(response)) => match response.code {
                404 => ErrorClass::NotFound,
                409 => ErrorClass::Conflict,
                401 => ErrorClass::Unauthorized,
                403 => ErrorClass::Forbidden,
                500..=599 => ErrorClass::ServerError,
                _ => ErrorClass::Api,
            },
            ResourceError::KubeError(
                kube::Error::HyperError(_)
                | kube::Error::Service(_)
                | kube::Error::ReadEvents(_)
                | kube::Error::HttpError(_),
            ) => ErrorClass::Protocol,
            ResourceError::WatchError(_) => ErrorClass::Protocol,
            ResourceError::TimeoutExpired { .. } => ErrorClass::Timeout,
            _ => ErrorClass::Other,
        }
    }

    pub fn parent(self) -> Option<Self> {
        match self {
            ErrorClass::Any => None,
            ErrorClass::NotFound
            | ErrorClass::Conflict
            | ErrorClass::Unauthorized
            | ErrorClass::Forbidden
            | ErrorClass::ServerError => Some(ErrorClass::Api),
            ErrorClass::Api
            | ErrorClass::Protocol
            | ErrorClass::Timeout
            | ErrorClass::Other => Some(ErrorClass::Any),
        }
    }

    /// Whether `self` equals `ancestor` or sits below it in the hierarchy
    pub fn is_a(self, ancestor: ErrorClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == ancestor {
                return true;
            }
            current = class.parent();
        }
        false
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::Any => "Error",
            ErrorClass::Api => "ApiError",
            ErrorClass::NotFound => "NotFoundError",
            ErrorClass::Conflict => "ConflictError",
            ErrorClass::Unauthorized => "UnauthorizedError",
            ErrorClass::Forbidden => "ForbiddenError",
            ErrorClass::ServerError => "ServerError",
            ErrorClass::Protocol => "ProtocolError",
            ErrorClass::Timeout => "TimeoutExpiredError",
            ErrorClass::Other => "OtherError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RetryRule {
    class: ErrorClass,
    messages: Vec<String>,
}

/// Table of error classes (and optional message substrings) that are safe to retry.
///
/// A rule with no messages matches every error of that class or any of its
/// subclasses. Errors that match no rule are fatal for the wait loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryTable {
    rules: Vec<RetryRule>,
}

impl RetryTable {
    /// A table that retries nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// A table that retries every error
    pub fn any() -> Self {
        Self::none().on(ErrorClass::Any)
    }

    pub fn not_found() -> Self {
        Self::none().on(ErrorClass::NotFound)
    }

    pub fn protocol() -> Self {
        Self::none().on(ErrorClass::Protocol)
    }

    /// Retry every error of `class`
    pub fn on(self, class: ErrorClass) -> Self {
        self.on_messages(class, Vec::<String>::new())
    }

    /// Retry errors of `class` whose message contains one of `messages`
    pub fn on_messages<I, S>(mut self, class: ErrorClass, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(RetryRule {
            class,
            messages: messages.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn merge(mut self, other: RetryTable) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_retryable(&self, err: &ResourceError) -> bool {
        let class = ErrorClass::of(err);
        let message = err.to_string();

        self.rules.iter().any(|rule| {
            class.is_a(rule.class)
                && (rule.messages.is_empty()
                    || rule.messages.iter().any(|m| message.contains(m.as_str())))
        })
    }
}
