//! Query parameters for a single usage lookup
//!
//! [`QueryParameters`] is built once from command-line input through
//! [`QueryBuilder`], validated, and then only read. All validation happens
//! here so that a bad flag never reaches the network.
//!
//! # Examples
//!
//! ```
//! use check_usage_core::query::QueryParameters;
//!
//! let query = QueryParameters::builder()
//!     .with_user("alice")
//!     .with_account("fc_physics")
//!     .with_expand(true)
//!     .with_start("2024-01-01")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(query.user(), Some("alice"));
//! assert_eq!(query.start().unwrap().to_string(), "2024-01-01T00:00:00Z");
//! assert!(query.end().is_none());
//! ```

use crate::error::{Result, UsageError};
use crate::timestamp::UtcTimestamp;
use std::fmt;
use tracing::debug;

/// Who a query is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget<'a> {
    /// A single user across all of their accounts
    User(&'a str),
    /// A single account across all of its users
    Account(&'a str),
    /// One user's usage within one account
    UserInAccount {
        /// User name
        user: &'a str,
        /// Account name
        account: &'a str,
    },
}

impl fmt::Display for QueryTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTarget::User(user) => write!(f, "USER {user}"),
            QueryTarget::Account(account) => write!(f, "ACCOUNT {account}"),
            QueryTarget::UserInAccount { user, account } => {
                write!(f, "USER {user} in ACCOUNT {account}")
            }
        }
    }
}

/// Validated, immutable parameters of one usage query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParameters {
    user: Option<String>,
    account: Option<String>,
    expand: bool,
    start: Option<UtcTimestamp>,
    end: Option<UtcTimestamp>,
}

impl QueryParameters {
    /// Start building a query
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// User filter, if any
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Account filter, if any
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Whether a per-user/per-account breakdown was requested
    pub fn expand(&self) -> bool {
        self.expand
    }

    /// Inclusive lower bound of the window
    pub fn start(&self) -> Option<&UtcTimestamp> {
        self.start.as_ref()
    }

    /// Inclusive upper bound of the window
    pub fn end(&self) -> Option<&UtcTimestamp> {
        self.end.as_ref()
    }

    /// Who the query is about
    ///
    /// A built query always has at least one of user or account.
    pub fn target(&self) -> QueryTarget<'_> {
        match (self.user.as_deref(), self.account.as_deref()) {
            (Some(user), Some(account)) => QueryTarget::UserInAccount { user, account },
            (None, Some(account)) => QueryTarget::Account(account),
            (Some(user), None) => QueryTarget::User(user),
            (None, None) => QueryTarget::User(""),
        }
    }

    /// Query-string pairs for the accounting service
    ///
    /// Bounds that were not given are left out so the service applies its
    /// own default window.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(user) = &self.user {
            pairs.push(("user", user.clone()));
        }
        if let Some(account) = &self.account {
            pairs.push(("account", account.clone()));
        }
        if let Some(start) = &self.start {
            pairs.push(("start_time", start.unix_seconds().to_string()));
        }
        if let Some(end) = &self.end {
            pairs.push(("end_time", end.unix_seconds().to_string()));
        }
        if self.expand {
            pairs.push(("expand", "true".to_string()));
        }
        pairs
    }
}

/// Collects raw command-line values for a [`QueryParameters`]
#[derive(Debug, Default, Clone)]
pub struct QueryBuilder {
    user: Option<String>,
    account: Option<String>,
    expand: bool,
    start: Option<String>,
    end: Option<String>,
}

impl QueryBuilder {
    /// Set the user filter
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the account filter
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Request a per-user/per-account breakdown
    pub fn with_expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    /// Set the raw start bound
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Set the raw end bound
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Validate, falling back to the invoking user's login name when
    /// neither user nor account was given
    pub fn build(self) -> Result<QueryParameters> {
        self.build_with_login(login_name())
    }

    /// Validate with an explicit fallback login name
    pub fn build_with_login(self, login: Option<String>) -> Result<QueryParameters> {
        let user = non_empty("user", self.user)?;
        let account = non_empty("account", self.account)?;

        let start = self.start.as_deref().map(UtcTimestamp::parse).transpose()?;
        let end = self.end.as_deref().map(UtcTimestamp::parse).transpose()?;

        if let (Some(start), Some(end)) = (&start, &end) {
            if start > end {
                return Err(UsageError::Parameter(format!(
                    "Start time ({start}) is after end time ({end})"
                )));
            }
        }

        let user = match (user, &account) {
            (None, None) => {
                let login = login.filter(|name| !name.is_empty()).ok_or_else(|| {
                    UsageError::Parameter(
                        "No user or account given and the current login name is unknown; \
                         pass -u USER or -a ACCOUNT"
                            .to_string(),
                    )
                })?;
                debug!("No user or account given, defaulting to '{}'", login);
                Some(login)
            }
            (user, _) => user,
        };

        Ok(QueryParameters {
            user,
            account,
            expand: self.expand,
            start,
            end,
        })
    }
}

fn non_empty(what: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(UsageError::Parameter(format!(
            "The {what} name must not be empty"
        ))),
        other => Ok(other),
    }
}

/// Login name of the invoking user
///
/// `USER` then `LOGNAME`, falling back to the account database when the
/// environment carries neither (cron, `env -i`).
pub fn login_name() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|name| !name.is_empty())
        .or_else(|| whoami::fallible::username().ok())
        .filter(|name| !name.is_empty())
}
