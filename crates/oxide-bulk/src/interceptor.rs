//! Last-mile command rewriting.

use std::borrow::Cow;

use oxide_bulk_core::ShardingRewriter;

/// Rewrites command text right before it is sent to the driver.
///
/// Runs once per command on the request path, so implementations must not
/// block.
pub trait CommandInterceptor: Send + Sync {
    /// Returns the text to send, borrowing `sql` when nothing changes.
    fn intercept<'a>(&self, sql: &'a str) -> Cow<'a, str>;
}

impl CommandInterceptor for ShardingRewriter {
    fn intercept<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        self.rewrite(sql)
    }
}

/// Runs `sql` through every interceptor in order.
pub(crate) fn apply_all<'a>(
    interceptors: &[Box<dyn CommandInterceptor>],
    sql: &'a str,
) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(sql);
    for interceptor in interceptors {
        let rewritten = match interceptor.intercept(&current) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(rewritten) => rewritten,
        };
        current = Cow::Owned(rewritten);
    }
    current
}
