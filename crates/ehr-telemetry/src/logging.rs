//! Structured logging macros.
//!
//! Every event carries a `component` field naming the protocol component
//! that emitted it:
//! - `component`: `transaction-broker`, `commitment`, `capability`, ...
//! - `record_id` / `request_id`: the lifecycle the event belongs to
//! - additional context fields
//!
//! Secrets (plaintext, trapdoor keys, bearer values) are never passed to
//! these macros; their `Debug` impls are redacted as a second line of defence.

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a record-lifecycle event with standard fields.
#[macro_export]
macro_rules! log_record_event {
    ($level:ident, $component:expr, $msg:expr, $record_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            record_id = %$record_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log an access-request event with standard fields.
#[macro_export]
macro_rules! log_request_event {
    ($level:ident, $component:expr, $msg:expr, $request_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            request_id = %$request_id,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand_without_subscriber() {
        crate::log_event!(info, "test", "plain event");
        crate::log_event!(debug, "test", "with fields", attempt = 1u32);
        crate::log_record_event!(info, "test", "record event", "0xabc", stage = "anchor");
        crate::log_request_event!(warn, "test", "request event", "0xdef");
    }
}
