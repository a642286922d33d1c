//! ---
//! thalos_section: "03-logging"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Structured logging adapters and sinks."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
/// Emit an informational log enriched with a [`LogContext`](crate::LogContext).
#[macro_export]
macro_rules! thalos_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::INFO,
            component = %ctx.component,
            instance = ctx.instance.as_deref().unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::thalos_info!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit a debug log enriched with a [`LogContext`](crate::LogContext).
#[macro_export]
macro_rules! thalos_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::DEBUG,
            component = %ctx.component,
            instance = ctx.instance.as_deref().unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::thalos_debug!(context = $crate::LogContext::default(), $($arg)+)
    }};
}

/// Emit an error log enriched with a [`LogContext`](crate::LogContext).
#[macro_export]
macro_rules! thalos_error {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        tracing::event!(
            tracing::Level::ERROR,
            component = %ctx.component,
            instance = ctx.instance.as_deref().unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        $crate::thalos_error!(context = $crate::LogContext::default(), $($arg)+)
    }};
}
