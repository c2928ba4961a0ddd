use std::borrow::Cow;

/// Errors that can occur while configuring the logger.
#[corral_derive::app_error]
pub enum LoggerError {
    /// Failure while preparing the log directory or file.
    #[error("Log file error{}: {source}", format_context(context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// A global tracing subscriber has already been initialized in the
    /// current process.
    #[error("Tracing subscriber error{}: {source}", format_context(context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    /// Internal logic errors.
    #[error("Internal logger error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Invalid configuration supplied to the logger builder.
    #[error("Invalid logger configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Failure while configuring the remote shipping pipeline.
    #[cfg(feature = "otlp")]
    #[error("Remote shipping error{}: {source}", format_context(context))]
    RemoteShipping {
        source: opentelemetry_sdk::trace::TraceError,
        context: Option<Cow<'static, str>>,
    },
}
