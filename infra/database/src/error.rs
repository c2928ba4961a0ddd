use std::borrow::Cow;

/// Errors raised by the database layer.
#[corral_derive::app_error]
pub enum DatabaseError {
    /// Missing or inconsistent connection parameters.
    #[error("Database validation error{}: {message}", format_context(context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The engine could not be reached or stayed unhealthy.
    #[error("Database connection error{}: {message}", format_context(context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An SQL statement failed.
    #[error("SQL error{}: {source}", format_context(context))]
    Sql { source: sqlx::Error, context: Option<Cow<'static, str>> },

    /// A migration could not be applied or verified.
    #[error("Migration error{}: {message}", format_context(context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal database error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
