use corral_derive::app_error;
use std::borrow::Cow;

#[app_error]
pub enum StoreError {
    #[error("IO error{}: {source}", format_context(context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Internal fault{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), std::io::Error> {
    Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))
}

#[test]
fn from_source_via_question_mark() {
    let run = || -> Result<(), StoreError> {
        read()?;
        Ok(())
    };
    let err = run().expect_err("source error should convert");
    assert!(matches!(err, StoreError::Io { context: None, .. }));
}

#[test]
fn context_attaches_to_source_results() {
    let err = read().context("opening manifest").expect_err("should fail");
    let rendered = err.to_string();
    assert!(rendered.contains("opening manifest"), "context missing: {rendered}");
}

#[test]
fn context_updates_existing_error() {
    let result: Result<(), StoreError> =
        Err(StoreError::Internal { message: "boom".into(), context: None });
    let err = result.context("during boot").expect_err("should stay an error");
    assert!(err.to_string().contains("during boot"));
}

#[test]
fn internal_from_string_types() {
    let from_str: StoreError = "static message".into();
    assert!(matches!(from_str, StoreError::Internal { .. }));

    let from_string: StoreError = String::from("owned message").into();
    assert!(from_string.to_string().contains("owned message"));
}
