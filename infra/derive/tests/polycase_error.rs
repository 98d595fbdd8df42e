use polycase_derive::polycase_error;
use std::borrow::Cow;

#[polycase_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn failing_io() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("disk gone"))
}

#[test]
fn source_errors_convert_with_question_mark() {
    fn run() -> Result<(), DemoError> {
        failing_io()?;
        Ok(())
    }

    let err = run().unwrap_err();
    assert!(matches!(err, DemoError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "IO error: disk gone");
}

#[test]
fn context_is_attached_to_source_results() {
    let err = failing_io().context("reading manifest").unwrap_err();
    assert_eq!(err.to_string(), "IO error (reading manifest): disk gone");
}

#[test]
fn context_overrides_existing_variant_context() {
    let result: Result<(), DemoError> =
        Err(DemoError::Rejected { message: "bad input".into(), context: None });

    let err = result.context("validating body").unwrap_err();
    assert_eq!(err.to_string(), "Rejected (validating body): bad input");
}

#[test]
fn internal_variant_accepts_plain_strings() {
    let from_static: DemoError = "static failure".into();
    let from_owned: DemoError = String::from("owned failure").into();

    assert_eq!(from_static.to_string(), "Internal error: static failure");
    assert_eq!(from_owned.to_string(), "Internal error: owned failure");
}
