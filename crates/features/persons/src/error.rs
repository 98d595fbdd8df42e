use std::borrow::Cow;

/// Persons error type.
#[polycase_derive::polycase_error]
pub enum PersonsError {
    #[error("Invalid seed data{}: {message}", format_context(.context))]
    Seed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("No free person id{}: {message}", format_context(.context))]
    IdsExhausted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
