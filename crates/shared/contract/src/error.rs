use std::borrow::Cow;

/// Errors raised while resolving contracts or converting values through them.
#[polycase_derive::polycase_error]
pub enum ContractError {
    /// The resolver was used before its selector or cache was bound at startup.
    #[error("Contract configuration error{}: {message}", format_context(.context))]
    Configuration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The naming selector ran outside of any in-flight request.
    #[error("No request context{}: {message}", format_context(.context))]
    NoRequestContext { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A member would be emitted with an empty name.
    #[error("Invalid contract member{}: {message}", format_context(.context))]
    InvalidMember { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two members of one type collapse to the same emitted name.
    #[error("Duplicate contract member{}: {message}", format_context(.context))]
    DuplicateMember { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An object re-entered itself while cycles are not tolerated.
    #[error("Reference loop detected{}: {message}", format_context(.context))]
    ReferenceLoop { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A value transform tag was attached to a value that cannot honour it.
    #[error("Unsupported value transform{}: {message}", format_context(.context))]
    UnsupportedTransform { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The wire value does not have the shape the contract expects.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A required member is absent from the wire value.
    #[error("Missing member{}: {message}", format_context(.context))]
    MissingMember { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Incoming JSON could not be decoded.
    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// An outgoing value could not be encoded.
    #[error("JSON encoding error{}: {message}", format_context(.context))]
    Encoding { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal contract error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ContractError {
    /// A dependency the resolver needs was never bound.
    pub(crate) fn missing_dependency(dependency: &'static str, remedy: &'static str) -> Self {
        Self::Configuration {
            message: format!("{dependency} is missing, call `{remedy}` during startup wiring")
                .into(),
            context: None,
        }
    }

    pub(crate) fn encoding(source: &serde_json::Error) -> Self {
        Self::Encoding { message: source.to_string().into(), context: None }
    }

    pub(crate) fn type_mismatch(expected: &str, found: &serde_json::Value) -> Self {
        Self::TypeMismatch {
            message: format!("expected {expected}, found {}", json_kind(found)).into(),
            context: None,
        }
    }

    /// Prefixes the error location with a member name, building a dotted path
    /// (`person.dateOfBirth`) as the error bubbles up through nested objects.
    #[must_use]
    pub fn in_member(mut self, member: &str) -> Self {
        match &mut self {
            Self::Configuration { .. } | Self::NoRequestContext { .. } => {},
            Self::InvalidMember { context, .. }
            | Self::DuplicateMember { context, .. }
            | Self::ReferenceLoop { context, .. }
            | Self::UnsupportedTransform { context, .. }
            | Self::TypeMismatch { context, .. }
            | Self::MissingMember { context, .. }
            | Self::Json { context, .. }
            | Self::Encoding { context, .. }
            | Self::Internal { context, .. } => {
                *context = Some(match context.take() {
                    Some(inner) => format!("{member}.{inner}").into(),
                    None => member.to_owned().into(),
                });
            },
        }
        self
    }

    /// `true` for errors caused by the shape of incoming data rather than by
    /// the way the host or its models are set up.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::MissingMember { .. } | Self::Json { .. })
    }
}

// `serde_json::Error` is not `Clone`; a copied `Json` error keeps its message.
impl Clone for ContractError {
    fn clone(&self) -> Self {
        match self {
            Self::Configuration { message, context } => {
                Self::Configuration { message: message.clone(), context: context.clone() }
            },
            Self::NoRequestContext { message, context } => {
                Self::NoRequestContext { message: message.clone(), context: context.clone() }
            },
            Self::InvalidMember { message, context } => {
                Self::InvalidMember { message: message.clone(), context: context.clone() }
            },
            Self::DuplicateMember { message, context } => {
                Self::DuplicateMember { message: message.clone(), context: context.clone() }
            },
            Self::ReferenceLoop { message, context } => {
                Self::ReferenceLoop { message: message.clone(), context: context.clone() }
            },
            Self::UnsupportedTransform { message, context } => {
                Self::UnsupportedTransform { message: message.clone(), context: context.clone() }
            },
            Self::TypeMismatch { message, context } => {
                Self::TypeMismatch { message: message.clone(), context: context.clone() }
            },
            Self::MissingMember { message, context } => {
                Self::MissingMember { message: message.clone(), context: context.clone() }
            },
            Self::Json { source, context } => Self::Json {
                source: <serde_json::Error as serde::de::Error>::custom(source.to_string()),
                context: context.clone(),
            },
            Self::Encoding { message, context } => {
                Self::Encoding { message: message.clone(), context: context.clone() }
            },
            Self::Internal { message, context } => {
                Self::Internal { message: message.clone(), context: context.clone() }
            },
        }
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
