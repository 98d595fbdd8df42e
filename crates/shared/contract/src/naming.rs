//! The four key-casing conventions and the pure functions behind them.

use heck::{ToKebabCase, ToSnakeCase};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Key-casing convention applied to emitted member names.
///
/// Labels are the values accepted by the naming header; parsing them is
/// ASCII case-insensitive (`"SNAKE_CASE".parse()` yields [`Self::SnakeCase`]).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum NamingConvention {
    #[default]
    #[strum(serialize = "camelCase")]
    CamelCase,
    #[strum(serialize = "snake_case")]
    SnakeCase,
    #[strum(serialize = "kebab-case")]
    KebabCase,
    #[strum(serialize = "PascalCase")]
    PascalCase,
}

impl NamingConvention {
    /// The canonical header label (`camelCase`, `snake_case`, ...).
    #[must_use]
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Parses a header label, ignoring ASCII case. Unknown labels yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        label.parse().ok()
    }

    /// The strategy implementing this convention.
    #[must_use]
    pub const fn strategy(self) -> &'static dyn NamingStrategy {
        match self {
            Self::CamelCase => &CamelCase,
            Self::SnakeCase => &SnakeCase,
            Self::KebabCase => &KebabCase,
            Self::PascalCase => &PascalCase,
        }
    }

    /// Maps a declared identifier to its emitted form under this convention.
    #[must_use]
    pub fn apply(self, identifier: &str) -> String {
        self.strategy().apply(identifier)
    }
}

/// A pure identifier transform. Implementations hold no state.
pub trait NamingStrategy: Send + Sync + std::fmt::Debug {
    fn convention(&self) -> NamingConvention;

    fn apply(&self, identifier: &str) -> String;
}

/// Lower-cases the leading character only.
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCase;

/// Splits words on case transitions, joins with `_`, all lower-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCase;

/// Splits words on case transitions, joins with `-`, all lower-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct KebabCase;

/// Identity: declared identifiers are already `PascalCase`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PascalCase;

impl NamingStrategy for CamelCase {
    fn convention(&self) -> NamingConvention {
        NamingConvention::CamelCase
    }

    fn apply(&self, identifier: &str) -> String {
        let mut chars = identifier.chars();
        chars.next().map_or_else(String::new, |first| first.to_lowercase().chain(chars).collect())
    }
}

impl NamingStrategy for SnakeCase {
    fn convention(&self) -> NamingConvention {
        NamingConvention::SnakeCase
    }

    fn apply(&self, identifier: &str) -> String {
        identifier.to_snake_case()
    }
}

impl NamingStrategy for KebabCase {
    fn convention(&self) -> NamingConvention {
        NamingConvention::KebabCase
    }

    fn apply(&self, identifier: &str) -> String {
        identifier.to_kebab_case()
    }
}

impl NamingStrategy for PascalCase {
    fn convention(&self) -> NamingConvention {
        NamingConvention::PascalCase
    }

    fn apply(&self, identifier: &str) -> String {
        identifier.to_owned()
    }
}
