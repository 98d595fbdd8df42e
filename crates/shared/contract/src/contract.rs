//! Static type descriptions and the per-convention contracts built from them.

use crate::error::ContractError;
use crate::naming::NamingConvention;
use fxhash::FxHashSet;
use std::fmt;

/// `chrono` format used by [`ValueTransform::DateOnly`].
pub const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

/// Value-level transform attached to a field, independent of the naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTransform {
    /// Dates and timestamps are written as `YYYY-MM-DD`.
    DateOnly,
}

impl fmt::Display for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateOnly => f.write_str("date-only"),
        }
    }
}

/// One declared field of a serializable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    /// Declared identifier, `PascalCase` (`FirstName`).
    pub identifier: &'static str,
    /// Explicit name override. Still subject to the active convention.
    pub rename: Option<&'static str>,
    pub transform: Option<ValueTransform>,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(identifier: &'static str) -> Self {
        Self { identifier, rename: None, transform: None }
    }

    #[must_use]
    pub const fn renamed(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    #[must_use]
    pub const fn with_transform(mut self, transform: ValueTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The name the convention is applied to: the override if any, else the identifier.
    #[must_use]
    pub const fn declared_name(&self) -> &'static str {
        match self.rename {
            Some(name) => name,
            None => self.identifier,
        }
    }
}

/// Per-type policy overrides; `None` falls back to the resolver's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PolicyOverrides {
    pub skip_null: Option<bool>,
    pub skip_default: Option<bool>,
    pub ignore_reference_cycles: Option<bool>,
}

impl PolicyOverrides {
    pub const NONE: Self =
        Self { skip_null: None, skip_default: None, ignore_reference_cycles: None };
}

/// Effective type-level policies copied onto every contract of a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ContractPolicies {
    /// Omit members whose value is null.
    pub skip_null: bool,
    /// Omit members holding their type's default value.
    pub skip_default: bool,
    /// Omit members that re-enter an object already being written instead of failing.
    pub ignore_reference_cycles: bool,
}

impl ContractPolicies {
    /// Every suppression policy enabled.
    pub const LENIENT: Self =
        Self { skip_null: true, skip_default: true, ignore_reference_cycles: true };

    /// Applies a type's overrides on top of these defaults.
    #[must_use]
    pub const fn with_overrides(self, overrides: PolicyOverrides) -> Self {
        Self {
            skip_null: pick(overrides.skip_null, self.skip_null),
            skip_default: pick(overrides.skip_default, self.skip_default),
            ignore_reference_cycles: pick(
                overrides.ignore_reference_cycles,
                self.ignore_reference_cycles,
            ),
        }
    }
}

const fn pick(value: Option<bool>, fallback: bool) -> bool {
    match value {
        Some(v) => v,
        None => fallback,
    }
}

/// Static description of a serializable type, registered once per type.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Fully-qualified type identifier (`my_crate::models::Person`).
    pub type_name: &'static str,
    /// Declared fields, in declaration order.
    pub fields: &'static [FieldDescriptor],
    pub policies: PolicyOverrides,
}

/// Types with a static [`TypeDescriptor`]. Usually derived with `#[derive(Contract)]`.
pub trait Describe: 'static {
    fn descriptor() -> &'static TypeDescriptor;
}

/// A field as it is emitted under one convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMember {
    name: String,
    index: usize,
    field: &'static FieldDescriptor,
}

impl ContractMember {
    /// Emitted key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration index of the field within its type.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn field(&self) -> &'static FieldDescriptor {
        self.field
    }

    #[must_use]
    pub const fn transform(&self) -> Option<ValueTransform> {
        self.field.transform
    }
}

/// Serialization metadata of one type under one naming convention.
///
/// Immutable once built and shared across requests through the contract cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationContract {
    type_name: &'static str,
    convention: NamingConvention,
    members: Vec<ContractMember>,
    policies: ContractPolicies,
}

impl SerializationContract {
    /// Builds the contract of `descriptor` under `convention`.
    ///
    /// # Errors
    /// * [`ContractError::InvalidMember`] if a member would be emitted with an empty name.
    /// * [`ContractError::DuplicateMember`] if two members collapse to the same name.
    pub fn build(
        descriptor: &'static TypeDescriptor,
        convention: NamingConvention,
        defaults: ContractPolicies,
    ) -> Result<Self, ContractError> {
        let mut seen = FxHashSet::default();
        let mut members = Vec::with_capacity(descriptor.fields.len());

        for (index, field) in descriptor.fields.iter().enumerate() {
            let name = convention.apply(field.declared_name());
            if name.is_empty() {
                return Err(ContractError::InvalidMember {
                    message: format!("field #{index} has an empty name").into(),
                    context: Some(descriptor.type_name.into()),
                });
            }
            if !seen.insert(name.clone()) {
                return Err(ContractError::DuplicateMember {
                    message: format!("`{name}` is emitted twice under {convention}").into(),
                    context: Some(descriptor.type_name.into()),
                });
            }
            members.push(ContractMember { name, index, field });
        }

        Ok(Self {
            type_name: descriptor.type_name,
            convention,
            members,
            policies: defaults.with_overrides(descriptor.policies),
        })
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub const fn convention(&self) -> NamingConvention {
        self.convention
    }

    #[must_use]
    pub const fn policies(&self) -> ContractPolicies {
        self.policies
    }

    #[must_use]
    pub fn members(&self) -> &[ContractMember] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Emitted names in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(ContractMember::name)
    }

    /// Member for the field declared at `index`.
    #[must_use]
    pub fn member_at(&self, index: usize) -> Option<&ContractMember> {
        self.members.get(index).filter(|m| m.index == index)
    }

    /// Finds a member by emitted name: exact match first, then ASCII case-insensitive.
    #[must_use]
    pub fn find_member(&self, name: &str) -> Option<&ContractMember> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .or_else(|| self.members.iter().find(|m| m.name.eq_ignore_ascii_case(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static PERSON: TypeDescriptor = TypeDescriptor {
        type_name: "tests::Person",
        fields: &[
            FieldDescriptor::new("Id"),
            FieldDescriptor::new("FirstName"),
            FieldDescriptor::new("Dob").renamed("DateOfBirth").with_transform(ValueTransform::DateOnly),
        ],
        policies: PolicyOverrides { skip_default: Some(false), ..PolicyOverrides::NONE },
    };

    static CLASHING: TypeDescriptor = TypeDescriptor {
        type_name: "tests::Clashing",
        fields: &[FieldDescriptor::new("UserId"), FieldDescriptor::new("UserID").renamed("User_Id")],
        policies: PolicyOverrides::NONE,
    };

    static BLANK: TypeDescriptor = TypeDescriptor {
        type_name: "tests::Blank",
        fields: &[FieldDescriptor::new("")],
        policies: PolicyOverrides::NONE,
    };

    #[test]
    fn overrides_are_still_cased() {
        let contract =
            SerializationContract::build(&PERSON, NamingConvention::SnakeCase, ContractPolicies::LENIENT)
                .unwrap();

        let names: Vec<_> = contract.member_names().collect();
        assert_eq!(names, ["id", "first_name", "date_of_birth"]);
        assert_eq!(contract.members()[2].transform(), Some(ValueTransform::DateOnly));
    }

    #[test]
    fn type_overrides_win_over_defaults() {
        let contract =
            SerializationContract::build(&PERSON, NamingConvention::CamelCase, ContractPolicies::LENIENT)
                .unwrap();

        assert_eq!(
            contract.policies(),
            ContractPolicies { skip_null: true, skip_default: false, ignore_reference_cycles: true }
        );
    }

    #[test]
    fn colliding_names_fail_the_build() {
        let err =
            SerializationContract::build(&CLASHING, NamingConvention::SnakeCase, ContractPolicies::default())
                .unwrap_err();
        assert!(matches!(err, ContractError::DuplicateMember { .. }));

        // The same descriptor is fine where the names stay distinct.
        assert!(
            SerializationContract::build(&CLASHING, NamingConvention::PascalCase, ContractPolicies::default())
                .is_ok()
        );
    }

    #[test]
    fn empty_names_fail_the_build() {
        let err =
            SerializationContract::build(&BLANK, NamingConvention::CamelCase, ContractPolicies::default())
                .unwrap_err();
        assert!(matches!(err, ContractError::InvalidMember { .. }));
    }

    #[test]
    fn members_are_found_ignoring_case() {
        let contract =
            SerializationContract::build(&PERSON, NamingConvention::CamelCase, ContractPolicies::default())
                .unwrap();

        assert_eq!(contract.find_member("firstName").map(ContractMember::index), Some(1));
        assert_eq!(contract.find_member("FIRSTNAME").map(ContractMember::index), Some(1));
        assert!(contract.find_member("first_name").is_none());
        assert_eq!(contract.member_at(2).map(ContractMember::name), Some("dateOfBirth"));
    }
}
