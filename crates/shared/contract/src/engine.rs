//! Contract-driven conversion between described objects and JSON values.

use crate::contract::{ContractPolicies, Describe, SerializationContract, TypeDescriptor};
use crate::error::ContractError;
use crate::naming::NamingConvention;
use crate::resolver::ContractResolver;
use crate::value::ContractValue;
use serde_json::{Map, Value};
use std::ptr;
use tracing::trace;

/// Objects whose members are written and read by index through a contract.
///
/// Generated by `#[derive(Contract)]`; indices follow declaration order of the
/// fields listed in the type's [`TypeDescriptor`].
pub trait ContractObject: Describe {
    /// Writes the member at `index`. `Ok(None)` omits it.
    ///
    /// # Errors
    /// Propagates errors of the member's value.
    fn write_member(
        &self,
        index: usize,
        cx: &mut SerializeContext<'_>,
        transform: Option<crate::contract::ValueTransform>,
    ) -> Result<Option<Value>, ContractError>;

    /// Whether the member at `index` holds its type's default value.
    fn member_is_default(&self, index: usize) -> bool;

    /// Rebuilds the object from the members of a wire object.
    ///
    /// # Errors
    /// Missing or malformed members.
    fn from_members(reader: &MemberReader<'_>) -> Result<Self, ContractError>
    where
        Self: Sized;
}

/// An object currently being written.
#[derive(Debug, Clone, Copy)]
struct Frame {
    address: usize,
    descriptor: &'static TypeDescriptor,
    ignore_cycles: bool,
}

/// State of one serialization pass.
///
/// The convention is fixed for the whole pass, so every nested object is
/// emitted under the same casing.
#[derive(Debug)]
pub struct SerializeContext<'r> {
    resolver: &'r ContractResolver,
    convention: NamingConvention,
    frames: Vec<Frame>,
}

impl<'r> SerializeContext<'r> {
    pub(crate) const fn new(resolver: &'r ContractResolver, convention: NamingConvention) -> Self {
        Self { resolver, convention, frames: Vec::new() }
    }

    #[must_use]
    pub const fn convention(&self) -> NamingConvention {
        self.convention
    }

    /// Current nesting depth in objects.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Writes a described object as a JSON object.
    ///
    /// Returns `Ok(None)` when the object is already being written further up
    /// and the enclosing contract ignores reference cycles.
    ///
    /// # Errors
    /// [`ContractError::ReferenceLoop`] on a cycle that is not ignored, plus
    /// resolution and member errors.
    pub fn write_object<T: ContractObject>(
        &mut self,
        object: &T,
    ) -> Result<Option<Value>, ContractError> {
        let descriptor = T::descriptor();
        let address = ptr::from_ref(object).addr();

        let reentered =
            self.frames.iter().any(|f| f.address == address && ptr::eq(f.descriptor, descriptor));
        if reentered {
            if self.frames.last().is_some_and(|parent| parent.ignore_cycles) {
                trace!(r#type = descriptor.type_name, "Skipping self-referencing member");
                return Ok(None);
            }
            return Err(ContractError::ReferenceLoop {
                message: format!("{} refers back to itself", descriptor.type_name).into(),
                context: None,
            });
        }

        let contract = self.resolver.resolve_contract(descriptor, self.convention)?;
        self.frames.push(Frame {
            address,
            descriptor,
            ignore_cycles: contract.policies().ignore_reference_cycles,
        });
        let members = self.write_members(object, &contract);
        self.frames.pop();

        members.map(|map| Some(Value::Object(map)))
    }

    fn write_members<T: ContractObject>(
        &mut self,
        object: &T,
        contract: &SerializationContract,
    ) -> Result<Map<String, Value>, ContractError> {
        let ContractPolicies { skip_null, skip_default, .. } = contract.policies();
        let mut map = Map::new();

        for member in contract.members() {
            if skip_default && object.member_is_default(member.index()) {
                continue;
            }

            let value = object
                .write_member(member.index(), self, member.transform())
                .map_err(|err| err.in_member(member.name()))?;

            match value {
                Some(Value::Null) if skip_null => {},
                Some(value) => {
                    map.insert(member.name().to_owned(), value);
                },
                None => {},
            }
        }

        Ok(map)
    }
}

/// State of one deserialization pass.
#[derive(Debug, Clone, Copy)]
pub struct DeserializeContext<'r> {
    resolver: &'r ContractResolver,
    convention: NamingConvention,
}

impl<'r> DeserializeContext<'r> {
    pub(crate) const fn new(resolver: &'r ContractResolver, convention: NamingConvention) -> Self {
        Self { resolver, convention }
    }

    #[must_use]
    pub const fn convention(&self) -> NamingConvention {
        self.convention
    }

    /// Reads a described object from a JSON object.
    ///
    /// # Errors
    /// [`ContractError::TypeMismatch`] if `value` is not an object, plus
    /// resolution and member errors.
    pub fn read_object<T: ContractObject>(&self, value: &Value) -> Result<T, ContractError> {
        let descriptor = T::descriptor();
        let Value::Object(object) = value else {
            return Err(ContractError::type_mismatch(
                &format!("an object for {}", descriptor.type_name),
                value,
            ));
        };

        let contract = self.resolver.resolve_contract(descriptor, self.convention)?;
        T::from_members(&MemberReader { object, contract: &contract, cx: *self })
    }
}

/// Member access over one wire object, used by generated `from_members`.
#[derive(Debug)]
pub struct MemberReader<'a> {
    object: &'a Map<String, Value>,
    contract: &'a SerializationContract,
    cx: DeserializeContext<'a>,
}

impl MemberReader<'_> {
    /// Reads the member declared at `index`.
    ///
    /// Emitted names are matched exactly first, then ignoring ASCII case.
    ///
    /// # Errors
    /// Malformed values; absent members for types without a fallback.
    pub fn member<F: ContractValue>(&self, index: usize) -> Result<F, ContractError> {
        let member = self.contract.member_at(index).ok_or_else(|| ContractError::Internal {
            message: format!("no member declared at index {index}").into(),
            context: Some(self.contract.type_name().into()),
        })?;

        match self.lookup(member.name()) {
            Some(value) => {
                F::read(value, &self.cx, member.transform()).map_err(|err| err.in_member(member.name()))
            },
            None => F::missing(member.name()),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.object.get(name).or_else(|| {
            self.object.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, v)| v)
        })
    }
}
