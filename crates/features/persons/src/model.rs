use chrono::NaiveDateTime;
use polycase_contract::Contract;

/// A person as exposed by the API.
///
/// The date of birth is emitted as `DateOfBirth` in the request's casing
/// (`dateOfBirth`, `date_of_birth`, ..) and always as a bare `YYYY-MM-DD` date.
#[derive(Debug, Clone, PartialEq, Eq, Contract)]
pub struct Person {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[contract(rename = "DateOfBirth", date_only)]
    pub dob: Option<NaiveDateTime>,
}
