use crate::error::PersonsError;
use crate::model::Person;
use chrono::NaiveDate;
use parking_lot::RwLock;
use polycase_kernel::domain::registry::FeatureSlice;
use std::any::Any;

const SEED: [(&str, &str, (i32, u32, u32)); 3] = [
    ("Ada", "Lovelace", (1815, 12, 10)),
    ("Alan", "Turing", (1912, 6, 23)),
    ("Grace", "Hopper", (1906, 12, 9)),
];

/// In-memory person storage shared by the persons routes.
#[derive(Debug, Default)]
pub struct PersonStore {
    people: RwLock<Vec<Person>>,
}

impl PersonStore {
    #[must_use]
    pub fn new(people: Vec<Person>) -> Self {
        Self { people: RwLock::new(people) }
    }

    /// A store holding the mock people served by the demo API.
    ///
    /// # Errors
    /// Returns an error if a seed date is not a valid calendar date.
    pub fn seeded() -> Result<Self, PersonsError> {
        let people = SEED
            .iter()
            .zip(1..)
            .map(|(&(first_name, last_name, (year, month, day)), id)| {
                let dob = NaiveDate::from_ymd_opt(year, month, day)
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .ok_or_else(|| PersonsError::Seed {
                        message: format!("{year}-{month}-{day}").into(),
                        context: Some(format!("{first_name} {last_name}").into()),
                    })?;
                Ok(Person {
                    id,
                    first_name: first_name.to_owned(),
                    last_name: last_name.to_owned(),
                    dob: Some(dob),
                })
            })
            .collect::<Result<Vec<_>, PersonsError>>()?;

        Ok(Self::new(people))
    }

    #[must_use]
    pub fn list(&self) -> Vec<Person> {
        self.people.read().clone()
    }

    #[must_use]
    pub fn get(&self, id: i32) -> Option<Person> {
        self.people.read().iter().find(|p| p.id == id).cloned()
    }

    /// Stores a new person. A missing or already taken id is replaced by a free one.
    ///
    /// # Errors
    /// Returns [`PersonsError::IdsExhausted`] if every positive id is taken.
    pub fn insert(&self, mut person: Person) -> Result<Person, PersonsError> {
        let mut people = self.people.write();
        if person.id <= 0 || people.iter().any(|p| p.id == person.id) {
            person.id = next_id(&people).ok_or_else(|| PersonsError::IdsExhausted {
                message: format!("{} people stored", people.len()).into(),
                context: None,
            })?;
        }
        people.push(person.clone());
        Ok(person)
    }

    /// Replaces the person stored under `id`, keeping the id. Returns `false` if absent.
    pub fn update(&self, id: i32, mut person: Person) -> bool {
        let mut people = self.people.write();
        let Some(slot) = people.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        person.id = id;
        *slot = person;
        true
    }

    /// Returns `false` if no person is stored under `id`.
    pub fn remove(&self, id: i32) -> bool {
        let mut people = self.people.write();
        let before = people.len();
        people.retain(|p| p.id != id);
        people.len() != before
    }
}

/// One past the highest id, or the lowest free positive id once that would overflow.
fn next_id(people: &[Person]) -> Option<i32> {
    let highest = people.iter().map(|p| p.id).max().unwrap_or(0);
    highest
        .checked_add(1)
        .or_else(|| (1..i32::MAX).find(|id| people.iter().all(|p| p.id != *id)))
}

impl FeatureSlice for PersonStore {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: i32, first_name: &str) -> Person {
        Person { id, first_name: first_name.to_owned(), last_name: "Test".to_owned(), dob: None }
    }

    #[test]
    fn seeded_store_has_the_mock_people() {
        let store = PersonStore::seeded().unwrap();
        let people = store.list();

        assert_eq!(people.len(), 3);
        assert_eq!(people[0].first_name, "Ada");
        assert_eq!(people.iter().map(|p| p.id).collect::<Vec<_>>(), [1, 2, 3]);
    }

    #[test]
    fn insert_assigns_free_ids() {
        let store = PersonStore::new(vec![person(1, "a"), person(5, "b")]);

        assert_eq!(store.insert(person(0, "c")).unwrap().id, 6);
        assert_eq!(store.insert(person(1, "d")).unwrap().id, 7);
        assert_eq!(store.insert(person(9, "e")).unwrap().id, 9);
    }

    #[test]
    fn insert_after_the_highest_id_reuses_a_gap() {
        let store = PersonStore::new(vec![person(1, "a"), person(3, "b")]);

        assert_eq!(store.insert(person(i32::MAX, "max")).unwrap().id, i32::MAX);
        assert_eq!(store.insert(person(0, "c")).unwrap().id, 2);
        assert_eq!(store.insert(person(i32::MAX, "d")).unwrap().id, 4);
        assert_eq!(store.list().len(), 5);
    }

    #[test]
    fn update_and_remove_report_missing_ids() {
        let store = PersonStore::new(vec![person(1, "a")]);

        assert!(store.update(1, person(42, "renamed")));
        assert_eq!(store.get(1).map(|p| p.first_name), Some("renamed".to_owned()));
        assert!(!store.update(2, person(2, "x")));

        assert!(store.remove(1));
        assert!(!store.remove(1));
        assert!(store.list().is_empty());
    }
}
