//! Referential-integrity gate for externally supplied graphs.
//!
//! Every snapshot that crosses a trust boundary (store load, import, merge,
//! share restore) passes through [`validate`] before the session accepts it.
//! The check reports the first violation found, naming the person and the
//! field holding the bad reference, so import failures are actionable.

use crate::graph::error::{GraphError, RefField};
use crate::graph::model::People;

/// Check that every id referenced by any relationship field exists in the
/// map, and that every id on the navigation stack exists.
pub fn validate(people: &People, root_stack: &[String]) -> Result<(), GraphError> {
    for (id, person) in people.iter() {
        if let Some(spouse) = &person.spouse_id
            && !people.contains(spouse)
        {
            return Err(dangling(id, RefField::Spouse, spouse));
        }
        for ex in &person.ex_spouse_ids {
            if !people.contains(ex) {
                return Err(dangling(id, RefField::ExSpouse, ex));
            }
        }
        for parent in &person.parent_ids {
            if !people.contains(parent) {
                return Err(dangling(id, RefField::Parent, parent));
            }
        }
        for child in &person.children {
            if !people.contains(child) {
                return Err(dangling(id, RefField::Child, child));
            }
        }
    }

    for entry in root_stack {
        if !people.contains(entry) {
            return Err(dangling(entry, RefField::RootStack, entry));
        }
    }

    Ok(())
}

fn dangling(person: &str, field: RefField, missing: &str) -> GraphError {
    GraphError::Validation {
        person: person.to_string(),
        field,
        missing: missing.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Person, PersonDetails, ROOT_ID};

    fn person(id: &str) -> Person {
        Person::new(
            id,
            PersonDetails {
                first_name: id.to_uppercase(),
                ..PersonDetails::default()
            },
        )
    }

    fn tree(ids: &[&str]) -> People {
        let mut people = People::new();
        for id in ids {
            people.0.insert(id.to_string(), person(id));
        }
        people
    }

    #[test]
    fn empty_graph_is_valid() {
        assert_eq!(validate(&People::new(), &[]), Ok(()));
    }

    #[test]
    fn intact_graph_passes() {
        let mut people = tree(&[ROOT_ID, "p1"]);
        people.get_mut(ROOT_ID).unwrap().spouse_id = Some("p1".to_string());
        people.get_mut("p1").unwrap().spouse_id = Some(ROOT_ID.to_string());
        assert_eq!(validate(&people, &[ROOT_ID.to_string()]), Ok(()));
    }

    #[test]
    fn dangling_spouse_names_person_and_field() {
        let mut people = tree(&["x"]);
        people.get_mut("x").unwrap().spouse_id = Some("ghost".to_string());
        let err = validate(&people, &[]).unwrap_err();
        assert_eq!(
            err,
            GraphError::Validation {
                person: "x".to_string(),
                field: RefField::Spouse,
                missing: "ghost".to_string(),
            }
        );
        let msg = err.to_string();
        assert!(msg.contains('x') && msg.contains("spouseId") && msg.contains("ghost"));
    }

    #[test]
    fn dangling_child_is_rejected() {
        let mut people = tree(&[ROOT_ID]);
        people.get_mut(ROOT_ID).unwrap().children.push("gone".to_string());
        let err = validate(&people, &[]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Validation {
                field: RefField::Child,
                ..
            }
        ));
    }

    #[test]
    fn dangling_parent_and_ex_spouse_are_rejected() {
        let mut people = tree(&[ROOT_ID]);
        people
            .get_mut(ROOT_ID)
            .unwrap()
            .parent_ids
            .push("nobody".to_string());
        assert!(validate(&people, &[]).is_err());

        let mut people = tree(&[ROOT_ID]);
        people
            .get_mut(ROOT_ID)
            .unwrap()
            .ex_spouse_ids
            .push("nobody".to_string());
        assert!(validate(&people, &[]).is_err());
    }

    #[test]
    fn stack_entry_must_exist() {
        let people = tree(&[ROOT_ID]);
        let err = validate(&people, &["missing".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Validation {
                field: RefField::RootStack,
                ..
            }
        ));
    }
}
