//! Structural edit operations over the family graph.
//!
//! Every operation resolves and checks its preconditions before the first
//! write, so a failed call leaves the graph untouched. After a successful
//! call the symmetry invariants hold again: spouse links point both ways,
//! and `children`/`parent_ids` mirror each other.

use crate::graph::error::GraphError;
use crate::graph::model::{ContactInfo, Gender, People, Person, PersonDetails, ROOT_ID};

/// Result of [`delete_person`]: the tree-emptied case is a recognized
/// terminal state, not an error, so the caller can reset to "no tree yet"
/// instead of rendering a broken empty diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    TreeEmptied,
}

/// Descriptive fields for [`edit_person`]. Relationship fields are
/// deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct PersonEdit {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub cemetery_address: Option<String>,
    pub contact_info: ContactInfo,
}

impl PersonEdit {
    pub fn from_person(p: &Person) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            gender: p.gender,
            birth_date: p.birth_date.clone(),
            death_date: p.death_date.clone(),
            image_url: p.image_url.clone(),
            bio: p.bio.clone(),
            cemetery_address: p.cemetery_address.clone(),
            contact_info: p.contact_info.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Spouse operations
// ---------------------------------------------------------------------------

/// Add a brand-new person as `anchor`'s current spouse.
///
/// If the anchor already had a spouse, that marriage becomes an ex-marriage
/// on both sides first (the divorce/remarriage transition). Returns the new
/// person's id.
pub fn add_spouse(
    people: &mut People,
    anchor_id: &str,
    details: PersonDetails,
) -> Result<String, GraphError> {
    if !people.contains(anchor_id) {
        return Err(GraphError::NotFound(anchor_id.to_string()));
    }
    let new_id = people.next_id();

    divorce_current_spouse(people, anchor_id);

    let mut spouse = Person::new(new_id.clone(), details);
    spouse.spouse_id = Some(anchor_id.to_string());
    people.0.insert(new_id.clone(), spouse);
    people.get_mut(anchor_id).expect("anchor checked above").spouse_id = Some(new_id.clone());

    Ok(new_id)
}

/// Re-marry `anchor` to a person already in the graph, typically one of
/// their recorded ex-spouses. Both ids lose their mutual ex-spouse entries.
pub fn rejoin_spouse(
    people: &mut People,
    anchor_id: &str,
    existing_id: &str,
) -> Result<(), GraphError> {
    if !people.contains(anchor_id) {
        return Err(GraphError::NotFound(anchor_id.to_string()));
    }
    if !people.contains(existing_id) {
        return Err(GraphError::NotFound(existing_id.to_string()));
    }

    // Any current marriages on either side end first, keeping the
    // one-current-spouse rule intact.
    divorce_current_spouse(people, anchor_id);
    divorce_current_spouse(people, existing_id);

    let anchor = people.get_mut(anchor_id).expect("checked above");
    anchor.spouse_id = Some(existing_id.to_string());
    anchor.ex_spouse_ids.retain(|id| id != existing_id);

    let existing = people.get_mut(existing_id).expect("checked above");
    existing.spouse_id = Some(anchor_id.to_string());
    existing.ex_spouse_ids.retain(|id| id != anchor_id);

    Ok(())
}

/// End `anchor_id`'s current marriage, recording the ex-spouse link on both
/// sides. No-op when unmarried.
fn divorce_current_spouse(people: &mut People, anchor_id: &str) {
    let Some(old_spouse_id) = people.get(anchor_id).and_then(|p| p.spouse_id.clone()) else {
        return;
    };
    if let Some(anchor) = people.get_mut(anchor_id) {
        anchor.spouse_id = None;
        if !anchor.ex_spouse_ids.contains(&old_spouse_id) {
            anchor.ex_spouse_ids.push(old_spouse_id.clone());
        }
    }
    if let Some(old_spouse) = people.get_mut(&old_spouse_id) {
        old_spouse.spouse_id = None;
        if !old_spouse.ex_spouse_ids.iter().any(|id| id == anchor_id) {
            old_spouse.ex_spouse_ids.push(anchor_id.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Parent / child / sibling operations
// ---------------------------------------------------------------------------

/// Add a new child of `anchor`. When the anchor has a current spouse the
/// child gets both co-parents, anchor first.
pub fn add_child(
    people: &mut People,
    anchor_id: &str,
    details: PersonDetails,
) -> Result<String, GraphError> {
    let Some(anchor) = people.get(anchor_id) else {
        return Err(GraphError::NotFound(anchor_id.to_string()));
    };
    let spouse_id = anchor.spouse_id.clone();
    let new_id = people.next_id();

    let mut child = Person::new(new_id.clone(), details);
    child.parent_ids.push(anchor_id.to_string());
    if let Some(spouse_id) = &spouse_id {
        child.parent_ids.push(spouse_id.clone());
    }
    people.0.insert(new_id.clone(), child);

    people
        .get_mut(anchor_id)
        .expect("anchor checked above")
        .children
        .push(new_id.clone());
    if let Some(spouse_id) = &spouse_id
        && let Some(spouse) = people.get_mut(spouse_id)
    {
        spouse.children.push(new_id.clone());
    }

    Ok(new_id)
}

/// Add a new parent of `anchor`. Rejected once the anchor already has two.
///
/// When exactly one other parent exists, the two parents are linked as
/// spouses: adding the second parent models discovering the other half of an
/// existing single-parent record.
pub fn add_parent(
    people: &mut People,
    anchor_id: &str,
    details: PersonDetails,
) -> Result<String, GraphError> {
    let Some(anchor) = people.get(anchor_id) else {
        return Err(GraphError::NotFound(anchor_id.to_string()));
    };
    if anchor.parent_ids.len() >= 2 {
        return Err(GraphError::ParentSlotsFull(anchor_id.to_string()));
    }
    let existing_parent_id = anchor.parent_ids.first().cloned();
    let new_id = people.next_id();

    let mut parent = Person::new(new_id.clone(), details);
    parent.children.push(anchor_id.to_string());

    if let Some(other_id) = &existing_parent_id {
        divorce_current_spouse(people, other_id);
        parent.spouse_id = Some(other_id.clone());
    }
    people.0.insert(new_id.clone(), parent);
    if let Some(other_id) = &existing_parent_id
        && let Some(other) = people.get_mut(other_id)
    {
        other.spouse_id = Some(new_id.clone());
    }

    people
        .get_mut(anchor_id)
        .expect("anchor checked above")
        .parent_ids
        .push(new_id.clone());

    Ok(new_id)
}

/// Add a new sibling sharing all of `anchor`'s parents. Requires the anchor
/// to have at least one recorded parent.
pub fn add_sibling(
    people: &mut People,
    anchor_id: &str,
    details: PersonDetails,
) -> Result<String, GraphError> {
    let Some(anchor) = people.get(anchor_id) else {
        return Err(GraphError::NotFound(anchor_id.to_string()));
    };
    if anchor.parent_ids.is_empty() {
        return Err(GraphError::MissingParents(anchor_id.to_string()));
    }
    let parent_ids = anchor.parent_ids.clone();
    let new_id = people.next_id();

    let mut sibling = Person::new(new_id.clone(), details);
    sibling.parent_ids = parent_ids.clone();
    people.0.insert(new_id.clone(), sibling);

    for parent_id in &parent_ids {
        if let Some(parent) = people.get_mut(parent_id) {
            parent.children.push(new_id.clone());
        }
    }

    Ok(new_id)
}

// ---------------------------------------------------------------------------
// Edit / delete
// ---------------------------------------------------------------------------

/// Replace a person's descriptive fields. Relationship fields are never
/// touched.
pub fn edit_person(people: &mut People, id: &str, edit: PersonEdit) -> Result<(), GraphError> {
    let Some(person) = people.get_mut(id) else {
        return Err(GraphError::NotFound(id.to_string()));
    };
    person.first_name = edit.first_name;
    person.last_name = edit.last_name;
    person.gender = edit.gender;
    person.birth_date = edit.birth_date;
    person.death_date = edit.death_date;
    person.image_url = edit.image_url;
    person.bio = edit.bio;
    person.cemetery_address = edit.cemetery_address;
    person.contact_info = edit.contact_info;
    Ok(())
}

/// Remove a person and repair every reference to them: spouse links are
/// cleared, ex-spouse entries dropped, and parent/child links removed on the
/// surviving side. The founder is refused outright.
pub fn delete_person(people: &mut People, id: &str) -> Result<DeleteOutcome, GraphError> {
    if id == ROOT_ID {
        return Err(GraphError::ProtectedNode);
    }
    if !people.contains(id) {
        return Err(GraphError::NotFound(id.to_string()));
    }

    people.0.remove(id);
    for (_, person) in people.0.iter_mut() {
        if person.spouse_id.as_deref() == Some(id) {
            person.spouse_id = None;
        }
        person.ex_spouse_ids.retain(|r| r != id);
        person.parent_ids.retain(|r| r != id);
        person.children.retain(|r| r != id);
    }

    if people.is_empty() {
        Ok(DeleteOutcome::TreeEmptied)
    } else {
        Ok(DeleteOutcome::Removed)
    }
}
