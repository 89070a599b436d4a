//! Merging an external snapshot into the current tree.
//!
//! The merge itself is permissive union semantics: people only present in
//! the incoming snapshot are inserted as-is; for people present in both,
//! non-empty incoming scalars win and relationship lists are unioned. That
//! can leave links pointing one way only, so a repair pass afterwards
//! restores spouse and parent/child symmetry. Callers still gate the result
//! through [`crate::graph::validate::validate`].

use std::collections::BTreeSet;

use crate::graph::model::{People, Person};

/// Union-merge `incoming` into `base` and repair symmetry.
pub fn merge(base: &mut People, incoming: &People) {
    for (id, theirs) in incoming.iter() {
        match base.get_mut(id) {
            None => {
                base.0.insert(id.clone(), theirs.clone());
            }
            Some(ours) => merge_person(ours, theirs),
        }
    }
    repair_symmetry(base);
}

fn merge_person(ours: &mut Person, theirs: &Person) {
    if !theirs.first_name.is_empty() {
        ours.first_name = theirs.first_name.clone();
    }
    if !theirs.last_name.is_empty() {
        ours.last_name = theirs.last_name.clone();
    }
    ours.gender = theirs.gender;
    if theirs.spouse_id.is_some() {
        ours.spouse_id = theirs.spouse_id.clone();
    }
    union_into(&mut ours.ex_spouse_ids, &theirs.ex_spouse_ids);
    union_into(&mut ours.parent_ids, &theirs.parent_ids);
    union_into(&mut ours.children, &theirs.children);
    if theirs.birth_date.is_some() {
        ours.birth_date = theirs.birth_date.clone();
    }
    if theirs.death_date.is_some() {
        ours.death_date = theirs.death_date.clone();
    }
    if theirs.image_url.is_some() {
        ours.image_url = theirs.image_url.clone();
    }
    if theirs.bio.is_some() {
        ours.bio = theirs.bio.clone();
    }
    if theirs.cemetery_address.is_some() {
        ours.cemetery_address = theirs.cemetery_address.clone();
    }
    if !theirs.contact_info.phone.is_empty() {
        ours.contact_info.phone = theirs.contact_info.phone.clone();
    }
    if !theirs.contact_info.email.is_empty() {
        ours.contact_info.email = theirs.contact_info.email.clone();
    }
    if !theirs.contact_info.address.is_empty() {
        ours.contact_info.address = theirs.contact_info.address.clone();
    }
}

fn union_into(ours: &mut Vec<String>, theirs: &[String]) {
    for id in theirs {
        if !ours.contains(id) {
            ours.push(id.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Symmetry repair
// ---------------------------------------------------------------------------

/// Restore the invariants a union merge can break.
///
/// Spouse links that are unreciprocated are completed when the other side is
/// unmarried, and demoted to mutual ex-spouse entries when the other side is
/// married to someone else. Parent/child links are completed in whichever
/// direction is missing; a child already holding two parents keeps them and
/// the extra claim is dropped from the claiming parent's `children`.
pub fn repair_symmetry(people: &mut People) {
    dedup_lists(people);
    repair_spouses(people);
    repair_ex_spouses(people);
    repair_parents_cap(people);
    repair_parent_child(people);
}

fn dedup_lists(people: &mut People) {
    for (id, person) in people.0.iter_mut() {
        dedup(&mut person.ex_spouse_ids);
        dedup(&mut person.parent_ids);
        dedup(&mut person.children);
        // Self-references can only come from corrupt input.
        person.ex_spouse_ids.retain(|r| r != id);
        person.parent_ids.retain(|r| r != id);
        person.children.retain(|r| r != id);
        if person.spouse_id.as_deref() == Some(id) {
            person.spouse_id = None;
        }
    }
}

fn dedup(list: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    list.retain(|id| seen.insert(id.clone()));
}

fn repair_spouses(people: &mut People) {
    let ids: Vec<String> = people.ids().map(str::to_string).collect();
    for id in &ids {
        let Some(spouse_id) = people.get(id).and_then(|p| p.spouse_id.clone()) else {
            continue;
        };
        let Some(spouse) = people.get(&spouse_id) else {
            // Dangling: left for validate() to report.
            continue;
        };
        match spouse.spouse_id.as_deref() {
            Some(back) if back == id => {}
            None => {
                people.get_mut(&spouse_id).expect("present above").spouse_id =
                    Some(id.clone());
            }
            Some(_other) => {
                // The other side is married elsewhere: demote this link to an
                // ex-marriage on both sides.
                let person = people.get_mut(id).expect("iterating known ids");
                person.spouse_id = None;
                if !person.ex_spouse_ids.contains(&spouse_id) {
                    person.ex_spouse_ids.push(spouse_id.clone());
                }
                let spouse = people.get_mut(&spouse_id).expect("present above");
                if !spouse.ex_spouse_ids.contains(id) {
                    spouse.ex_spouse_ids.push(id.clone());
                }
            }
        }
    }
}

fn repair_ex_spouses(people: &mut People) {
    let mut missing: Vec<(String, String)> = Vec::new();
    for (id, person) in people.iter() {
        for ex in &person.ex_spouse_ids {
            if let Some(other) = people.get(ex)
                && !other.ex_spouse_ids.contains(id)
            {
                missing.push((ex.clone(), id.clone()));
            }
        }
    }
    for (holder, entry) in missing {
        if let Some(person) = people.get_mut(&holder)
            && !person.ex_spouse_ids.contains(&entry)
        {
            person.ex_spouse_ids.push(entry);
        }
    }
}

fn repair_parents_cap(people: &mut People) {
    let mut dropped: Vec<(String, String)> = Vec::new();
    for (id, person) in people.0.iter_mut() {
        while person.parent_ids.len() > 2 {
            let extra = person.parent_ids.pop().expect("len checked");
            dropped.push((extra, id.clone()));
        }
    }
    for (parent_id, child_id) in dropped {
        if let Some(parent) = people.get_mut(&parent_id) {
            parent.children.retain(|c| *c != child_id);
        }
    }
}

fn repair_parent_child(people: &mut People) {
    // Parent claims a child the child does not know about.
    let mut add_parent: Vec<(String, String)> = Vec::new();
    let mut drop_child: Vec<(String, String)> = Vec::new();
    for (id, person) in people.iter() {
        for child_id in &person.children {
            let Some(child) = people.get(child_id) else {
                continue;
            };
            if child.parent_ids.iter().any(|p| p == id) {
                continue;
            }
            if child.parent_ids.len() < 2 {
                add_parent.push((child_id.clone(), id.clone()));
            } else {
                drop_child.push((id.clone(), child_id.clone()));
            }
        }
    }
    for (child_id, parent_id) in add_parent {
        if let Some(child) = people.get_mut(&child_id)
            && !child.parent_ids.contains(&parent_id)
            && child.parent_ids.len() < 2
        {
            child.parent_ids.push(parent_id);
        }
    }
    for (parent_id, child_id) in drop_child {
        if let Some(parent) = people.get_mut(&parent_id) {
            parent.children.retain(|c| *c != child_id);
        }
    }

    // Child lists a parent who does not know about the child.
    let mut add_child: Vec<(String, String)> = Vec::new();
    for (id, person) in people.iter() {
        for parent_id in &person.parent_ids {
            if let Some(parent) = people.get(parent_id)
                && !parent.children.iter().any(|c| c == id)
            {
                add_child.push((parent_id.clone(), id.clone()));
            }
        }
    }
    for (parent_id, child_id) in add_child {
        if let Some(parent) = people.get_mut(&parent_id)
            && !parent.children.contains(&child_id)
        {
            parent.children.push(child_id);
        }
    }
}
