//! Derived read-only queries over the family graph.
//!
//! Everything here is pure and total: unreachable or degenerate inputs give
//! `None`/empty results, never errors.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::graph::model::People;

/// The kind of direct connection between two adjacent people.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Spouse,
    ExSpouse,
    /// First id is the parent of the second.
    ParentOf,
    /// First id is a child of the second.
    ChildOf,
}

impl RelationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Spouse => "spouse of",
            Self::ExSpouse => "ex-spouse of",
            Self::ParentOf => "parent of",
            Self::ChildOf => "child of",
        }
    }
}

/// The direct relation from `a` to `b`, if any.
pub fn relation_between(people: &People, a: &str, b: &str) -> Option<RelationKind> {
    let pa = people.get(a)?;
    if pa.spouse_id.as_deref() == Some(b) {
        return Some(RelationKind::Spouse);
    }
    if pa.ex_spouse_ids.iter().any(|id| id == b) {
        return Some(RelationKind::ExSpouse);
    }
    if pa.children.iter().any(|id| id == b) {
        return Some(RelationKind::ParentOf);
    }
    if pa.parent_ids.iter().any(|id| id == b) {
        return Some(RelationKind::ChildOf);
    }
    None
}

// ---------------------------------------------------------------------------
// Family units
// ---------------------------------------------------------------------------

/// The set of ids implied by a single relationship edge, used for
/// highlight-on-click.
///
/// A spouse edge yields both spouses plus their joint children; a
/// parent-child edge yields the parent, the parent's current spouse, and all
/// of that parent's children. Any other edge falls back to `{a, b}`.
pub fn family_unit(people: &People, a: &str, b: &str) -> BTreeSet<String> {
    let mut unit = BTreeSet::new();
    unit.insert(a.to_string());
    unit.insert(b.to_string());

    match relation_between(people, a, b) {
        Some(RelationKind::Spouse) => {
            let (Some(pa), Some(pb)) = (people.get(a), people.get(b)) else {
                return unit;
            };
            for child in pa.unique_children() {
                if pb.children.iter().any(|c| c == child) {
                    unit.insert(child.to_string());
                }
            }
        }
        Some(RelationKind::ParentOf) => extend_with_parent_household(people, a, &mut unit),
        Some(RelationKind::ChildOf) => extend_with_parent_household(people, b, &mut unit),
        Some(RelationKind::ExSpouse) | None => {}
    }
    unit
}

fn extend_with_parent_household(people: &People, parent_id: &str, unit: &mut BTreeSet<String>) {
    let Some(parent) = people.get(parent_id) else {
        return;
    };
    if let Some(spouse) = &parent.spouse_id {
        unit.insert(spouse.clone());
    }
    for child in parent.unique_children() {
        unit.insert(child.to_string());
    }
}

/// Spouse, parents, and children of `id`, the hover-highlight set.
pub fn direct_connections(people: &People, id: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let Some(person) = people.get(id) else {
        return out;
    };
    if let Some(spouse) = &person.spouse_id {
        out.insert(spouse.clone());
    }
    for parent in &person.parent_ids {
        out.insert(parent.clone());
    }
    for child in person.unique_children() {
        out.insert(child.to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Path finding
// ---------------------------------------------------------------------------

/// Shortest path of person ids from `from` to `to` over the undirected
/// relationship graph (spouse, ex-spouse, parent, child edges), inclusive of
/// both endpoints. `None` when either id is unknown or the two are
/// disconnected.
///
/// Breadth-first with a visited set: parent/child edges are bidirectional in
/// the search graph and corrupt ex-spouse data can introduce cycles, so no
/// id is ever expanded twice. Ties between equally short paths resolve to
/// first-discovered order, which is deterministic because neighbor order is
/// fixed (spouse, ex-spouses, parents, children).
pub fn relationship_path(people: &People, from: &str, to: &str) -> Option<Vec<String>> {
    if !people.contains(from) || !people.contains(to) {
        return None;
    }
    if from == to {
        return Some(vec![from.to_string()]);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut came_from: HashMap<&str, &str> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(from);
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        for neighbor in neighbors(people, current) {
            if !visited.insert(neighbor) {
                continue;
            }
            came_from.insert(neighbor, current);
            if neighbor == to {
                return Some(rebuild_path(&came_from, from, to));
            }
            queue.push_back(neighbor);
        }
    }
    None
}

fn neighbors<'a>(people: &'a People, id: &str) -> Vec<&'a str> {
    let Some(person) = people.get(id) else {
        return Vec::new();
    };
    let mut out: Vec<&str> = Vec::new();
    if let Some(spouse) = &person.spouse_id {
        out.push(spouse.as_str());
    }
    for ex in &person.ex_spouse_ids {
        out.push(ex.as_str());
    }
    for parent in &person.parent_ids {
        out.push(parent.as_str());
    }
    for child in &person.children {
        out.push(child.as_str());
    }
    // Only ids actually present participate in the search graph.
    out.retain(|id| people.contains(id));
    out
}

fn rebuild_path(came_from: &HashMap<&str, &str>, from: &str, to: &str) -> Vec<String> {
    let mut path = vec![to.to_string()];
    let mut cursor = to;
    while cursor != from {
        cursor = came_from[cursor];
        path.push(cursor.to_string());
    }
    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Generation levels
// ---------------------------------------------------------------------------

/// Generation tier of every person reachable from `root_id`.
///
/// The root is generation 0, children of a visited person are one tier
/// lower, and a spouse shares their partner's tier so co-parents sit on one
/// generational row. Ids already assigned are never revisited, which guards
/// against the same person being reachable through both a parent and a
/// spouse edge, and against cycles from corrupt data.
pub fn generation_levels(people: &People, root_id: &str) -> BTreeMap<String, i64> {
    let mut levels: BTreeMap<String, i64> = BTreeMap::new();
    if !people.contains(root_id) {
        return levels;
    }

    let mut queue: VecDeque<(String, i64)> = VecDeque::new();
    levels.insert(root_id.to_string(), 0);
    queue.push_back((root_id.to_string(), 0));

    while let Some((id, level)) = queue.pop_front() {
        let Some(person) = people.get(&id) else {
            continue;
        };
        if let Some(spouse) = &person.spouse_id
            && people.contains(spouse)
            && !levels.contains_key(spouse)
        {
            levels.insert(spouse.clone(), level);
            queue.push_back((spouse.clone(), level));
        }
        for child in person.unique_children() {
            if people.contains(child) && !levels.contains_key(child) {
                levels.insert(child.to_string(), level + 1);
                queue.push_back((child.to_string(), level + 1));
            }
        }
    }
    levels
}
