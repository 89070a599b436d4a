//! The family graph: `Person` records keyed by id.
//!
//! A `People` map is the whole tree. Relationship fields are plain id
//! references; the symmetry rules (spouse links point both ways, a parent's
//! `children` entry mirrors the child's `parent_ids` entry) are maintained by
//! the mutation operations in [`crate::graph::mutate`] and checked for
//! externally supplied data by [`crate::graph::validate`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The distinguished founder id. The founder can never be deleted while any
/// other person exists.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// UI default for a newly added spouse.
    pub fn opposite(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Self::Male
    }
}

/// Free-form contact details. Purely descriptive; never affects the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address: String,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phone.is_empty() && self.email.is_empty() && self.address.is_empty()
    }
}

/// A node in the family graph.
///
/// `id` is opaque and immutable after creation. Dates are either full
/// calendar dates or bare 4-digit years, stored as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spouse_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ex_spouse_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cemetery_address: Option<String>,
    #[serde(default, skip_serializing_if = "ContactInfo::is_empty")]
    pub contact_info: ContactInfo,
}

impl Person {
    pub fn new(id: impl Into<String>, details: PersonDetails) -> Self {
        Self {
            id: id.into(),
            first_name: details.first_name,
            last_name: details.last_name,
            gender: details.gender,
            spouse_id: None,
            ex_spouse_ids: Vec::new(),
            parent_ids: Vec::new(),
            children: Vec::new(),
            birth_date: details.birth_date,
            death_date: details.death_date,
            image_url: None,
            bio: None,
            cemetery_address: None,
            contact_info: ContactInfo::default(),
        }
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => self.id.clone(),
        }
    }

    /// At least one name component must be non-empty for a person to be
    /// persisted.
    pub fn has_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    pub fn is_deceased(&self) -> bool {
        self.death_date.is_some()
    }

    /// Children with duplicates removed, preserving first-seen order.
    ///
    /// The stored list can accumulate duplicates through merges of older
    /// snapshots; readers always go through this.
    pub fn unique_children(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for child in &self.children {
            if !seen.contains(&child.as_str()) {
                seen.push(child.as_str());
            }
        }
        seen
    }
}

/// New-person field data supplied by a form or command flag.
#[derive(Debug, Clone, Default)]
pub struct PersonDetails {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<String>,
    pub death_date: Option<String>,
}

/// The whole family graph.
///
/// A `BTreeMap` keyed by id: iteration order is deterministic, which the
/// breadth-first queries rely on for stable tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct People(pub BTreeMap<String, Person>);

impl People {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh single-person tree with the founder as `"root"`.
    pub fn with_founder(details: PersonDetails) -> Self {
        let mut people = Self::new();
        people
            .0
            .insert(ROOT_ID.to_string(), Person::new(ROOT_ID, details));
        people
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Person> {
        self.0.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Person)> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Smallest unused `p{n}` id.
    pub fn next_id(&self) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("p{n}");
            if !self.0.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(first: &str, last: &str) -> PersonDetails {
        PersonDetails {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..PersonDetails::default()
        }
    }

    #[test]
    fn founder_tree_has_root() {
        let people = People::with_founder(details("Ada", "Byron"));
        assert!(people.contains(ROOT_ID));
        assert_eq!(people.len(), 1);
    }

    #[test]
    fn next_id_skips_taken_suffixes() {
        let mut people = People::with_founder(details("A", "B"));
        assert_eq!(people.next_id(), "p1");
        people
            .0
            .insert("p1".to_string(), Person::new("p1", details("C", "D")));
        assert_eq!(people.next_id(), "p2");
    }

    #[test]
    fn unique_children_deduplicates_preserving_order() {
        let mut p = Person::new("x", details("A", "B"));
        p.children = vec!["c2".into(), "c1".into(), "c2".into()];
        assert_eq!(p.unique_children(), vec!["c2", "c1"]);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let p = Person::new("p9", PersonDetails::default());
        assert_eq!(p.display_name(), "p9");
        assert!(!p.has_name());
    }

    #[test]
    fn person_round_trips_through_json_with_camel_case_fields() {
        let mut p = Person::new("p1", details("Ada", "Byron"));
        p.spouse_id = Some("root".to_string());
        p.birth_date = Some("1815".to_string());
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"firstName\":\"Ada\""));
        assert!(json.contains("\"spouseId\":\"root\""));
        assert!(!json.contains("exSpouseIds"), "empty lists are omitted");
        let back: Person = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
