//! `kin list`: print every person with their immediate relationships.

use anyhow::Result;

use crate::graph::model::{People, Person};
use crate::persist;
use crate::store;

pub fn run() -> Result<()> {
    let root = store::find_root()?;
    let snapshot = persist::load(&store::tree_path(&root))?
        .ok_or_else(|| anyhow::anyhow!("kin/tree.json is missing; run `kin init`"))?;

    let lines = list_people(&snapshot.people);
    if lines.is_empty() {
        println!("  No people.");
    } else {
        for line in lines {
            println!("  {line}");
        }
    }
    Ok(())
}

fn list_people(people: &People) -> Vec<String> {
    people
        .iter()
        .map(|(id, person)| {
            let mut line = format!("{} {}{}", id, person.display_name(), lifespan(person));
            if let Some(spouse) = &person.spouse_id {
                line.push_str(&format!("  spouse: {spouse}"));
            }
            if !person.parent_ids.is_empty() {
                line.push_str(&format!("  parents: {}", person.parent_ids.join(", ")));
            }
            let children = person.unique_children();
            if !children.is_empty() {
                line.push_str(&format!("  children: {}", children.join(", ")));
            }
            line
        })
        .collect()
}

fn lifespan(person: &Person) -> String {
    match (&person.birth_date, &person.death_date) {
        (None, None) => String::new(),
        (birth, death) => format!(
            " ({}–{})",
            birth.as_deref().unwrap_or("?"),
            death.as_deref().unwrap_or("")
        ),
    }
}
