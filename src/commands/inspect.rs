//! `kin inspect`: query the tree for specific conditions.

use anyhow::Result;
use crossterm::style::Stylize;

use crate::graph::model::People;
use crate::graph::query::{self, RelationKind};
use crate::graph::validate::validate;
use crate::persist::Snapshot;
use crate::{persist, store};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

pub fn run_validate() -> Result<()> {
    let snapshot = load_snapshot()?;
    match validate(&snapshot.people, &snapshot.root_id_stack) {
        Ok(()) => println!(
            "  {} {} people, every reference resolves",
            "Valid".green().bold(),
            snapshot.people.len()
        ),
        Err(err) => println!("  {} {}", "Invalid".red().bold(), err),
    }
    Ok(())
}

pub fn run_path(from: &str, to: &str) -> Result<()> {
    let snapshot = load_snapshot()?;
    for line in path_report(&snapshot.people, from, to) {
        println!("  {line}");
    }
    Ok(())
}

pub fn run_generations() -> Result<()> {
    let snapshot = load_snapshot()?;
    let root = snapshot
        .root_id_stack
        .first()
        .map(String::as_str)
        .unwrap_or(crate::graph::model::ROOT_ID);
    let lines = generation_report(&snapshot.people, root);
    if lines.is_empty() {
        println!("  No one reachable from {root}.");
    } else {
        for line in lines {
            println!("  {line}");
        }
    }
    Ok(())
}

pub fn run_family(a: &str, b: &str) -> Result<()> {
    let snapshot = load_snapshot()?;
    for line in family_report(&snapshot.people, a, b) {
        println!("  {line}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pure reports
// ---------------------------------------------------------------------------

fn path_report(people: &People, from: &str, to: &str) -> Vec<String> {
    for id in [from, to] {
        if !people.contains(id) {
            return vec![format!("Person not found: {id}")];
        }
    }
    match query::relationship_path(people, from, to) {
        None => vec![format!("{from} and {to} are not connected.")],
        Some(path) => {
            let mut lines = vec![format!("{} steps:", path.len().saturating_sub(1))];
            for pair in path.windows(2) {
                let label = query::relation_between(people, &pair[0], &pair[1])
                    .map(RelationKind::label)
                    .unwrap_or("related to");
                lines.push(format!(
                    "{} {} {}",
                    display(people, &pair[0]),
                    label,
                    display(people, &pair[1])
                ));
            }
            lines
        }
    }
}

fn generation_report(people: &People, root: &str) -> Vec<String> {
    let levels = query::generation_levels(people, root);
    let mut by_level: Vec<(i64, Vec<&str>)> = Vec::new();
    for (id, level) in &levels {
        match by_level.iter_mut().find(|(l, _)| l == level) {
            Some((_, ids)) => ids.push(id),
            None => by_level.push((*level, vec![id])),
        }
    }
    by_level.sort_by_key(|(level, _)| *level);
    by_level
        .into_iter()
        .map(|(level, ids)| {
            let names: Vec<String> = ids.iter().map(|id| display(people, id)).collect();
            format!("generation {level}: {}", names.join(", "))
        })
        .collect()
}

fn family_report(people: &People, a: &str, b: &str) -> Vec<String> {
    for id in [a, b] {
        if !people.contains(id) {
            return vec![format!("Person not found: {id}")];
        }
    }
    query::family_unit(people, a, b)
        .iter()
        .map(|id| format!("{id} {}", display(people, id)))
        .collect()
}

fn display(people: &People, id: &str) -> String {
    people
        .get(id)
        .map(|p| p.display_name())
        .unwrap_or_else(|| id.to_string())
}

fn load_snapshot() -> Result<Snapshot> {
    let root = store::find_root()?;
    persist::load(&store::tree_path(&root))?
        .ok_or_else(|| anyhow::anyhow!("kin/tree.json is missing; run `kin init`"))
}
