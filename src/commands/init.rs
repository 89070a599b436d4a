//! `kin init`: start a family tree in the current directory.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Result, bail};
use crossterm::style::Stylize;

use crate::graph::model::{Gender, PersonDetails};
use crate::persist;
use crate::session::TreeSession;
use crate::store;

/// Entry point called from `main`.
pub fn run() -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root, None)
}

/// Run init inside `root`.
///
/// `founder`:
/// - `None`    → prompt for the founder's name interactively
/// - `Some(d)` → use `d` without prompting
pub fn run_in(root: &Path, founder: Option<PersonDetails>) -> Result<()> {
    let kin_dir = store::kin_dir(root);

    if kin_dir.join("tree.json").exists() {
        bail!("a family tree already exists here (kin/tree.json). Run `kin view` instead.");
    }

    let details = match founder {
        Some(details) => details,
        None => prompt_founder()?,
    };
    if !has_name(&details) {
        bail!("the founder needs at least a first or last name");
    }

    fs::create_dir_all(&kin_dir)?;

    let session = TreeSession::with_founder(details);
    persist::save(&store::tree_path(root), &session.snapshot())?;
    println!("  {} kin/tree.json", "Created".green().bold());
    println!("  {} `kin view` to open the tree", "Run".cyan().bold());

    Ok(())
}

fn has_name(details: &PersonDetails) -> bool {
    !details.first_name.trim().is_empty() || !details.last_name.trim().is_empty()
}

fn prompt_founder() -> Result<PersonDetails> {
    print!("  Founder's name (first [last]): ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let mut details = split_name(input.trim());
    details.gender = Gender::Male;
    Ok(details)
}

/// "First Last Parts" → first word is the first name, the rest the last.
pub fn split_name(input: &str) -> PersonDetails {
    let mut parts = input.split_whitespace();
    let first_name = parts.next().unwrap_or_default().to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");
    PersonDetails {
        first_name,
        last_name,
        ..PersonDetails::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::ROOT_ID;
    use tempfile::TempDir;

    fn founder() -> PersonDetails {
        PersonDetails {
            first_name: "Ada".to_string(),
            last_name: "Byron".to_string(),
            gender: Gender::Female,
            ..PersonDetails::default()
        }
    }

    #[test]
    fn creates_kin_directory_and_tree() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), Some(founder())).unwrap();
        assert!(dir.path().join("kin").is_dir());
        let snap = persist::load(&store::tree_path(dir.path())).unwrap().unwrap();
        assert_eq!(snap.people.len(), 1);
        assert_eq!(snap.people.get(ROOT_ID).unwrap().first_name, "Ada");
        assert_eq!(snap.root_id_stack, vec![ROOT_ID.to_string()]);
    }

    #[test]
    fn error_if_already_initialised() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), Some(founder())).unwrap();
        assert!(run_in(dir.path(), Some(founder())).is_err());
    }

    #[test]
    fn rejects_nameless_founder() {
        let dir = TempDir::new().unwrap();
        assert!(run_in(dir.path(), Some(PersonDetails::default())).is_err());
        assert!(!dir.path().join("kin/tree.json").exists());
    }

    #[test]
    fn split_name_first_word_then_rest() {
        let d = split_name("Anne Marie Jensen");
        assert_eq!(d.first_name, "Anne");
        assert_eq!(d.last_name, "Marie Jensen");
        let single = split_name("Cher");
        assert_eq!(single.first_name, "Cher");
        assert!(single.last_name.is_empty());
    }
}
