//! Pure recursive layout of the rooted display tree.
//!
//! `layout` turns `(people, view root, highlight state)` into a tree of card
//! and edge descriptors; rendering (colors, glyphs, geometry) happens
//! elsewhere. The output is a *display* tree, not the graph: a person
//! reachable through two branches is laid out independently under each, and
//! no back-edges are followed.

use std::collections::BTreeSet;

use crate::graph::model::People;
use crate::graph::query::direct_connections;

/// Visual priority for a card or edge. Explicit selection beats hover
/// beats default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Selected,
    Hover,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    Spouse,
    ParentChild,
}

/// A connecting line between two cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeDesc {
    pub from: String,
    pub to: String,
    pub role: EdgeRole,
    pub emphasis: Emphasis,
}

/// One person's card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub emphasis: Emphasis,
    /// Deceased styling applies only when no highlight condition does.
    pub dimmed: bool,
}

/// A laid-out subtree: the person, their spouse beside them, the parents row
/// (view root only), and the children row below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutNode {
    pub card: Card,
    pub spouse: Option<Card>,
    pub spouse_edge: Option<EdgeDesc>,
    /// Up to two parents, present only when this node is the view root.
    pub parents: Vec<Card>,
    /// The parents' own spouse edge plus their edges down to the view root.
    pub parent_edges: Vec<EdgeDesc>,
    /// Edge up to the parent that laid this node out (absent at the top).
    pub parent_link: Option<EdgeDesc>,
    pub children: Vec<LayoutNode>,
}

/// Highlight inputs: the explicitly selected set (family-unit click) and the
/// hovered person.
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    pub selected: BTreeSet<String>,
    pub hovered: Option<String>,
}

struct LayoutCtx<'a> {
    people: &'a People,
    view_root: &'a str,
    selected: &'a BTreeSet<String>,
    /// The hovered person and their spouse/parents/children.
    hover_set: BTreeSet<String>,
}

/// Lay out the subtree rooted at `view_root`. `None` when the id is absent.
pub fn layout(people: &People, view_root: &str, highlight: &HighlightState) -> Option<LayoutNode> {
    if !people.contains(view_root) {
        return None;
    }
    let mut hover_set = BTreeSet::new();
    if let Some(hovered) = &highlight.hovered {
        hover_set = direct_connections(people, hovered);
        hover_set.insert(hovered.clone());
    }
    let ctx = LayoutCtx {
        people,
        view_root,
        selected: &highlight.selected,
        hover_set,
    };
    let mut path = Vec::new();
    Some(layout_node(&ctx, view_root, None, &mut path))
}

fn layout_node(
    ctx: &LayoutCtx<'_>,
    id: &str,
    parent_id: Option<&str>,
    path: &mut Vec<String>,
) -> LayoutNode {
    let person = ctx.people.get(id).expect("caller checks presence");

    let mut parents = Vec::new();
    let mut parent_edges = Vec::new();
    if id == ctx.view_root {
        let parent_ids: Vec<&str> = person
            .parent_ids
            .iter()
            .map(String::as_str)
            .filter(|p| ctx.people.contains(p))
            .collect();
        for parent in &parent_ids {
            parents.push(card(ctx, parent));
            parent_edges.push(edge(ctx, parent, id, EdgeRole::ParentChild));
        }
        if let [a, b] = parent_ids.as_slice() {
            parent_edges.push(edge(ctx, a, b, EdgeRole::Spouse));
        }
    }

    let spouse = person
        .spouse_id
        .as_deref()
        .filter(|s| ctx.people.contains(s));
    let spouse_card = spouse.map(|s| card(ctx, s));
    let spouse_edge = spouse.map(|s| edge(ctx, id, s, EdgeRole::Spouse));

    path.push(id.to_string());
    // Resolve the child set against the current path before recursing; a
    // child already on the path means cyclic parent data and is skipped.
    let child_ids: Vec<&str> = person
        .unique_children()
        .into_iter()
        .filter(|c| ctx.people.contains(c))
        .filter(|c| !path.iter().any(|p| p == c))
        .collect();
    let children = child_ids
        .into_iter()
        .map(|c| layout_node(ctx, c, Some(id), path))
        .collect();
    path.pop();

    LayoutNode {
        card: card(ctx, id),
        spouse: spouse_card,
        spouse_edge,
        parents,
        parent_edges,
        parent_link: parent_id.map(|p| edge(ctx, id, p, EdgeRole::ParentChild)),
        children,
    }
}

fn card(ctx: &LayoutCtx<'_>, id: &str) -> Card {
    let emphasis = if ctx.selected.contains(id) {
        Emphasis::Selected
    } else if ctx.hover_set.contains(id) {
        Emphasis::Hover
    } else {
        Emphasis::Default
    };
    let deceased = ctx.people.get(id).is_some_and(|p| p.is_deceased());
    Card {
        id: id.to_string(),
        emphasis,
        dimmed: deceased && emphasis == Emphasis::Default,
    }
}

fn edge(ctx: &LayoutCtx<'_>, from: &str, to: &str, role: EdgeRole) -> EdgeDesc {
    let emphasis = if ctx.selected.contains(from) && ctx.selected.contains(to) {
        Emphasis::Selected
    } else if ctx.hover_set.contains(from) || ctx.hover_set.contains(to) {
        Emphasis::Hover
    } else {
        Emphasis::Default
    };
    EdgeDesc {
        from: from.to_string(),
        to: to.to_string(),
        role,
        emphasis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Gender, PersonDetails, ROOT_ID};
    use crate::graph::mutate::{add_child, add_parent, add_spouse};
    use crate::graph::query::family_unit;

    fn details(first: &str, gender: Gender) -> PersonDetails {
        PersonDetails {
            first_name: first.to_string(),
            gender,
            ..PersonDetails::default()
        }
    }

    fn family() -> (People, String, String) {
        let mut people = People::with_founder(details("A", Gender::Male));
        let spouse = add_spouse(&mut people, ROOT_ID, details("B", Gender::Female)).unwrap();
        let child = add_child(&mut people, ROOT_ID, details("C", Gender::Male)).unwrap();
        (people, spouse, child)
    }

    #[test]
    fn unknown_root_yields_none() {
        let (people, ..) = family();
        assert!(layout(&people, "ghost", &HighlightState::default()).is_none());
    }

    #[test]
    fn spouse_sits_beside_with_an_edge() {
        let (people, spouse, _child) = family();
        let tree = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        assert_eq!(tree.spouse.as_ref().unwrap().id, spouse);
        let edge = tree.spouse_edge.as_ref().unwrap();
        assert_eq!(edge.role, EdgeRole::Spouse);
        assert_eq!((edge.from.as_str(), edge.to.as_str()), (ROOT_ID, spouse.as_str()));
    }

    #[test]
    fn children_carry_a_link_back_to_their_parent() {
        let (people, _spouse, child) = family();
        let tree = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        assert_eq!(tree.children.len(), 1);
        let child_node = &tree.children[0];
        assert_eq!(child_node.card.id, child);
        let link = child_node.parent_link.as_ref().unwrap();
        assert_eq!(link.role, EdgeRole::ParentChild);
        assert_eq!(link.to, ROOT_ID);
    }

    #[test]
    fn parents_row_appears_only_at_the_view_root() {
        let mut people = People::with_founder(details("A", Gender::Male));
        let mother = add_parent(&mut people, ROOT_ID, details("M", Gender::Female)).unwrap();
        let father = add_parent(&mut people, ROOT_ID, details("F", Gender::Male)).unwrap();

        let tree = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        let parent_ids: Vec<&str> = tree.parents.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(parent_ids, vec![mother.as_str(), father.as_str()]);
        // Two down-edges plus the parents' own spouse edge.
        assert_eq!(tree.parent_edges.len(), 3);
        assert!(
            tree.parent_edges
                .iter()
                .any(|e| e.role == EdgeRole::Spouse && e.from == mother && e.to == father)
        );

        // Viewed from the mother, the founder is a plain child node with no
        // parents row of its own.
        let from_mother = layout(&people, &mother, &HighlightState::default()).unwrap();
        let founder_node = from_mother
            .children
            .iter()
            .find(|n| n.card.id == ROOT_ID)
            .unwrap();
        assert!(founder_node.parents.is_empty());
    }

    #[test]
    fn duplicate_child_entries_render_once() {
        let (mut people, _spouse, child) = family();
        people
            .get_mut(ROOT_ID)
            .unwrap()
            .children
            .push(child.clone());
        let tree = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn selected_family_unit_beats_hover() {
        let (people, spouse, child) = family();
        let highlight = HighlightState {
            selected: family_unit(&people, ROOT_ID, &spouse),
            hovered: Some(child.clone()),
        };
        let tree = layout(&people, ROOT_ID, &highlight).unwrap();
        assert_eq!(tree.card.emphasis, Emphasis::Selected);
        assert_eq!(
            tree.spouse_edge.as_ref().unwrap().emphasis,
            Emphasis::Selected,
            "both endpoints selected highlights the edge"
        );
    }

    #[test]
    fn hover_highlights_connections_of_the_hovered_person() {
        let (people, _spouse, child) = family();
        let highlight = HighlightState {
            selected: BTreeSet::new(),
            hovered: Some(child.clone()),
        };
        let tree = layout(&people, ROOT_ID, &highlight).unwrap();
        // Root is a parent of the hovered child.
        assert_eq!(tree.card.emphasis, Emphasis::Hover);
        assert_eq!(tree.spouse.as_ref().unwrap().emphasis, Emphasis::Hover);
    }

    #[test]
    fn deceased_dim_applies_only_without_highlight() {
        let (mut people, _spouse, child) = family();
        people.get_mut(&child).unwrap().death_date = Some("1900".to_string());

        let plain = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        assert!(plain.children[0].card.dimmed);

        let hovered = HighlightState {
            selected: BTreeSet::new(),
            hovered: Some(child.clone()),
        };
        let lit = layout(&people, ROOT_ID, &hovered).unwrap();
        assert!(!lit.children[0].card.dimmed);
    }

    #[test]
    fn cyclic_parent_data_terminates() {
        let (mut people, ..) = family();
        // Corrupt: the founder listed as their own grandchild.
        let child_id = people.get(ROOT_ID).unwrap().children[0].clone();
        people
            .get_mut(&child_id)
            .unwrap()
            .children
            .push(ROOT_ID.to_string());
        let tree = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        assert!(tree.children[0].children.is_empty());
    }

    #[test]
    fn cycle_guard_skips_only_the_cyclic_child() {
        let (mut people, _spouse, child) = family();
        let grandchild = add_child(&mut people, &child, details("G", Gender::Male)).unwrap();
        // Corrupt: the founder also recorded as the child's child, next to a
        // legitimate grandchild.
        people
            .get_mut(&child)
            .unwrap()
            .children
            .push(ROOT_ID.to_string());

        let tree = layout(&people, ROOT_ID, &HighlightState::default()).unwrap();
        let child_node = &tree.children[0];
        let grandchildren: Vec<&str> = child_node
            .children
            .iter()
            .map(|n| n.card.id.as_str())
            .collect();
        assert_eq!(grandchildren, vec![grandchild.as_str()]);
        assert!(child_node.children[0].children.is_empty());
    }
}
