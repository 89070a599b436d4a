use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Margin, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::graph::model::People;
use crate::layout::{EdgeRole, Emphasis, LayoutNode};
use crate::viewport::Transform;

pub const CARD_W: i32 = 20;
pub const CARD_H: i32 = 3;
const H_GAP: i32 = 3;
const V_GAP: i32 = 3;

// ---------------------------------------------------------------------------
// Placement: world coordinates for every card and edge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCard {
    pub id: String,
    pub title: String,
    pub sub: String,
    pub x: i32,
    pub y: i32,
    pub emphasis: Emphasis,
    pub dimmed: bool,
    pub deceased: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedEdge {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub role: EdgeRole,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    pub cards: Vec<PlacedCard>,
    pub edges: Vec<PlacedEdge>,
}

/// Assign world coordinates to a laid-out tree. Children spread left to
/// right, each couple block centered over its own descendants.
pub fn place(tree: &LayoutNode, people: &People) -> Placement {
    let mut placement = Placement::default();
    let top_row = if tree.parents.is_empty() { 0 } else { 1 };
    place_subtree(tree, people, 0, top_row, &mut placement);
    placement
}

fn block_width(node: &LayoutNode) -> i32 {
    if node.spouse.is_some() {
        CARD_W * 2 + H_GAP
    } else {
        CARD_W
    }
}

fn subtree_width(node: &LayoutNode) -> i32 {
    let children: i32 = node.children.iter().map(subtree_width).sum::<i32>()
        + H_GAP * (node.children.len().saturating_sub(1)) as i32;
    block_width(node).max(children)
}

/// Returns the anchor card's top-center, for the caller's parent-child edge.
fn place_subtree(
    node: &LayoutNode,
    people: &People,
    left: i32,
    row: i32,
    out: &mut Placement,
) -> (i32, i32) {
    let width = subtree_width(node);
    let block_x = left + (width - block_width(node)) / 2;
    let y = row * (CARD_H + V_GAP);

    out.cards.push(placed_card(&node.card, people, block_x, y));
    if let Some(spouse) = &node.spouse {
        let spouse_x = block_x + CARD_W + H_GAP;
        out.cards.push(placed_card(spouse, people, spouse_x, y));
        if let Some(edge) = &node.spouse_edge {
            out.edges.push(PlacedEdge {
                from: (block_x + CARD_W, y + CARD_H / 2),
                to: (spouse_x, y + CARD_H / 2),
                role: edge.role,
                emphasis: edge.emphasis,
            });
        }
    }

    // Parents row above the view root.
    if !node.parents.is_empty() {
        let parents_w =
            CARD_W * node.parents.len() as i32 + H_GAP * (node.parents.len() as i32 - 1);
        let parents_left = block_x + (CARD_W - parents_w) / 2;
        let parents_y = y - CARD_H - V_GAP;
        for (idx, parent) in node.parents.iter().enumerate() {
            let px = parents_left + idx as i32 * (CARD_W + H_GAP);
            out.cards.push(placed_card(parent, people, px, parents_y));
            if let Some(edge) = node
                .parent_edges
                .iter()
                .find(|e| e.role == EdgeRole::ParentChild && e.from == parent.id)
            {
                out.edges.push(PlacedEdge {
                    from: (px + CARD_W / 2, parents_y + CARD_H),
                    to: (block_x + CARD_W / 2, y),
                    role: edge.role,
                    emphasis: edge.emphasis,
                });
            }
        }
        if let Some(edge) = node
            .parent_edges
            .iter()
            .find(|e| e.role == EdgeRole::Spouse)
        {
            out.edges.push(PlacedEdge {
                from: (parents_left + CARD_W, parents_y + CARD_H / 2),
                to: (parents_left + CARD_W + H_GAP, parents_y + CARD_H / 2),
                role: edge.role,
                emphasis: edge.emphasis,
            });
        }
    }

    // Children row, with an edge from the anchor card down to each child.
    let mut child_left = left + (width - children_width(node)) / 2;
    for child in &node.children {
        let child_w = subtree_width(child);
        let (cx, cy) = place_subtree(child, people, child_left, row + 1, out);
        if let Some(edge) = &child.parent_link {
            out.edges.push(PlacedEdge {
                from: (block_x + CARD_W / 2, y + CARD_H),
                to: (cx, cy),
                role: edge.role,
                emphasis: edge.emphasis,
            });
        }
        child_left += child_w + H_GAP;
    }

    (block_x + CARD_W / 2, y)
}

fn children_width(node: &LayoutNode) -> i32 {
    node.children.iter().map(subtree_width).sum::<i32>()
        + H_GAP * (node.children.len().saturating_sub(1)) as i32
}

fn placed_card(card: &crate::layout::Card, people: &People, x: i32, y: i32) -> PlacedCard {
    let person = people.get(&card.id);
    let title = person
        .map(|p| p.display_name())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| card.id.clone());
    let sub = person
        .map(|p| {
            match (&p.birth_date, &p.death_date) {
                (None, None) => String::new(),
                (birth, death) => format!(
                    "{}–{}",
                    birth.as_deref().unwrap_or("?"),
                    death.as_deref().unwrap_or("")
                ),
            }
        })
        .unwrap_or_default();
    PlacedCard {
        id: card.id.clone(),
        title,
        sub,
        x,
        y,
        emphasis: card.emphasis,
        dimmed: card.dimmed,
        deceased: person.is_some_and(|p| p.is_deceased()),
    }
}

// ---------------------------------------------------------------------------
// Screen mapping and hit-testing
// ---------------------------------------------------------------------------

fn to_screen(t: Transform, x: i32, y: i32) -> (i32, i32) {
    (
        (x as f32 * t.scale + t.x).round() as i32,
        (y as f32 * t.scale + t.y).round() as i32,
    )
}

/// The card under a screen cell, topmost (last-placed) first.
pub fn card_at<'a>(
    placement: &'a Placement,
    transform: Transform,
    area: Rect,
    column: u16,
    row: u16,
) -> Option<&'a PlacedCard> {
    let px = column as i32 - area.x as i32;
    let py = row as i32 - area.y as i32;
    placement.cards.iter().rev().find(|card| {
        let (sx, sy) = to_screen(transform, card.x, card.y);
        px >= sx && px < sx + CARD_W && py >= sy && py < sy + CARD_H
    })
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct TreeRenderData<'a> {
    pub placement: &'a Placement,
    pub transform: Transform,
    pub breadcrumb: &'a [String],
    pub breadcrumb_names: &'a [String],
    pub focused_id: Option<&'a str>,
    pub details: Option<&'a [String]>,
    pub hints: &'a str,
    pub message: Option<&'a str>,
    pub show_help: bool,
    pub demo: bool,
}

/// The screen regions the view is split into. Computed in one place so
/// mouse hit-testing agrees with what was drawn.
#[derive(Debug, Clone, Copy)]
pub struct Chrome {
    pub outer: Rect,
    pub breadcrumb: Rect,
    pub canvas: Rect,
    pub details: Option<Rect>,
    pub status: Rect,
}

pub fn chrome(frame_area: Rect, show_details: bool) -> Chrome {
    let outer = frame_area.inner(Margin {
        horizontal: 1,
        vertical: 0,
    });
    // Inside the double border plus one column of padding.
    let inner = Rect::new(
        outer.x + 2,
        outer.y + 1,
        outer.width.saturating_sub(4),
        outer.height.saturating_sub(2),
    );
    let [body, status] =
        Layout::vertical([Constraint::Min(6), Constraint::Length(3)]).areas(inner);
    let (tree, details) = if show_details {
        let [t, d] = Layout::horizontal([Constraint::Min(20), Constraint::Length(34)]).areas(body);
        (t, Some(d))
    } else {
        (body, None)
    };
    let breadcrumb = Rect::new(tree.x, tree.y, tree.width, 1.min(tree.height));
    let canvas = Rect::new(
        tree.x,
        tree.y + 1,
        tree.width,
        tree.height.saturating_sub(1),
    );
    Chrome {
        outer,
        breadcrumb,
        canvas,
        details,
        status,
    }
}

pub fn draw(frame: &mut Frame, data: &TreeRenderData<'_>) {
    let chrome = chrome(frame.area(), data.details.is_some());
    let area = chrome.outer;

    let mut title_spans = vec![
        Span::styled("kin view", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ];
    if data.demo {
        title_spans.push(Span::raw("  "));
        title_spans.push(Span::styled(
            "[DEMO]",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    }
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::new(1, 1, 0, 0))
        .title(Line::from(title_spans));
    frame.render_widget(outer, area);

    draw_breadcrumb(frame, chrome.breadcrumb, data);
    draw_edges(frame, chrome.canvas, data);
    draw_cards(frame, chrome.canvas, data);
    if let Some(details) = data.details
        && let Some(details_area) = chrome.details
    {
        draw_details(frame, details_area, details);
    }
    draw_status(frame, chrome.status, data);
    if data.show_help {
        draw_help(frame, area);
    }
}

fn draw_breadcrumb(frame: &mut Frame, area: Rect, data: &TreeRenderData<'_>) {
    if area.height == 0 {
        return;
    }
    let entries: Vec<(&String, &String)> =
        data.breadcrumb.iter().zip(data.breadcrumb_names).collect();
    let mut spans = Vec::new();
    for (idx, (id, name)) in entries.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
        }
        let style = if idx + 1 == entries.len() {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(breadcrumb_label(id, name).to_string(), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// A breadcrumb entry shows the person's name, or the raw id when the name
/// is empty.
fn breadcrumb_label<'a>(id: &'a str, name: &'a str) -> &'a str {
    if name.is_empty() { id } else { name }
}

fn emphasis_color(emphasis: Emphasis) -> Color {
    match emphasis {
        Emphasis::Selected => Color::Yellow,
        Emphasis::Hover => Color::Cyan,
        Emphasis::Default => Color::DarkGray,
    }
}

fn draw_edges(frame: &mut Frame, canvas: Rect, data: &TreeRenderData<'_>) {
    for edge in &data.placement.edges {
        let (fx, fy) = to_screen(data.transform, edge.from.0, edge.from.1);
        let (tx, ty) = to_screen(data.transform, edge.to.0, edge.to.1);
        let style = Style::default().fg(emphasis_color(edge.emphasis));
        match edge.role {
            EdgeRole::Spouse => {
                for x in fx.min(tx)..=fx.max(tx) {
                    put(frame, canvas, x, fy, "─", style);
                }
            }
            EdgeRole::ParentChild => {
                // Vertical, jog across at the midpoint, vertical again.
                let mid = (fy + ty) / 2;
                for y in fy.min(mid)..=fy.max(mid) {
                    put(frame, canvas, fx, y, "│", style);
                }
                for x in fx.min(tx)..=fx.max(tx) {
                    put(frame, canvas, x, mid, "─", style);
                }
                for y in mid.min(ty)..=mid.max(ty) {
                    put(frame, canvas, tx, y, "│", style);
                }
            }
        }
    }
}

fn put(frame: &mut Frame, area: Rect, x: i32, y: i32, symbol: &str, style: Style) {
    let sx = area.x as i32 + x;
    let sy = area.y as i32 + y;
    if sx < area.x as i32
        || sy < area.y as i32
        || sx >= (area.x + area.width) as i32
        || sy >= (area.y + area.height) as i32
    {
        return;
    }
    if let Some(cell) = frame
        .buffer_mut()
        .cell_mut(Position::new(sx as u16, sy as u16))
    {
        cell.set_symbol(symbol);
        cell.set_style(style);
    }
}

fn draw_cards(frame: &mut Frame, canvas: Rect, data: &TreeRenderData<'_>) {
    for card in &data.placement.cards {
        let (sx, sy) = to_screen(data.transform, card.x, card.y);
        let x = canvas.x as i32 + sx;
        let y = canvas.y as i32 + sy;
        if x + CARD_W <= canvas.x as i32
            || y + CARD_H <= canvas.y as i32
            || x >= (canvas.x + canvas.width) as i32
            || y >= (canvas.y + canvas.height) as i32
        {
            continue;
        }
        // Clip to the canvas; ratatui rects are unsigned.
        let cx = x.max(canvas.x as i32) as u16;
        let cy = y.max(canvas.y as i32) as u16;
        let right = ((x + CARD_W).min((canvas.x + canvas.width) as i32)) as u16;
        let bottom = ((y + CARD_H).min((canvas.y + canvas.height) as i32)) as u16;
        if right <= cx || bottom <= cy {
            continue;
        }
        let rect = Rect::new(cx, cy, right - cx, bottom - cy);

        let focused = data.focused_id == Some(card.id.as_str());
        let border_color = if focused {
            Color::White
        } else {
            emphasis_color(card.emphasis)
        };
        let mut text_style = Style::default().fg(Color::White);
        if card.dimmed {
            text_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM);
        }
        let title = if card.deceased {
            format!("✝ {}", card.title)
        } else {
            card.title.clone()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(if focused {
                BorderType::Thick
            } else {
                BorderType::Rounded
            })
            .border_style(Style::default().fg(border_color));
        frame.render_widget(Clear, rect);
        let body = Paragraph::new(vec![
            Line::from(Span::styled(title, text_style)),
            Line::from(Span::styled(
                card.sub.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        frame.render_widget(body, rect);
    }
}

fn draw_details(frame: &mut Frame, area: Rect, details: &[String]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::new(1, 1, 0, 0))
        .title(Span::styled(
            "details",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let lines: Vec<Line> = details
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(Color::White))))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_status(frame: &mut Frame, area: Rect, data: &TreeRenderData<'_>) {
    let mut lines = Vec::new();
    if let Some(message) = data.message {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        data.hints.to_string(),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let width = 56.min(area.width.saturating_sub(4));
    let height = 16.min(area.height.saturating_sub(2));
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, popup);
    let entries = [
        ("arrows/hjkl", "move focus between cards"),
        ("Tab", "cycle focus"),
        ("Enter", "make the focused person the view root"),
        ("Esc/Backspace", "step back up the breadcrumb"),
        ("m / c / p / b", "add spouse / child / parent / sibling"),
        ("r", "re-marry the last recorded ex-spouse"),
        ("e", "edit the focused person's name"),
        ("D", "delete the focused person"),
        ("x", "highlight the focused family unit"),
        ("+ / - / 0", "zoom in / out / reset view"),
        ("mouse", "drag pans, wheel zooms, hover highlights"),
        ("q", "quit (saves the tree)"),
    ];
    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(format!("{key:>14}  "), Style::default().fg(Color::Cyan)),
                Span::raw(*what),
            ])
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .padding(Padding::new(1, 1, 1, 1))
        .title(Span::styled(
            "keys",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::{Gender, People, PersonDetails, ROOT_ID};
    use crate::graph::mutate::{add_child, add_parent, add_spouse};
    use crate::layout::{self, HighlightState};

    fn details(first: &str) -> PersonDetails {
        PersonDetails {
            first_name: first.to_string(),
            gender: Gender::Male,
            ..PersonDetails::default()
        }
    }

    fn placed(people: &People) -> Placement {
        let tree = layout::layout(people, ROOT_ID, &HighlightState::default()).unwrap();
        place(&tree, people)
    }

    fn find<'a>(placement: &'a Placement, id: &str) -> &'a PlacedCard {
        placement.cards.iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn spouse_sits_to_the_right_on_the_same_row() {
        let mut people = People::with_founder(details("A"));
        let spouse = add_spouse(&mut people, ROOT_ID, details("B")).unwrap();
        let placement = placed(&people);
        let root = find(&placement, ROOT_ID);
        let partner = find(&placement, &spouse);
        assert_eq!(root.y, partner.y);
        assert_eq!(partner.x, root.x + CARD_W + H_GAP);
    }

    #[test]
    fn children_land_on_the_next_row_without_overlap() {
        let mut people = People::with_founder(details("A"));
        let c1 = add_child(&mut people, ROOT_ID, details("B")).unwrap();
        let c2 = add_child(&mut people, ROOT_ID, details("C")).unwrap();
        let placement = placed(&people);
        let root = find(&placement, ROOT_ID);
        let first = find(&placement, &c1);
        let second = find(&placement, &c2);
        assert_eq!(first.y, root.y + CARD_H + V_GAP);
        assert_eq!(first.y, second.y);
        assert!(second.x >= first.x + CARD_W + H_GAP);
    }

    #[test]
    fn parents_row_sits_above_the_view_root() {
        let mut people = People::with_founder(details("A"));
        let parent = add_parent(&mut people, ROOT_ID, details("M")).unwrap();
        let placement = placed(&people);
        let root = find(&placement, ROOT_ID);
        let mother = find(&placement, &parent);
        assert_eq!(mother.y, root.y - CARD_H - V_GAP);
        assert!(placement
            .edges
            .iter()
            .any(|e| e.role == EdgeRole::ParentChild && e.from.1 < e.to.1));
    }

    #[test]
    fn card_at_respects_the_transform() {
        let mut people = People::with_founder(details("A"));
        let _ = add_child(&mut people, ROOT_ID, details("B")).unwrap();
        let placement = placed(&people);
        let area = Rect::new(0, 0, 200, 60);

        let root = find(&placement, ROOT_ID);
        let hit = card_at(
            &placement,
            Transform::default(),
            area,
            (root.x + 1) as u16,
            (root.y + 1) as u16,
        );
        assert_eq!(hit.map(|c| c.id.as_str()), Some(ROOT_ID));

        let shifted = Transform {
            scale: 1.0,
            x: 40.0,
            y: 0.0,
        };
        assert!(card_at(&placement, shifted, area, (root.x + 1) as u16, (root.y + 1) as u16)
            .is_none_or(|c| c.id != ROOT_ID));
    }

    #[test]
    fn breadcrumb_label_falls_back_to_the_id() {
        assert_eq!(breadcrumb_label("p3", "Mads Larsen"), "Mads Larsen");
        assert_eq!(breadcrumb_label("p3", ""), "p3");
    }

    #[test]
    fn placed_card_shows_name_and_lifespan() {
        let mut people = People::with_founder(details("Ada"));
        people.get_mut(ROOT_ID).unwrap().birth_date = Some("1815".to_string());
        people.get_mut(ROOT_ID).unwrap().death_date = Some("1852".to_string());
        let placement = placed(&people);
        let root = find(&placement, ROOT_ID);
        assert_eq!(root.title, "Ada");
        assert_eq!(root.sub, "1815–1852");
        assert!(root.deceased);
    }
}
