use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::{Block, Borders};

pub struct Sections {
    pub status_bar: Rect,
    pub frame: Rect,
    pub panels: Vec<Rect>,
    pub controls: Rect,
}

pub fn build(area: Rect, panel_count: usize) -> Sections {
    let outer = if area.width > 80 && area.height > 20 {
        Rect {
            x: area.x.saturating_add(1),
            y: area.y,
            width: area.width.saturating_sub(2),
            height: area.height,
        }
    } else {
        area
    };

    let [status_bar, frame, controls] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(controls_height(area.height)),
    ])
    .areas(outer);

    // Panels sit inside the bordered "Development servers" frame.
    let inner = Block::default().borders(Borders::ALL).inner(frame);
    let panels = if panel_count == 0 {
        Vec::new()
    } else {
        Layout::horizontal(vec![Constraint::Ratio(1, panel_count as u32); panel_count])
            .split(inner)
            .to_vec()
    };

    Sections {
        status_bar,
        frame,
        panels,
        controls,
    }
}

fn controls_height(frame_height: u16) -> u16 {
    if frame_height < 20 { 2 } else { 3 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_panels_side_by_side() {
        let sections = build(Rect::new(0, 0, 120, 40), 2);
        assert_eq!(sections.panels.len(), 2);
        let [left, right] = [sections.panels[0], sections.panels[1]];
        assert_eq!(left.y, right.y);
        assert!(left.x < right.x);
        assert!(sections.frame.height > sections.status_bar.height);
    }

    #[test]
    fn no_panels_without_services() {
        assert!(build(Rect::new(0, 0, 80, 24), 0).panels.is_empty());
    }
}
