//! Draggable settings panel model.
//!
//! `offset` is how far the panel has been pulled up from its resting slot:
//! 0.0 is at rest, 1.0 is fully raised. Moving it reports events back to the
//! screen in the order a listener would see them.

use crate::config::{Background, MAX_PANEL_DRAG_LIMIT, Rgb};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    BackgroundChanged(Rgb),
    ShadowAlpha(f32),
    Opened,
    Closed,
}

#[derive(Debug, Clone)]
pub struct ConfigPanel {
    offset: f32,
    drag_limit: f32,
    max_shadow_alpha: f32,
    hidden: bool,
    background: Background,
}

impl ConfigPanel {
    pub fn new(drag_limit: f32, max_shadow_alpha: f32, background: Background) -> Self {
        Self {
            offset: 0.0,
            drag_limit: drag_limit.clamp(0.0, MAX_PANEL_DRAG_LIMIT),
            max_shadow_alpha: max_shadow_alpha.clamp(0.0, 1.0),
            hidden: false,
            background,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn shadow_alpha(&self) -> f32 {
        self.offset * self.max_shadow_alpha
    }

    pub fn is_dragged_above_limit(&self) -> bool {
        self.offset > self.drag_limit
    }

    pub fn drag_to(&mut self, offset: f32) -> Vec<PanelEvent> {
        let offset = if offset.is_finite() {
            offset.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.hidden = false;
        self.set_offset(offset)
    }

    pub fn raise(&mut self) -> Vec<PanelEvent> {
        self.hidden = false;
        self.set_offset(1.0)
    }

    pub fn move_to_rest(&mut self) -> Vec<PanelEvent> {
        self.set_offset(0.0)
    }

    /// Slide the panel away entirely; even the drag handle is hidden until the
    /// panel is raised again.
    pub fn move_off_screen(&mut self) -> Vec<PanelEvent> {
        let events = self.set_offset(0.0);
        self.hidden = true;
        events
    }

    pub fn select_background(&mut self, background: Background) -> Vec<PanelEvent> {
        if background == self.background {
            return Vec::new();
        }
        self.background = background;
        vec![PanelEvent::BackgroundChanged(background.rgb())]
    }

    fn set_offset(&mut self, offset: f32) -> Vec<PanelEvent> {
        let was_open = self.is_dragged_above_limit();
        let changed = (offset - self.offset).abs() > f32::EPSILON;
        self.offset = offset;
        let is_open = self.is_dragged_above_limit();

        let mut events = Vec::new();
        if changed {
            events.push(PanelEvent::ShadowAlpha(self.shadow_alpha()));
        }
        match (was_open, is_open) {
            (false, true) => events.push(PanelEvent::Opened),
            (true, false) => events.push(PanelEvent::Closed),
            _ => {}
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> ConfigPanel {
        ConfigPanel::new(0.3, 0.5, Background::Paper)
    }

    #[test]
    fn starts_at_rest() {
        let p = panel();
        assert_eq!(p.offset(), 0.0);
        assert!(!p.is_dragged_above_limit());
        assert!(!p.is_hidden());
        assert_eq!(p.shadow_alpha(), 0.0);
    }

    #[test]
    fn crossing_the_limit_opens_and_closes() {
        let mut p = panel();
        assert_eq!(p.drag_to(0.2), vec![PanelEvent::ShadowAlpha(0.1)]);
        assert!(!p.is_dragged_above_limit());

        assert_eq!(
            p.drag_to(0.8),
            vec![PanelEvent::ShadowAlpha(0.4), PanelEvent::Opened]
        );
        assert!(p.is_dragged_above_limit());

        assert_eq!(
            p.move_to_rest(),
            vec![PanelEvent::ShadowAlpha(0.0), PanelEvent::Closed]
        );
        assert!(!p.is_dragged_above_limit());
    }

    #[test]
    fn full_raise_opens_even_with_the_highest_limit() {
        let mut p = ConfigPanel::new(1.0, 0.5, Background::Paper);
        assert!(p.raise().contains(&PanelEvent::Opened));
        assert!(p.is_dragged_above_limit());
        assert_eq!(p.move_to_rest().last(), Some(&PanelEvent::Closed));
    }

    #[test]
    fn resting_panel_emits_nothing_on_rest() {
        let mut p = panel();
        assert!(p.move_to_rest().is_empty());
    }

    #[test]
    fn off_screen_hides_until_raised() {
        let mut p = panel();
        p.raise();
        let events = p.move_off_screen();
        assert_eq!(events.last(), Some(&PanelEvent::Closed));
        assert!(p.is_hidden());

        p.raise();
        assert!(!p.is_hidden());
        assert_eq!(p.offset(), 1.0);
    }

    #[test]
    fn clamps_and_sanitizes_drag() {
        let mut p = panel();
        p.drag_to(7.0);
        assert_eq!(p.offset(), 1.0);
        p.drag_to(f32::NAN);
        assert_eq!(p.offset(), 0.0);
    }

    #[test]
    fn background_change_reports_colour_once() {
        let mut p = panel();
        assert_eq!(
            p.select_background(Background::Sepia),
            vec![PanelEvent::BackgroundChanged(Background::Sepia.rgb())]
        );
        assert!(p.select_background(Background::Sepia).is_empty());
        assert_eq!(p.background(), Background::Sepia);
    }
}
