//! View components
//!
//! Each screen region is a [`Component`]: it reacts to key presses, consumes
//! dispatched actions, and paints itself into a frame area. Key handling and
//! updates may hand back a follow-up [`Action`] for the app loop to route.

pub mod policies;

pub use policies::PoliciesComponent;

use crate::action::Action;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

pub trait Component {
    /// React to a key press
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>>;

    /// Consume a dispatched action
    fn update(&mut self, action: Action) -> Result<Option<Action>>;

    /// Paint into the given frame area
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
