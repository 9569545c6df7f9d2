//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Header, filter bar and status bar background.
pub const BRAND_BLUE: Color = Color::Rgb(25, 118, 210);
/// Inactive filter tab text.
pub const PALE_BLUE: Color = Color::Rgb(227, 234, 252);
/// Overdue pending tasks.
pub const DARK_RED: Color = Color::Rgb(209, 26, 42);
/// Due today.
pub const GOLD: Color = Color::Rgb(255, 215, 0);
