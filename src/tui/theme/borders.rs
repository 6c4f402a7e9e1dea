//! Border styles

use super::ThemeName;
use ratatui::symbols::border;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderStyle;

impl BorderStyle {
    pub fn for_theme(name: ThemeName) -> border::Set<'static> {
        match name {
            ThemeName::Classic | ThemeName::Dark => border::ROUNDED,
            ThemeName::Gold => border::DOUBLE,
        }
    }
}
