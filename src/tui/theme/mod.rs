//! Device skins: classic, dark and gold

pub mod borders;
pub mod icons;
pub mod palette;

pub use borders::BorderStyle;
pub use icons::Icons;
pub use palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeName {
    #[default]
    Classic,
    Dark,
    Gold,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Classic, ThemeName::Dark, ThemeName::Gold];

    pub fn key(self) -> &'static str {
        match self {
            ThemeName::Classic => "classic",
            ThemeName::Dark => "dark",
            ThemeName::Gold => "gold",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeName::Classic => "Classic",
            ThemeName::Dark => "Dark",
            ThemeName::Gold => "Gold",
        }
    }

    /// Unknown names fall back to the classic skin.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => ThemeName::Dark,
            "gold" => ThemeName::Gold,
            _ => ThemeName::Classic,
        }
    }
}

/// Active theme configuration
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    pub palette: Palette,
    pub icons: Icons,
}

impl Theme {
    pub fn new(name: ThemeName) -> Self {
        let palette = match name {
            ThemeName::Classic => Palette::CLASSIC,
            ThemeName::Dark => Palette::DARK,
            ThemeName::Gold => Palette::GOLD,
        };
        Self {
            name,
            palette,
            icons: Icons::unicode(),
        }
    }

    pub fn border_set(&self) -> ratatui::symbols::border::Set<'static> {
        BorderStyle::for_theme(self.name)
    }
}

pub fn get_theme(name: ThemeName) -> Theme {
    Theme::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_keys() {
        for t in ThemeName::ALL {
            assert_eq!(ThemeName::parse(t.key()), t);
        }
        assert_eq!(ThemeName::parse(" GOLD "), ThemeName::Gold);
        assert_eq!(ThemeName::parse("neon"), ThemeName::Classic);
    }
}
