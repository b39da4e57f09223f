use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for each kind of terminal output
#[derive(Debug, Clone)]
pub struct Theme {
    pub heading: Style,
    pub ok: Style,
    pub failure: Style,
    pub notice: Style,
    /// Labels and secondary text
    pub label: Style,
    /// Vendor and device ids
    pub id: Style,
    /// Vendor names
    pub name: Style,
}

impl Theme {
    pub fn new(color: bool) -> Self {
        if !color {
            return Self {
                heading: Style::new(),
                ok: Style::new(),
                failure: Style::new(),
                notice: Style::new(),
                label: Style::new(),
                id: Style::new(),
                name: Style::new(),
            };
        }
        Self {
            heading: Style::new().cyan().bold(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            notice: Style::new().yellow(),
            label: Style::new().dimmed(),
            id: Style::new().bright_black(),
            name: Style::new().bold(),
        }
    }
}

/// Colors are off when `NO_COLOR` is set, otherwise follow the terminal
/// and `CLICOLOR`/`CLICOLOR_FORCE`.
pub fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none_or(|v| v.is_empty()) && console::colors_enabled()
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::new(color_enabled()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_adds_no_escapes() {
        let theme = Theme::new(false);
        assert_eq!("1d6b".style(theme.id).to_string(), "1d6b");
        assert_eq!("Linux Foundation".style(theme.name).to_string(), "Linux Foundation");
    }

    #[test]
    fn test_color_theme_styles_ids() {
        let theme = Theme::new(true);
        let styled = "1d6b".style(theme.id).to_string();
        assert!(styled.starts_with("\u{1b}["));
        assert!(styled.contains("1d6b"));
    }
}
