// theme support for the tui

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    // plant floor colors: navy and safety yellow
    Industrial,
    IndustrialLight,
    Dark,
    Light,
    Nord,
    CatppuccinMocha,
}

impl ThemeKind {
    pub const ALL: &'static [ThemeKind] = &[
        Self::Industrial,
        Self::IndustrialLight,
        Self::Dark,
        Self::Light,
        Self::Nord,
        Self::CatppuccinMocha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Industrial => "industrial",
            Self::IndustrialLight => "industrial light",
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Nord => "nord",
            Self::CatppuccinMocha => "catppuccin mocha",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&t| t == self).unwrap_or(0)
    }
}

/// Picks the light or dark industrial theme from the terminal background.
pub fn detect_theme() -> ThemeKind {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => ThemeKind::IndustrialLight,
        _ => ThemeKind::Industrial,
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub border: Color,
    pub selection: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub muted: Color,
}

impl Theme {
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Industrial => Self::industrial(),
            ThemeKind::IndustrialLight => Self::industrial_light(),
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
            ThemeKind::Nord => Self::nord(),
            ThemeKind::CatppuccinMocha => Self::catppuccin_mocha(),
        }
    }

    fn industrial() -> Self {
        Self {
            bg: Color::Rgb(16, 27, 41),
            fg: Color::Rgb(226, 232, 240),
            accent: Color::Rgb(255, 193, 7),
            border: Color::Rgb(31, 78, 121),
            selection: Color::Rgb(31, 58, 92),
            error: Color::Rgb(239, 83, 80),
            success: Color::Rgb(102, 187, 106),
            warning: Color::Rgb(255, 167, 38),
            muted: Color::Rgb(120, 140, 160),
        }
    }

    fn industrial_light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 247),
            fg: Color::Rgb(31, 78, 121),
            accent: Color::Rgb(31, 78, 121),
            border: Color::Rgb(255, 193, 7),
            selection: Color::Rgb(255, 243, 205),
            error: Color::Rgb(198, 40, 40),
            success: Color::Rgb(46, 125, 50),
            warning: Color::Rgb(183, 110, 0),
            muted: Color::Rgb(120, 130, 140),
        }
    }

    fn dark() -> Self {
        Self {
            bg: Color::Rgb(20, 20, 30),
            fg: Color::Rgb(220, 220, 230),
            accent: Color::Rgb(100, 150, 255),
            border: Color::Rgb(60, 60, 80),
            selection: Color::Rgb(50, 50, 70),
            error: Color::Rgb(255, 100, 100),
            success: Color::Rgb(100, 255, 150),
            warning: Color::Rgb(255, 200, 100),
            muted: Color::Rgb(120, 120, 140),
        }
    }

    fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 252),
            fg: Color::Rgb(30, 30, 40),
            accent: Color::Rgb(50, 100, 200),
            border: Color::Rgb(200, 200, 210),
            selection: Color::Rgb(230, 240, 255),
            error: Color::Rgb(200, 50, 50),
            success: Color::Rgb(50, 150, 80),
            warning: Color::Rgb(200, 150, 50),
            muted: Color::Rgb(140, 140, 150),
        }
    }

    fn nord() -> Self {
        Self {
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(236, 239, 244),
            accent: Color::Rgb(136, 192, 208),
            border: Color::Rgb(67, 76, 94),
            selection: Color::Rgb(67, 76, 94),
            error: Color::Rgb(191, 97, 106),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            muted: Color::Rgb(76, 86, 106),
        }
    }

    fn catppuccin_mocha() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),
            fg: Color::Rgb(205, 214, 244),
            accent: Color::Rgb(180, 190, 254),
            border: Color::Rgb(49, 50, 68),
            selection: Color::Rgb(69, 71, 90),
            error: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 227, 161),
            warning: Color::Rgb(249, 226, 175),
            muted: Color::Rgb(166, 173, 200),
        }
    }

    // style helpers
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}
