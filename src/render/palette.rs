use colored::{Color, Colorize};

/// Severity bucket a level string falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Unknown,
}

impl Category {
    /// Case-insensitive mapping; anything unrecognised, including the empty
    /// string, is `Unknown`.
    pub fn from_level(level: &str) -> Self {
        match level.to_lowercase().as_str() {
            "debug" => Category::Debug,
            "info" => Category::Info,
            "warn" | "warning" => Category::Warn,
            "error" => Category::Error,
            "fatal" | "panic" => Category::Fatal,
            _ => Category::Unknown,
        }
    }
}

/// Foreground and background pair applied to a piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paint {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

impl Paint {
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
        }
    }

    pub const fn on(self, color: Color) -> Self {
        Self {
            fg: self.fg,
            bg: Some(color),
        }
    }

    pub fn paint(&self, text: &str) -> String {
        let mut styled = text.normal();
        if let Some(fg) = self.fg {
            styled = styled.color(fg);
        }
        if let Some(bg) = self.bg {
            styled = styled.on_color(bg);
        }
        styled.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub key: Paint,
    pub value: Paint,
    pub time: Paint,
    pub caller: Paint,
    pub debug: Paint,
    pub info: Paint,
    pub warn: Paint,
    pub error: Paint,
    pub fatal: Paint,
    pub unknown: Paint,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            key: Paint::fg(Color::Green),
            value: Paint::fg(Color::BrightWhite),
            time: Paint::fg(Color::White),
            caller: Paint::fg(Color::Blue),
            debug: Paint::fg(Color::Magenta),
            info: Paint::fg(Color::Cyan),
            warn: Paint::fg(Color::Yellow),
            error: Paint::fg(Color::Red),
            fatal: Paint::fg(Color::BrightWhite).on(Color::BrightRed),
            unknown: Paint::fg(Color::Magenta),
        }
    }
}

impl Palette {
    /// Palette that leaves every piece of text untouched.
    pub fn plain() -> Self {
        Self {
            key: Paint::default(),
            value: Paint::default(),
            time: Paint::default(),
            caller: Paint::default(),
            debug: Paint::default(),
            info: Paint::default(),
            warn: Paint::default(),
            error: Paint::default(),
            fatal: Paint::default(),
            unknown: Paint::default(),
        }
    }

    pub fn for_category(&self, category: Category) -> &Paint {
        match category {
            Category::Debug => &self.debug,
            Category::Info => &self.info,
            Category::Warn => &self.warn,
            Category::Error => &self.error,
            Category::Fatal => &self.fatal,
            Category::Unknown => &self.unknown,
        }
    }

    /// Returns the level label (upper-cased, at most four characters) wrapped
    /// in its category colour, along with the category.
    pub fn level_label(&self, level: &str) -> (String, Category) {
        let category = Category::from_level(level);
        let label: String = level.to_uppercase().chars().take(4).collect();
        (self.for_category(category).paint(&label), category)
    }
}
