pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        pub const TEXT: Color = Color::Rgb(205, 214, 244);
        pub const SURFACE2: Color = Color::Rgb(108, 112, 134);

        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
    }
}

use nu_ansi_term::Style;

/// Styles for diagnostics written to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub error: Style,
    pub location: Style,
    pub source: Style,
    pub caret: Style,
    pub notice: Style,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        use catppuccin::Mocha;
        if !color {
            return Self::plain();
        }
        Self {
            error: Mocha::RED.bold(),
            location: Mocha::BLUE.normal(),
            source: Mocha::TEXT.normal(),
            caret: Mocha::YELLOW.bold(),
            notice: Mocha::SURFACE2.normal(),
        }
    }

    pub fn plain() -> Self {
        Self {
            error: Style::new(),
            location: Style::new(),
            source: Style::new(),
            caret: Style::new(),
            notice: Style::new(),
        }
    }
}
