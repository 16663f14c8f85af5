use crossterm::style::{style, Color as TermColor, Stylize};

use crate::color::Color;
use crate::registry::{Institution, PaletteRegistry, Role};

const SWATCH_WIDTH: usize = 11;

fn to_term(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/// Choose black or white text for readable labels on the given background.
fn contrast_fg(c: Color) -> TermColor {
    if c.is_light() {
        TermColor::Black
    } else {
        TermColor::White
    }
}

/// A single swatch: the hex code centered on its own color.
fn swatch(c: Color, styled: bool) -> String {
    let label = format!("{:^w$}", c.to_hex(), w = SWATCH_WIDTH);
    if styled {
        style(label).on(to_term(c)).with(contrast_fg(c)).to_string()
    } else {
        label
    }
}

/// One line for an institution: name followed by primary, secondary and accent.
pub fn institution_line(inst: &Institution, styled: bool) -> String {
    let swatches: Vec<String> = Role::ALL
        .iter()
        .map(|&role| swatch(inst.color(role), styled))
        .collect();
    format!(
        "{:<7} {:<24} {}",
        inst.id.as_str(),
        inst.display_name,
        swatches.join(" ")
    )
}

/// Header plus one line per registered institution, in table order.
pub fn palette_table(registry: &PaletteRegistry, styled: bool) -> String {
    let mut out = format!(
        "{:<7} {:<24} {:^w$} {:^w$} {:^w$}\n",
        "id",
        "name",
        Role::Primary.label(),
        Role::Secondary.label(),
        Role::Accent.label(),
        w = SWATCH_WIDTH,
    );
    for inst in registry.institutions() {
        out.push_str(&institution_line(inst, styled));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_table_lists_every_institution() {
        let registry = PaletteRegistry::laccd().unwrap();
        let table = palette_table(&registry, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("id"));
        assert!(lines[6].starts_with("lapc    LAPC (LA Pierce)"));
        assert!(lines[6].contains("#bf2116"));
        assert!(!table.contains('\x1b'));
    }

    #[test]
    fn styled_line_uses_truecolor_background() {
        let registry = PaletteRegistry::laccd().unwrap();
        let line = institution_line(&registry.institutions()[0], true);
        assert!(line.contains('\x1b'));
        // 48;2;r;g;b selects a 24-bit background.
        assert!(line.contains("48;2;0;90;149"), "{line:?}");
    }

    #[test]
    fn label_color_follows_lightness() {
        assert_eq!(contrast_fg(Color::new(255, 255, 255)), TermColor::Black);
        assert_eq!(contrast_fg(Color::new(0, 0x34, 0x5f)), TermColor::White);
    }
}
