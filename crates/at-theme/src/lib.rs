//! Wallet palette derived from the page background.
//!
//! The UI samples a computed `background-color`, hands it to [`ThemeMemo`],
//! and writes whatever [`Palette`] comes back as `--wallet-*` CSS variables.
//! Extend by adding variables to [`derive_theme`]; the UI applies them all.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees, saturation and lightness in percent, all rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsl {
    pub h: i32,
    pub s: i32,
    pub l: i32,
}

/// Parse the first `rgb(r, g, b)` / `rgba(r, g, b, a)` found in `sample`.
pub fn parse_rgb(sample: &str) -> Option<Rgb> {
    let start = sample.find("rgb")?;
    let rest = &sample[start + 3..];
    let rest = rest.strip_prefix('a').unwrap_or(rest);
    let body = rest.strip_prefix('(')?;
    let body = &body[..body.find(')')?];

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }
    if let Some(alpha) = parts.get(3) {
        alpha.parse::<f64>().ok()?;
    }
    let channel = |s: &str| s.parse::<u8>().ok();
    Some(Rgb {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
    })
}

/// BT.709 luminance below 0.4. Anything unparseable counts as light.
pub fn is_dark(sample: &str) -> bool {
    parse_rgb(sample).is_some_and(|c| luminance(c) < 0.4)
}

fn luminance(c: Rgb) -> f64 {
    (0.2126 * f64::from(c.r) + 0.7152 * f64::from(c.g) + 0.0722 * f64::from(c.b)) / 255.0
}

pub fn rgb_to_hsl(c: Rgb) -> Hsl {
    let r = f64::from(c.r) / 255.0;
    let g = f64::from(c.g) / 255.0;
    let b = f64::from(c.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (mut h, mut s) = (0.0, 0.0);
    if max != min {
        let d = max - min;
        s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h = (h * 60.0).round();
    }

    Hsl {
        h: h as i32,
        s: (s * 100.0).round() as i32,
        l: (l * 100.0).round() as i32,
    }
}

/// Ordered CSS custom properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    vars: Vec<(&'static str, String)>,
}

impl Palette {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.vars.iter().map(|(name, value)| (*name, value.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

pub fn derive_theme(color: Rgb, dark: bool) -> Palette {
    let Hsl { h, s, l } = rgb_to_hsl(color);
    let primary_hue = (h + 30) % 360;
    let secondary_hue = (h + 180) % 360;
    let s = (s + 20).min(100);

    let text_l = if dark { 90 } else { 10 };
    let button_l = if dark { (l + 20).min(95) } else { (l - 20).max(5) };
    let hover_l = if dark { (l + 30).min(98) } else { (l - 30).max(2) };
    let danger_l = if dark { 60 } else { 40 };
    let shift = |by: i32| if dark { l + by } else { l - by };

    let vars = vec![
        ("--wallet-primary", format!("hsla({primary_hue}, {s}%, {button_l}%, 0.9)")),
        ("--wallet-primary-hover", format!("hsla({primary_hue}, {s}%, {hover_l}%, 1)")),
        ("--wallet-secondary", format!("hsla({secondary_hue}, {s}%, {}%, 0.7)", shift(10))),
        ("--wallet-secondary-hover", format!("hsla({secondary_hue}, {s}%, {}%, 0.85)", shift(15))),
        ("--wallet-danger", format!("hsla(0, 70%, {danger_l}%, 0.9)")),
        ("--wallet-danger-hover", format!("hsla(0, 70%, {}%, 1)", danger_l + 10)),
        ("--wallet-text", format!("hsla({h}, {s}%, {text_l}%, 1)")),
        ("--wallet-text-inverted", pick(dark, "#ffffff", "#000000")),
        ("--wallet-border", format!("hsla({h}, {s}%, {}%, 0.3)", shift(20))),
        ("--wallet-shadow", format!("0 4px 12px rgba(0, 0, 0, {})", pick(dark, "0.3", "0.1"))),
        ("--wallet-shadow-hover", format!("0 6px 16px rgba(0, 0, 0, {})", pick(dark, "0.4", "0.2"))),
        ("--wallet-bg", pick(dark, "rgba(0, 0, 0, 0.3)", "rgba(255, 255, 255, 0.3)")),
        ("--wallet-border-radius", "12px".to_owned()),
        ("--wallet-backdrop-filter", pick(dark, "blur(8px)", "blur(6px)")),
    ];
    Palette { vars }
}

fn pick(dark: bool, on_dark: &str, on_light: &str) -> String {
    let chosen = if dark { on_dark } else { on_light };
    chosen.to_owned()
}

/// Remembers the last sampled background so repeated samples are free.
#[derive(Debug, Default)]
pub struct ThemeMemo {
    last: Option<String>,
}

impl ThemeMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a palette only when the sample changed and could be parsed.
    pub fn observe(&mut self, sample: &str) -> Option<Palette> {
        if self.last.as_deref() == Some(sample) {
            return None;
        }
        self.last = Some(sample.to_owned());

        let Some(color) = parse_rgb(sample) else {
            debug!(%sample, "background colour not parseable, keeping theme");
            return None;
        };
        let dark = luminance(color) < 0.4;
        debug!(%sample, dark, "deriving wallet theme");
        Some(derive_theme(color, dark))
    }

    pub fn last_sample(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_computed_style_colours() {
        assert_eq!(parse_rgb("rgb(30, 40, 50)"), Some(Rgb { r: 30, g: 40, b: 50 }));
        assert_eq!(parse_rgb("rgba(1,2,3, 0.5)"), Some(Rgb { r: 1, g: 2, b: 3 }));
        assert_eq!(parse_rgb("transparent"), None);
        assert_eq!(parse_rgb("rgb(1, 2)"), None);
        assert_eq!(parse_rgb("#ffffff"), None);
    }

    #[test]
    fn classifies_by_luminance() {
        assert!(is_dark("rgb(0, 0, 0)"));
        assert!(is_dark("rgb(30, 30, 30)"));
        assert!(!is_dark("rgb(255, 255, 255)"));
        // pure green is bright under BT.709 weights
        assert!(!is_dark("rgb(0, 255, 0)"));
        assert!(is_dark("rgb(0, 0, 255)"));
        assert!(!is_dark("transparent"));
    }

    #[test]
    fn converts_to_rounded_hsl() {
        assert_eq!(rgb_to_hsl(Rgb { r: 255, g: 0, b: 0 }), Hsl { h: 0, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(Rgb { r: 0, g: 128, b: 255 }), Hsl { h: 210, s: 100, l: 50 });
        assert_eq!(rgb_to_hsl(Rgb { r: 30, g: 30, b: 30 }), Hsl { h: 0, s: 0, l: 12 });
    }

    #[test]
    fn dark_background_gets_lighter_controls() {
        let palette = derive_theme(Rgb { r: 30, g: 30, b: 30 }, true);

        assert_eq!(palette.len(), 14);
        assert_eq!(palette.get("--wallet-primary"), Some("hsla(30, 20%, 32%, 0.9)"));
        assert_eq!(palette.get("--wallet-primary-hover"), Some("hsla(30, 20%, 42%, 1)"));
        assert_eq!(palette.get("--wallet-secondary"), Some("hsla(180, 20%, 22%, 0.7)"));
        assert_eq!(palette.get("--wallet-text"), Some("hsla(0, 20%, 90%, 1)"));
        assert_eq!(palette.get("--wallet-text-inverted"), Some("#ffffff"));
        assert_eq!(palette.get("--wallet-shadow-hover"), Some("0 6px 16px rgba(0, 0, 0, 0.4)"));
        assert_eq!(palette.get("--wallet-backdrop-filter"), Some("blur(8px)"));
    }

    #[test]
    fn light_background_gets_darker_controls() {
        let palette = derive_theme(Rgb { r: 255, g: 255, b: 255 }, false);

        assert_eq!(palette.get("--wallet-primary"), Some("hsla(30, 20%, 80%, 0.9)"));
        assert_eq!(palette.get("--wallet-primary-hover"), Some("hsla(30, 20%, 70%, 1)"));
        assert_eq!(palette.get("--wallet-secondary-hover"), Some("hsla(180, 20%, 85%, 0.85)"));
        assert_eq!(palette.get("--wallet-danger"), Some("hsla(0, 70%, 40%, 0.9)"));
        assert_eq!(palette.get("--wallet-danger-hover"), Some("hsla(0, 70%, 50%, 1)"));
        assert_eq!(palette.get("--wallet-bg"), Some("rgba(255, 255, 255, 0.3)"));
    }

    #[test]
    fn memo_skips_identical_samples() {
        let mut memo = ThemeMemo::new();

        let first = memo.observe("rgb(30, 30, 30)");
        assert!(first.is_some());
        assert!(memo.observe("rgb(30, 30, 30)").is_none());

        assert!(memo.observe("not a colour").is_none());
        assert_eq!(memo.last_sample(), Some("not a colour"));
        assert!(memo.observe("not a colour").is_none());

        let changed = memo.observe("rgb(255, 255, 255)");
        assert_ne!(changed, first);
    }
}
