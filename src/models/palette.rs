use chroma_color::Rgb;
use serde::{Deserialize, Serialize};

/// A palette as written in the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub name: String,
    #[serde(default)]
    pub colors: Vec<PaletteColorConfig>,
}

/// One palette entry; `color` accepts anything `Rgb` parses ("#d4af37", "212,175,55")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColorConfig {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedColor {
    pub name: String,
    pub rgb: Rgb,
}

/// A palette with its colors resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<NamedColor>,
}

impl Palette {
    /// Find a color by name (case-insensitive)
    pub fn color(&self, name: &str) -> Option<&NamedColor> {
        self.colors
            .iter()
            .find(|color| color.name.eq_ignore_ascii_case(name.trim()))
    }
}

impl PaletteConfig {
    /// Resolve the color strings, skipping entries that do not parse.
    pub fn resolve(&self) -> Palette {
        let colors = self
            .colors
            .iter()
            .filter_map(|entry| match entry.color.parse::<Rgb>() {
                Ok(rgb) => Some(NamedColor {
                    name: entry.name.clone(),
                    rgb,
                }),
                Err(e) => {
                    tracing::warn!(
                        palette = %self.name,
                        color = %entry.name,
                        value = %entry.color,
                        error = %e,
                        "Skipping invalid palette color"
                    );
                    None
                }
            })
            .collect();

        Palette {
            name: self.name.clone(),
            colors,
        }
    }
}

/// All configured palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteBook {
    palettes: Vec<Palette>,
}

impl PaletteBook {
    pub fn from_config(configs: &[PaletteConfig]) -> Self {
        Self {
            palettes: configs.iter().map(PaletteConfig::resolve).collect(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.iter().map(|palette| palette.name.as_str())
    }

    pub fn palettes(&self) -> &[Palette] {
        &self.palettes
    }

    /// Find a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&Palette> {
        self.palettes
            .iter()
            .find(|palette| palette.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve a `palette/color` reference
    pub fn lookup(&self, reference: &str) -> Option<&NamedColor> {
        let (palette, color) = reference.split_once('/')?;
        self.get(palette)?.color(color)
    }
}
