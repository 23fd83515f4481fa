use std::collections::HashMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// ColorBrewer "Set3", the twelve pastel categories used for genres.
pub const SET3: [Color32; 12] = [
    Color32::from_rgb(0x8d, 0xd3, 0xc7),
    Color32::from_rgb(0xff, 0xff, 0xb3),
    Color32::from_rgb(0xbe, 0xba, 0xda),
    Color32::from_rgb(0xfb, 0x80, 0x72),
    Color32::from_rgb(0x80, 0xb1, 0xd3),
    Color32::from_rgb(0xfd, 0xb4, 0x62),
    Color32::from_rgb(0xb3, 0xde, 0x69),
    Color32::from_rgb(0xfc, 0xcd, 0xe5),
    Color32::from_rgb(0xd9, 0xd9, 0xd9),
    Color32::from_rgb(0xbc, 0x80, 0xbd),
    Color32::from_rgb(0xcc, 0xeb, 0xc5),
    Color32::from_rgb(0xff, 0xed, 0x6f),
];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.55, 0.72);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ordinal scale: genre → Color32
// ---------------------------------------------------------------------------

/// Maps genres to distinct colours in domain order. Up to twelve genres use
/// [`SET3`]; larger domains switch to an evenly spaced hue wheel so no two
/// genres share a colour.
#[derive(Debug, Clone)]
pub struct GenrePalette {
    mapping: HashMap<String, Color32>,
    order: Vec<String>,
    default_color: Color32,
}

impl GenrePalette {
    pub fn new<'a>(genres: impl IntoIterator<Item = &'a String>) -> Self {
        let mut order: Vec<String> = Vec::new();
        for g in genres {
            if !order.contains(g) {
                order.push(g.clone());
            }
        }
        let colors = if order.len() <= SET3.len() {
            SET3.to_vec()
        } else {
            generate_palette(order.len())
        };
        let mapping = order.iter().cloned().zip(colors).collect();

        GenrePalette {
            mapping,
            order,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a genre; unknown genres are grey.
    pub fn color_for(&self, genre: &str) -> Color32 {
        self.mapping
            .get(genre)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Colour for a record's first genre.
    pub fn color_for_optional(&self, genre: Option<&str>) -> Color32 {
        genre.map_or(self.default_color, |g| self.color_for(g))
    }

    /// Return the legend entries (genre → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|g| (g.clone(), self.color_for(g)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_domain_uses_set3() {
        let genres: Vec<String> = vec!["Drama".into(), "Comedy".into(), "Drama".into()];
        let palette = GenrePalette::new(&genres);
        assert_eq!(palette.color_for("Drama"), SET3[0]);
        assert_eq!(palette.color_for("Comedy"), SET3[1]);
        assert_eq!(palette.color_for("Western"), Color32::GRAY);
        assert_eq!(palette.color_for_optional(None), Color32::GRAY);
        assert_eq!(palette.legend_entries().len(), 2);
    }

    #[test]
    fn test_large_domain_is_distinct() {
        let genres: Vec<String> = (0..20).map(|i| format!("g{i}")).collect();
        let palette = GenrePalette::new(&genres);
        let mut colors: Vec<Color32> = genres.iter().map(|g| palette.color_for(g)).collect();
        colors.sort_by_key(|c| c.to_array());
        colors.dedup();
        assert_eq!(colors.len(), 20);
    }

    #[test]
    fn test_generate_palette_len() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
