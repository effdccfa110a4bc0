/// An 8-bit RGB display color for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Tint used for wood painted with the brush (imported wood keeps the
/// source pixel color instead).
pub const DEFAULT_WOOD_TINT: Rgb = Rgb::new(139, 69, 19);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Material {
    Empty,
    Wood,
    Fire,
    Smoke,
    Ember,
    Sand,
    Water,
}

impl Material {
    /// Display color for cells of this material that carry no tint.
    pub fn base_color(self) -> Rgb {
        match self {
            Material::Empty => Rgb::new(0, 0, 0),
            Material::Wood => DEFAULT_WOOD_TINT,
            Material::Fire => Rgb::new(255, 69, 0),
            Material::Smoke => Rgb::new(80, 80, 80),
            Material::Ember => Rgb::new(139, 0, 0),
            Material::Sand => Rgb::new(255, 215, 0),
            Material::Water => Rgb::new(135, 206, 235),
        }
    }

    /// Half-extent of the square brush footprint for this material.
    ///
    /// `0` means a single cell, `1` a 3×3 square, `2` a 5×5 square.
    pub fn brush_half_extent(self) -> i32 {
        match self {
            Material::Sand | Material::Water => 1,
            Material::Wood => 2,
            _ => 0,
        }
    }

    /// Whether cells of this material fall under gravity.
    pub fn falls(self) -> bool {
        matches!(self, Material::Sand | Material::Water)
    }
}
