use crate::material::{Material, Rgb};
use std::time::Instant;

/// A single grid cell.
///
/// `burns_until` is only meaningful while `material` is [`Material::Fire`]:
/// it is the wall-clock instant at which the fire transitions to smoke or
/// ember. Fire with no deadline burns until a rule forces a transition.
///
/// `tint` is only meaningful for [`Material::Wood`] and is display-only;
/// wood imported from an image keeps the source pixel color here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub material: Material,
    pub burns_until: Option<Instant>,
    pub tint: Option<Rgb>,
}

impl Cell {
    pub fn empty() -> Self {
        Self::of(Material::Empty)
    }

    /// A cell of the given material with no timer and no tint.
    pub fn of(material: Material) -> Self {
        Self {
            material,
            burns_until: None,
            tint: None,
        }
    }

    /// A fire cell that expires at `burns_until`.
    pub fn fire(burns_until: Instant) -> Self {
        Self {
            material: Material::Fire,
            burns_until: Some(burns_until),
            tint: None,
        }
    }

    /// A wood cell with an explicit tint.
    pub fn wood(tint: Rgb) -> Self {
        Self {
            material: Material::Wood,
            burns_until: None,
            tint: Some(tint),
        }
    }

    /// The one logical display color for this cell.
    ///
    /// Wood uses its tint when present; everything else uses the
    /// material's base color.
    pub fn display_color(&self) -> Rgb {
        match (self.material, self.tint) {
            (Material::Wood, Some(tint)) => tint,
            (material, _) => material.base_color(),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::DEFAULT_WOOD_TINT;
    use std::time::{Duration, Instant};

    #[test]
    fn of_clears_timer_and_tint() {
        let cell = Cell::of(Material::Sand);
        assert_eq!(cell.material, Material::Sand);
        assert!(cell.burns_until.is_none());
        assert!(cell.tint.is_none());
    }

    #[test]
    fn fire_carries_its_deadline() {
        let deadline = Instant::now() + Duration::from_millis(750);
        let cell = Cell::fire(deadline);
        assert_eq!(cell.material, Material::Fire);
        assert_eq!(cell.burns_until, Some(deadline));
    }

    #[test]
    fn wood_tint_wins_over_base_color() {
        let tinted = Cell::wood(Rgb::new(10, 20, 30));
        assert_eq!(tinted.display_color(), Rgb::new(10, 20, 30));

        // Wood without a tint falls back to the default wood color.
        let plain = Cell::of(Material::Wood);
        assert_eq!(plain.display_color(), DEFAULT_WOOD_TINT);
    }

    #[test]
    fn non_wood_ignores_tint() {
        let mut cell = Cell::of(Material::Fire);
        cell.tint = Some(Rgb::new(1, 2, 3));
        assert_eq!(cell.display_color(), Material::Fire.base_color());
    }
}
