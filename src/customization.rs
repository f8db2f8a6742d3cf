//! Customizations
//!
//! The made-to-order options attached to a cart item, distinct from the
//! product template they derive from.

use rust_decimal::Decimal;

/// Drive mechanism for a blind or curtain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MechanismType {
    /// Chain- or wand-operated.
    Manual,

    /// Motorised.
    Electric,
}

/// Side on which a manual mechanism's chain or wand hangs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MechanismSide {
    /// Left-hand side.
    Left,

    /// Right-hand side.
    Right,
}

/// Surface the treatment is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountingType {
    /// Fixed to the wall above the window.
    Wall,

    /// Fixed to the ceiling.
    Ceiling,
}

/// Made-to-order options for a single cart item.
///
/// Dimension range limits (e.g. 20–500cm) are a caller concern; this type
/// only guarantees that the mechanism side is absent for electric mechanisms,
/// where it is neither meaningful nor charged.
#[derive(Debug, Clone, PartialEq)]
pub struct Customization {
    width_cm: Decimal,
    height_cm: Decimal,
    mechanism: MechanismType,
    mechanism_side: Option<MechanismSide>,
    mounting: MountingType,
    with_box: bool,
}

impl Customization {
    /// Creates a new customization, dropping the mechanism side when the
    /// mechanism is electric.
    #[must_use]
    pub fn new(
        width_cm: Decimal,
        height_cm: Decimal,
        mechanism: MechanismType,
        mechanism_side: Option<MechanismSide>,
        mounting: MountingType,
        with_box: bool,
    ) -> Self {
        let mechanism_side = match mechanism {
            MechanismType::Manual => mechanism_side,
            MechanismType::Electric => None,
        };

        Self {
            width_cm,
            height_cm,
            mechanism,
            mechanism_side,
            mounting,
            with_box,
        }
    }

    /// Width in centimetres.
    #[must_use]
    pub fn width_cm(&self) -> Decimal {
        self.width_cm
    }

    /// Height in centimetres.
    #[must_use]
    pub fn height_cm(&self) -> Decimal {
        self.height_cm
    }

    /// Drive mechanism.
    #[must_use]
    pub fn mechanism(&self) -> MechanismType {
        self.mechanism
    }

    /// Mechanism side; always `None` for electric mechanisms.
    #[must_use]
    pub fn mechanism_side(&self) -> Option<MechanismSide> {
        self.mechanism_side
    }

    /// Mounting surface.
    #[must_use]
    pub fn mounting(&self) -> MountingType {
        self.mounting
    }

    /// Whether the cosmetic housing box was chosen.
    #[must_use]
    pub fn with_box(&self) -> bool {
        self.with_box
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_mechanism_keeps_side() {
        let custom = Customization::new(
            Decimal::from(120),
            Decimal::from(150),
            MechanismType::Manual,
            Some(MechanismSide::Left),
            MountingType::Wall,
            false,
        );

        assert_eq!(custom.mechanism_side(), Some(MechanismSide::Left));
        assert_eq!(custom.mounting(), MountingType::Wall);
    }

    #[test]
    fn electric_mechanism_drops_side() {
        let custom = Customization::new(
            Decimal::from(120),
            Decimal::from(150),
            MechanismType::Electric,
            Some(MechanismSide::Right),
            MountingType::Ceiling,
            true,
        );

        assert_eq!(custom.mechanism_side(), None);
        assert!(custom.with_box());
    }
}
