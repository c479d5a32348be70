use crate::inventory::Item;

/// The outcome of validating one side's offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// Total value computed by the rule. Zero for rules without a value concept.
    pub points: u32,
    /// Human-readable errors in the order the items were evaluated.
    pub errors: Vec<String>,
}

impl Validation {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn passed() -> Self {
        Self::default()
    }
}

/// A rule evaluated synchronously against the live offer of one side, never
/// against a stale snapshot.
pub trait OfferValidator: Send + Sync {
    fn validate(&self, items: &[Item]) -> Validation;
}

/// Accepts any offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAny;

impl OfferValidator for AcceptAny {
    fn validate(&self, _items: &[Item]) -> Validation {
        Validation::passed()
    }
}

/// Values metal items in scrap: 1 per Scrap Metal, 3 per Reclaimed Metal, 9 per
/// Refined Metal, matched on the original name. Anything else is rejected.
#[derive(Debug, Clone, Copy)]
pub struct MetalValue {
    /// The minimum scrap value the offer must reach.
    pub minimum: u32,
}

impl Default for MetalValue {
    fn default() -> Self {
        Self { minimum: 1 }
    }
}

impl OfferValidator for MetalValue {
    fn validate(&self, items: &[Item]) -> Validation {
        let mut validation = Validation::default();

        for item in items {
            match item.original_name.as_str() {
                "Scrap Metal" => validation.points += 1,
                "Reclaimed Metal" => validation.points += 3,
                "Refined Metal" => validation.points += 9,
                _ => validation.errors.push(format!("Item {} is not a metal.", item.name)),
            }
        }

        if validation.points < self.minimum {
            validation.errors.push(format!("You must put up at least {} scrap.", self.minimum));
        }

        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::test_item;

    #[test]
    fn rejects_non_metal_items() {
        let items = vec![
            test_item(1, "Scrap Metal"),
            test_item(2, "Scrap Metal"),
            test_item(3, "Trade Chatterbox"),
        ];
        let validation = MetalValue::default().validate(&items);

        assert!(!validation.ok());
        assert_eq!(validation.points, 2);
        assert_eq!(validation.errors, vec!["Item Trade Chatterbox is not a metal."]);
    }

    #[test]
    fn accepts_pure_metal_offer() {
        let items = vec![
            test_item(1, "Scrap Metal"),
            test_item(2, "Scrap Metal"),
            test_item(3, "Scrap Metal"),
        ];
        let validation = MetalValue::default().validate(&items);

        assert!(validation.ok());
        assert_eq!(validation.points, 3);
    }

    #[test]
    fn enforces_minimum_value() {
        let validation = MetalValue { minimum: 4 }.validate(&[test_item(1, "Reclaimed Metal")]);

        assert_eq!(validation.points, 3);
        assert_eq!(validation.errors, vec!["You must put up at least 4 scrap."]);
    }

    #[test]
    fn errors_follow_evaluation_order() {
        let items = vec![
            test_item(1, "Banana"),
            test_item(2, "Refined Metal"),
            test_item(3, "Apple"),
        ];
        let validation = MetalValue::default().validate(&items);

        assert_eq!(validation.errors, vec![
            "Item Banana is not a metal.",
            "Item Apple is not a metal.",
        ]);
    }
}
