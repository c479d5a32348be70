use crate::inventory::Item;
use crate::types::ItemKey;
use super::validation::{OfferValidator, Validation};

/// A participant in the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Side {
    /// The bot's side.
    Us,
    /// The counterparty's side.
    Them,
}

impl Side {
    pub fn other(&self) -> Side {
        match self {
            Side::Us => Side::Them,
            Side::Them => Side::Us,
        }
    }
}

/// The items and flags each side has placed into the live offer.
///
/// Mutated only through [`super::TradeSession`] operations, which serialize
/// concurrent mutation attempts.
pub struct TradeOfferModel {
    our_items: Vec<Item>,
    their_items: Vec<Item>,
    our_ready: bool,
    their_ready: bool,
    our_accepted: bool,
    their_accepted: bool,
    validator: Box<dyn OfferValidator>,
}

impl TradeOfferModel {
    pub fn new(validator: Box<dyn OfferValidator>) -> Self {
        Self {
            our_items: Vec::new(),
            their_items: Vec::new(),
            our_ready: false,
            their_ready: false,
            our_accepted: false,
            their_accepted: false,
            validator,
        }
    }

    /// A side's offered items in the order they were added.
    pub fn items(&self, side: Side) -> &[Item] {
        match side {
            Side::Us => &self.our_items,
            Side::Them => &self.their_items,
        }
    }

    fn items_mut(&mut self, side: Side) -> &mut Vec<Item> {
        match side {
            Side::Us => &mut self.our_items,
            Side::Them => &mut self.their_items,
        }
    }

    /// Adds an item to a side's offer. Returns whether the offer changed; the key
    /// being present already is a no-op. Any change un-readies both sides.
    pub fn add_item(&mut self, side: Side, item: Item) -> bool {
        let items = self.items_mut(side);

        if items.iter().any(|existing| existing.key == item.key) {
            return false;
        }

        items.push(item);
        self.clear_ready();
        true
    }

    /// Removes an item from a side's offer. Any change un-readies both sides.
    pub fn remove_item(&mut self, side: Side, key: &ItemKey) -> Option<Item> {
        let items = self.items_mut(side);
        let position = items.iter().position(|item| item.key == *key)?;
        let item = items.remove(position);

        self.clear_ready();
        Some(item)
    }

    fn clear_ready(&mut self) {
        self.our_ready = false;
        self.their_ready = false;
    }

    /// Validates a side's current offer against the trade rule.
    pub fn validate(&self, side: Side) -> Validation {
        self.validator.validate(self.items(side))
    }

    /// Marks a side ready. Readiness is only granted when the side's current offer
    /// passes validation; the returned validation carries the errors otherwise.
    pub fn set_ready(&mut self, side: Side, ready: bool) -> Validation {
        if !ready {
            self.force_ready(side, false);
            return Validation::passed();
        }

        let validation = self.validate(side);

        if validation.ok() {
            self.force_ready(side, true);
        }

        validation
    }

    /// Records readiness reported by the platform, bypassing validation.
    pub(crate) fn force_ready(&mut self, side: Side, ready: bool) {
        match side {
            Side::Us => self.our_ready = ready,
            Side::Them => self.their_ready = ready,
        }
    }

    pub fn ready(&self, side: Side) -> bool {
        match side {
            Side::Us => self.our_ready,
            Side::Them => self.their_ready,
        }
    }

    pub fn both_ready(&self) -> bool {
        self.our_ready && self.their_ready
    }

    pub(crate) fn set_accepted(&mut self, side: Side) {
        match side {
            Side::Us => self.our_accepted = true,
            Side::Them => self.their_accepted = true,
        }
    }

    pub fn accepted(&self, side: Side) -> bool {
        match side {
            Side::Us => self.our_accepted,
            Side::Them => self.their_accepted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::test_item;
    use crate::trade::validation::{AcceptAny, MetalValue};

    #[test]
    fn re_adding_a_key_is_a_no_op() {
        let mut offer = TradeOfferModel::new(Box::new(AcceptAny));

        assert!(offer.add_item(Side::Them, test_item(1, "Scrap Metal")));
        assert!(!offer.add_item(Side::Them, test_item(1, "Scrap Metal")));
        assert_eq!(offer.items(Side::Them).len(), 1);
    }

    #[test]
    fn readiness_requires_validation_to_pass() {
        let mut offer = TradeOfferModel::new(Box::new(MetalValue::default()));

        offer.add_item(Side::Them, test_item(1, "Trade Chatterbox"));

        let validation = offer.set_ready(Side::Them, true);

        assert!(!validation.ok());
        assert!(!offer.ready(Side::Them));
    }

    #[test]
    fn item_changes_clear_both_ready_flags() {
        let mut offer = TradeOfferModel::new(Box::new(AcceptAny));

        offer.add_item(Side::Them, test_item(1, "Scrap Metal"));
        offer.set_ready(Side::Us, true);
        offer.set_ready(Side::Them, true);
        assert!(offer.both_ready());

        offer.add_item(Side::Us, test_item(2, "Scrap Metal"));
        assert!(!offer.ready(Side::Us));
        assert!(!offer.ready(Side::Them));
    }

    #[test]
    fn removing_an_unknown_key_returns_none() {
        let mut offer = TradeOfferModel::new(Box::new(AcceptAny));

        offer.add_item(Side::Us, test_item(1, "Scrap Metal"));

        assert!(offer.remove_item(Side::Us, &test_item(2, "Scrap Metal").key).is_none());
        assert_eq!(offer.items(Side::Us).len(), 1);
    }
}
