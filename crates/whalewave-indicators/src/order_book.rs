//! Liquidity wall detection on an order book snapshot.

use serde::{Deserialize, Serialize};
use whalewave_core::types::{OrderBook, OrderBookLevel};

/// A price level where one side heavily outweighs the other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub price: f64,
    pub bid_quantity: f64,
    pub ask_quantity: f64,
}

/// Walls on either side of the current price, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallLevels {
    /// Bid-heavy levels at or below price
    pub supports: Vec<Wall>,
    /// Ask-heavy levels at or above price
    pub resistances: Vec<Wall>,
}

impl WallLevels {
    pub fn support_prices(&self) -> Vec<f64> {
        self.supports.iter().map(|w| w.price).collect()
    }

    pub fn resistance_prices(&self) -> Vec<f64> {
        self.resistances.iter().map(|w| w.price).collect()
    }

    pub fn nearest_support(&self) -> Option<f64> {
        self.supports.first().map(|w| w.price)
    }

    pub fn nearest_resistance(&self) -> Option<f64> {
        self.resistances.first().map(|w| w.price)
    }
}

/// Sum quantity per distinct price.
fn aggregate(levels: &[OrderBookLevel]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<(f64, f64)> = levels.iter().map(|l| (l.price, l.quantity)).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for (price, qty) in sorted {
        match merged.last_mut() {
            Some(last) if last.0 == price => last.1 += qty,
            _ => merged.push((price, qty)),
        }
    }
    merged
}

fn quantity_at(levels: &[(f64, f64)], price: f64) -> f64 {
    levels
        .binary_search_by(|probe| probe.0.total_cmp(&price))
        .map_or(0.0, |idx| levels[idx].1)
}

/// Find support and resistance walls.
///
/// A level is a support wall when its bid quantity exceeds `ratio` times the
/// ask quantity at the same price and it sits at or below `price`; resistance
/// mirrors this for asks at or above `price`. At most `max_levels` walls are
/// kept per side, closest to `price` first.
pub fn detect_walls(book: &OrderBook, price: f64, ratio: f64, max_levels: usize) -> WallLevels {
    let bids = aggregate(&book.bids);
    let asks = aggregate(&book.asks);

    let wall = |p: f64| Wall {
        price: p,
        bid_quantity: quantity_at(&bids, p),
        ask_quantity: quantity_at(&asks, p),
    };

    let mut supports: Vec<Wall> = bids
        .iter()
        .map(|&(p, _)| wall(p))
        .filter(|w| w.price <= price && w.bid_quantity > w.ask_quantity * ratio)
        .collect();
    let mut resistances: Vec<Wall> = asks
        .iter()
        .map(|&(p, _)| wall(p))
        .filter(|w| w.price >= price && w.ask_quantity > w.bid_quantity * ratio)
        .collect();

    supports.sort_by(|a, b| b.price.total_cmp(&a.price));
    resistances.sort_by(|a, b| a.price.total_cmp(&b.price));
    supports.truncate(max_levels);
    resistances.truncate(max_levels);

    WallLevels {
        supports,
        resistances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lvl(price: f64, qty: f64) -> OrderBookLevel {
        OrderBookLevel::new(price, qty)
    }

    #[test]
    fn test_walls_split_by_price() {
        let book = OrderBook::new(
            vec![lvl(99.0, 50.0), lvl(98.0, 5.0), lvl(97.0, 40.0)],
            vec![lvl(101.0, 60.0), lvl(102.0, 2.0), lvl(103.0, 30.0)],
        );
        let walls = detect_walls(&book, 100.0, 3.0, 5);

        assert_eq!(walls.support_prices(), vec![99.0, 98.0, 97.0]);
        assert_eq!(walls.resistance_prices(), vec![101.0, 102.0, 103.0]);
        assert_eq!(walls.nearest_support(), Some(99.0));
    }

    #[test]
    fn test_balanced_level_is_not_a_wall() {
        let book = OrderBook::new(vec![lvl(100.0, 10.0)], vec![lvl(100.0, 8.0)]);
        let walls = detect_walls(&book, 100.0, 3.0, 5);

        assert!(walls.supports.is_empty());
        assert!(walls.resistances.is_empty());
    }

    #[test]
    fn test_duplicate_levels_are_merged() {
        let book = OrderBook::new(
            vec![lvl(95.0, 10.0), lvl(95.0, 15.0)],
            vec![lvl(95.0, 9.0)],
        );
        let walls = detect_walls(&book, 100.0, 2.0, 5);

        assert_eq!(walls.supports.len(), 1);
        assert_eq!(walls.supports[0].bid_quantity, 25.0);
        assert_eq!(walls.supports[0].ask_quantity, 9.0);
    }

    #[test]
    fn test_keeps_nearest_levels() {
        let bids = (1..=10).map(|i| lvl(100.0 - i as f64, 10.0)).collect();
        let book = OrderBook::new(bids, vec![]);
        let walls = detect_walls(&book, 100.0, 3.0, 3);

        assert_eq!(walls.support_prices(), vec![99.0, 98.0, 97.0]);
    }

    #[test]
    fn test_empty_book() {
        assert_eq!(
            detect_walls(&OrderBook::default(), 100.0, 3.0, 5),
            WallLevels::default()
        );
    }
}
