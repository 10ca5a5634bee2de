//! Teaser pricing
//!
//! Teasers move every leg's line by a fixed number of points and pay from
//! a fixed table instead of the product of leg prices.

use super::{Selection, Sport};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (points, legs, American odds)
type TeaserRow = (Decimal, usize, i32);

const NFL_TEASERS: &[TeaserRow] = &[
    (dec!(6), 2, -110),
    (dec!(6), 3, 180),
    (dec!(6), 4, 300),
    (dec!(6), 5, 450),
    (dec!(6), 6, 600),
    (dec!(6.5), 2, -120),
    (dec!(6.5), 3, 160),
    (dec!(6.5), 4, 250),
    (dec!(6.5), 5, 400),
    (dec!(6.5), 6, 500),
    (dec!(7), 2, -130),
    (dec!(7), 3, 140),
    (dec!(7), 4, 200),
    (dec!(7), 5, 350),
    (dec!(7), 6, 400),
];

const NBA_TEASERS: &[TeaserRow] = &[
    (dec!(4), 2, -110),
    (dec!(4), 3, 180),
    (dec!(4), 4, 300),
    (dec!(4), 5, 450),
    (dec!(4), 6, 600),
    (dec!(4.5), 2, -120),
    (dec!(4.5), 3, 160),
    (dec!(4.5), 4, 250),
    (dec!(4.5), 5, 400),
    (dec!(4.5), 6, 500),
    (dec!(5), 2, -130),
    (dec!(5), 3, 150),
    (dec!(5), 4, 200),
    (dec!(5), 5, 350),
    (dec!(5), 6, 400),
];

/// Look up fixed teaser odds, `None` when the book offers no such teaser
pub fn teaser_odds(sport: Sport, points: Decimal, legs: usize) -> Option<i32> {
    let table = match sport {
        Sport::Nfl => NFL_TEASERS,
        Sport::Nba => NBA_TEASERS,
        _ => return None,
    };

    table
        .iter()
        .find(|(p, n, _)| *p == points && *n == legs)
        .map(|(_, _, odds)| *odds)
}

/// Move a line in the bettor's favour by `points`
///
/// Spread lines are the home team's handicap, so teasing the home side
/// raises the line and teasing the away side lowers it.
pub fn apply_teaser_adjustment(line: Decimal, points: Decimal, selection: Selection) -> Decimal {
    match selection {
        Selection::Over => line - points,
        Selection::Under => line + points,
        Selection::Home => line + points,
        Selection::Away => line - points,
    }
}
