//! Same-game parlay grouping

use super::BetLeg;
use std::collections::HashMap;
use uuid::Uuid;

/// Tag legs that share a game with a common group id
///
/// Every game with more than one leg in the bet gets a fresh group id;
/// legs alone on their game are left ungrouped. Grouping is informational,
/// pricing still treats each leg as an independent factor.
pub fn assign_sgp_groups(legs: &mut [BetLeg]) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for leg in legs.iter() {
        *counts.entry(leg.game_id.as_str()).or_default() += 1;
    }

    let groups: HashMap<String, Uuid> = counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(game, _)| (game.to_string(), Uuid::new_v4()))
        .collect();

    for leg in legs.iter_mut() {
        leg.sgp_group = groups.get(&leg.game_id).copied();
    }
}
