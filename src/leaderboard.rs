//! Leaderboard: the current player ranked against a fixed roster of peers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::category::Category;
use crate::gate::Badge;
use crate::progress::ProgressMap;

/// Static competitor record. Peer badges are fixed display labels, not
/// derived from their score.
pub struct Peer {
    pub name: &'static str,
    pub score: u32,
    /// Completed levels in `Category::ALL` order.
    pub completed: [u32; 5],
    pub badge: Badge,
}

pub const PEERS: [Peer; 8] = [
    Peer { name: "Alex Chen", score: 2850, completed: [30, 30, 30, 3, 2], badge: Badge::Grandmaster },
    Peer { name: "Sarah Kim", score: 2720, completed: [30, 29, 28, 0, 0], badge: Badge::Master },
    Peer { name: "Mike Johnson", score: 2650, completed: [30, 28, 27, 0, 0], badge: Badge::Expert },
    Peer { name: "Emma Davis", score: 2580, completed: [29, 27, 26, 0, 0], badge: Badge::Advanced },
    Peer { name: "David Wilson", score: 2490, completed: [28, 26, 25, 0, 0], badge: Badge::Advanced },
    Peer { name: "Lisa Zhang", score: 2420, completed: [27, 25, 24, 0, 0], badge: Badge::Intermediate },
    Peer { name: "Tom Brown", score: 2350, completed: [26, 24, 23, 0, 0], badge: Badge::Intermediate },
    Peer { name: "Anna Lee", score: 2280, completed: [25, 23, 22, 0, 0], badge: Badge::Intermediate },
];

pub const CURRENT_USER_NAME: &str = "You";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: u32,
    pub name: String,
    pub score: u32,
    pub total_levels: u32,
    /// `{"html": 30, "css": 29, ...}`
    pub completed_levels: BTreeMap<Category, u32>,
    pub badge: Badge,
    pub is_current_user: bool,
}

/// Peers then the current player, sorted by descending score. The sort is
/// stable, so on a tie the player ranks below every peer with that score.
pub fn standings(user_score: u32, progress: &ProgressMap) -> Vec<Standing> {
    let mut all: Vec<Standing> = PEERS
        .iter()
        .map(|p| Standing {
            rank: 0,
            name: p.name.to_string(),
            score: p.score,
            total_levels: p.completed.iter().sum(),
            completed_levels: Category::ALL.into_iter().zip(p.completed).collect(),
            badge: p.badge,
            is_current_user: false,
        })
        .collect();

    all.push(Standing {
        rank: 0,
        name: CURRENT_USER_NAME.to_string(),
        score: user_score,
        total_levels: progress.total_completed(),
        completed_levels: Category::ALL
            .into_iter()
            .map(|c| (c, progress.completed_count(c)))
            .collect(),
        badge: Badge::for_score(user_score),
        is_current_user: true,
    });

    all.sort_by(|a, b| b.score.cmp(&a.score));
    for (idx, s) in all.iter_mut().enumerate() {
        s.rank = idx as u32 + 1;
    }
    all
}

/// The player's rank, or the table length if they are somehow absent.
pub fn current_user_rank(table: &[Standing]) -> u32 {
    table
        .iter()
        .find(|s| s.is_current_user)
        .map_or(table.len() as u32, |s| s.rank)
}
