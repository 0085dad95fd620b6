//! Agreement-ratio similarity between users over their overlapping ratings.

use crate::error::Result;
use crate::graph::queries;
use crate::ids::Id;
use crate::model::{Similarity, User};
use crate::store::{self, Store};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::instrument;

/// Agreement-ratio similarity between two users, given their already
/// hydrated `ratings` maps. `None` if the two users share no rated item —
/// such pairs are not persisted (SPEC_FULL.md §4.4.1).
pub(crate) fn similarity_index(a: &User, b: &User) -> Option<f64> {
    let mut agree: i64 = 0;
    let mut disagree: i64 = 0;

    for (item_id, rating_a) in &a.ratings {
        if let Some(rating_b) = b.ratings.get(item_id) {
            if rating_a.score == rating_b.score {
                agree += 1;
            } else {
                disagree += 1;
            }
        }
    }

    if agree + disagree == 0 {
        return None;
    }

    Some((agree - disagree) as f64 / (agree + disagree) as f64)
}

/// Recompute `user`'s similarity row against every rating-neighbor and
/// persist both directions of each symmetric pair.
///
/// Neighbor pairs are scored in parallel with `rayon` (pure CPU-bound work
/// over data already hydrated by [`queries::get_rating_neighbors`]), then
/// each pair is written in its own write-transaction so a mid-batch failure
/// leaves only that one pair unresolved; the similarity row is a cache and
/// is reconstructible on the next mutation (SPEC_FULL.md §4.4.2).
#[instrument(skip(store, user), fields(user_id = %user.id))]
pub fn update_similarity(store: &Store, user: &User) -> Result<()> {
    let mut user = user.clone();
    user.ratings = queries::get_ratings(store, &user.id)?;

    let neighbors = queries::get_rating_neighbors(store, &user)?;

    let pairs: Vec<(Id, f64)> = neighbors
        .par_iter()
        .filter_map(|(neighbor_id, neighbor)| {
            similarity_index(&user, neighbor).map(|index| (*neighbor_id, index))
        })
        .collect();

    for (neighbor_id, index) in pairs {
        store.write(|view| {
            let mut row_u = view.get_map::<f64>(store::USER_SIMILARITY, "similarity-row", &user.id)?;
            row_u.insert(neighbor_id, index);
            view.put_map(store::USER_SIMILARITY, "similarity-row", &user.id, &row_u)?;

            let mut row_n =
                view.get_map::<f64>(store::USER_SIMILARITY, "similarity-row", &neighbor_id)?;
            row_n.insert(user.id, index);
            view.put_map(store::USER_SIMILARITY, "similarity-row", &neighbor_id, &row_n)?;

            Ok(())
        })?;
    }

    Ok(())
}

/// `user_id`'s persisted similarity row, hydrated into peer `User` records.
/// Peers that no longer resolve to a user record are skipped.
pub fn get_similarity(store: &Store, user_id: &Id) -> Result<HashMap<Id, Similarity>> {
    store.read(|view| {
        let row = view.get_map::<f64>(store::USER_SIMILARITY, "similarity-row", user_id)?;
        let mut result = HashMap::new();
        for (peer_id, index) in row {
            match view.get_record::<User>(store::USER, "user", &peer_id)? {
                Some(user) => {
                    result.insert(peer_id, Similarity { user, index });
                }
                None => store::warn_dangling_reference("user", &peer_id),
            }
        }
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, Rating, Score};

    fn rated(pairs: &[(&str, i8)]) -> HashMap<Id, Rating> {
        pairs
            .iter()
            .map(|(name, score)| {
                let item = Item::new(*name);
                let score = if *score > 0 { Score::Like } else { Score::Dislike };
                (item.id, Rating { item, score })
            })
            .collect()
    }

    // Scenario S5 from SPEC_FULL.md §8.
    #[test]
    fn test_s5_similarity_values_and_symmetry() {
        let mut niko = User::new("niko");
        let mut aubreigh = User::new("aubreigh");
        let mut johnny = User::new("johnny");
        let mut nick = User::new("nick");

        let phoenix = Item::new("phoenix");
        let pittsburgh = Item::new("pittsburgh");
        let boulder = Item::new("boulder");
        let los_angeles = Item::new("losAngeles");
        let portland = Item::new("portland");
        let seattle = Item::new("seattle");

        let rating = |item: &Item, score: Score| Rating { item: item.clone(), score };

        niko.ratings = HashMap::from([
            (phoenix.id, rating(&phoenix, Score::Dislike)),
            (pittsburgh.id, rating(&pittsburgh, Score::Like)),
            (boulder.id, rating(&boulder, Score::Like)),
            (los_angeles.id, rating(&los_angeles, Score::Dislike)),
            (portland.id, rating(&portland, Score::Like)),
            (seattle.id, rating(&seattle, Score::Like)),
        ]);
        aubreigh.ratings = HashMap::from([
            (phoenix.id, rating(&phoenix, Score::Dislike)),
            (pittsburgh.id, rating(&pittsburgh, Score::Dislike)),
            (boulder.id, rating(&boulder, Score::Like)),
            (los_angeles.id, rating(&los_angeles, Score::Like)),
            (portland.id, rating(&portland, Score::Like)),
            (seattle.id, rating(&seattle, Score::Like)),
        ]);
        johnny.ratings = HashMap::from([
            (phoenix.id, rating(&phoenix, Score::Like)),
            (los_angeles.id, rating(&los_angeles, Score::Like)),
        ]);
        nick.ratings = HashMap::from([
            (pittsburgh.id, rating(&pittsburgh, Score::Like)),
            (portland.id, rating(&portland, Score::Like)),
        ]);

        let sim_niko_aubreigh = similarity_index(&niko, &aubreigh).unwrap();
        let sim_niko_nick = similarity_index(&niko, &nick).unwrap();
        let sim_niko_johnny = similarity_index(&niko, &johnny).unwrap();

        assert!((sim_niko_aubreigh - 1.0 / 3.0).abs() < 1e-9);
        assert!((sim_niko_nick - 1.0).abs() < 1e-9);
        assert!((sim_niko_johnny - (-1.0)).abs() < 1e-9);

        assert_eq!(similarity_index(&aubreigh, &niko), Some(sim_niko_aubreigh));
        assert_eq!(similarity_index(&nick, &niko), Some(sim_niko_nick));
        assert_eq!(similarity_index(&johnny, &niko), Some(sim_niko_johnny));
    }

    #[test]
    fn test_no_overlap_returns_none() {
        let a = User::new("a");
        let mut b = User::new("b");
        b.ratings = rated(&[("only-b-item", 1)]);
        assert_eq!(similarity_index(&a, &b), None);
    }

    #[test]
    fn test_similarity_domain_bounded() {
        let mut a = User::new("a");
        let mut b = User::new("b");
        a.ratings = rated(&[("x", 1), ("y", -1), ("z", 1)]);
        b.ratings = rated(&[("x", 1), ("y", 1), ("z", -1)]);
        let index = similarity_index(&a, &b).unwrap();
        assert!((-1.0..=1.0).contains(&index));
    }
}
