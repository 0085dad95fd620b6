//! Weighted like-minus-dislike suggestion index over a user's similarity
//! peers.

use crate::error::Result;
use crate::graph::queries;
use crate::ids::Id;
use crate::model::{Item, Suggestion, User};
use crate::store::{self, Store};
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use tracing::instrument;

/// Bound on the candidate-item channel between peer-fan-out workers and the
/// single consumer (SPEC_FULL.md §5, "Backpressure").
const CANDIDATE_CHANNEL_CAPACITY: usize = 16;

/// Recompute and persist `user`'s suggestion map.
///
/// One worker thread is spawned per similarity peer (bounded by the size of
/// `user`'s similarity row); each worker opens its own read-transaction to
/// stream that peer's ratings and forwards any item `user` has not rated
/// into a bounded channel read by a single consumer. A worker whose read
/// fails is simply dropped — the consumer observes a short stream rather
/// than the whole operation failing (SPEC_FULL.md §7).
#[instrument(skip(store, user), fields(user_id = %user.id))]
pub fn update_suggestions(store: &Store, user: &User) -> Result<()> {
    let own_ratings = queries::get_ratings(store, &user.id)?;
    let similarity_map = super::similarity::get_similarity(store, &user.id)?;

    let peers: Vec<(Id, f64)> = similarity_map
        .iter()
        .map(|(peer_id, similarity)| (*peer_id, similarity.index))
        .collect();

    let candidates = collect_candidates(store, &own_ratings.keys().copied().collect(), &peers);

    let mut suggestion_map: HashMap<Id, Suggestion> = HashMap::new();
    for (item_id, item) in candidates {
        let likers = queries::get_users_who_like(store, &item_id)?;
        let dislikers = queries::get_users_who_dislike(store, &item_id)?;

        let mut z_like = 0.0;
        let mut z_dislike = 0.0;
        let mut total: u32 = 0;

        for (peer_id, index) in &peers {
            if likers.contains_key(peer_id) {
                z_like += index;
                total += 1;
            } else if dislikers.contains_key(peer_id) {
                z_dislike += index;
                total += 1;
            }
        }

        if total == 0 {
            continue;
        }

        let index = (z_like - z_dislike) / f64::from(total);
        suggestion_map.insert(item_id, Suggestion { item, index });
    }

    store.write(|view| view.put_map(store::SUGGESTIONS, "suggestion-row", &user.id, &suggestion_map))
}

/// Fan out one worker per peer to stream ratings; collect distinct items not
/// already rated by the subject user.
fn collect_candidates(
    store: &Store,
    own_rated_items: &std::collections::HashSet<Id>,
    peers: &[(Id, f64)],
) -> HashMap<Id, Item> {
    let (tx, rx) = mpsc::sync_channel::<Item>(CANDIDATE_CHANNEL_CAPACITY);
    let candidates: Mutex<HashMap<Id, Item>> = Mutex::new(HashMap::new());

    thread::scope(|scope| {
        for (peer_id, _) in peers {
            let tx = tx.clone();
            scope.spawn(move || {
                if let Ok(peer_ratings) = queries::get_ratings(store, peer_id) {
                    for (item_id, rating) in peer_ratings {
                        if !own_rated_items.contains(&item_id) {
                            if tx.send(rating.item).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        }
        drop(tx);

        for item in rx {
            candidates.lock().expect("candidate map lock poisoned").insert(item.id, item);
        }
    });

    candidates.into_inner().expect("candidate map lock poisoned")
}

/// `user_id`'s persisted suggestion map; empty if none has been computed.
pub fn get_suggestions(store: &Store, user_id: &Id) -> Result<HashMap<Id, Suggestion>> {
    store.read(|view| view.get_map::<Suggestion>(store::SUGGESTIONS, "suggestion-row", user_id))
}
