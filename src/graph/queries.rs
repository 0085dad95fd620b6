//! Read-only traversals over the rating graph. All queries execute within a
//! single read-transaction (SPEC_FULL.md §4.3).

use crate::error::Result;
use crate::ids::Id;
use crate::model::{Item, Rating, Score, User};
use crate::store::{self, ReadView, Store};
use std::collections::HashMap;

fn liked_items_in(view: &ReadView, user_id: &Id) -> Result<HashMap<Id, Item>> {
    let item_ids = view.get_set(store::USER_LIKES, user_id)?;
    hydrate_items(view, item_ids)
}

fn disliked_items_in(view: &ReadView, user_id: &Id) -> Result<HashMap<Id, Item>> {
    let item_ids = view.get_set(store::USER_DISLIKES, user_id)?;
    hydrate_items(view, item_ids)
}

fn hydrate_items(view: &ReadView, ids: impl IntoIterator<Item = Id>) -> Result<HashMap<Id, Item>> {
    let mut items = HashMap::new();
    for id in ids {
        match view.get_record::<Item>(store::ITEM, "item", &id)? {
            Some(item) => {
                items.insert(id, item);
            }
            None => store::warn_dangling_reference("item", &id),
        }
    }
    Ok(items)
}

fn users_who_like_in(view: &ReadView, item_id: &Id) -> Result<HashMap<Id, User>> {
    let user_ids = view.get_set(store::ITEM_LIKES, item_id)?;
    hydrate_users(view, user_ids)
}

fn users_who_dislike_in(view: &ReadView, item_id: &Id) -> Result<HashMap<Id, User>> {
    let user_ids = view.get_set(store::ITEM_DISLIKES, item_id)?;
    hydrate_users(view, user_ids)
}

fn hydrate_users(view: &ReadView, ids: impl IntoIterator<Item = Id>) -> Result<HashMap<Id, User>> {
    let mut users = HashMap::new();
    for id in ids {
        match view.get_record::<User>(store::USER, "user", &id)? {
            Some(user) => {
                users.insert(id, user);
            }
            None => store::warn_dangling_reference("user", &id),
        }
    }
    Ok(users)
}

fn ratings_in(view: &ReadView, user_id: &Id) -> Result<HashMap<Id, Rating>> {
    let mut ratings = HashMap::new();
    for (id, item) in liked_items_in(view, user_id)? {
        ratings.insert(id, Rating { item, score: Score::Like });
    }
    for (id, item) in disliked_items_in(view, user_id)? {
        ratings.insert(id, Rating { item, score: Score::Dislike });
    }
    Ok(ratings)
}

fn users_who_rated_in(view: &ReadView, item_id: &Id) -> Result<HashMap<Id, User>> {
    let mut users = users_who_like_in(view, item_id)?;
    users.extend(users_who_dislike_in(view, item_id)?);
    Ok(users)
}

/// Items liked by `user_id`.
pub fn get_liked_items(store: &Store, user_id: &Id) -> Result<HashMap<Id, Item>> {
    store.read(|view| liked_items_in(view, user_id))
}

/// Items disliked by `user_id`.
pub fn get_disliked_items(store: &Store, user_id: &Id) -> Result<HashMap<Id, Item>> {
    store.read(|view| disliked_items_in(view, user_id))
}

/// Users who like `item_id`.
pub fn get_users_who_like(store: &Store, item_id: &Id) -> Result<HashMap<Id, User>> {
    store.read(|view| users_who_like_in(view, item_id))
}

/// Users who dislike `item_id`.
pub fn get_users_who_dislike(store: &Store, item_id: &Id) -> Result<HashMap<Id, User>> {
    store.read(|view| users_who_dislike_in(view, item_id))
}

/// The union of liked and disliked items for `user_id`, as `Rating`s.
///
/// Both halves are read from the same read-transaction snapshot, so they are
/// merged sequentially rather than fanned out across threads: there is no
/// overlappable I/O latency to hide (see SPEC_FULL.md §9).
pub fn get_ratings(store: &Store, user_id: &Id) -> Result<HashMap<Id, Rating>> {
    store.read(|view| ratings_in(view, user_id))
}

/// Union of users who like or dislike `item_id`.
pub fn get_users_who_rated(store: &Store, item_id: &Id) -> Result<HashMap<Id, User>> {
    store.read(|view| users_who_rated_in(view, item_id))
}

/// Users who rated any item that `user` has also rated, excluding `user`
/// itself, each hydrated with their own ratings map populated so the
/// similarity engine can proceed without further store access.
pub fn get_rating_neighbors(store: &Store, user: &User) -> Result<HashMap<Id, User>> {
    store.read(|view| {
        let ratings = ratings_in(view, &user.id)?;

        let mut neighbor_map: HashMap<Id, User> = HashMap::new();
        for rating in ratings.values() {
            let raters = users_who_rated_in(view, &rating.item.id)?;
            for (id, mut neighbor) in raters {
                if neighbor_map.contains_key(&id) {
                    continue;
                }
                neighbor.ratings = ratings_in(view, &id)?;
                neighbor_map.insert(id, neighbor);
            }
        }

        neighbor_map.remove(&user.id);
        Ok(neighbor_map)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::graph::mutation::{add_dislike, add_item, add_like, add_user};
    use crate::model::Item;
    use crate::store::Store;

    fn open_temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&EngineConfig::new(dir.path().join("test.redb"))).unwrap();
        (dir, store)
    }

    // Scenario S1 from SPEC_FULL.md §8.
    #[test]
    fn test_s1_empty_state() {
        let (_dir, store) = open_temp_store();
        let niko = User::new("niko");
        let portland = Item::new("portland");

        assert!(get_liked_items(&store, &niko.id).unwrap().is_empty());
        assert!(get_users_who_like(&store, &portland.id).unwrap().is_empty());
    }

    // Scenario S2 from SPEC_FULL.md §8.
    #[test]
    fn test_s2_basic_add_and_flip() {
        let (_dir, store) = open_temp_store();
        let niko = User::new("niko");
        let aubreigh = User::new("aubreigh");
        let phoenix = Item::new("phoenix");
        let denver = Item::new("denver");
        let pittsburgh = Item::new("pittsburgh");
        let portland = Item::new("portland");
        let miami = Item::new("miami");
        let los_angeles = Item::new("losAngeles");

        let like = |u: &User, i: &Item| {
            store
                .write(|view| {
                    add_user(view, u)?;
                    add_item(view, i)?;
                    add_like(view, &u.id, &i.id)
                })
                .unwrap();
        };
        let dislike = |u: &User, i: &Item| {
            store
                .write(|view| {
                    add_user(view, u)?;
                    add_item(view, i)?;
                    add_dislike(view, &u.id, &i.id)
                })
                .unwrap();
        };

        like(&niko, &phoenix);
        like(&niko, &denver);
        like(&niko, &pittsburgh);
        like(&aubreigh, &phoenix);
        like(&aubreigh, &portland);

        assert_eq!(get_liked_items(&store, &niko.id).unwrap().len(), 3);

        dislike(&niko, &phoenix);
        dislike(&niko, &miami);
        dislike(&niko, &los_angeles);
        like(&niko, &phoenix);
        like(&niko, &portland);
        like(&niko, &pittsburgh);

        assert_eq!(get_liked_items(&store, &niko.id).unwrap().len(), 4);
    }

    // Scenario S3 from SPEC_FULL.md §8.
    #[test]
    fn test_s3_ratings_union() {
        let (_dir, store) = open_temp_store();
        let niko = User::new("niko");
        let items: Vec<Item> = ["phoenix", "miami", "losAngeles", "pittsburgh", "boulder", "seattle"]
            .iter()
            .map(|n| Item::new(*n))
            .collect();

        let dislikes = [0, 1, 2];
        for (idx, item) in items.iter().enumerate() {
            store
                .write(|view| {
                    add_user(view, &niko)?;
                    add_item(view, item)?;
                    if dislikes.contains(&idx) {
                        add_dislike(view, &niko.id, &item.id)
                    } else {
                        add_like(view, &niko.id, &item.id)
                    }
                })
                .unwrap();
        }

        assert_eq!(get_ratings(&store, &niko.id).unwrap().len(), 6);
    }

    // Scenario S4 from SPEC_FULL.md §8.
    #[test]
    fn test_s4_users_who_rated() {
        let (_dir, store) = open_temp_store();
        let niko = User::new("niko");
        let aubreigh = User::new("aubreigh");
        let johnny = User::new("johnny");
        let amanda = User::new("amanda");
        let nick = User::new("nick");
        let phoenix = Item::new("phoenix");
        let pittsburgh = Item::new("pittsburgh");

        let rate = |u: &User, i: &Item, like_it: bool| {
            store
                .write(|view| {
                    add_user(view, u)?;
                    add_item(view, i)?;
                    if like_it {
                        add_like(view, &u.id, &i.id)
                    } else {
                        add_dislike(view, &u.id, &i.id)
                    }
                })
                .unwrap();
        };

        rate(&niko, &phoenix, false);
        rate(&aubreigh, &phoenix, false);
        rate(&johnny, &phoenix, true);
        rate(&amanda, &phoenix, true);
        rate(&niko, &pittsburgh, true);
        rate(&nick, &pittsburgh, true);

        assert_eq!(get_users_who_rated(&store, &phoenix.id).unwrap().len(), 4);
        assert_eq!(get_users_who_rated(&store, &pittsburgh.id).unwrap().len(), 2);
    }
}
