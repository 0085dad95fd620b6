//! Idempotent vertex insertion and bidirectional edge maintenance.

use crate::error::Result;
use crate::ids::Id;
use crate::model::{Item, User};
use crate::store::{self, WriteView};

/// Insert `user` into the `user` keyspace if absent. No-op otherwise.
pub(crate) fn add_user(view: &WriteView, user: &User) -> Result<()> {
    if view.contains_key(store::USER, &user.id)? {
        return Ok(());
    }
    view.put_record(store::USER, "user", &user.id, user)
}

/// Insert `item` into the `item` keyspace if absent. No-op otherwise.
pub(crate) fn add_item(view: &WriteView, item: &Item) -> Result<()> {
    if view.contains_key(store::ITEM, &item.id)? {
        return Ok(());
    }
    view.put_record(store::ITEM, "item", &item.id, item)
}

/// Record `user_id` liking `item_id`. Removes any existing dislike for the
/// same pair (flip semantics). Idempotent.
///
/// Callers are expected to have already inserted `user_id`/`item_id` via
/// [`add_user`]/[`add_item`] in the same transaction, per the public façade
/// ordering (SPEC_FULL.md §4.6). This function maintains edges only.
pub(crate) fn add_like(view: &WriteView, user_id: &Id, item_id: &Id) -> Result<()> {
    let mut user_likes = view.get_set(store::USER_LIKES, user_id)?;
    if user_likes.contains(item_id) {
        return Ok(());
    }
    user_likes.insert(*item_id);
    view.put_set(store::USER_LIKES, user_id, &user_likes)?;

    let mut user_dislikes = view.get_set(store::USER_DISLIKES, user_id)?;
    if user_dislikes.remove(item_id) {
        view.put_set(store::USER_DISLIKES, user_id, &user_dislikes)?;
    }

    let mut item_likes = view.get_set(store::ITEM_LIKES, item_id)?;
    item_likes.insert(*user_id);
    view.put_set(store::ITEM_LIKES, item_id, &item_likes)?;

    let mut item_dislikes = view.get_set(store::ITEM_DISLIKES, item_id)?;
    if item_dislikes.remove(user_id) {
        view.put_set(store::ITEM_DISLIKES, item_id, &item_dislikes)?;
    }

    Ok(())
}

/// Record `user_id` disliking `item_id`. Mirror of [`add_like`].
pub(crate) fn add_dislike(view: &WriteView, user_id: &Id, item_id: &Id) -> Result<()> {
    let mut user_dislikes = view.get_set(store::USER_DISLIKES, user_id)?;
    if user_dislikes.contains(item_id) {
        return Ok(());
    }
    user_dislikes.insert(*item_id);
    view.put_set(store::USER_DISLIKES, user_id, &user_dislikes)?;

    let mut user_likes = view.get_set(store::USER_LIKES, user_id)?;
    if user_likes.remove(item_id) {
        view.put_set(store::USER_LIKES, user_id, &user_likes)?;
    }

    let mut item_dislikes = view.get_set(store::ITEM_DISLIKES, item_id)?;
    item_dislikes.insert(*user_id);
    view.put_set(store::ITEM_DISLIKES, item_id, &item_dislikes)?;

    let mut item_likes = view.get_set(store::ITEM_LIKES, item_id)?;
    if item_likes.remove(user_id) {
        view.put_set(store::ITEM_LIKES, item_id, &item_likes)?;
    }

    Ok(())
}
