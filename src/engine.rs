//! Public façade: opens the store and orders graph mutation → similarity
//! refresh → suggestion refresh (SPEC_FULL.md §4.6).

use crate::config::EngineConfig;
use crate::error::Result;
use crate::graph::{mutation, queries, similarity, suggestions};
use crate::ids::Id;
use crate::model::{Item, Rating, Similarity, Suggestion, User};
use crate::store::Store;
use std::collections::HashMap;
use tracing::instrument;

/// A recommendation engine instance backed by one embedded store file.
pub struct Engine {
    store: Store,
}

impl Engine {
    /// Open the store named by `config`, creating it and its keyspaces if
    /// necessary.
    pub fn open(config: EngineConfig) -> Result<Self> {
        let store = Store::open(&config)?;
        Ok(Self { store })
    }

    /// Release the store handle. Subsequent operations fail with
    /// [`crate::Error::StoreClosed`].
    pub fn close(&self) {
        self.store.close();
    }

    /// Record `user` liking `item`, then refresh `user`'s similarity row and
    /// suggestion map.
    ///
    /// Steps execute strictly in order: inserting the user and item
    /// vertices, recording the edge (transactionally, with flip semantics
    /// against any prior dislike), then the two best-effort derived-index
    /// refreshes. Any step's failure aborts the remaining steps.
    #[instrument(skip(self, user, item), fields(user_id = %user.id, item_id = %item.id))]
    pub fn like(&self, user: &User, item: &Item) -> Result<()> {
        self.store.write(|view| {
            mutation::add_user(view, user)?;
            mutation::add_item(view, item)?;
            mutation::add_like(view, &user.id, &item.id)
        })?;
        similarity::update_similarity(&self.store, user)?;
        suggestions::update_suggestions(&self.store, user)?;
        Ok(())
    }

    /// Record `user` disliking `item`; mirror of [`Engine::like`].
    #[instrument(skip(self, user, item), fields(user_id = %user.id, item_id = %item.id))]
    pub fn dislike(&self, user: &User, item: &Item) -> Result<()> {
        self.store.write(|view| {
            mutation::add_user(view, user)?;
            mutation::add_item(view, item)?;
            mutation::add_dislike(view, &user.id, &item.id)
        })?;
        similarity::update_similarity(&self.store, user)?;
        suggestions::update_suggestions(&self.store, user)?;
        Ok(())
    }

    /// Items liked by `user`.
    pub fn get_liked_items(&self, user: &User) -> Result<HashMap<Id, Item>> {
        queries::get_liked_items(&self.store, &user.id)
    }

    /// Items disliked by `user`.
    pub fn get_disliked_items(&self, user: &User) -> Result<HashMap<Id, Item>> {
        queries::get_disliked_items(&self.store, &user.id)
    }

    /// Union of `user`'s liked and disliked items, as ratings.
    pub fn get_ratings(&self, user: &User) -> Result<HashMap<Id, Rating>> {
        queries::get_ratings(&self.store, &user.id)
    }

    /// Users who like `item`.
    pub fn get_users_who_like(&self, item: &Item) -> Result<HashMap<Id, User>> {
        queries::get_users_who_like(&self.store, &item.id)
    }

    /// Users who dislike `item`.
    pub fn get_users_who_dislike(&self, item: &Item) -> Result<HashMap<Id, User>> {
        queries::get_users_who_dislike(&self.store, &item.id)
    }

    /// Union of users who like or dislike `item`.
    pub fn get_users_who_rated(&self, item: &Item) -> Result<HashMap<Id, User>> {
        queries::get_users_who_rated(&self.store, &item.id)
    }

    /// Rating-neighbors of `user`, each hydrated with their own ratings.
    pub fn get_rating_neighbors(&self, user: &User) -> Result<HashMap<Id, User>> {
        queries::get_rating_neighbors(&self.store, user)
    }

    /// Recompute `user`'s similarity row against all current rating-neighbors.
    pub fn update_similarity(&self, user: &User) -> Result<()> {
        similarity::update_similarity(&self.store, user)
    }

    /// `user`'s persisted similarity row, hydrated into peer `User` records.
    pub fn get_similarity(&self, user: &User) -> Result<HashMap<Id, Similarity>> {
        similarity::get_similarity(&self.store, &user.id)
    }

    /// Recompute `user`'s suggestion map from their current similarity row.
    pub fn update_suggestions(&self, user: &User) -> Result<()> {
        suggestions::update_suggestions(&self.store, user)
    }

    /// `user`'s persisted suggestion map.
    pub fn get_suggestions(&self, user: &User) -> Result<HashMap<Id, Suggestion>> {
        suggestions::get_suggestions(&self.store, &user.id)
    }
}
