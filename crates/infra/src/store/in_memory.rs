//! In-memory catalog store for tests/dev.
//!
//! All tables live behind a single `RwLock`, so every write (cascades
//! included) happens under one guard.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use kinoteka_catalog::{
    Actor, Category, Genre, Movie, MovieQuery, MovieShot, NewActor, NewCategory, NewGenre,
    NewMovie, NewMovieShot, NewRating, NewRatingStar, NewReview, Rating, RatingStar, Review, Slug,
};
use kinoteka_core::{
    ActorId, CategoryId, Entity, GenreId, MovieId, MovieShotId, RatingId, RatingStarId, ReviewId,
};

use super::{
    ActorRepository, CategoryRepository, GenreRepository, MovieRepository, MovieShotRepository,
    RatingRepository, RatingStarRepository, ReviewRepository, StoreError, StoreResult, Upsert,
};

#[derive(Debug, Default)]
struct Tables {
    last_id: BTreeMap<&'static str, i64>,
    categories: BTreeMap<CategoryId, Category>,
    genres: BTreeMap<GenreId, Genre>,
    actors: BTreeMap<ActorId, Actor>,
    movies: BTreeMap<MovieId, Movie>,
    shots: BTreeMap<MovieShotId, MovieShot>,
    stars: BTreeMap<RatingStarId, RatingStar>,
    ratings: BTreeMap<RatingId, Rating>,
    reviews: BTreeMap<ReviewId, Review>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.last_id.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn category_slug_taken(&self, url: &Slug, except: Option<CategoryId>) -> bool {
        self.categories
            .values()
            .any(|c| &c.url == url && Some(c.id) != except)
    }

    fn genre_slug_taken(&self, url: &Slug, except: Option<GenreId>) -> bool {
        self.genres
            .values()
            .any(|g| &g.url == url && Some(g.id) != except)
    }

    fn movie_slug_taken(&self, url: &Slug, except: Option<MovieId>) -> bool {
        self.movies
            .values()
            .any(|m| &m.url == url && Some(m.id) != except)
    }

    fn check_movie_refs(&self, new: &NewMovie) -> StoreResult<()> {
        if let Some(category) = new.category {
            if !self.categories.contains_key(&category) {
                return Err(fk("category", category));
            }
        }
        for actor in new.directors.iter().chain(&new.actors) {
            if !self.actors.contains_key(actor) {
                return Err(fk("actor", actor));
            }
        }
        for genre in &new.genres {
            if !self.genres.contains_key(genre) {
                return Err(fk("genre", genre));
            }
        }
        Ok(())
    }

    fn check_movie_exists(&self, movie: MovieId) -> StoreResult<()> {
        if self.movies.contains_key(&movie) {
            Ok(())
        } else {
            Err(fk("movie", movie))
        }
    }

    fn check_rating_refs(&self, new: &NewRating) -> StoreResult<()> {
        self.check_movie_exists(new.movie)?;
        if !self.stars.contains_key(&new.star) {
            return Err(fk("rating star", new.star));
        }
        Ok(())
    }

    fn check_review_refs(&self, new: &NewReview) -> StoreResult<()> {
        self.check_movie_exists(new.movie)?;
        if let Some(parent) = new.parent {
            if !self.reviews.contains_key(&parent) {
                return Err(fk("review", parent));
            }
        }
        Ok(())
    }

    fn category_name(&self, id: Option<CategoryId>) -> Option<&str> {
        id.and_then(|id| self.categories.get(&id))
            .map(|c| c.name.as_str())
    }
}

fn fk(what: &str, id: impl core::fmt::Display) -> StoreError {
    StoreError::ForeignKey(format!("{what} {id} does not exist"))
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

/// Insert or replace `row` under its own id.
fn put<E>(table: &mut BTreeMap<E::Id, E>, row: E)
where
    E: Entity,
    E::Id: Ord,
{
    table.insert(row.id(), row);
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCatalogStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn insert_category(&self, new: NewCategory) -> StoreResult<Category> {
        let mut t = self.write()?;
        if t.category_slug_taken(&new.url, None) {
            return Err(StoreError::Unique { table: "categories", column: "url" });
        }
        let id = CategoryId::new(t.next_id("categories"));
        let category = Category::new(id, new);
        put(&mut t.categories, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: CategoryId, new: NewCategory) -> StoreResult<Category> {
        let mut t = self.write()?;
        if !t.categories.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if t.category_slug_taken(&new.url, Some(id)) {
            return Err(StoreError::Unique { table: "categories", column: "url" });
        }
        let category = Category::new(id, new);
        put(&mut t.categories, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for movie in t.movies.values_mut() {
            if movie.category == Some(id) {
                movie.category = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl GenreRepository for InMemoryCatalogStore {
    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(self.read()?.genres.values().cloned().collect())
    }

    async fn get_genre(&self, id: GenreId) -> StoreResult<Option<Genre>> {
        Ok(self.read()?.genres.get(&id).cloned())
    }

    async fn genres_by_ids(&self, ids: &[GenreId]) -> StoreResult<Vec<Genre>> {
        let t = self.read()?;
        let wanted: BTreeSet<&GenreId> = ids.iter().collect();
        Ok(t.genres
            .values()
            .filter(|g| wanted.contains(&g.id))
            .cloned()
            .collect())
    }

    async fn insert_genre(&self, new: NewGenre) -> StoreResult<Genre> {
        let mut t = self.write()?;
        if t.genre_slug_taken(&new.url, None) {
            return Err(StoreError::Unique { table: "genres", column: "url" });
        }
        let id = GenreId::new(t.next_id("genres"));
        let genre = Genre::new(id, new);
        put(&mut t.genres, genre.clone());
        Ok(genre)
    }

    async fn update_genre(&self, id: GenreId, new: NewGenre) -> StoreResult<Genre> {
        let mut t = self.write()?;
        if !t.genres.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if t.genre_slug_taken(&new.url, Some(id)) {
            return Err(StoreError::Unique { table: "genres", column: "url" });
        }
        let genre = Genre::new(id, new);
        put(&mut t.genres, genre.clone());
        Ok(genre)
    }

    async fn delete_genre(&self, id: GenreId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.genres.remove(&id).is_none() {
            return Ok(false);
        }
        for movie in t.movies.values_mut() {
            movie.genres.retain(|g| *g != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl ActorRepository for InMemoryCatalogStore {
    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        Ok(self.read()?.actors.values().cloned().collect())
    }

    async fn get_actor(&self, id: ActorId) -> StoreResult<Option<Actor>> {
        Ok(self.read()?.actors.get(&id).cloned())
    }

    async fn find_actor_by_name(&self, name: &str) -> StoreResult<Option<Actor>> {
        Ok(self
            .read()?
            .actors
            .values()
            .find(|a| a.name == name)
            .cloned())
    }

    async fn actors_by_ids(&self, ids: &[ActorId]) -> StoreResult<Vec<Actor>> {
        let t = self.read()?;
        let wanted: BTreeSet<&ActorId> = ids.iter().collect();
        Ok(t.actors
            .values()
            .filter(|a| wanted.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn insert_actor(&self, new: NewActor) -> StoreResult<Actor> {
        let mut t = self.write()?;
        let id = ActorId::new(t.next_id("actors"));
        let actor = Actor::new(id, new);
        put(&mut t.actors, actor.clone());
        Ok(actor)
    }

    async fn update_actor(&self, id: ActorId, new: NewActor) -> StoreResult<Actor> {
        let mut t = self.write()?;
        if !t.actors.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        let actor = Actor::new(id, new);
        put(&mut t.actors, actor.clone());
        Ok(actor)
    }

    async fn delete_actor(&self, id: ActorId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.actors.remove(&id).is_none() {
            return Ok(false);
        }
        for movie in t.movies.values_mut() {
            movie.actors.retain(|a| *a != id);
            movie.directors.retain(|a| *a != id);
        }
        Ok(true)
    }
}

#[async_trait]
impl MovieRepository for InMemoryCatalogStore {
    async fn list_movies(&self, query: &MovieQuery) -> StoreResult<Vec<Movie>> {
        let t = self.read()?;
        Ok(t.movies
            .values()
            .filter(|m| query.matches(m, t.category_name(m.category)))
            .cloned()
            .collect())
    }

    async fn get_movie(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        Ok(self.read()?.movies.get(&id).cloned())
    }

    async fn find_movie_by_slug(&self, slug: &Slug) -> StoreResult<Option<Movie>> {
        Ok(self
            .read()?
            .movies
            .values()
            .find(|m| &m.url == slug)
            .cloned())
    }

    async fn insert_movie(&self, new: NewMovie) -> StoreResult<Movie> {
        let mut t = self.write()?;
        if t.movie_slug_taken(&new.url, None) {
            return Err(StoreError::Unique { table: "movies", column: "url" });
        }
        t.check_movie_refs(&new)?;
        let id = MovieId::new(t.next_id("movies"));
        let movie = Movie::new(id, new);
        put(&mut t.movies, movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, id: MovieId, new: NewMovie) -> StoreResult<Movie> {
        let mut t = self.write()?;
        if !t.movies.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if t.movie_slug_taken(&new.url, Some(id)) {
            return Err(StoreError::Unique { table: "movies", column: "url" });
        }
        t.check_movie_refs(&new)?;
        let movie = Movie::new(id, new);
        put(&mut t.movies, movie.clone());
        Ok(movie)
    }

    async fn delete_movie(&self, id: MovieId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.movies.remove(&id).is_none() {
            return Ok(false);
        }
        t.shots.retain(|_, s| s.movie != id);
        t.ratings.retain(|_, r| r.movie != id);
        t.reviews.retain(|_, r| r.movie != id);
        // Replies from other movies pointing at removed reviews.
        let remaining: BTreeSet<ReviewId> = t.reviews.keys().copied().collect();
        for review in t.reviews.values_mut() {
            if review.parent.is_some_and(|p| !remaining.contains(&p)) {
                review.parent = None;
            }
        }
        Ok(true)
    }

    async fn set_draft(&self, ids: &[MovieId], draft: bool) -> StoreResult<u64> {
        let mut t = self.write()?;
        let wanted: BTreeSet<&MovieId> = ids.iter().collect();
        let mut updated = 0;
        for id in wanted {
            if let Some(movie) = t.movies.get_mut(id) {
                movie.draft = draft;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn published_years(&self) -> StoreResult<Vec<u16>> {
        let t = self.read()?;
        let years: BTreeSet<u16> = t
            .movies
            .values()
            .filter(|m| m.is_published())
            .map(|m| m.year)
            .collect();
        Ok(years.into_iter().collect())
    }
}

#[async_trait]
impl MovieShotRepository for InMemoryCatalogStore {
    async fn list_shots(&self, movie: Option<MovieId>) -> StoreResult<Vec<MovieShot>> {
        Ok(self
            .read()?
            .shots
            .values()
            .filter(|s| movie.is_none_or(|m| s.movie == m))
            .cloned()
            .collect())
    }

    async fn get_shot(&self, id: MovieShotId) -> StoreResult<Option<MovieShot>> {
        Ok(self.read()?.shots.get(&id).cloned())
    }

    async fn insert_shot(&self, new: NewMovieShot) -> StoreResult<MovieShot> {
        let mut t = self.write()?;
        t.check_movie_exists(new.movie)?;
        let id = MovieShotId::new(t.next_id("movie_shots"));
        let shot = MovieShot::new(id, new);
        put(&mut t.shots, shot.clone());
        Ok(shot)
    }

    async fn update_shot(&self, id: MovieShotId, new: NewMovieShot) -> StoreResult<MovieShot> {
        let mut t = self.write()?;
        if !t.shots.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        t.check_movie_exists(new.movie)?;
        let shot = MovieShot::new(id, new);
        put(&mut t.shots, shot.clone());
        Ok(shot)
    }

    async fn delete_shot(&self, id: MovieShotId) -> StoreResult<bool> {
        Ok(self.write()?.shots.remove(&id).is_some())
    }
}

#[async_trait]
impl RatingStarRepository for InMemoryCatalogStore {
    async fn list_rating_stars(&self) -> StoreResult<Vec<RatingStar>> {
        let mut stars: Vec<RatingStar> = self.read()?.stars.values().copied().collect();
        RatingStar::sort_descending(&mut stars);
        Ok(stars)
    }

    async fn get_rating_star(&self, id: RatingStarId) -> StoreResult<Option<RatingStar>> {
        Ok(self.read()?.stars.get(&id).copied())
    }

    async fn find_star_by_value(&self, value: i16) -> StoreResult<Option<RatingStar>> {
        Ok(self
            .read()?
            .stars
            .values()
            .find(|s| s.value == value)
            .copied())
    }

    async fn insert_rating_star(&self, new: NewRatingStar) -> StoreResult<RatingStar> {
        let mut t = self.write()?;
        let id = RatingStarId::new(t.next_id("rating_stars"));
        let star = RatingStar::new(id, new);
        put(&mut t.stars, star);
        Ok(star)
    }

    async fn update_rating_star(&self, id: RatingStarId, new: NewRatingStar) -> StoreResult<RatingStar> {
        let mut t = self.write()?;
        let star = t.stars.get_mut(&id).ok_or(StoreError::NotFound)?;
        star.value = new.value;
        Ok(*star)
    }

    async fn delete_rating_star(&self, id: RatingStarId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.stars.remove(&id).is_none() {
            return Ok(false);
        }
        t.ratings.retain(|_, r| r.star != id);
        Ok(true)
    }
}

#[async_trait]
impl RatingRepository for InMemoryCatalogStore {
    async fn list_ratings(&self, movie: Option<MovieId>) -> StoreResult<Vec<Rating>> {
        Ok(self
            .read()?
            .ratings
            .values()
            .filter(|r| movie.is_none_or(|m| r.movie == m))
            .cloned()
            .collect())
    }

    async fn get_rating(&self, id: RatingId) -> StoreResult<Option<Rating>> {
        Ok(self.read()?.ratings.get(&id).cloned())
    }

    async fn find_rating(&self, ip: &str, movie: MovieId) -> StoreResult<Option<Rating>> {
        Ok(self
            .read()?
            .ratings
            .values()
            .find(|r| r.ip == ip && r.movie == movie)
            .cloned())
    }

    async fn upsert_rating(&self, new: NewRating) -> StoreResult<(Rating, Upsert)> {
        let mut t = self.write()?;
        t.check_rating_refs(&new)?;
        if let Some(existing) = t
            .ratings
            .values_mut()
            .find(|r| r.ip == new.ip && r.movie == new.movie)
        {
            existing.star = new.star;
            return Ok((existing.clone(), Upsert::Updated));
        }
        let id = RatingId::new(t.next_id("ratings"));
        let rating = Rating::new(id, new);
        put(&mut t.ratings, rating.clone());
        Ok((rating, Upsert::Created))
    }

    async fn update_rating(&self, id: RatingId, new: NewRating) -> StoreResult<Rating> {
        let mut t = self.write()?;
        if !t.ratings.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        t.check_rating_refs(&new)?;
        if t
            .ratings
            .values()
            .any(|r| r.id != id && r.ip == new.ip && r.movie == new.movie)
        {
            return Err(StoreError::Unique { table: "ratings", column: "ip" });
        }
        let rating = Rating::new(id, new);
        put(&mut t.ratings, rating.clone());
        Ok(rating)
    }

    async fn delete_rating(&self, id: RatingId) -> StoreResult<bool> {
        Ok(self.write()?.ratings.remove(&id).is_some())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryCatalogStore {
    async fn list_reviews(&self, movie: Option<MovieId>) -> StoreResult<Vec<Review>> {
        Ok(self
            .read()?
            .reviews
            .values()
            .filter(|r| movie.is_none_or(|m| r.movie == m))
            .cloned()
            .collect())
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        Ok(self.read()?.reviews.get(&id).cloned())
    }

    async fn insert_review(&self, new: NewReview) -> StoreResult<Review> {
        let mut t = self.write()?;
        t.check_review_refs(&new)?;
        let id = ReviewId::new(t.next_id("reviews"));
        let review = Review::new(id, new);
        put(&mut t.reviews, review.clone());
        Ok(review)
    }

    async fn update_review(&self, id: ReviewId, new: NewReview) -> StoreResult<Review> {
        let mut t = self.write()?;
        if !t.reviews.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        t.check_review_refs(&new)?;
        let review = Review::new(id, new);
        put(&mut t.reviews, review.clone());
        Ok(review)
    }

    async fn delete_review(&self, id: ReviewId) -> StoreResult<bool> {
        let mut t = self.write()?;
        if t.reviews.remove(&id).is_none() {
            return Ok(false);
        }
        for reply in t.reviews.values_mut() {
            if reply.parent == Some(id) {
                reply.parent = None;
            }
        }
        Ok(true)
    }
}
