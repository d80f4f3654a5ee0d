//! Catalog persistence: one repository trait per entity, plus the
//! [`CatalogStore`] umbrella the services hold as `Arc<dyn CatalogStore>`.
//!
//! Every implementation must enforce the same relational rules:
//! - unique slugs on categories, genres and movies
//! - one rating per `(ip, movie)`
//! - referenced rows must exist on insert and update
//! - deleting a movie removes its shots, ratings, reviews and relation rows
//! - deleting a category, actor or genre detaches it from movies
//! - deleting a review leaves its replies with `parent = None`
//! - deleting a rating star removes its ratings

use async_trait::async_trait;
use thiserror::Error;

use kinoteka_catalog::{
    Actor, Category, Genre, Movie, MovieQuery, MovieShot, NewActor, NewCategory, NewGenre,
    NewMovie, NewMovieShot, NewRating, NewRatingStar, NewReview, Rating, RatingStar, Review, Slug,
};
use kinoteka_core::{
    ActorId, CategoryId, GenreId, MovieId, MovieShotId, RatingId, RatingStarId, ReviewId,
};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint was violated (`column` is the offending input field).
    #[error("duplicate value for {table}.{column}")]
    Unique { table: &'static str, column: &'static str },

    /// A referenced row does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    /// The row to update does not exist.
    #[error("row not found")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whether an upsert created a new row or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>>;
    async fn insert_category(&self, new: NewCategory) -> StoreResult<Category>;
    async fn update_category(&self, id: CategoryId, new: NewCategory) -> StoreResult<Category>;
    /// Returns `false` when nothing was deleted.
    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    async fn list_genres(&self) -> StoreResult<Vec<Genre>>;
    async fn get_genre(&self, id: GenreId) -> StoreResult<Option<Genre>>;
    /// Genres with the given ids, ordered by id. Unknown ids are skipped.
    async fn genres_by_ids(&self, ids: &[GenreId]) -> StoreResult<Vec<Genre>>;
    async fn insert_genre(&self, new: NewGenre) -> StoreResult<Genre>;
    async fn update_genre(&self, id: GenreId, new: NewGenre) -> StoreResult<Genre>;
    async fn delete_genre(&self, id: GenreId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ActorRepository: Send + Sync {
    async fn list_actors(&self) -> StoreResult<Vec<Actor>>;
    async fn get_actor(&self, id: ActorId) -> StoreResult<Option<Actor>>;
    /// First actor (lowest id) with exactly this name.
    async fn find_actor_by_name(&self, name: &str) -> StoreResult<Option<Actor>>;
    async fn actors_by_ids(&self, ids: &[ActorId]) -> StoreResult<Vec<Actor>>;
    async fn insert_actor(&self, new: NewActor) -> StoreResult<Actor>;
    async fn update_actor(&self, id: ActorId, new: NewActor) -> StoreResult<Actor>;
    async fn delete_actor(&self, id: ActorId) -> StoreResult<bool>;
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Movies accepted by `query`, ordered by id.
    async fn list_movies(&self, query: &MovieQuery) -> StoreResult<Vec<Movie>>;
    async fn get_movie(&self, id: MovieId) -> StoreResult<Option<Movie>>;
    async fn find_movie_by_slug(&self, slug: &Slug) -> StoreResult<Option<Movie>>;
    async fn insert_movie(&self, new: NewMovie) -> StoreResult<Movie>;
    async fn update_movie(&self, id: MovieId, new: NewMovie) -> StoreResult<Movie>;
    async fn delete_movie(&self, id: MovieId) -> StoreResult<bool>;
    /// Set `draft` on every listed movie; returns the number of movies matched.
    async fn set_draft(&self, ids: &[MovieId], draft: bool) -> StoreResult<u64>;
    /// Distinct release years of published movies, ascending.
    async fn published_years(&self) -> StoreResult<Vec<u16>>;
}

#[async_trait]
pub trait MovieShotRepository: Send + Sync {
    async fn list_shots(&self, movie: Option<MovieId>) -> StoreResult<Vec<MovieShot>>;
    async fn get_shot(&self, id: MovieShotId) -> StoreResult<Option<MovieShot>>;
    async fn insert_shot(&self, new: NewMovieShot) -> StoreResult<MovieShot>;
    async fn update_shot(&self, id: MovieShotId, new: NewMovieShot) -> StoreResult<MovieShot>;
    async fn delete_shot(&self, id: MovieShotId) -> StoreResult<bool>;
}

#[async_trait]
pub trait RatingStarRepository: Send + Sync {
    /// All star levels, highest value first.
    async fn list_rating_stars(&self) -> StoreResult<Vec<RatingStar>>;
    async fn get_rating_star(&self, id: RatingStarId) -> StoreResult<Option<RatingStar>>;
    /// First star level (lowest id) with this value.
    async fn find_star_by_value(&self, value: i16) -> StoreResult<Option<RatingStar>>;
    async fn insert_rating_star(&self, new: NewRatingStar) -> StoreResult<RatingStar>;
    async fn update_rating_star(&self, id: RatingStarId, new: NewRatingStar) -> StoreResult<RatingStar>;
    async fn delete_rating_star(&self, id: RatingStarId) -> StoreResult<bool>;
}

#[async_trait]
pub trait RatingRepository: Send + Sync {
    async fn list_ratings(&self, movie: Option<MovieId>) -> StoreResult<Vec<Rating>>;
    async fn get_rating(&self, id: RatingId) -> StoreResult<Option<Rating>>;
    async fn find_rating(&self, ip: &str, movie: MovieId) -> StoreResult<Option<Rating>>;
    /// Insert, or update the star of the existing `(ip, movie)` rating.
    async fn upsert_rating(&self, new: NewRating) -> StoreResult<(Rating, Upsert)>;
    async fn update_rating(&self, id: RatingId, new: NewRating) -> StoreResult<Rating>;
    async fn delete_rating(&self, id: RatingId) -> StoreResult<bool>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews ordered by id, optionally restricted to one movie.
    async fn list_reviews(&self, movie: Option<MovieId>) -> StoreResult<Vec<Review>>;
    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>>;
    async fn insert_review(&self, new: NewReview) -> StoreResult<Review>;
    async fn update_review(&self, id: ReviewId, new: NewReview) -> StoreResult<Review>;
    async fn delete_review(&self, id: ReviewId) -> StoreResult<bool>;
}

/// Everything the catalog services need from storage.
pub trait CatalogStore:
    CategoryRepository
    + GenreRepository
    + ActorRepository
    + MovieRepository
    + MovieShotRepository
    + RatingStarRepository
    + RatingRepository
    + ReviewRepository
{
}

impl<T> CatalogStore for T where
    T: CategoryRepository
        + GenreRepository
        + ActorRepository
        + MovieRepository
        + MovieShotRepository
        + RatingStarRepository
        + RatingRepository
        + ReviewRepository
{
}
