//! Public catalog operations: listing, filtering, search, detail pages,
//! visitor ratings and reviews.

use std::sync::Arc;

use tracing::{info, instrument};

use kinoteka_catalog::{
    Actor, BulkUpdateOutcome, Category, Genre, Movie, MovieFilter, MovieQuery, MovieShot,
    NewRating, PublicationAction, Rating, RatingStar, Review, ReviewForm, ReviewThread, Slug,
    StarSubmission, Visibility, rating::validate_ip,
};
use kinoteka_core::{MovieId, ReviewId};

use crate::error::{CatalogError, CatalogResult};
use crate::store::{
    ActorRepository, CatalogStore, CategoryRepository, GenreRepository, MovieRepository,
    MovieShotRepository, RatingRepository, RatingStarRepository, ReviewRepository, Upsert,
};

/// Genres and release years offered by the filter sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    pub genres: Vec<Genre>,
    pub years: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieListing {
    pub movies: Vec<Movie>,
    pub sidebar: Sidebar,
}

/// Everything shown on a movie's public page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoviePage {
    pub movie: Movie,
    pub category: Option<Category>,
    pub genres: Vec<Genre>,
    pub directors: Vec<Actor>,
    pub actors: Vec<Actor>,
    pub shots: Vec<MovieShot>,
    pub reviews: Vec<ReviewThread>,
    /// Star levels, highest first.
    pub stars: Vec<RatingStar>,
    /// Star the requesting address gave this movie, if any.
    pub current_rating: Option<RatingStar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorPage {
    pub actor: Actor,
    /// Published movies where the actor plays or directs.
    pub movies: Vec<Movie>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn sidebar(&self) -> CatalogResult<Sidebar> {
        Ok(Sidebar {
            genres: self.store.list_genres().await?,
            years: self.store.published_years().await?,
        })
    }

    /// Published movies in insertion order.
    pub async fn list_published(&self) -> CatalogResult<Vec<Movie>> {
        Ok(self.store.list_movies(&MovieQuery::published()).await?)
    }

    /// Published movies carrying any selected genre or released in any
    /// selected year. An empty filter returns every published movie.
    #[instrument(skip(self), err)]
    pub async fn filter(&self, filter: MovieFilter) -> CatalogResult<Vec<Movie>> {
        let query = MovieQuery::published().with_filter(filter);
        Ok(self.store.list_movies(&query).await?)
    }

    pub async fn listing(&self, filter: MovieFilter) -> CatalogResult<MovieListing> {
        Ok(MovieListing {
            movies: self.filter(filter).await?,
            sidebar: self.sidebar().await?,
        })
    }

    /// Published movies whose title contains `needle`, ignoring case.
    #[instrument(skip(self), err)]
    pub async fn search(&self, needle: &str) -> CatalogResult<Vec<Movie>> {
        let query = MovieQuery::published().with_title(needle);
        Ok(self.store.list_movies(&query).await?)
    }

    /// Movie by slug. Drafts are only visible with [`Visibility::All`].
    pub async fn movie_detail(&self, slug: &str, visibility: Visibility) -> CatalogResult<Movie> {
        let slug = Slug::parse(slug).map_err(|_| CatalogError::NotFound)?;
        let movie = self
            .store
            .find_movie_by_slug(&slug)
            .await?
            .ok_or(CatalogError::NotFound)?;
        if !visibility.admits(&movie) {
            return Err(CatalogError::NotFound);
        }
        Ok(movie)
    }

    #[instrument(skip(self, ip), err)]
    pub async fn movie_page(&self, slug: &str, ip: Option<&str>) -> CatalogResult<MoviePage> {
        let movie = self.movie_detail(slug, Visibility::Published).await?;

        let category = match movie.category {
            Some(id) => self.store.get_category(id).await?,
            None => None,
        };
        let genres = self.store.genres_by_ids(&movie.genres).await?;
        let directors = self.store.actors_by_ids(&movie.directors).await?;
        let actors = self.store.actors_by_ids(&movie.actors).await?;
        let shots = self.store.list_shots(Some(movie.id)).await?;

        let (roots, replies): (Vec<Review>, Vec<Review>) = self
            .store
            .list_reviews(Some(movie.id))
            .await?
            .into_iter()
            .partition(Review::is_root);
        let reviews = ReviewThread::build(roots, replies);

        let stars = self.store.list_rating_stars().await?;
        let current_rating = match ip {
            Some(ip) => self
                .store
                .find_rating(ip, movie.id)
                .await?
                .and_then(|r| stars.iter().find(|s| s.id == r.star).copied()),
            None => None,
        };

        Ok(MoviePage {
            movie,
            category,
            genres,
            directors,
            actors,
            shots,
            reviews,
            stars,
            current_rating,
        })
    }

    /// Reviews of `movie` that are not replies, in submission order.
    pub async fn top_level_reviews(&self, movie: MovieId) -> CatalogResult<Vec<Review>> {
        let mut reviews = self.store.list_reviews(Some(movie)).await?;
        reviews.retain(Review::is_root);
        Ok(reviews)
    }

    /// Direct replies to `review`, in submission order.
    pub async fn replies(&self, review: ReviewId) -> CatalogResult<Vec<Review>> {
        let parent = self
            .store
            .get_review(review)
            .await?
            .ok_or(CatalogError::NotFound)?;
        let mut reviews = self.store.list_reviews(Some(parent.movie)).await?;
        reviews.retain(|r| r.parent == Some(review));
        Ok(reviews)
    }

    /// Record a visitor's star for a published movie. A repeated submission
    /// from the same address replaces the earlier star.
    #[instrument(skip(self, ip), fields(movie = %submission.movie), err)]
    pub async fn submit_rating(
        &self,
        ip: &str,
        submission: StarSubmission,
    ) -> CatalogResult<(Rating, Upsert)> {
        let ip = validate_ip(ip)?;
        let value = submission.star_value()?;

        let movie = self
            .store
            .get_movie(submission.movie)
            .await?
            .ok_or_else(|| {
                CatalogError::Integrity(format!("movie {} does not exist", submission.movie))
            })?;
        if !movie.is_published() {
            return Err(CatalogError::NotFound);
        }

        let star = self
            .store
            .find_star_by_value(value)
            .await?
            .ok_or_else(|| CatalogError::validation("star", format!("no rating star with value {value}")))?;

        let (rating, outcome) = self
            .store
            .upsert_rating(NewRating {
                ip,
                star: star.id,
                movie: movie.id,
            })
            .await?;
        info!(rating = %rating.id, star = value, ?outcome, "rating recorded");
        Ok((rating, outcome))
    }

    /// Store a visitor review (or reply) for a published movie.
    #[instrument(skip(self, form), err)]
    pub async fn submit_review(&self, movie: MovieId, form: ReviewForm) -> CatalogResult<Review> {
        let new = form.validate(movie)?;

        let movie = self
            .store
            .get_movie(movie)
            .await?
            .ok_or_else(|| CatalogError::Integrity(format!("movie {movie} does not exist")))?;
        if !movie.is_published() {
            return Err(CatalogError::NotFound);
        }

        if let Some(parent_id) = new.parent {
            let parent = self
                .store
                .get_review(parent_id)
                .await?
                .ok_or_else(|| CatalogError::Integrity(format!("review {parent_id} does not exist")))?;
            if parent.movie != movie.id {
                return Err(CatalogError::validation(
                    "parent",
                    "the parent review belongs to another movie",
                ));
            }
        }

        let review = self.store.insert_review(new).await?;
        info!(review = %review.id, movie = %movie.id, reply = !review.is_root(), "review stored");
        Ok(review)
    }

    /// Set `draft` on every listed movie.
    #[instrument(skip(self, ids), fields(action = action.label(), requested = ids.len()), err)]
    pub async fn apply_publication(
        &self,
        action: PublicationAction,
        ids: &[MovieId],
    ) -> CatalogResult<BulkUpdateOutcome> {
        let updated = self.store.set_draft(ids, action.draft_value()).await?;
        let outcome = BulkUpdateOutcome::new(updated);
        info!(updated, "{}", outcome.message());
        Ok(outcome)
    }

    pub async fn publish(&self, ids: &[MovieId]) -> CatalogResult<BulkUpdateOutcome> {
        self.apply_publication(PublicationAction::Publish, ids).await
    }

    pub async fn unpublish(&self, ids: &[MovieId]) -> CatalogResult<BulkUpdateOutcome> {
        self.apply_publication(PublicationAction::Unpublish, ids).await
    }

    /// Actor by display name (lowest id on duplicates) with the published
    /// movies they appear in.
    pub async fn actor_detail(&self, name: &str) -> CatalogResult<ActorPage> {
        let actor = self
            .store
            .find_actor_by_name(name)
            .await?
            .ok_or(CatalogError::NotFound)?;
        let movies = self
            .store
            .list_movies(&MovieQuery::published().featuring(actor.id))
            .await?;
        Ok(ActorPage { actor, movies })
    }
}
