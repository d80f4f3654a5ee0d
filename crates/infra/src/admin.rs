//! Administrative operations: full CRUD over every catalog entity, admin
//! movie list filters, "save as new" copies and draft toggles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use kinoteka_catalog::movie::RESERVED_SLUGS;
use kinoteka_catalog::{
    Actor, ActorForm, BulkUpdateOutcome, Category, CategoryForm, Genre, GenreForm, Movie,
    MovieForm, MovieQuery, MovieShot, MovieShotForm, NewReview, Rating, RatingForm, RatingStar,
    RatingStarForm, Review, ReviewEdit, ReviewForm, Slug,
};
use kinoteka_core::{
    ActorId, CategoryId, GenreId, MovieId, MovieShotId, RatingId, RatingStarId, ReviewId,
};

use crate::catalog::CatalogService;
use crate::error::{CatalogError, CatalogResult};
use crate::store::{
    ActorRepository, CatalogStore, CategoryRepository, GenreRepository, MovieRepository,
    MovieShotRepository, RatingRepository, RatingStarRepository, ReviewRepository, Upsert,
};

/// Filters of the admin movie list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MovieListParams {
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub draft: Option<bool>,
    /// Matched against the title or the category name.
    #[serde(default)]
    pub q: Option<String>,
}

impl MovieListParams {
    fn to_query(&self) -> MovieQuery {
        let mut query = MovieQuery::all();
        query.category = self.category;
        query.year = self.year;
        query.draft = self.draft;
        match &self.q {
            Some(q) => query.with_search(q.as_str()),
            None => query,
        }
    }
}

/// Admin movie detail with its inline shots and reviews.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieAdminDetail {
    pub movie: Movie,
    pub shots: Vec<MovieShot>,
    pub reviews: Vec<Review>,
}

/// Review created from the admin console; the movie is part of the input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminReviewForm {
    pub movie: MovieId,
    #[serde(flatten)]
    pub review: ReviewForm,
}

fn found<T>(row: Option<T>) -> CatalogResult<T> {
    row.ok_or(CatalogError::NotFound)
}

fn deleted(done: bool) -> CatalogResult<()> {
    if done { Ok(()) } else { Err(CatalogError::NotFound) }
}

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn CatalogStore>,
    catalog: CatalogService,
}

impl AdminService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        let catalog = CatalogService::new(store.clone());
        Self { store, catalog }
    }

    // Categories

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn get_category(&self, id: CategoryId) -> CatalogResult<Category> {
        found(self.store.get_category(id).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn create_category(&self, form: CategoryForm) -> CatalogResult<Category> {
        let category = self.store.insert_category(form.validate()?).await?;
        info!(category = %category.id, "category created");
        Ok(category)
    }

    #[instrument(skip(self, form), err)]
    pub async fn update_category(&self, id: CategoryId, form: CategoryForm) -> CatalogResult<Category> {
        Ok(self.store.update_category(id, form.validate()?).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_category(&self, id: CategoryId) -> CatalogResult<()> {
        deleted(self.store.delete_category(id).await?)
    }

    // Genres

    pub async fn list_genres(&self) -> CatalogResult<Vec<Genre>> {
        Ok(self.store.list_genres().await?)
    }

    pub async fn get_genre(&self, id: GenreId) -> CatalogResult<Genre> {
        found(self.store.get_genre(id).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn create_genre(&self, form: GenreForm) -> CatalogResult<Genre> {
        let genre = self.store.insert_genre(form.validate()?).await?;
        info!(genre = %genre.id, "genre created");
        Ok(genre)
    }

    #[instrument(skip(self, form), err)]
    pub async fn update_genre(&self, id: GenreId, form: GenreForm) -> CatalogResult<Genre> {
        Ok(self.store.update_genre(id, form.validate()?).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_genre(&self, id: GenreId) -> CatalogResult<()> {
        deleted(self.store.delete_genre(id).await?)
    }

    // Actors

    pub async fn list_actors(&self) -> CatalogResult<Vec<Actor>> {
        Ok(self.store.list_actors().await?)
    }

    pub async fn get_actor(&self, id: ActorId) -> CatalogResult<Actor> {
        found(self.store.get_actor(id).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn create_actor(&self, form: ActorForm) -> CatalogResult<Actor> {
        let actor = self.store.insert_actor(form.validate()?).await?;
        info!(actor = %actor.id, "actor created");
        Ok(actor)
    }

    #[instrument(skip(self, form), err)]
    pub async fn update_actor(&self, id: ActorId, form: ActorForm) -> CatalogResult<Actor> {
        Ok(self.store.update_actor(id, form.validate()?).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_actor(&self, id: ActorId) -> CatalogResult<()> {
        deleted(self.store.delete_actor(id).await?)
    }

    // Movies

    /// All movies (drafts included) accepted by `params`, ordered by id.
    pub async fn list_movies(&self, params: &MovieListParams) -> CatalogResult<Vec<Movie>> {
        Ok(self.store.list_movies(&params.to_query()).await?)
    }

    pub async fn movie_detail(&self, id: MovieId) -> CatalogResult<MovieAdminDetail> {
        let movie = found(self.store.get_movie(id).await?)?;
        let shots = self.store.list_shots(Some(id)).await?;
        let reviews = self.store.list_reviews(Some(id)).await?;
        Ok(MovieAdminDetail { movie, shots, reviews })
    }

    #[instrument(skip(self, form), err)]
    pub async fn create_movie(&self, form: MovieForm) -> CatalogResult<Movie> {
        let movie = self.store.insert_movie(form.validate()?).await?;
        info!(movie = %movie.id, url = %movie.url, draft = movie.draft, "movie created");
        Ok(movie)
    }

    #[instrument(skip(self, form), err)]
    pub async fn update_movie(&self, id: MovieId, form: MovieForm) -> CatalogResult<Movie> {
        Ok(self.store.update_movie(id, form.validate()?).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_movie(&self, id: MovieId) -> CatalogResult<()> {
        deleted(self.store.delete_movie(id).await?)?;
        info!(movie = %id, "movie deleted with its shots, ratings and reviews");
        Ok(())
    }

    /// Copy a movie, relations included, under a new slug.
    #[instrument(skip(self), err)]
    pub async fn save_as_new(&self, id: MovieId, url: &str) -> CatalogResult<Movie> {
        let source = found(self.store.get_movie(id).await?)?;
        let url = Slug::parse(url).map_err(|e| CatalogError::validation("url", e.to_string()))?;
        if RESERVED_SLUGS.contains(&url.as_str()) {
            return Err(CatalogError::validation(
                "url",
                format!("'{url}' is reserved by a public route"),
            ));
        }
        let mut new = source.to_new();
        new.url = url;
        let copy = self.store.insert_movie(new).await?;
        info!(source = %id, copy = %copy.id, "movie saved as new");
        Ok(copy)
    }

    /// Toggle `draft` on a single movie.
    #[instrument(skip(self), err)]
    pub async fn set_draft(&self, id: MovieId, draft: bool) -> CatalogResult<Movie> {
        if self.store.set_draft(&[id], draft).await? == 0 {
            return Err(CatalogError::NotFound);
        }
        found(self.store.get_movie(id).await?)
    }

    pub async fn publish(&self, ids: &[MovieId]) -> CatalogResult<BulkUpdateOutcome> {
        self.catalog.publish(ids).await
    }

    pub async fn unpublish(&self, ids: &[MovieId]) -> CatalogResult<BulkUpdateOutcome> {
        self.catalog.unpublish(ids).await
    }

    // Movie shots

    pub async fn list_shots(&self, movie: Option<MovieId>) -> CatalogResult<Vec<MovieShot>> {
        Ok(self.store.list_shots(movie).await?)
    }

    pub async fn get_shot(&self, id: MovieShotId) -> CatalogResult<MovieShot> {
        found(self.store.get_shot(id).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn create_shot(&self, form: MovieShotForm) -> CatalogResult<MovieShot> {
        Ok(self.store.insert_shot(form.validate()?).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn update_shot(&self, id: MovieShotId, form: MovieShotForm) -> CatalogResult<MovieShot> {
        Ok(self.store.update_shot(id, form.validate()?).await?)
    }

    pub async fn delete_shot(&self, id: MovieShotId) -> CatalogResult<()> {
        deleted(self.store.delete_shot(id).await?)
    }

    // Rating stars

    /// Highest value first.
    pub async fn list_rating_stars(&self) -> CatalogResult<Vec<RatingStar>> {
        Ok(self.store.list_rating_stars().await?)
    }

    pub async fn get_rating_star(&self, id: RatingStarId) -> CatalogResult<RatingStar> {
        found(self.store.get_rating_star(id).await?)
    }

    pub async fn create_rating_star(&self, form: RatingStarForm) -> CatalogResult<RatingStar> {
        Ok(self.store.insert_rating_star(form.validate()?).await?)
    }

    pub async fn update_rating_star(&self, id: RatingStarId, form: RatingStarForm) -> CatalogResult<RatingStar> {
        Ok(self.store.update_rating_star(id, form.validate()?).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_rating_star(&self, id: RatingStarId) -> CatalogResult<()> {
        deleted(self.store.delete_rating_star(id).await?)
    }

    // Ratings

    pub async fn list_ratings(&self, movie: Option<MovieId>) -> CatalogResult<Vec<Rating>> {
        Ok(self.store.list_ratings(movie).await?)
    }

    pub async fn get_rating(&self, id: RatingId) -> CatalogResult<Rating> {
        found(self.store.get_rating(id).await?)
    }

    /// Same upsert as the public route: one rating per `(ip, movie)`.
    #[instrument(skip(self, form), err)]
    pub async fn create_rating(&self, form: RatingForm) -> CatalogResult<(Rating, Upsert)> {
        Ok(self.store.upsert_rating(form.validate()?).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn update_rating(&self, id: RatingId, form: RatingForm) -> CatalogResult<Rating> {
        Ok(self.store.update_rating(id, form.validate()?).await?)
    }

    pub async fn delete_rating(&self, id: RatingId) -> CatalogResult<()> {
        deleted(self.store.delete_rating(id).await?)
    }

    // Reviews

    pub async fn list_reviews(&self, movie: Option<MovieId>) -> CatalogResult<Vec<Review>> {
        Ok(self.store.list_reviews(movie).await?)
    }

    pub async fn get_review(&self, id: ReviewId) -> CatalogResult<Review> {
        found(self.store.get_review(id).await?)
    }

    #[instrument(skip(self, form), err)]
    pub async fn create_review(&self, form: AdminReviewForm) -> CatalogResult<Review> {
        let new = form.review.validate(form.movie)?;
        self.check_parent(None, &new).await?;
        Ok(self.store.insert_review(new).await?)
    }

    /// Edit text, parent or movie. Submitter name and e-mail are kept.
    #[instrument(skip(self, edit), err)]
    pub async fn update_review(&self, id: ReviewId, edit: ReviewEdit) -> CatalogResult<Review> {
        let existing = found(self.store.get_review(id).await?)?;
        let new = edit.apply(&existing)?;
        self.check_parent(Some(id), &new).await?;
        Ok(self.store.update_review(id, new).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_review(&self, id: ReviewId) -> CatalogResult<()> {
        deleted(self.store.delete_review(id).await?)
    }

    /// The parent must exist on the same movie and, when `id` is an existing
    /// review, must not be `id` or one of its replies.
    async fn check_parent(&self, id: Option<ReviewId>, new: &NewReview) -> CatalogResult<()> {
        let Some(parent_id) = new.parent else {
            return Ok(());
        };
        let parent = self
            .store
            .get_review(parent_id)
            .await?
            .ok_or_else(|| CatalogError::Integrity(format!("review {parent_id} does not exist")))?;
        if parent.movie != new.movie {
            return Err(CatalogError::validation(
                "parent",
                "the parent review belongs to another movie",
            ));
        }

        let Some(id) = id else {
            return Ok(());
        };
        let parents: HashMap<ReviewId, Option<ReviewId>> = self
            .store
            .list_reviews(None)
            .await?
            .into_iter()
            .map(|r| (r.id, r.parent))
            .collect();
        let mut seen = HashSet::new();
        let mut cursor = Some(parent_id);
        while let Some(ancestor) = cursor {
            if ancestor == id {
                return Err(CatalogError::validation(
                    "parent",
                    "a review cannot reply to one of its own replies",
                ));
            }
            if !seen.insert(ancestor) {
                break;
            }
            cursor = parents.get(&ancestor).copied().flatten();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Seed;
    use kinoteka_catalog::{MovieFilter, StarSubmission};

    fn movie_form(url: &str, category: Option<CategoryId>) -> MovieForm {
        MovieForm {
            title: "New Movie".into(),
            tagline: String::new(),
            description: "desc".into(),
            poster: "new.png".into(),
            year: Some(2021),
            country: "Poland".into(),
            directors: vec![],
            actors: vec![],
            genres: vec![],
            world_premiere: Some("2021-02-03".into()),
            budget: None,
            fees_in_usa: None,
            fees_in_world: None,
            category,
            url: url.into(),
            draft: false,
        }
    }

    fn review_form(text: &str, parent: Option<ReviewId>) -> ReviewForm {
        ReviewForm {
            parent,
            name: "Mykola".into(),
            email: "mykola@example.com".into(),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn deleting_a_category_keeps_its_movies() {
        let seed = Seed::new().await;
        let admin = seed.admin();

        admin.delete_category(seed.films).await.unwrap();

        let movies = admin.list_movies(&MovieListParams::default()).await.unwrap();
        assert_eq!(movies.len(), 4);
        assert!(movies.iter().all(|m| m.category.is_none()));
        assert_eq!(admin.delete_category(seed.films).await.unwrap_err(), CatalogError::NotFound);
    }

    #[tokio::test]
    async fn deleting_a_movie_cascades() {
        let seed = Seed::new().await;
        let admin = seed.admin();
        let catalog = seed.catalog();

        admin
            .create_shot(MovieShotForm {
                title: "Opening".into(),
                description: "First scene".into(),
                image: "opening.jpg".into(),
                movie: seed.drama_2019,
            })
            .await
            .unwrap();
        catalog
            .submit_rating("10.0.0.1", StarSubmission { movie: seed.drama_2019, star: 4 })
            .await
            .unwrap();
        let root = catalog
            .submit_review(seed.drama_2019, review_form("Nice", None))
            .await
            .unwrap();
        catalog
            .submit_review(seed.drama_2019, review_form("Reply", Some(root.id)))
            .await
            .unwrap();

        admin.delete_movie(seed.drama_2019).await.unwrap();

        assert!(admin.list_shots(Some(seed.drama_2019)).await.unwrap().is_empty());
        assert!(admin.list_ratings(Some(seed.drama_2019)).await.unwrap().is_empty());
        assert!(admin.list_reviews(Some(seed.drama_2019)).await.unwrap().is_empty());
        let drama = MovieFilter { genres: [seed.drama].into(), years: Default::default() };
        let left = catalog.filter(drama).await.unwrap();
        assert!(left.iter().all(|m| m.id != seed.drama_2019));
        // The actor survives with the remaining published movie.
        let page = catalog.actor_detail("Ivan Petrenko").await.unwrap();
        assert_eq!(page.movies.len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_parent_review_orphans_replies() {
        let seed = Seed::new().await;
        let admin = seed.admin();

        let root = admin
            .create_review(AdminReviewForm { movie: seed.comedy_2018, review: review_form("Root", None) })
            .await
            .unwrap();
        let reply = admin
            .create_review(AdminReviewForm {
                movie: seed.comedy_2018,
                review: review_form("Reply", Some(root.id)),
            })
            .await
            .unwrap();

        admin.delete_review(root.id).await.unwrap();
        let reply = admin.get_review(reply.id).await.unwrap();
        assert_eq!(reply.parent, None);
        assert_eq!(reply.text, "Reply");
    }

    #[tokio::test]
    async fn deleting_an_actor_or_genre_detaches_it() {
        let seed = Seed::new().await;
        let admin = seed.admin();

        admin.delete_actor(seed.ivan).await.unwrap();
        admin.delete_genre(seed.comedy).await.unwrap();

        let detail = admin.movie_detail(seed.drama_2019).await.unwrap();
        assert!(detail.movie.directors.is_empty());
        let comedy = admin.movie_detail(seed.comedy_2020).await.unwrap();
        assert!(comedy.movie.genres.is_empty());
        assert!(comedy.movie.actors.is_empty());
    }

    #[tokio::test]
    async fn admin_list_filters_and_searches_category_names() {
        let seed = Seed::new().await;
        let admin = seed.admin();
        admin.create_movie(movie_form("uncategorized", None)).await.unwrap();

        let drafts = admin
            .list_movies(&MovieListParams { draft: Some(true), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(drafts.iter().map(|m| m.id).collect::<Vec<_>>(), vec![seed.drama_2020_draft]);

        let by_category_name = admin
            .list_movies(&MovieListParams { q: Some("FEATURE".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_category_name.len(), 4);

        let by_year = admin
            .list_movies(&MovieListParams { year: Some(2020), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_year.len(), 2);

        let by_title = admin
            .list_movies(&MovieListParams { q: Some("new movie".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_url_field_error() {
        let seed = Seed::new().await;
        let err = seed
            .admin()
            .create_movie(movie_form("drama-2019", None))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref f) if f.contains("url")));

        let err = seed
            .admin()
            .create_category(CategoryForm { name: "x".into(), description: "x".into(), url: "films".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref f) if f.contains("url")));
    }

    #[tokio::test]
    async fn unknown_references_are_integrity_errors() {
        let seed = Seed::new().await;
        let err = seed
            .admin()
            .create_movie(movie_form("orphan", Some(CategoryId::new(77))))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Integrity(_)));
    }

    #[tokio::test]
    async fn save_as_new_copies_relations() {
        let seed = Seed::new().await;
        let admin = seed.admin();

        let copy = admin.save_as_new(seed.drama_2019, "drama-2019-copy").await.unwrap();
        assert_ne!(copy.id, seed.drama_2019);
        assert_eq!(copy.directors, vec![seed.ivan]);
        assert_eq!(copy.genres, vec![seed.drama]);

        let err = admin.save_as_new(seed.drama_2019, "drama-2019").await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref f) if f.contains("url")));
        let err = admin.save_as_new(seed.drama_2019, "search").await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation(ref f) if f.contains("url")));
    }

    #[tokio::test]
    async fn draft_toggle_and_missing_movie() {
        let seed = Seed::new().await;
        let admin = seed.admin();

        let movie = admin.set_draft(seed.drama_2020_draft, false).await.unwrap();
        assert!(!movie.draft);
        assert_eq!(admin.set_draft(MovieId::new(500), true).await.unwrap_err(), CatalogError::NotFound);
    }

    #[tokio::test]
    async fn review_edit_keeps_submitter() {
        let seed = Seed::new().await;
        let admin = seed.admin();
        let review = admin
            .create_review(AdminReviewForm { movie: seed.drama_2019, review: review_form("Before", None) })
            .await
            .unwrap();

        let edited = admin
            .update_review(
                review.id,
                ReviewEdit { text: "After".into(), parent: None, movie: seed.drama_2019 },
            )
            .await
            .unwrap();
        assert_eq!(edited.text, "After");
        assert_eq!(edited.name, "Mykola");
        assert_eq!(edited.email.as_str(), "mykola@example.com");
    }

    #[tokio::test]
    async fn review_cannot_be_moved_under_its_own_replies() {
        let seed = Seed::new().await;
        let admin = seed.admin();
        let create = |text: &'static str, parent: Option<ReviewId>| {
            admin.create_review(AdminReviewForm { movie: seed.drama_2019, review: review_form(text, parent) })
        };
        let root = create("Root", None).await.unwrap();
        let a = create("A", Some(root.id)).await.unwrap();
        let b = create("B", Some(a.id)).await.unwrap();
        let c = create("C", Some(b.id)).await.unwrap();

        for descendant in [b.id, c.id] {
            let err = admin
                .update_review(
                    a.id,
                    ReviewEdit { text: "A".into(), parent: Some(descendant), movie: seed.drama_2019 },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::Validation(ref f) if f.contains("parent")));
        }
        assert_eq!(admin.get_review(a.id).await.unwrap().parent, Some(root.id));

        let moved = admin
            .update_review(
                c.id,
                ReviewEdit { text: "C".into(), parent: Some(root.id), movie: seed.drama_2019 },
            )
            .await
            .unwrap();
        assert_eq!(moved.parent, Some(root.id));

        let page = seed.catalog().movie_page("drama-2019", None).await.unwrap();
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].count(), 4);
    }

    #[tokio::test]
    async fn admin_rating_creation_upserts() {
        let seed = Seed::new().await;
        let admin = seed.admin();
        let stars = admin.list_rating_stars().await.unwrap();
        assert_eq!(stars.iter().map(|s| s.value).collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);

        let form = |star: RatingStarId| RatingForm { ip: "192.168.0.5".into(), star, movie: seed.comedy_2018 };
        let (_, first) = admin.create_rating(form(stars[0].id)).await.unwrap();
        let (rating, second) = admin.create_rating(form(stars[4].id)).await.unwrap();
        assert_eq!((first, second), (Upsert::Created, Upsert::Updated));
        assert_eq!(rating.star, stars[4].id);
    }

    #[tokio::test]
    async fn movie_detail_includes_inline_rows() {
        let seed = Seed::new().await;
        let admin = seed.admin();
        admin
            .create_shot(MovieShotForm {
                title: "Still".into(),
                description: "d".into(),
                image: "still.webp".into(),
                movie: seed.drama_2020_draft,
            })
            .await
            .unwrap();

        let detail = admin.movie_detail(seed.drama_2020_draft).await.unwrap();
        assert!(detail.movie.draft);
        assert_eq!(detail.shots.len(), 1);
        assert!(detail.reviews.is_empty());
    }
}
