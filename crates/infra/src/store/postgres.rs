//! Postgres-backed catalog store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |---|---|---|
//! | `23505` | `Unique` | duplicate slug, second rating for the same `(ip, movie)` |
//! | `23503` | `ForeignKey` | referenced category/actor/genre/movie/star/review missing |
//! | anything else | `Backend` | connection failures, check constraints, decode errors |
//!
//! Cascades are declared in the schema (`migrations/0001_catalog.sql`);
//! multi-row writes (movie + relation rows) run in one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use tracing::{Span, instrument};

use kinoteka_catalog::{
    Actor, Category, Email, Genre, ImageRef, MediaLocation, Movie, MovieQuery, MovieShot,
    NewActor, NewCategory, NewGenre, NewMovie, NewMovieShot, NewRating, NewRatingStar, NewReview,
    Rating, RatingStar, Review, Slug, Visibility,
};
use kinoteka_core::{
    ActorId, CategoryId, GenreId, MovieId, MovieShotId, RatingId, RatingStarId, ReviewId,
};

use super::{
    ActorRepository, CategoryRepository, GenreRepository, MovieRepository, MovieShotRepository,
    RatingRepository, RatingStarRepository, ReviewRepository, StoreError, StoreResult, Upsert,
};

const MIGRATION: &str = include_str!("../../migrations/0001_catalog.sql");

const MOVIE_COLUMNS: &str = "m.id, m.title, m.tagline, m.description, m.poster, m.year, \
     m.country, m.world_premiere, m.budget, m.fees_in_usa, m.fees_in_world, m.category_id, \
     m.url, m.draft";

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the catalog schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(MIGRATION)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn load_movies(&self, rows: Vec<PgRow>) -> StoreResult<Vec<Movie>> {
        let ids: Vec<i64> = rows
            .iter()
            .map(|r| col::<i64>(r, "id"))
            .collect::<StoreResult<_>>()?;
        let mut relations = self.load_relations(&ids).await?;
        rows.iter()
            .map(|row| {
                let id: i64 = col(row, "id")?;
                movie_from_row(row, relations.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn load_relations(&self, ids: &[i64]) -> StoreResult<HashMap<i64, MovieRelations>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            r#"
            SELECT movie_id, actor_id AS other_id, 'director' AS kind FROM movie_directors WHERE movie_id = ANY($1)
            UNION ALL
            SELECT movie_id, actor_id, 'actor' FROM movie_actors WHERE movie_id = ANY($1)
            UNION ALL
            SELECT movie_id, genre_id, 'genre' FROM movie_genres WHERE movie_id = ANY($1)
            ORDER BY 1, 3, 2
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_relations", e))?;

        let mut out: HashMap<i64, MovieRelations> = HashMap::new();
        for row in rows {
            let movie_id: i64 = col(&row, "movie_id")?;
            let other: i64 = col(&row, "other_id")?;
            let kind: String = col(&row, "kind")?;
            let entry = out.entry(movie_id).or_default();
            match kind.as_str() {
                "director" => entry.directors.push(ActorId::new(other)),
                "actor" => entry.actors.push(ActorId::new(other)),
                _ => entry.genres.push(GenreId::new(other)),
            }
        }
        Ok(out)
    }

    async fn fetch_movie_where(&self, clause: &str, bind: MovieKey<'_>) -> StoreResult<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies m WHERE {clause}");
        let query = sqlx::query(&sql);
        let query = match bind {
            MovieKey::Id(id) => query.bind(id.get()),
            MovieKey::Slug(slug) => query.bind(slug.as_str()),
        };
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_movie", e))?;
        match row {
            Some(row) => Ok(self.load_movies(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

enum MovieKey<'a> {
    Id(MovieId),
    Slug(&'a Slug),
}

#[derive(Debug, Default)]
struct MovieRelations {
    directors: Vec<ActorId>,
    actors: Vec<ActorId>,
    genres: Vec<GenreId>,
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => {
                    let (table, column) = unique_target(db_err.constraint());
                    StoreError::Unique { table, column }
                }
                Some("23503") => StoreError::ForeignKey(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn unique_target(constraint: Option<&str>) -> (&'static str, &'static str) {
    match constraint {
        Some("categories_url_key") => ("categories", "url"),
        Some("genres_url_key") => ("genres", "url"),
        Some("movies_url_key") => ("movies", "url"),
        Some("ratings_ip_movie_key") => ("ratings", "ip"),
        _ => ("catalog", "__all__"),
    }
}

fn col<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name).map_err(|e| map_sqlx_error("decode", e))
}

fn corrupt(what: &str, err: impl core::fmt::Display) -> StoreError {
    StoreError::Backend(format!("stored {what} is invalid: {err}"))
}

fn to_small(value: u16) -> StoreResult<i16> {
    i16::try_from(value).map_err(|e| corrupt("small integer", e))
}

fn from_small(value: i16) -> StoreResult<u16> {
    u16::try_from(value).map_err(|e| corrupt("small integer", e))
}

fn from_money(value: i64) -> StoreResult<u32> {
    u32::try_from(value).map_err(|e| corrupt("amount", e))
}

fn slug_col(row: &PgRow) -> StoreResult<Slug> {
    let raw: String = col(row, "url")?;
    Slug::parse(&raw).map_err(|e| corrupt("slug", e))
}

fn image_col(row: &PgRow, name: &str, location: MediaLocation) -> StoreResult<ImageRef> {
    let raw: String = col(row, name)?;
    ImageRef::from_stored(location, &raw).map_err(|e| corrupt("image", e))
}

fn category_from_row(row: &PgRow) -> StoreResult<Category> {
    Ok(Category {
        id: CategoryId::new(col(row, "id")?),
        name: col(row, "name")?,
        description: col(row, "description")?,
        url: slug_col(row)?,
    })
}

fn genre_from_row(row: &PgRow) -> StoreResult<Genre> {
    Ok(Genre {
        id: GenreId::new(col(row, "id")?),
        name: col(row, "name")?,
        description: col(row, "description")?,
        url: slug_col(row)?,
    })
}

fn actor_from_row(row: &PgRow) -> StoreResult<Actor> {
    Ok(Actor {
        id: ActorId::new(col(row, "id")?),
        name: col(row, "name")?,
        age: from_small(col(row, "age")?)?,
        description: col(row, "description")?,
        image: image_col(row, "image", MediaLocation::Actors)?,
    })
}

fn movie_from_row(row: &PgRow, rel: MovieRelations) -> StoreResult<Movie> {
    Ok(Movie {
        id: MovieId::new(col(row, "id")?),
        title: col(row, "title")?,
        tagline: col(row, "tagline")?,
        description: col(row, "description")?,
        poster: image_col(row, "poster", MediaLocation::Movies)?,
        year: from_small(col(row, "year")?)?,
        country: col(row, "country")?,
        directors: rel.directors,
        actors: rel.actors,
        genres: rel.genres,
        world_premiere: col(row, "world_premiere")?,
        budget: from_money(col(row, "budget")?)?,
        fees_in_usa: from_money(col(row, "fees_in_usa")?)?,
        fees_in_world: from_money(col(row, "fees_in_world")?)?,
        category: col::<Option<i64>>(row, "category_id")?.map(CategoryId::new),
        url: slug_col(row)?,
        draft: col(row, "draft")?,
    })
}

fn shot_from_row(row: &PgRow) -> StoreResult<MovieShot> {
    Ok(MovieShot {
        id: MovieShotId::new(col(row, "id")?),
        title: col(row, "title")?,
        description: col(row, "description")?,
        image: image_col(row, "image", MediaLocation::MovieShots)?,
        movie: MovieId::new(col(row, "movie_id")?),
    })
}

fn star_from_row(row: &PgRow) -> StoreResult<RatingStar> {
    Ok(RatingStar {
        id: RatingStarId::new(col(row, "id")?),
        value: col(row, "value")?,
    })
}

fn rating_from_row(row: &PgRow) -> StoreResult<Rating> {
    Ok(Rating {
        id: RatingId::new(col(row, "id")?),
        ip: col(row, "ip")?,
        star: RatingStarId::new(col(row, "star_id")?),
        movie: MovieId::new(col(row, "movie_id")?),
    })
}

fn review_from_row(row: &PgRow) -> StoreResult<Review> {
    let email: String = col(row, "email")?;
    Ok(Review {
        id: ReviewId::new(col(row, "id")?),
        email: Email::parse(&email).map_err(|e| corrupt("email", e))?,
        name: col(row, "name")?,
        text: col(row, "text")?,
        parent: col::<Option<i64>>(row, "parent_id")?.map(ReviewId::new),
        movie: MovieId::new(col(row, "movie_id")?),
    })
}

fn ids<T: Copy + Into<i64>>(values: &[T]) -> Vec<i64> {
    values.iter().map(|v| (*v).into()).collect()
}

async fn write_relations(
    tx: &mut Transaction<'_, Postgres>,
    movie: MovieId,
    new: &NewMovie,
) -> StoreResult<()> {
    for (table, column, values) in [
        ("movie_directors", "actor_id", ids(&new.directors)),
        ("movie_actors", "actor_id", ids(&new.actors)),
        ("movie_genres", "genre_id", ids(&new.genres)),
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE movie_id = $1"))
            .bind(movie.get())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("clear_relations", e))?;
        if values.is_empty() {
            continue;
        }
        sqlx::query(&format!(
            "INSERT INTO {table} (movie_id, {column}) SELECT $1, unnest($2::bigint[])"
        ))
        .bind(movie.get())
        .bind(&values)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("write_relations", e))?;
    }
    Ok(())
}

#[async_trait]
impl CategoryRepository for PostgresCatalogStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, description, url FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;
        rows.iter().map(category_from_row).collect()
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, description, url FROM categories WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_category", e))?;
        row.as_ref().map(category_from_row).transpose()
    }

    #[instrument(skip(self, new), fields(url = %new.url), err)]
    async fn insert_category(&self, new: NewCategory) -> StoreResult<Category> {
        let row = sqlx::query(
            r#"
            INSERT INTO categories (name, description, url)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, url
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.url.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_category", e))?;
        category_from_row(&row)
    }

    #[instrument(skip(self, new), err)]
    async fn update_category(&self, id: CategoryId, new: NewCategory) -> StoreResult<Category> {
        let row = sqlx::query(
            r#"
            UPDATE categories SET name = $2, description = $3, url = $4
            WHERE id = $1
            RETURNING id, name, description, url
            "#,
        )
        .bind(id.get())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.url.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_category", e))?
        .ok_or(StoreError::NotFound)?;
        category_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn delete_category(&self, id: CategoryId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_category", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl GenreRepository for PostgresCatalogStore {
    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        let rows = sqlx::query("SELECT id, name, description, url FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_genres", e))?;
        rows.iter().map(genre_from_row).collect()
    }

    async fn get_genre(&self, id: GenreId) -> StoreResult<Option<Genre>> {
        let row = sqlx::query("SELECT id, name, description, url FROM genres WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_genre", e))?;
        row.as_ref().map(genre_from_row).transpose()
    }

    async fn genres_by_ids(&self, ids_in: &[GenreId]) -> StoreResult<Vec<Genre>> {
        let rows = sqlx::query(
            "SELECT id, name, description, url FROM genres WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids(ids_in))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("genres_by_ids", e))?;
        rows.iter().map(genre_from_row).collect()
    }

    #[instrument(skip(self, new), fields(url = %new.url), err)]
    async fn insert_genre(&self, new: NewGenre) -> StoreResult<Genre> {
        let row = sqlx::query(
            r#"
            INSERT INTO genres (name, description, url)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, url
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.url.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_genre", e))?;
        genre_from_row(&row)
    }

    #[instrument(skip(self, new), err)]
    async fn update_genre(&self, id: GenreId, new: NewGenre) -> StoreResult<Genre> {
        let row = sqlx::query(
            r#"
            UPDATE genres SET name = $2, description = $3, url = $4
            WHERE id = $1
            RETURNING id, name, description, url
            "#,
        )
        .bind(id.get())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.url.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_genre", e))?
        .ok_or(StoreError::NotFound)?;
        genre_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn delete_genre(&self, id: GenreId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_genre", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl ActorRepository for PostgresCatalogStore {
    async fn list_actors(&self) -> StoreResult<Vec<Actor>> {
        let rows = sqlx::query("SELECT id, name, age, description, image FROM actors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_actors", e))?;
        rows.iter().map(actor_from_row).collect()
    }

    async fn get_actor(&self, id: ActorId) -> StoreResult<Option<Actor>> {
        let row = sqlx::query("SELECT id, name, age, description, image FROM actors WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_actor", e))?;
        row.as_ref().map(actor_from_row).transpose()
    }

    async fn find_actor_by_name(&self, name: &str) -> StoreResult<Option<Actor>> {
        let row = sqlx::query(
            "SELECT id, name, age, description, image FROM actors WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_actor_by_name", e))?;
        row.as_ref().map(actor_from_row).transpose()
    }

    async fn actors_by_ids(&self, ids_in: &[ActorId]) -> StoreResult<Vec<Actor>> {
        let rows = sqlx::query(
            "SELECT id, name, age, description, image FROM actors WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids(ids_in))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("actors_by_ids", e))?;
        rows.iter().map(actor_from_row).collect()
    }

    #[instrument(skip(self, new), err)]
    async fn insert_actor(&self, new: NewActor) -> StoreResult<Actor> {
        let row = sqlx::query(
            r#"
            INSERT INTO actors (name, age, description, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, age, description, image
            "#,
        )
        .bind(&new.name)
        .bind(to_small(new.age)?)
        .bind(&new.description)
        .bind(new.image.path())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_actor", e))?;
        actor_from_row(&row)
    }

    #[instrument(skip(self, new), err)]
    async fn update_actor(&self, id: ActorId, new: NewActor) -> StoreResult<Actor> {
        let row = sqlx::query(
            r#"
            UPDATE actors SET name = $2, age = $3, description = $4, image = $5
            WHERE id = $1
            RETURNING id, name, age, description, image
            "#,
        )
        .bind(id.get())
        .bind(&new.name)
        .bind(to_small(new.age)?)
        .bind(&new.description)
        .bind(new.image.path())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_actor", e))?
        .ok_or(StoreError::NotFound)?;
        actor_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn delete_actor(&self, id: ActorId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_actor", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl MovieRepository for PostgresCatalogStore {
    #[instrument(skip(self, query), fields(movie_count = tracing::field::Empty), err)]
    async fn list_movies(&self, query: &MovieQuery) -> StoreResult<Vec<Movie>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {MOVIE_COLUMNS} FROM movies m LEFT JOIN categories c ON c.id = m.category_id WHERE TRUE"
        ));
        if query.visibility == Visibility::Published {
            qb.push(" AND m.draft = FALSE");
        }
        if !query.filter.is_empty() {
            let years: Vec<i16> = query
                .filter
                .years
                .iter()
                .filter_map(|y| i16::try_from(*y).ok())
                .collect();
            let genres: Vec<i64> = query.filter.genres.iter().map(|g| g.get()).collect();
            qb.push(" AND (m.year = ANY(")
                .push_bind(years)
                .push(") OR EXISTS (SELECT 1 FROM movie_genres mg WHERE mg.movie_id = m.id AND mg.genre_id = ANY(")
                .push_bind(genres)
                .push(")))");
        }
        if let Some(needle) = &query.title_contains {
            qb.push(" AND strpos(lower(m.title), lower(")
                .push_bind(needle.clone())
                .push(")) > 0");
        }
        if let Some(needle) = &query.search {
            qb.push(" AND (strpos(lower(m.title), lower(")
                .push_bind(needle.clone())
                .push(")) > 0 OR strpos(lower(coalesce(c.name, '')), lower(")
                .push_bind(needle.clone())
                .push(")) > 0)");
        }
        if let Some(category) = query.category {
            qb.push(" AND m.category_id = ").push_bind(category.get());
        }
        if let Some(year) = query.year {
            qb.push(" AND m.year = ").push_bind(i32::from(year));
        }
        if let Some(draft) = query.draft {
            qb.push(" AND m.draft = ").push_bind(draft);
        }
        if let Some(actor) = query.featuring {
            qb.push(" AND (EXISTS (SELECT 1 FROM movie_actors ma WHERE ma.movie_id = m.id AND ma.actor_id = ")
                .push_bind(actor.get())
                .push(") OR EXISTS (SELECT 1 FROM movie_directors md WHERE md.movie_id = m.id AND md.actor_id = ")
                .push_bind(actor.get())
                .push("))");
        }
        qb.push(" ORDER BY m.id");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_movies", e))?;
        Span::current().record("movie_count", rows.len());
        self.load_movies(rows).await
    }

    async fn get_movie(&self, id: MovieId) -> StoreResult<Option<Movie>> {
        self.fetch_movie_where("m.id = $1", MovieKey::Id(id)).await
    }

    async fn find_movie_by_slug(&self, slug: &Slug) -> StoreResult<Option<Movie>> {
        self.fetch_movie_where("m.url = $1", MovieKey::Slug(slug)).await
    }

    #[instrument(skip(self, new), fields(url = %new.url), err)]
    async fn insert_movie(&self, new: NewMovie) -> StoreResult<Movie> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO movies (
                title, tagline, description, poster, year, country, world_premiere,
                budget, fees_in_usa, fees_in_world, category_id, url, draft
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&new.title)
        .bind(&new.tagline)
        .bind(&new.description)
        .bind(new.poster.path())
        .bind(to_small(new.year)?)
        .bind(&new.country)
        .bind(new.world_premiere)
        .bind(i64::from(new.budget))
        .bind(i64::from(new.fees_in_usa))
        .bind(i64::from(new.fees_in_world))
        .bind(new.category.map(CategoryId::get))
        .bind(new.url.as_str())
        .bind(new.draft)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_movie", e))?;

        let id = MovieId::new(id);
        write_relations(&mut tx, id, &new).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Movie::new(id, new))
    }

    #[instrument(skip(self, new), err)]
    async fn update_movie(&self, id: MovieId, new: NewMovie) -> StoreResult<Movie> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let done = sqlx::query(
            r#"
            UPDATE movies SET
                title = $2, tagline = $3, description = $4, poster = $5, year = $6,
                country = $7, world_premiere = $8, budget = $9, fees_in_usa = $10,
                fees_in_world = $11, category_id = $12, url = $13, draft = $14
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .bind(&new.title)
        .bind(&new.tagline)
        .bind(&new.description)
        .bind(new.poster.path())
        .bind(to_small(new.year)?)
        .bind(&new.country)
        .bind(new.world_premiere)
        .bind(i64::from(new.budget))
        .bind(i64::from(new.fees_in_usa))
        .bind(i64::from(new.fees_in_world))
        .bind(new.category.map(CategoryId::get))
        .bind(new.url.as_str())
        .bind(new.draft)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_movie", e))?;

        if done.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        }

        write_relations(&mut tx, id, &new).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(Movie::new(id, new))
    }

    #[instrument(skip(self), err)]
    async fn delete_movie(&self, id: MovieId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_movie", e))?;
        Ok(done.rows_affected() > 0)
    }

    #[instrument(skip(self, movie_ids), fields(requested = movie_ids.len()), err)]
    async fn set_draft(&self, movie_ids: &[MovieId], draft: bool) -> StoreResult<u64> {
        let done = sqlx::query("UPDATE movies SET draft = $1 WHERE id = ANY($2)")
            .bind(draft)
            .bind(ids(movie_ids))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_draft", e))?;
        Ok(done.rows_affected())
    }

    async fn published_years(&self) -> StoreResult<Vec<u16>> {
        let years: Vec<i16> =
            sqlx::query_scalar("SELECT DISTINCT year FROM movies WHERE draft = FALSE ORDER BY year")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("published_years", e))?;
        years.into_iter().map(from_small).collect()
    }
}

#[async_trait]
impl MovieShotRepository for PostgresCatalogStore {
    async fn list_shots(&self, movie: Option<MovieId>) -> StoreResult<Vec<MovieShot>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, image, movie_id FROM movie_shots
            WHERE $1::bigint IS NULL OR movie_id = $1
            ORDER BY id
            "#,
        )
        .bind(movie.map(MovieId::get))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_shots", e))?;
        rows.iter().map(shot_from_row).collect()
    }

    async fn get_shot(&self, id: MovieShotId) -> StoreResult<Option<MovieShot>> {
        let row = sqlx::query(
            "SELECT id, title, description, image, movie_id FROM movie_shots WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_shot", e))?;
        row.as_ref().map(shot_from_row).transpose()
    }

    #[instrument(skip(self, new), fields(movie = %new.movie), err)]
    async fn insert_shot(&self, new: NewMovieShot) -> StoreResult<MovieShot> {
        let row = sqlx::query(
            r#"
            INSERT INTO movie_shots (title, description, image, movie_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, image, movie_id
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.image.path())
        .bind(new.movie.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_shot", e))?;
        shot_from_row(&row)
    }

    async fn update_shot(&self, id: MovieShotId, new: NewMovieShot) -> StoreResult<MovieShot> {
        let row = sqlx::query(
            r#"
            UPDATE movie_shots SET title = $2, description = $3, image = $4, movie_id = $5
            WHERE id = $1
            RETURNING id, title, description, image, movie_id
            "#,
        )
        .bind(id.get())
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.image.path())
        .bind(new.movie.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_shot", e))?
        .ok_or(StoreError::NotFound)?;
        shot_from_row(&row)
    }

    async fn delete_shot(&self, id: MovieShotId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM movie_shots WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_shot", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl RatingStarRepository for PostgresCatalogStore {
    async fn list_rating_stars(&self) -> StoreResult<Vec<RatingStar>> {
        let rows = sqlx::query("SELECT id, value FROM rating_stars ORDER BY value DESC, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_rating_stars", e))?;
        rows.iter().map(star_from_row).collect()
    }

    async fn get_rating_star(&self, id: RatingStarId) -> StoreResult<Option<RatingStar>> {
        let row = sqlx::query("SELECT id, value FROM rating_stars WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_rating_star", e))?;
        row.as_ref().map(star_from_row).transpose()
    }

    async fn find_star_by_value(&self, value: i16) -> StoreResult<Option<RatingStar>> {
        let row = sqlx::query(
            "SELECT id, value FROM rating_stars WHERE value = $1 ORDER BY id LIMIT 1",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_star_by_value", e))?;
        row.as_ref().map(star_from_row).transpose()
    }

    async fn insert_rating_star(&self, new: NewRatingStar) -> StoreResult<RatingStar> {
        let row = sqlx::query("INSERT INTO rating_stars (value) VALUES ($1) RETURNING id, value")
            .bind(new.value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_rating_star", e))?;
        star_from_row(&row)
    }

    async fn update_rating_star(&self, id: RatingStarId, new: NewRatingStar) -> StoreResult<RatingStar> {
        let row = sqlx::query("UPDATE rating_stars SET value = $2 WHERE id = $1 RETURNING id, value")
            .bind(id.get())
            .bind(new.value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_rating_star", e))?
            .ok_or(StoreError::NotFound)?;
        star_from_row(&row)
    }

    async fn delete_rating_star(&self, id: RatingStarId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM rating_stars WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_rating_star", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl RatingRepository for PostgresCatalogStore {
    async fn list_ratings(&self, movie: Option<MovieId>) -> StoreResult<Vec<Rating>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ip, star_id, movie_id FROM ratings
            WHERE $1::bigint IS NULL OR movie_id = $1
            ORDER BY id
            "#,
        )
        .bind(movie.map(MovieId::get))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_ratings", e))?;
        rows.iter().map(rating_from_row).collect()
    }

    async fn get_rating(&self, id: RatingId) -> StoreResult<Option<Rating>> {
        let row = sqlx::query("SELECT id, ip, star_id, movie_id FROM ratings WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_rating", e))?;
        row.as_ref().map(rating_from_row).transpose()
    }

    async fn find_rating(&self, ip: &str, movie: MovieId) -> StoreResult<Option<Rating>> {
        let row = sqlx::query(
            "SELECT id, ip, star_id, movie_id FROM ratings WHERE ip = $1 AND movie_id = $2",
        )
        .bind(ip)
        .bind(movie.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_rating", e))?;
        row.as_ref().map(rating_from_row).transpose()
    }

    #[instrument(skip(self, new), fields(movie = %new.movie, star = %new.star), err)]
    async fn upsert_rating(&self, new: NewRating) -> StoreResult<(Rating, Upsert)> {
        // xmax = 0 only for freshly inserted tuples.
        let row = sqlx::query(
            r#"
            INSERT INTO ratings (ip, star_id, movie_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (ip, movie_id) DO UPDATE SET star_id = EXCLUDED.star_id
            RETURNING id, ip, star_id, movie_id, (xmax = 0) AS inserted
            "#,
        )
        .bind(&new.ip)
        .bind(new.star.get())
        .bind(new.movie.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_rating", e))?;
        let inserted: bool = col(&row, "inserted")?;
        let outcome = if inserted { Upsert::Created } else { Upsert::Updated };
        Ok((rating_from_row(&row)?, outcome))
    }

    async fn update_rating(&self, id: RatingId, new: NewRating) -> StoreResult<Rating> {
        let row = sqlx::query(
            r#"
            UPDATE ratings SET ip = $2, star_id = $3, movie_id = $4
            WHERE id = $1
            RETURNING id, ip, star_id, movie_id
            "#,
        )
        .bind(id.get())
        .bind(&new.ip)
        .bind(new.star.get())
        .bind(new.movie.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_rating", e))?
        .ok_or(StoreError::NotFound)?;
        rating_from_row(&row)
    }

    async fn delete_rating(&self, id: RatingId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_rating", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepository for PostgresCatalogStore {
    async fn list_reviews(&self, movie: Option<MovieId>) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, name, text, parent_id, movie_id FROM reviews
            WHERE $1::bigint IS NULL OR movie_id = $1
            ORDER BY id
            "#,
        )
        .bind(movie.map(MovieId::get))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_reviews", e))?;
        rows.iter().map(review_from_row).collect()
    }

    async fn get_review(&self, id: ReviewId) -> StoreResult<Option<Review>> {
        let row = sqlx::query(
            "SELECT id, email, name, text, parent_id, movie_id FROM reviews WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_review", e))?;
        row.as_ref().map(review_from_row).transpose()
    }

    #[instrument(skip(self, new), fields(movie = %new.movie), err)]
    async fn insert_review(&self, new: NewReview) -> StoreResult<Review> {
        let row = sqlx::query(
            r#"
            INSERT INTO reviews (email, name, text, parent_id, movie_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, name, text, parent_id, movie_id
            "#,
        )
        .bind(new.email.as_str())
        .bind(&new.name)
        .bind(&new.text)
        .bind(new.parent.map(ReviewId::get))
        .bind(new.movie.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_review", e))?;
        review_from_row(&row)
    }

    async fn update_review(&self, id: ReviewId, new: NewReview) -> StoreResult<Review> {
        let row = sqlx::query(
            r#"
            UPDATE reviews SET email = $2, name = $3, text = $4, parent_id = $5, movie_id = $6
            WHERE id = $1
            RETURNING id, email, name, text, parent_id, movie_id
            "#,
        )
        .bind(id.get())
        .bind(new.email.as_str())
        .bind(&new.name)
        .bind(&new.text)
        .bind(new.parent.map(ReviewId::get))
        .bind(new.movie.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_review", e))?
        .ok_or(StoreError::NotFound)?;
        review_from_row(&row)
    }

    #[instrument(skip(self), err)]
    async fn delete_review(&self, id: ReviewId) -> StoreResult<bool> {
        let done = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_review", e))?;
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_constraints_map_to_input_fields() {
        assert_eq!(unique_target(Some("movies_url_key")), ("movies", "url"));
        assert_eq!(unique_target(Some("ratings_ip_movie_key")), ("ratings", "ip"));
        assert_eq!(unique_target(None), ("catalog", "__all__"));
    }

    #[test]
    fn migration_declares_cascades() {
        assert!(MIGRATION.contains("REFERENCES categories (id) ON DELETE SET NULL"));
        assert!(MIGRATION.contains("REFERENCES reviews (id) ON DELETE SET NULL"));
        assert!(MIGRATION.contains("UNIQUE (ip, movie_id)"));
    }

    #[test]
    fn migration_limits_star_values_to_the_accepted_range() {
        use kinoteka_catalog::rating::STAR_RANGE;

        let check = format!(
            "CHECK (value BETWEEN {} AND {})",
            STAR_RANGE.start(),
            STAR_RANGE.end()
        );
        assert!(MIGRATION.contains(&check));
    }

    #[test]
    fn small_integer_conversions_are_checked() {
        assert_eq!(to_small(32_767).unwrap(), 32_767);
        assert!(to_small(40_000).is_err());
        assert!(from_small(-1).is_err());
        assert!(from_money(-5).is_err());
    }
}
