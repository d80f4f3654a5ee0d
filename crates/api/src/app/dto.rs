use serde::Deserialize;
use serde_json::{Value, json};

use kinoteka_catalog::{Actor, Movie, MovieShot, Rating, RatingStar};
use kinoteka_core::MovieId;
use kinoteka_infra::{ActorPage, MovieAdminDetail, MovieListing, MoviePage, Sidebar, Upsert};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// `?movie=<id>` on admin lists of shots, ratings and reviews.
#[derive(Debug, Default, Deserialize)]
pub struct MovieScope {
    #[serde(default)]
    pub movie: Option<MovieId>,
}

#[derive(Debug, Deserialize)]
pub struct BulkPublicationRequest {
    pub ids: Vec<MovieId>,
}

#[derive(Debug, Deserialize)]
pub struct SaveAsNewRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub draft: bool,
}

// -------------------------
// Response mapping
// -------------------------

pub fn movie_to_json(movie: &Movie, media_url: &str) -> Value {
    json!({
        "id": movie.id,
        "title": movie.title,
        "tagline": movie.tagline,
        "description": movie.description,
        "poster": movie.poster,
        "poster_url": movie.poster.url(media_url),
        "year": movie.year,
        "country": movie.country,
        "directors": movie.directors,
        "actors": movie.actors,
        "genres": movie.genres,
        "world_premiere": movie.world_premiere,
        "budget": movie.budget,
        "fees_in_usa": movie.fees_in_usa,
        "fees_in_world": movie.fees_in_world,
        "category": movie.category,
        "url": movie.url,
        "draft": movie.draft,
        "absolute_url": movie.absolute_url(),
    })
}

pub fn movies_to_json(movies: &[Movie], media_url: &str) -> Vec<Value> {
    movies.iter().map(|m| movie_to_json(m, media_url)).collect()
}

pub fn actor_to_json(actor: &Actor, media_url: &str) -> Value {
    json!({
        "id": actor.id,
        "name": actor.name,
        "age": actor.age,
        "description": actor.description,
        "image": actor.image,
        "image_url": actor.image.url(media_url),
        "absolute_url": actor.absolute_url(),
    })
}

pub fn actors_to_json(actors: &[Actor], media_url: &str) -> Vec<Value> {
    actors.iter().map(|a| actor_to_json(a, media_url)).collect()
}

pub fn shot_to_json(shot: &MovieShot, media_url: &str) -> Value {
    json!({
        "id": shot.id,
        "title": shot.title,
        "description": shot.description,
        "image": shot.image,
        "image_url": shot.image.url(media_url),
        "movie": shot.movie,
    })
}

pub fn shots_to_json(shots: &[MovieShot], media_url: &str) -> Vec<Value> {
    shots.iter().map(|s| shot_to_json(s, media_url)).collect()
}

pub fn sidebar_to_json(sidebar: &Sidebar) -> Value {
    json!({
        "genres": sidebar.genres,
        "years": sidebar.years,
    })
}

pub fn listing_to_json(listing: &MovieListing, media_url: &str) -> Value {
    json!({
        "items": movies_to_json(&listing.movies, media_url),
        "sidebar": sidebar_to_json(&listing.sidebar),
    })
}

pub fn movie_page_to_json(page: &MoviePage, media_url: &str) -> Value {
    json!({
        "movie": movie_to_json(&page.movie, media_url),
        "category": page.category,
        "genres": page.genres,
        "directors": actors_to_json(&page.directors, media_url),
        "actors": actors_to_json(&page.actors, media_url),
        "shots": shots_to_json(&page.shots, media_url),
        "reviews": page.reviews,
        "stars": page.stars,
        "current_rating": page.current_rating.map(|s| s.value),
    })
}

pub fn actor_page_to_json(page: &ActorPage, media_url: &str) -> Value {
    json!({
        "actor": actor_to_json(&page.actor, media_url),
        "movies": movies_to_json(&page.movies, media_url),
    })
}

pub fn movie_admin_detail_to_json(detail: &MovieAdminDetail, media_url: &str) -> Value {
    json!({
        "movie": movie_to_json(&detail.movie, media_url),
        "shots": shots_to_json(&detail.shots, media_url),
        "reviews": detail.reviews,
    })
}

pub fn rating_to_json(rating: &Rating, star: Option<&RatingStar>, outcome: Option<Upsert>) -> Value {
    let mut body = json!({
        "id": rating.id,
        "ip": rating.ip,
        "star": rating.star,
        "movie": rating.movie,
    });
    if let Some(star) = star {
        body["value"] = json!(star.value);
    }
    if let Some(outcome) = outcome {
        body["created"] = json!(outcome == Upsert::Created);
    }
    body
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use kinoteka_catalog::{ImageRef, MediaLocation, NewMovie, Slug};

    use super::*;

    #[test]
    fn movie_json_carries_urls() {
        let movie = Movie::new(
            MovieId::new(3),
            NewMovie {
                title: "Solaris".into(),
                tagline: String::new(),
                description: "Ocean".into(),
                poster: ImageRef::new(MediaLocation::Movies, "solaris.jpg").unwrap(),
                year: 1972,
                country: "USSR".into(),
                directors: vec![],
                actors: vec![],
                genres: vec![],
                world_premiere: NaiveDate::from_ymd_opt(1972, 3, 20).unwrap(),
                budget: 0,
                fees_in_usa: 0,
                fees_in_world: 0,
                category: None,
                url: Slug::parse("solaris").unwrap(),
                draft: false,
            },
        );

        let body = movie_to_json(&movie, "/media/");
        assert_eq!(body["poster"], "movies/solaris.jpg");
        assert_eq!(body["poster_url"], "/media/movies/solaris.jpg");
        assert_eq!(body["absolute_url"], "/movies/solaris");
        assert_eq!(body["world_premiere"], "1972-03-20");
        assert_eq!(body["id"], 3);
    }
}
