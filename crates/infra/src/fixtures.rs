//! Shared seed data for service tests.

use std::sync::Arc;

use chrono::NaiveDate;

use kinoteka_catalog::{
    ImageRef, MediaLocation, NewActor, NewCategory, NewGenre, NewMovie, NewRatingStar, Slug,
};
use kinoteka_core::{ActorId, CategoryId, GenreId, MovieId};

use crate::admin::AdminService;
use crate::catalog::CatalogService;
use crate::store::{
    ActorRepository, CategoryRepository, GenreRepository, InMemoryCatalogStore, MovieRepository,
    RatingStarRepository,
};

/// Four movies: drama 2019, comedy 2020, comedy 2018 (published) and a
/// drama 2020 draft. "Ivan Petrenko" directs the 2019 drama and plays in the
/// 2020 comedy and the draft. Star levels 1..=5 exist.
pub(crate) struct Seed {
    pub store: Arc<InMemoryCatalogStore>,
    pub films: CategoryId,
    pub drama: GenreId,
    pub comedy: GenreId,
    pub ivan: ActorId,
    pub drama_2019: MovieId,
    pub comedy_2020: MovieId,
    pub comedy_2018: MovieId,
    pub drama_2020_draft: MovieId,
}

impl Seed {
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryCatalogStore::new());

        let films = store
            .insert_category(NewCategory {
                name: "Feature films".into(),
                description: "Full-length films".into(),
                url: slug("films"),
            })
            .await
            .unwrap()
            .id;
        let drama = store
            .insert_genre(NewGenre { name: "Drama".into(), description: "d".into(), url: slug("drama") })
            .await
            .unwrap()
            .id;
        let comedy = store
            .insert_genre(NewGenre { name: "Comedy".into(), description: "c".into(), url: slug("comedy") })
            .await
            .unwrap()
            .id;
        let ivan = store
            .insert_actor(NewActor {
                name: "Ivan Petrenko".into(),
                age: 45,
                description: "Director and actor".into(),
                image: ImageRef::new(MediaLocation::Actors, "ivan.jpg").unwrap(),
            })
            .await
            .unwrap()
            .id;
        for value in 1..=5 {
            store.insert_rating_star(NewRatingStar { value }).await.unwrap();
        }

        let movie = |title: &str, url: &str, year: u16, genre: GenreId, draft: bool| NewMovie {
            title: title.into(),
            tagline: String::new(),
            description: "A movie".into(),
            poster: ImageRef::new(MediaLocation::Movies, "poster.jpg").unwrap(),
            year,
            country: "Ukraine".into(),
            directors: vec![],
            actors: vec![],
            genres: vec![genre],
            world_premiere: NaiveDate::from_ymd_opt(i32::from(year), 6, 1).unwrap(),
            budget: 1_000_000,
            fees_in_usa: 0,
            fees_in_world: 0,
            category: Some(films),
            url: slug(url),
            draft,
        };

        let mut d19 = movie("Drama 2019", "drama-2019", 2019, drama, false);
        d19.directors = vec![ivan];
        let mut c20 = movie("Comedy 2020", "comedy-2020", 2020, comedy, false);
        c20.actors = vec![ivan];
        let c18 = movie("Comedy 2018", "comedy-2018", 2018, comedy, false);
        let mut d20 = movie("Drama 2020", "drama-2020-draft", 2020, drama, true);
        d20.actors = vec![ivan];

        let drama_2019 = store.insert_movie(d19).await.unwrap().id;
        let comedy_2020 = store.insert_movie(c20).await.unwrap().id;
        let comedy_2018 = store.insert_movie(c18).await.unwrap().id;
        let drama_2020_draft = store.insert_movie(d20).await.unwrap().id;

        Self {
            store,
            films,
            drama,
            comedy,
            ivan,
            drama_2019,
            comedy_2020,
            comedy_2018,
            drama_2020_draft,
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.store.clone())
    }
}

pub(crate) fn slug(s: &str) -> Slug {
    Slug::parse(s).unwrap()
}
