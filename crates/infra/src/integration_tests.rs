//! Cross-service flows: admin writes, public reads.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kinoteka_catalog::{
        CategoryForm, GenreForm, MovieFilter, MovieForm, ReviewForm, StarSubmission, Visibility,
    };

    use crate::admin::{AdminService, MovieListParams};
    use crate::catalog::CatalogService;
    use crate::error::CatalogError;
    use crate::store::{CatalogStore, InMemoryCatalogStore, Upsert};

    fn services() -> (AdminService, CatalogService) {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        (AdminService::new(store.clone()), CatalogService::new(store))
    }

    #[tokio::test]
    async fn draft_becomes_visible_after_publish() {
        let (admin, catalog) = services();

        let category = admin
            .create_category(CategoryForm {
                name: "Cartoons".into(),
                description: "Animated".into(),
                url: "cartoons".into(),
            })
            .await
            .unwrap();
        let genre = admin
            .create_genre(GenreForm {
                name: "Family".into(),
                description: "For everyone".into(),
                url: "family".into(),
            })
            .await
            .unwrap();
        let movie = admin
            .create_movie(MovieForm {
                title: "Paper Boats".into(),
                tagline: String::new(),
                description: "Two kids and a river".into(),
                poster: "boats.png".into(),
                year: Some(2022),
                country: "Georgia".into(),
                directors: vec![],
                actors: vec![],
                genres: vec![genre.id],
                world_premiere: Some("2022-09-01".into()),
                budget: Some(250_000),
                fees_in_usa: None,
                fees_in_world: Some(1_200_000),
                category: Some(category.id),
                url: "paper-boats".into(),
                draft: true,
            })
            .await
            .unwrap();

        assert!(catalog.list_published().await.unwrap().is_empty());
        assert_eq!(
            catalog.movie_detail("paper-boats", Visibility::Published).await.unwrap_err(),
            CatalogError::NotFound
        );
        assert_eq!(
            catalog.movie_detail("paper-boats", Visibility::All).await.unwrap().id,
            movie.id
        );

        let outcome = admin.publish(&[movie.id]).await.unwrap();
        assert_eq!(outcome.message(), "1 record updated");

        let listing = catalog.listing(MovieFilter::default()).await.unwrap();
        assert_eq!(listing.movies.len(), 1);
        assert_eq!(listing.sidebar.years, vec![2022]);
        assert_eq!(listing.sidebar.genres.len(), 1);
    }

    #[tokio::test]
    async fn visitor_activity_shows_up_in_admin_lists() {
        let (admin, catalog) = services();
        for value in [1, 2, 3] {
            admin
                .create_rating_star(kinoteka_catalog::RatingStarForm { value })
                .await
                .unwrap();
        }
        let movie = admin
            .create_movie(MovieForm {
                title: "Night Train".into(),
                tagline: "Last stop".into(),
                description: "A long ride".into(),
                poster: "train.jpg".into(),
                year: Some(2015),
                country: "Czechia".into(),
                directors: vec![],
                actors: vec![],
                genres: vec![],
                world_premiere: None,
                budget: None,
                fees_in_usa: None,
                fees_in_world: None,
                category: None,
                url: "night-train".into(),
                draft: false,
            })
            .await
            .unwrap();

        let (_, first) = catalog
            .submit_rating("203.0.113.9", StarSubmission { movie: movie.id, star: 3 })
            .await
            .unwrap();
        let (_, again) = catalog
            .submit_rating("203.0.113.9", StarSubmission { movie: movie.id, star: 1 })
            .await
            .unwrap();
        assert_eq!((first, again), (Upsert::Created, Upsert::Updated));
        catalog
            .submit_review(
                movie.id,
                ReviewForm {
                    parent: None,
                    name: "Olena".into(),
                    email: "olena@example.com".into(),
                    text: "Worth the ticket".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(admin.list_ratings(Some(movie.id)).await.unwrap().len(), 1);
        let detail = admin.movie_detail(movie.id).await.unwrap();
        assert_eq!(detail.reviews.len(), 1);

        let page = catalog.movie_page("night-train", Some("203.0.113.9")).await.unwrap();
        assert_eq!(page.current_rating.map(|s| s.value), Some(1));
        assert_eq!(page.stars.iter().map(|s| s.value).collect::<Vec<_>>(), vec![3, 2, 1]);

        admin.delete_movie(movie.id).await.unwrap();
        assert!(admin.list_movies(&MovieListParams::default()).await.unwrap().is_empty());
        assert!(admin.list_reviews(None).await.unwrap().is_empty());
        assert!(admin.list_ratings(None).await.unwrap().is_empty());
    }
}
