//! Movie catalog domain model.
//!
//! Entities, input forms and their validation, value objects (slugs, e-mail
//! addresses, image references) and movie queries, implemented as pure domain
//! logic (no IO, no HTTP, no storage).

pub mod actor;
pub mod category;
pub mod email;
pub mod fields;
pub mod genre;
pub mod image;
pub mod movie;
pub mod publication;
pub mod query;
pub mod rating;
pub mod review;
pub mod shot;
pub mod slug;

pub use actor::{Actor, ActorForm, NewActor};
pub use category::{Category, CategoryForm, NewCategory};
pub use email::{Email, EmailError};
pub use genre::{Genre, GenreForm, NewGenre};
pub use image::{ImageError, ImageRef, MediaLocation};
pub use movie::{Movie, MovieForm, NewMovie};
pub use publication::{BulkUpdateOutcome, PublicationAction};
pub use query::{MovieFilter, MovieQuery, Visibility};
pub use rating::{NewRating, NewRatingStar, Rating, RatingForm, RatingStar, RatingStarForm, StarSubmission};
pub use review::{MAX_REPLY_DEPTH, NewReview, Review, ReviewEdit, ReviewForm, ReviewThread};
pub use shot::{MovieShot, MovieShotForm, NewMovieShot};
pub use slug::{Slug, SlugError};
