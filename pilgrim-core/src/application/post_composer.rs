use tracing::{info, warn};

use crate::data::geocoder::Geocoder;
use crate::data::image_storage::ImageStorage;
use crate::data::post_repository::{NewPost, PostsRepository};
use crate::domain::draft::{PostDraft, Waypoint};
use crate::domain::error::DomainError;
use crate::domain::post::{GeoPoint, Post};

/// Подпись точки, если обратное геокодирование не удалось.
pub const FALLBACK_PLACE_NAME: &str = "Selected point";

/// Сборка и публикация поста-маршрута.
pub struct PostComposer<R: PostsRepository, S: ImageStorage, G: Geocoder> {
    repo: R,
    images: S,
    geocoder: G,
}

impl<R: PostsRepository, S: ImageStorage, G: Geocoder> PostComposer<R, S, G> {
    pub fn new(repo: R, images: S, geocoder: G) -> Self {
        Self {
            repo,
            images,
            geocoder,
        }
    }

    /// Название места для точки. Ошибка геокодера не пробрасывается:
    /// вместо неё возвращается [`FALLBACK_PLACE_NAME`].
    pub async fn place_name(&self, point: GeoPoint) -> String {
        match self.geocoder.reverse(point).await {
            Ok(name) => name,
            Err(err) => {
                warn!(lat = point.lat, lng = point.lng, error = %err, "reverse geocoding failed");
                FALLBACK_PLACE_NAME.to_string()
            }
        }
    }

    /// Добавляет точку в конец маршрута с названием от геокодера.
    pub async fn add_waypoint(&self, draft: &mut PostDraft, point: GeoPoint) -> usize {
        let name = self.place_name(point).await;
        draft.waypoints.push(Waypoint { point, name });
        draft.waypoints.len() - 1
    }

    /// Публикует черновик. Если есть изображение, оно загружается первым;
    /// ошибка загрузки отменяет публикацию.
    pub async fn publish(&self, draft: PostDraft) -> Result<Post, DomainError> {
        let draft = draft.validate()?;

        let image_url = match &draft.image {
            Some(image) => Some(self.images.upload(image).await?),
            None => None,
        };

        let (locations, location_names) = draft
            .waypoints
            .into_iter()
            .map(|waypoint| (waypoint.point, waypoint.name))
            .unzip();

        let post = self
            .repo
            .create_post(NewPost {
                text: draft.text,
                image_url,
                locations,
                location_names,
            })
            .await?;

        info!(post_id = %post.id, waypoints = post.locations.len(), "route published");
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{FALLBACK_PLACE_NAME, PostComposer};
    use crate::data::geocoder::{GeocodeError, Geocoder};
    use crate::data::image_storage::ImageStorage;
    use crate::data::post_repository::PostsRepository;
    use crate::data::repositories::memory::post_repository::InMemoryPostsRepository;
    use crate::domain::draft::{ImageUpload, PostDraft};
    use crate::domain::error::DomainError;
    use crate::domain::post::GeoPoint;

    #[derive(Clone)]
    struct FakeGeocoder {
        name: Option<String>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn reverse(&self, _point: GeoPoint) -> Result<String, GeocodeError> {
            self.name
                .clone()
                .ok_or_else(|| GeocodeError::Transport("connection refused".to_string()))
        }
    }

    #[derive(Clone, Default)]
    struct FakeImages {
        fail: bool,
        uploads: Arc<Mutex<Vec<ImageUpload>>>,
    }

    #[async_trait]
    impl ImageStorage for FakeImages {
        async fn upload(&self, image: &ImageUpload) -> Result<String, DomainError> {
            if self.fail {
                return Err(DomainError::Upload("bucket unavailable".to_string()));
            }
            self.uploads
                .lock()
                .expect("uploads mutex poisoned")
                .push(image.clone());
            Ok("https://images.example.com/posts/1700000000000".to_string())
        }
    }

    fn composer(
        geocoder_name: Option<&str>,
        images: FakeImages,
    ) -> (
        PostComposer<InMemoryPostsRepository, FakeImages, FakeGeocoder>,
        InMemoryPostsRepository,
    ) {
        let repo = InMemoryPostsRepository::new();
        let geocoder = FakeGeocoder {
            name: geocoder_name.map(str::to_string),
        };
        (PostComposer::new(repo.clone(), images, geocoder), repo)
    }

    fn point() -> GeoPoint {
        GeoPoint {
            lat: 26.2124,
            lng: 127.6792,
        }
    }

    #[tokio::test]
    async fn add_waypoint_uses_geocoded_name() {
        let (composer, _) = composer(Some("Naha"), FakeImages::default());
        let mut draft = PostDraft::new("route");

        let index = composer.add_waypoint(&mut draft, point()).await;
        assert_eq!(index, 0);
        assert_eq!(draft.waypoints[0].name, "Naha");
    }

    #[tokio::test]
    async fn geocoder_failure_falls_back_to_fixed_label() {
        let (composer, _) = composer(None, FakeImages::default());
        let mut draft = PostDraft::new("route");

        composer.add_waypoint(&mut draft, point()).await;
        assert_eq!(draft.waypoints[0].name, FALLBACK_PLACE_NAME);
    }

    #[tokio::test]
    async fn publish_uploads_image_and_creates_post() {
        let images = FakeImages::default();
        let (composer, repo) = composer(Some("Naha"), images.clone());
        let mut draft = PostDraft::new("  Okinawa loop ");
        composer.add_waypoint(&mut draft, point()).await;
        composer
            .add_waypoint(&mut draft, GeoPoint { lat: 26.3, lng: 127.8 })
            .await;
        draft.rename_waypoint(1, "Cape").expect("rename");
        draft.image = Some(ImageUpload {
            bytes: vec![1, 2, 3],
            content_type: "image/jpeg".to_string(),
        });

        let post = composer.publish(draft).await.expect("publish must succeed");

        assert_eq!(post.text, "Okinawa loop");
        assert_eq!(post.likes, 0);
        assert_eq!(
            post.image_url.as_deref(),
            Some("https://images.example.com/posts/1700000000000")
        );
        assert_eq!(post.location_names, vec!["Naha".to_string(), "Cape".to_string()]);
        assert_eq!(post.locations.len(), 2);
        assert_eq!(images.uploads.lock().expect("uploads").len(), 1);

        let stored = repo.get_post(&post.id).await.expect("get").expect("stored");
        assert_eq!(stored, post);
    }

    #[tokio::test]
    async fn upload_failure_aborts_publish() {
        let images = FakeImages {
            fail: true,
            ..FakeImages::default()
        };
        let (composer, repo) = composer(Some("Naha"), images);
        let mut draft = PostDraft::new("route");
        composer.add_waypoint(&mut draft, point()).await;
        draft.image = Some(ImageUpload {
            bytes: vec![0],
            content_type: "image/png".to_string(),
        });

        let err = composer.publish(draft).await.expect_err("upload must fail");
        assert!(matches!(err, DomainError::Upload(_)));
        assert!(repo.list_recent(10).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn publish_without_waypoints_is_rejected() {
        let (composer, repo) = composer(Some("Naha"), FakeImages::default());

        let err = composer
            .publish(PostDraft::new("route"))
            .await
            .expect_err("validation must fail");
        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(repo.list_recent(10).await.expect("list").is_empty());
    }
}
