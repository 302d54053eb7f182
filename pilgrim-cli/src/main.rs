use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use pilgrim_core::data::post_repository::PostsRepository;
use pilgrim_core::data::repositories::file::likes_store::JsonFileLikesStore;
use pilgrim_core::data::repositories::postgres::post_repository::PostgresPostsRepository;
use pilgrim_core::infrastructure::database::{create_pool, run_migrations};
use pilgrim_core::infrastructure::local_image_storage::LocalImageStorage;
use pilgrim_core::infrastructure::logging::init_logging;
use pilgrim_core::infrastructure::nominatim::NominatimGeocoder;
use pilgrim_core::infrastructure::settings::Settings;
use pilgrim_core::{
    DomainError, FavoritesService, FetchOutcome, GeoPoint, HomeFeed, HomeFeedService, ImageUpload,
    LikeService, Post, PostComposer, PostDraft, PostId, RankedFeedController, RankingWindow,
    Viewer,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "pilgrim-cli", version, about = "CLI для ленты маршрутов паломничества")]
struct Cli {
    /// Идентификатор пользователя. Без него команды выполняются от имени гостя.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Печатать посты в JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Подробные логи (debug) для pilgrim.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Рейтинг постов за окно времени (1h, 1d, 1w, 1m).
    Ranking {
        #[arg(long, default_value_t = RankingWindow::LastDay)]
        window: RankingWindow,
        /// Сколько страниц загрузить, включая первую.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Последние посты и превью рейтинга.
    Feed {
        #[arg(long, default_value_t = RankingWindow::LastDay)]
        window: RankingWindow,
    },
    /// Поставить или снять лайк.
    Like {
        #[arg(long)]
        id: String,
    },
    /// Посты, которые понравились пользователю.
    Favorites,
    /// Опубликовать пост с маршрутом.
    ///
    /// Каждая точка задаётся как `--point lat,lng`. Подписи `--name` применяются
    /// к точкам по порядку; для остальных используется результат геокодирования.
    Publish {
        #[arg(long)]
        text: String,
        #[arg(long = "point", required = true)]
        points: Vec<String>,
        #[arg(long = "name")]
        names: Vec<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Скрыть пост (мягкое удаление).
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    init_logging(&settings.log_level, cli.verbose)?;

    let pool = create_pool(&settings.database_url, settings.db_max_connections).await?;
    run_migrations(&pool).await?;

    let repo = PostgresPostsRepository::new(pool);
    let likes = JsonFileLikesStore::new(&settings.likes_store_dir);
    let viewer = Viewer::from_user_id(cli.user.as_deref());
    info!(viewer = %viewer.likes_key(), "cli started");

    match cli.command {
        Command::Ranking { window, pages } => {
            let feed = RankedFeedController::new(repo);
            feed.select_window(window).await.map_err(map_domain_error)?;
            for _ in 1..pages {
                match feed.load_more().await.map_err(map_domain_error)? {
                    FetchOutcome::Loaded {
                        end_of_data: false,
                        ..
                    } => continue,
                    _ => break,
                }
            }

            let snapshot = feed.snapshot().map_err(map_domain_error)?;
            if cli.json {
                print_json(&snapshot.posts)?;
            } else {
                println!(
                    "Рейтинг за {window}: {} постов{}",
                    snapshot.posts.len(),
                    if snapshot.end_of_data {
                        ", больше нет"
                    } else {
                        ""
                    }
                );
                print_ranked(&snapshot.posts);
            }
        }
        Command::Feed { window } => {
            let feed = HomeFeedService::new(repo, likes)
                .load(&viewer, window)
                .await
                .map_err(map_domain_error)?;
            if cli.json {
                let posts = feed
                    .items
                    .iter()
                    .map(|item| item.post.clone())
                    .collect::<Vec<_>>();
                print_json(&posts)?;
            } else {
                print_home_feed(&feed);
            }
        }
        Command::Like { id } => {
            let toggle = LikeService::new(repo, likes)
                .toggle_like(&viewer, &PostId::new(id))
                .await
                .map_err(map_domain_error)?;
            let verb = if toggle.liked {
                "Лайк поставлен"
            } else {
                "Лайк снят"
            };
            println!("{verb}: id={} likes={}", toggle.post_id, toggle.likes);
        }
        Command::Favorites => {
            let posts = FavoritesService::new(repo, likes)
                .list(&viewer)
                .await
                .map_err(map_domain_error)?;
            if cli.json {
                print_json(&posts)?;
            } else {
                println!("Избранное: {} постов", posts.len());
                for post in &posts {
                    print_post_line(post);
                }
            }
        }
        Command::Publish {
            text,
            points,
            names,
            image,
        } => {
            let geocoder = NominatimGeocoder::new(
                settings.geocoder_url.clone(),
                &settings.geocoder_user_agent,
                Duration::from_secs(settings.geocoder_timeout_secs),
            )
            .map_err(|err| anyhow!("не удалось создать геокодер: {err}"))?;
            let images =
                LocalImageStorage::new(&settings.image_store_dir, &settings.image_public_base_url);
            let composer = PostComposer::new(repo, images, geocoder);

            let mut draft = PostDraft::new(text);
            for raw in &points {
                let point = parse_point(raw)?;
                composer.add_waypoint(&mut draft, point).await;
            }
            for (index, name) in names.iter().enumerate() {
                draft
                    .rename_waypoint(index, name)
                    .map_err(map_domain_error)?;
            }
            if let Some(path) = image {
                draft.image = Some(read_image(Path::new(&path))?);
            }

            let post = composer.publish(draft).await.map_err(map_domain_error)?;
            if cli.json {
                print_json(&post)?;
            } else {
                print_post("Пост опубликован", &post);
            }
        }
        Command::Delete { id } => {
            let id = PostId::new(id);
            let deleted = repo.mark_deleted(&id).await.map_err(map_domain_error)?;
            if !deleted {
                bail!("пост не найден: id={id}");
            }
            println!("Пост скрыт: id={id}");
        }
    }

    Ok(())
}

fn parse_point(raw: &str) -> Result<GeoPoint> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("точка должна быть в формате lat,lng: {raw}"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .with_context(|| format!("некорректная широта: {raw}"))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .with_context(|| format!("некорректная долгота: {raw}"))?;

    GeoPoint::new(lat, lng).map_err(map_domain_error)
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn read_image(path: &Path) -> Result<ImageUpload> {
    let content_type = content_type_for(path)
        .ok_or_else(|| anyhow!("неизвестный формат изображения: {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("не удалось прочитать {}", path.display()))?;

    Ok(ImageUpload {
        bytes,
        content_type: content_type.to_string(),
    })
}

fn map_domain_error(err: DomainError) -> anyhow::Error {
    let message = match err {
        DomainError::Validation { field, message } => {
            format!("некорректные данные: {field}: {message}")
        }
        DomainError::NotFound(what) => format!("не найдено: {what}"),
        DomainError::Query(err) => format!("ошибка запроса к хранилищу: {err}"),
        DomainError::Upload(err) => format!("не удалось загрузить изображение: {err}"),
        DomainError::LocalState(err) => format!("локальный список лайков повреждён: {err}"),
        DomainError::Unexpected(err) => format!("внутренняя ошибка: {err}"),
    };
    anyhow!(message)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("не удалось сериализовать JSON")?;
    println!("{rendered}");
    Ok(())
}

fn route_label(post: &Post) -> String {
    if post.location_names.is_empty() {
        return "-".to_string();
    }
    post.location_names.join(" → ")
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("text: {}", post.text);
    if let Some(url) = &post.image_url {
        println!("image_url: {url}");
    }
    println!("route: {}", route_label(post));
    println!("likes: {}", post.likes);
    println!("created_at: {}", post.created_at);
}

fn print_post_line(post: &Post) {
    println!(
        "- [{}] {} ({}, likes={})",
        post.id,
        post.text,
        route_label(post),
        post.likes
    );
}

fn print_ranked(posts: &[Post]) {
    for (place, post) in posts.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} ({}, likes={})",
            place + 1,
            post.id,
            post.text,
            route_label(post),
            post.likes
        );
    }
}

fn print_home_feed(feed: &HomeFeed) {
    println!("Топ за {}:", feed.window);
    print_ranked(&feed.top);

    println!("Последние посты: {}", feed.items.len());
    for item in &feed.items {
        let mark = if item.liked { "♥" } else { " " };
        println!(
            "{mark} [{}] {} ({}, likes={})",
            item.post.id,
            item.post.text,
            route_label(&item.post),
            item.post.likes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_accepts_lat_lng_pair() {
        let point = parse_point(" 35.0116, 135.7681 ").expect("must parse");
        assert_eq!(point.lat, 35.0116);
        assert_eq!(point.lng, 135.7681);
    }

    #[test]
    fn parse_point_rejects_missing_separator() {
        assert!(parse_point("35.0116").is_err());
    }

    #[test]
    fn parse_point_rejects_out_of_range_latitude() {
        assert!(parse_point("91,10").is_err());
    }

    #[test]
    fn content_type_is_guessed_from_extension() {
        assert_eq!(content_type_for(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("shrine.png")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("notes.txt")), None);
        assert_eq!(content_type_for(Path::new("noext")), None);
    }

    #[test]
    fn cli_parses_ranking_window() {
        let cli = Cli::try_parse_from(["pilgrim-cli", "ranking", "--window", "1w", "--pages", "3"])
            .expect("must parse");
        match cli.command {
            Command::Ranking { window, pages } => {
                assert_eq!(window, RankingWindow::LastWeek);
                assert_eq!(pages, 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_unknown_window() {
        assert!(Cli::try_parse_from(["pilgrim-cli", "ranking", "--window", "2d"]).is_err());
    }

    #[test]
    fn cli_collects_repeated_points_and_global_user() {
        let cli = Cli::try_parse_from([
            "pilgrim-cli",
            "publish",
            "--text",
            "Kumano Kodo",
            "--point",
            "33.84,135.77",
            "--point",
            "33.67,135.89",
            "--name",
            "Takijiri",
            "--user",
            "u-1",
        ])
        .expect("must parse");

        assert_eq!(cli.user.as_deref(), Some("u-1"));
        match cli.command {
            Command::Publish { points, names, .. } => {
                assert_eq!(points.len(), 2);
                assert_eq!(names, vec!["Takijiri".to_string()]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn route_label_joins_names() {
        let post = Post {
            id: PostId::new("p1"),
            text: "walk".to_string(),
            image_url: None,
            locations: vec![],
            location_names: vec!["Kyoto".to_string(), "Nara".to_string()],
            created_at: Default::default(),
            likes: 0,
            deleted: None,
        };
        assert_eq!(route_label(&post), "Kyoto → Nara");
    }
}
