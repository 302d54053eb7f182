//! Рейтинг постов за окно времени с постраничной догрузкой.
//!
//! Каждая страница запрашивается у хранилища в порядке свежести и
//! сортируется по лайкам только внутри себя. Границы страниц определяются
//! свежестью, а не рейтингом, поэтому глобальный порядок по лайкам между
//! страницами приблизительный.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::data::post_repository::{PageCursor, PostsRepository, RankingQuery};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::ranking::{RankingWindow, sort_by_likes_desc};

/// Размер страницы ранжирующего запроса.
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Первая страница окна: заменяет накопленные результаты.
    Initial,
    /// Следующая страница после курсора: дописывается в конец.
    Continuation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Запрос не выполнялся: загрузка уже идёт, данные закончились или окно не выбрано.
    Skipped,
    /// Страница получена и применена.
    Loaded { batch_len: usize, end_of_data: bool },
    /// Пока шёл запрос, окно сменилось; результат отброшен.
    Stale,
}

/// Состояние ленты на момент чтения.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub window: Option<RankingWindow>,
    pub posts: Vec<Post>,
    pub end_of_data: bool,
    pub in_flight: bool,
    pub has_cursor: bool,
}

#[derive(Debug, Default)]
struct FeedState {
    window: Option<RankingWindow>,
    since: Option<DateTime<Utc>>,
    posts: Vec<Post>,
    cursor: Option<PageCursor>,
    end_of_data: bool,
    in_flight: bool,
    generation: u64,
}

pub struct RankedFeedController<R: PostsRepository> {
    repo: R,
    state: Mutex<FeedState>,
}

impl<R: PostsRepository> RankedFeedController<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Выбирает окно относительно текущего времени и загружает первую страницу.
    pub async fn select_window(&self, window: RankingWindow) -> Result<FetchOutcome, DomainError> {
        self.select_window_at(window, Utc::now()).await
    }

    /// Сбрасывает результаты, курсор и признак конца данных, затем загружает
    /// первую страницу окна `[now - offset, now]`.
    ///
    /// Незавершённый запрос предыдущего окна не отменяется, но его результат
    /// будет отброшен.
    pub async fn select_window_at(
        &self,
        window: RankingWindow,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, DomainError> {
        {
            let mut state = self.state()?;
            state.generation += 1;
            state.window = Some(window);
            state.since = Some(window.start_from(now));
            state.posts.clear();
            state.cursor = None;
            state.end_of_data = false;
            state.in_flight = false;
        }
        debug!(%window, "ranking window selected");
        self.fetch_page(FetchMode::Initial).await
    }

    /// Догружает следующую страницу.
    pub async fn load_more(&self) -> Result<FetchOutcome, DomainError> {
        self.fetch_page(FetchMode::Continuation).await
    }

    pub async fn fetch_page(&self, mode: FetchMode) -> Result<FetchOutcome, DomainError> {
        let (query, generation, window) = {
            let mut state = self.state()?;
            if state.in_flight {
                debug!(?mode, "ranking fetch already in flight, skipping");
                return Ok(FetchOutcome::Skipped);
            }
            if mode == FetchMode::Continuation && state.end_of_data {
                return Ok(FetchOutcome::Skipped);
            }
            let (Some(since), Some(window)) = (state.since, state.window) else {
                return Ok(FetchOutcome::Skipped);
            };

            let after = match mode {
                FetchMode::Initial => None,
                FetchMode::Continuation => state.cursor.clone(),
            };
            state.in_flight = true;

            let query = RankingQuery {
                since,
                after,
                limit: PAGE_SIZE,
            };
            (query, state.generation, window)
        };

        let result = self.repo.ranking_page(query).await;

        let mut state = self.state()?;
        if state.generation != generation {
            debug!(%window, "discarding ranking page for a replaced window");
            return Ok(FetchOutcome::Stale);
        }
        state.in_flight = false;

        let batch = match result {
            Ok(batch) => batch,
            Err(err) => {
                error!(%window, ?mode, error = %err, "ranking fetch failed");
                return Err(err);
            }
        };

        let batch_len = batch.len();
        let cursor = batch.last().map(PageCursor::after);
        let mut ranked = batch;
        sort_by_likes_desc(&mut ranked);

        match mode {
            FetchMode::Initial => {
                state.posts = ranked;
                state.cursor = cursor;
            }
            FetchMode::Continuation => {
                state.posts.extend(ranked);
                if cursor.is_some() {
                    state.cursor = cursor;
                }
            }
        }
        state.end_of_data = batch_len < PAGE_SIZE as usize;

        info!(
            %window,
            ?mode,
            batch_len,
            total = state.posts.len(),
            end_of_data = state.end_of_data,
            "ranking page loaded"
        );

        Ok(FetchOutcome::Loaded {
            batch_len,
            end_of_data: state.end_of_data,
        })
    }

    pub fn snapshot(&self) -> Result<FeedSnapshot, DomainError> {
        let state = self.state()?;
        Ok(FeedSnapshot {
            window: state.window,
            posts: state.posts.clone(),
            end_of_data: state.end_of_data,
            in_flight: state.in_flight,
            has_cursor: state.cursor.is_some(),
        })
    }

    fn state(&self) -> Result<MutexGuard<'_, FeedState>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Unexpected("ranking state mutex poisoned".to_string()))
    }
}
