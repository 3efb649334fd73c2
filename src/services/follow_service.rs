// Follow edges between authors

use tracing::{debug, info, instrument};

use crate::{
    ent_framework::{can_follow, can_unfollow},
    error::{AppError, AppResult},
    infrastructure::{BlogDatabase, ViewerContext},
    models::Author,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollow,
}

#[derive(Clone)]
pub struct FollowService {
    db: BlogDatabase,
}

impl FollowService {
    pub fn new(db: BlogDatabase) -> Self {
        Self { db }
    }

    async fn target(&self, username: &str) -> AppResult<Author> {
        self.db
            .get_author_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", username)))
    }

    fn viewer_id(vc: &ViewerContext) -> AppResult<i64> {
        vc.author_id()
            .ok_or_else(|| AppError::Unauthorized("Login required to follow".to_string()))
    }

    /// Self-follows and repeated follows leave the graph untouched.
    #[instrument(skip(self, vc))]
    pub async fn follow(&self, vc: &ViewerContext, username: &str) -> AppResult<FollowOutcome> {
        let viewer_id = Self::viewer_id(vc)?;
        let author = self.target(username).await?;

        if !can_follow(vc, author.id) {
            debug!("Author {} tried to follow themselves", viewer_id);
            return Ok(FollowOutcome::SelfFollow);
        }

        if self.db.create_follow(viewer_id, author.id).await? {
            info!("Author {} now follows {}", viewer_id, author.id);
            Ok(FollowOutcome::Created)
        } else {
            debug!("Author {} already follows {}", viewer_id, author.id);
            Ok(FollowOutcome::AlreadyFollowing)
        }
    }

    /// Returns whether an edge was removed; a missing edge is not an error.
    #[instrument(skip(self, vc))]
    pub async fn unfollow(&self, vc: &ViewerContext, username: &str) -> AppResult<bool> {
        let viewer_id = Self::viewer_id(vc)?;
        let author = self.target(username).await?;
        if !can_unfollow(vc, author.id) {
            return Err(AppError::Forbidden(format!("Cannot unfollow {}", username)));
        }

        let removed = self.db.delete_follow(viewer_id, author.id).await?;
        if removed {
            info!("Author {} unfollowed {}", viewer_id, author.id);
        }
        Ok(removed)
    }
}
