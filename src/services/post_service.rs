// Post authoring - create, edit and view single posts

use tracing::{debug, info, instrument};

use crate::{
    ent_framework::{can_create, can_edit_post, can_view, PrivacyTarget},
    error::{AppError, AppResult},
    infrastructure::{media_storage::looks_like_image, BlogDatabase, MediaStorage, UploadedImage, ViewerContext},
    models::{Comment, Group, GroupId, Post, PostDraft, PostId},
    services::forms::{FormErrors, PostForm},
};

pub const INVALID_GROUP: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// A post with everything its detail page shows.
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub author_posts_count: u64,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(PostId),
    Invalid(FormErrors),
}

/// Whether the viewer may open the edit form for a post.
#[derive(Debug)]
pub enum EditAccess {
    Allowed(Post),
    NotAuthor(Post),
}

#[derive(Debug)]
pub enum EditOutcome {
    Updated(Post),
    Invalid { post: Post, errors: FormErrors },
    NotAuthor(Post),
}

#[derive(Clone)]
pub struct PostService {
    db: BlogDatabase,
    media: MediaStorage,
}

impl PostService {
    pub fn new(db: BlogDatabase, media: MediaStorage) -> Self {
        Self { db, media }
    }

    /// Groups offered by the post form's select box.
    pub async fn group_choices(&self) -> AppResult<Vec<Group>> {
        self.db.list_groups().await
    }

    /// Post `post_id` as long as it belongs to `username`.
    pub async fn find_post(&self, username: &str, post_id: PostId) -> AppResult<Post> {
        self.db
            .get_post_for_author(username, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} by {} not found", post_id, username)))
    }

    #[instrument(skip(self, vc))]
    pub async fn post_detail(&self, vc: &ViewerContext, username: &str, post_id: PostId) -> AppResult<PostDetail> {
        let post = self.find_post(username, post_id).await?;
        if !can_view(vc, PrivacyTarget::Post { author_id: post.author_id }) {
            return Err(AppError::Forbidden(format!("Post {} is not visible", post_id)));
        }
        let comments = self.db.list_comments(post.id).await?;
        let author_posts_count = self.db.count_posts_by_author(post.author_id).await?;
        Ok(PostDetail {
            post,
            comments,
            author_posts_count,
        })
    }

    #[instrument(skip(self, vc, form, image))]
    pub async fn create_post(
        &self,
        vc: &ViewerContext,
        form: PostForm,
        image: Option<UploadedImage>,
    ) -> AppResult<CreateOutcome> {
        let author_id = match vc.author_id() {
            Some(id) if can_create(vc) => id,
            _ => return Err(AppError::Unauthorized("Login required to post".to_string())),
        };

        let (form, group_id, image) = match self.check_form(form, image).await? {
            Ok(valid) => valid,
            Err(errors) => return Ok(CreateOutcome::Invalid(errors)),
        };

        let image = match image {
            Some(image) => Some(self.media.save_post_image(&image).await?),
            None => None,
        };
        let draft = PostDraft {
            text: form.text,
            group_id,
            image,
        };
        let post_id = match self.db.create_post(author_id, &draft).await {
            Ok(id) => id,
            Err(e) => {
                self.discard_image(draft.image.as_deref()).await;
                return Err(e);
            }
        };
        info!("Author {} created post {}", author_id, post_id);
        Ok(CreateOutcome::Created(post_id))
    }

    pub async fn edit_access(&self, vc: &ViewerContext, username: &str, post_id: PostId) -> AppResult<EditAccess> {
        let post = self.find_post(username, post_id).await?;
        if can_edit_post(vc, post.author_id) {
            Ok(EditAccess::Allowed(post))
        } else {
            debug!("Viewer {} may not edit post {}", vc.cache_identity(), post_id);
            Ok(EditAccess::NotAuthor(post))
        }
    }

    /// Update text and group; the stored image is kept unless a new one is uploaded.
    #[instrument(skip(self, vc, form, image))]
    pub async fn edit_post(
        &self,
        vc: &ViewerContext,
        username: &str,
        post_id: PostId,
        form: PostForm,
        image: Option<UploadedImage>,
    ) -> AppResult<EditOutcome> {
        let post = match self.edit_access(vc, username, post_id).await? {
            EditAccess::Allowed(post) => post,
            EditAccess::NotAuthor(post) => return Ok(EditOutcome::NotAuthor(post)),
        };

        let (form, group_id, image) = match self.check_form(form, image).await? {
            Ok(valid) => valid,
            Err(errors) => return Ok(EditOutcome::Invalid { post, errors }),
        };

        let new_image = match image {
            Some(image) => Some(self.media.save_post_image(&image).await?),
            None => None,
        };
        let draft = PostDraft {
            text: form.text,
            group_id,
            image: new_image.clone().or_else(|| post.image.clone()),
        };
        if let Err(e) = self.db.update_post(post.id, &draft).await {
            self.discard_image(new_image.as_deref()).await;
            return Err(e);
        }
        info!("Post {} updated", post.id);

        let updated = self
            .db
            .get_post(post.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", post.id)))?;
        Ok(EditOutcome::Updated(updated))
    }

    async fn discard_image(&self, stored: Option<&str>) {
        if let Some(relative) = stored {
            self.media.remove_post_image(relative).await;
        }
    }

    /// Normalize and validate a submitted form, resolving its group choice.
    async fn check_form(
        &self,
        form: PostForm,
        image: Option<UploadedImage>,
    ) -> AppResult<Result<(PostForm, Option<GroupId>, Option<UploadedImage>), FormErrors>> {
        let form = form.normalized();
        let mut errors = form.field_errors();

        let group = match form.group.as_deref().map(str::parse::<GroupId>) {
            None => None,
            Some(Ok(id)) => Some(self.db.get_group(id).await?),
            Some(Err(_)) => Some(None),
        };
        let group_id = match group {
            None => None,
            Some(Some(group)) => Some(group.id),
            Some(None) => {
                errors.add("group", INVALID_GROUP);
                None
            }
        };

        let image = image.filter(|img| !img.bytes.is_empty());
        if let Some(img) = &image {
            if !looks_like_image(&img.bytes) {
                errors.add("image", INVALID_IMAGE);
            }
        }

        Ok(errors.into_result().map(|()| (form, group_id, image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x00\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

    async fn setup() -> (tempfile::TempDir, BlogDatabase, PostService) {
        let dir = tempfile::tempdir().unwrap();
        let db = BlogDatabase::new_in_memory().await.unwrap();
        let service = PostService::new(db.clone(), MediaStorage::new(dir.path()));
        (dir, db, service)
    }

    fn form(text: &str, group: Option<&str>) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create() {
        let (_dir, _db, posts) = setup().await;
        let anon = ViewerContext::anonymous("req".to_string());
        let result = posts.create_post(&anon, form("hi", None), None).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_create_with_group_and_image() {
        let (dir, db, posts) = setup().await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let cats = db.create_group("Cats", "cats", "").await.unwrap();
        let vc = ViewerContext::for_author(&leo, "req".to_string());
        let image = UploadedImage {
            file_name: "small.gif".to_string(),
            bytes: SMALL_GIF.to_vec(),
        };

        let group = cats.id.to_string();
        let outcome = posts
            .create_post(&vc, form("  Hello  ", Some(&group)), Some(image))
            .await
            .unwrap();
        let CreateOutcome::Created(post_id) = outcome else {
            panic!("expected a created post");
        };

        let post = db.get_post(post_id).await.unwrap().unwrap();
        assert_eq!(post.text, "Hello");
        assert_eq!(post.group_id, Some(cats.id));
        assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
        assert!(dir.path().join("posts/small.gif").exists());
    }

    #[tokio::test]
    async fn test_invalid_group_and_image_are_reported() {
        let (_dir, db, posts) = setup().await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let vc = ViewerContext::for_author(&leo, "req".to_string());
        let bogus = UploadedImage {
            file_name: "notes.txt".to_string(),
            bytes: b"plain text".to_vec(),
        };

        let outcome = posts.create_post(&vc, form("", Some("999")), Some(bogus)).await.unwrap();
        let CreateOutcome::Invalid(errors) = outcome else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.get("group"), [INVALID_GROUP.to_string()]);
        assert_eq!(errors.get("image"), [INVALID_IMAGE.to_string()]);
        assert_eq!(errors.get("text").len(), 1);
        assert_eq!(db.count_posts(crate::models::PostScope::All).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_non_author_edit_changes_nothing() {
        let (_dir, db, posts) = setup().await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let anna = db.create_author("anna", None, "hash").await.unwrap();
        let post_id = db
            .create_post(
                leo.id,
                &PostDraft {
                    text: "original".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        let vc = ViewerContext::for_author(&anna, "req".to_string());
        let outcome = posts.edit_post(&vc, "leo", post_id, form("hijack", None), None).await.unwrap();
        assert!(matches!(outcome, EditOutcome::NotAuthor(_)));
        assert_eq!(db.get_post(post_id).await.unwrap().unwrap().text, "original");
    }

    #[tokio::test]
    async fn test_edit_keeps_existing_image() {
        let (_dir, db, posts) = setup().await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let post_id = db
            .create_post(
                leo.id,
                &PostDraft {
                    text: "original".to_string(),
                    group_id: None,
                    image: Some("posts/old.gif".to_string()),
                },
            )
            .await
            .unwrap();

        let vc = ViewerContext::for_author(&leo, "req".to_string());
        let outcome = posts.edit_post(&vc, "leo", post_id, form("edited", None), None).await.unwrap();
        let EditOutcome::Updated(post) = outcome else {
            panic!("expected an update");
        };
        assert_eq!(post.text, "edited");
        assert_eq!(post.image.as_deref(), Some("posts/old.gif"));
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_image_behind() {
        let (dir, db, posts) = setup().await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        let vc = ViewerContext::for_author(&leo, "req".to_string());
        sqlx::query("DROP TABLE comments").execute(db.pool()).await.unwrap();
        sqlx::query("DROP TABLE posts").execute(db.pool()).await.unwrap();
        let image = UploadedImage {
            file_name: "small.gif".to_string(),
            bytes: SMALL_GIF.to_vec(),
        };

        let result = posts.create_post(&vc, form("lost post", None), Some(image)).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(!dir.path().join("posts/small.gif").exists());
    }

    #[tokio::test]
    async fn test_detail_requires_matching_author() {
        let (_dir, db, posts) = setup().await;
        let leo = db.create_author("leo", None, "hash").await.unwrap();
        db.create_author("anna", None, "hash").await.unwrap();
        let post_id = db
            .create_post(
                leo.id,
                &PostDraft {
                    text: "hello".to_string(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        let anon = ViewerContext::anonymous("req".to_string());
        let detail = posts.post_detail(&anon, "leo", post_id).await.unwrap();
        assert_eq!(detail.author_posts_count, 1);
        assert!(detail.comments.is_empty());
        assert!(matches!(
            posts.post_detail(&anon, "anna", post_id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
