// Blog Database - SQLite entity store with referential-integrity cascades
// Authors, groups, posts, comments, follow edges and login sessions

use chrono::Utc;
use sqlx::{
    sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    QueryBuilder,
};
use std::str::FromStr;
use tracing::{debug, info, instrument};

use crate::error::{AppError, AppResult};
use crate::models::{
    Author, AuthorCredentials, AuthorId, Comment, Group, GroupId, Post, PostDraft, PostId,
    PostScope,
};

/// Longest group title, in characters.
pub const GROUP_TITLE_MAX: usize = 200;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        full_name TEXT,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS communities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL CHECK (length(title) <= 200),
        slug TEXT NOT NULL UNIQUE,
        description TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        pub_date TEXT NOT NULL,
        author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
        group_id INTEGER REFERENCES communities(id) ON DELETE SET NULL,
        image TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        created TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS follows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
        author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
        created TEXT NOT NULL,
        UNIQUE (user_id, author_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        token TEXT PRIMARY KEY,
        author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_posts_pub_date ON posts(pub_date DESC, id DESC)",
    "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
    "CREATE INDEX IF NOT EXISTS idx_posts_group ON posts(group_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created DESC)",
    "CREATE INDEX IF NOT EXISTS idx_follows_author ON follows(author_id)",
];

const POST_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, a.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title, p.image
    FROM posts p
    JOIN authors a ON a.id = p.author_id
    LEFT JOIN communities g ON g.id = p.group_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.author_id, a.username AS author_username, c.text, c.created
    FROM comments c
    JOIN authors a ON a.id = c.author_id
"#;

/// Entity store over a SQLite connection pool. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct BlogDatabase {
    pool: SqlitePool,
}

impl BlogDatabase {
    /// Connect to `database_url`, creating the file if needed.
    ///
    /// Each `sqlite::memory:` connection is its own database, so in-memory
    /// stores are pinned to a single long-lived connection.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::ConfigurationError(format!("Invalid database URL {}: {}", database_url, e))
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to connect to {}: {}", database_url, e))
        })?;

        info!("Connected to database {}", database_url);
        Ok(Self { pool })
    }

    pub async fn new_in_memory() -> AppResult<Self> {
        let db = Self::connect("sqlite::memory:").await?;
        db.init().await?;
        Ok(db)
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to initialize schema: {}", e)))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---------------------------------------------------------------- authors

    /// Insert an author and an initial login session in one transaction.
    #[instrument(skip(self, password_hash, session_token))]
    pub async fn register_author(
        &self,
        username: &str,
        full_name: Option<&str>,
        password_hash: &str,
        session_token: &str,
    ) -> AppResult<Author> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
        })?;
        let now = Utc::now();

        let author_id = sqlx::query(
            "INSERT INTO authors (username, full_name, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create author {}: {}", username, e)))?
        .last_insert_rowid();

        sqlx::query("INSERT INTO sessions (token, author_id, created_at) VALUES (?, ?, ?)")
            .bind(session_token)
            .bind(author_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create session: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit author registration: {}", e))
        })?;

        info!("Registered author {} (ID: {})", username, author_id);
        Ok(Author {
            id: author_id,
            username: username.to_string(),
            full_name: full_name.map(str::to_string),
            created_at: now,
        })
    }

    #[instrument(skip(self, password_hash))]
    pub async fn create_author(
        &self,
        username: &str,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> AppResult<Author> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO authors (username, full_name, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(full_name)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create author {}: {}", username, e)))?
        .last_insert_rowid();

        Ok(Author {
            id,
            username: username.to_string(),
            full_name: full_name.map(str::to_string),
            created_at: now,
        })
    }

    pub async fn get_author(&self, id: AuthorId) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(
            "SELECT id, username, full_name, created_at FROM authors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get author {}: {}", id, e)))
    }

    pub async fn get_author_by_username(&self, username: &str) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(
            "SELECT id, username, full_name, created_at FROM authors WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get author {}: {}", username, e)))
    }

    pub async fn get_credentials(&self, username: &str) -> AppResult<Option<AuthorCredentials>> {
        sqlx::query_as::<_, AuthorCredentials>(
            "SELECT id, username, password_hash FROM authors WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get credentials: {}", e)))
    }

    /// Delete an author; posts, comments, follow edges and sessions cascade.
    #[instrument(skip(self))]
    pub async fn delete_author(&self, id: AuthorId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete author {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ----------------------------------------------------------------- groups

    #[instrument(skip(self, description))]
    pub async fn create_group(&self, title: &str, slug: &str, description: &str) -> AppResult<Group> {
        if title.chars().count() > GROUP_TITLE_MAX {
            return Err(AppError::Validation(format!(
                "Group title must be at most {} characters",
                GROUP_TITLE_MAX
            )));
        }
        let id = sqlx::query("INSERT INTO communities (title, slug, description) VALUES (?, ?, ?)")
            .bind(title)
            .bind(slug)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create group {}: {}", slug, e)))?
            .last_insert_rowid();

        Ok(Group {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        })
    }

    pub async fn get_group(&self, id: GroupId) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM communities WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get group {}: {}", id, e)))
    }

    pub async fn get_group_by_slug(&self, slug: &str) -> AppResult<Option<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM communities WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get group {}: {}", slug, e)))
    }

    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        sqlx::query_as::<_, Group>("SELECT id, title, slug, description FROM communities ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list groups: {}", e)))
    }

    /// Delete a group; its posts stay and lose their group reference.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, id: GroupId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM communities WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete group {}: {}", id, e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------ posts

    #[instrument(skip(self, draft))]
    pub async fn create_post(&self, author_id: AuthorId, draft: &PostDraft) -> AppResult<PostId> {
        let id = sqlx::query(
            "INSERT INTO posts (text, pub_date, author_id, group_id, image) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&draft.text)
        .bind(Utc::now())
        .bind(author_id)
        .bind(draft.group_id)
        .bind(&draft.image)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create post: {}", e)))?
        .last_insert_rowid();

        debug!("Created post {} by author {}", id, author_id);
        Ok(id)
    }

    /// Overwrite the mutable fields of a post. Author and pub date never change.
    #[instrument(skip(self, draft))]
    pub async fn update_post(&self, id: PostId, draft: &PostDraft) -> AppResult<()> {
        let result = sqlx::query("UPDATE posts SET text = ?, group_id = ?, image = ? WHERE id = ?")
            .bind(&draft.text)
            .bind(draft.group_id)
            .bind(&draft.image)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update post {}: {}", id, e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }
        Ok(())
    }

    pub async fn get_post(&self, id: PostId) -> AppResult<Option<Post>> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);

        qb.build_query_as::<Post>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get post {}: {}", id, e)))
    }

    /// A post addressed by its author's username; mismatched pairs are absent.
    pub async fn get_post_for_author(&self, username: &str, id: PostId) -> AppResult<Option<Post>> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        qb.push(" WHERE p.id = ");
        qb.push_bind(id);
        qb.push(" AND a.username = ");
        qb.push_bind(username);

        qb.build_query_as::<Post>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get post {}: {}", id, e)))
    }

    pub async fn count_posts(&self, scope: PostScope) -> AppResult<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        push_scope(&mut qb, scope);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count posts: {}", e)))?;
        Ok(count as u64)
    }

    pub async fn count_posts_by_author(&self, author_id: AuthorId) -> AppResult<u64> {
        self.count_posts(PostScope::Author(author_id)).await
    }

    /// Posts in `scope`, newest first.
    pub async fn list_posts(&self, scope: PostScope, limit: i64, offset: i64) -> AppResult<Vec<Post>> {
        let mut qb = QueryBuilder::<Sqlite>::new(POST_SELECT);
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        qb.build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list posts: {}", e)))
    }

    // --------------------------------------------------------------- comments

    #[instrument(skip(self, text))]
    pub async fn create_comment(
        &self,
        post_id: PostId,
        author_id: AuthorId,
        text: &str,
    ) -> AppResult<Comment> {
        let created = Utc::now();
        let id = sqlx::query("INSERT INTO comments (post_id, author_id, text, created) VALUES (?, ?, ?, ?)")
            .bind(post_id)
            .bind(author_id)
            .bind(text)
            .bind(created)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create comment: {}", e)))?
            .last_insert_rowid();

        let mut qb = QueryBuilder::<Sqlite>::new(COMMENT_SELECT);
        qb.push(" WHERE c.id = ");
        qb.push_bind(id);
        qb.build_query_as::<Comment>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to load comment {}: {}", id, e)))
    }

    /// Comments on a post, newest first.
    pub async fn list_comments(&self, post_id: PostId) -> AppResult<Vec<Comment>> {
        let mut qb = QueryBuilder::<Sqlite>::new(COMMENT_SELECT);
        qb.push(" WHERE c.post_id = ");
        qb.push_bind(post_id);
        qb.push(" ORDER BY c.created DESC, c.id DESC");

        qb.build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list comments: {}", e)))
    }

    pub async fn count_comments(&self, post_id: PostId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count comments: {}", e)))?;
        Ok(count as u64)
    }

    // ---------------------------------------------------------------- follows

    /// Insert the edge `user_id -> author_id`. Returns false if it already existed.
    #[instrument(skip(self))]
    pub async fn create_follow(&self, user_id: AuthorId, author_id: AuthorId) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO follows (user_id, author_id, created) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(author_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create follow: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the edge if present. Returns whether a row was deleted.
    #[instrument(skip(self))]
    pub async fn delete_follow(&self, user_id: AuthorId, author_id: AuthorId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete follow: {}", e)))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn follow_exists(&self, user_id: AuthorId, author_id: AuthorId) -> AppResult<bool> {
        let row: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?")
                .bind(user_id)
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to check follow existence: {}", e))
                })?;
        Ok(row.is_some())
    }

    /// Number of authors `user_id` follows.
    pub async fn count_following(&self, user_id: AuthorId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count following: {}", e)))?;
        Ok(count as u64)
    }

    /// Number of authors following `author_id`.
    pub async fn count_followers(&self, author_id: AuthorId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count followers: {}", e)))?;
        Ok(count as u64)
    }

    pub async fn count_all_follows(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count follows: {}", e)))?;
        Ok(count as u64)
    }

    // --------------------------------------------------------------- sessions

    pub async fn create_session(&self, token: &str, author_id: AuthorId) -> AppResult<()> {
        sqlx::query("INSERT INTO sessions (token, author_id, created_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(author_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create session: {}", e)))?;
        Ok(())
    }

    pub async fn author_for_session(&self, token: &str) -> AppResult<Option<Author>> {
        sqlx::query_as::<_, Author>(
            r#"
            SELECT a.id, a.username, a.full_name, a.created_at
            FROM sessions s
            JOIN authors a ON a.id = s.author_id
            WHERE s.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to resolve session: {}", e)))
    }

    pub async fn delete_session(&self, token: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete session: {}", e)))?;
        Ok(())
    }
}

fn push_scope(qb: &mut QueryBuilder<'_, Sqlite>, scope: PostScope) {
    match scope {
        PostScope::All => {}
        PostScope::Group(group_id) => {
            qb.push(" WHERE p.group_id = ");
            qb.push_bind(group_id);
        }
        PostScope::Author(author_id) => {
            qb.push(" WHERE p.author_id = ");
            qb.push_bind(author_id);
        }
        PostScope::FollowedBy(user_id) => {
            qb.push(" WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id = ");
            qb.push_bind(user_id);
            qb.push(")");
        }
    }
}
