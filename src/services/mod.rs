// Services - business operations between the handlers and the entity store

pub mod account_service;
pub mod comment_service;
pub mod feed_service;
pub mod follow_service;
pub mod forms;
pub mod post_service;

pub use account_service::{AccountOutcome, AccountService, Session};
pub use comment_service::{CommentOutcome, CommentService};
pub use feed_service::{FeedService, ProfileFeed};
pub use follow_service::{FollowOutcome, FollowService};
pub use forms::{CommentForm, FormErrors, LoginForm, PostForm, SignupForm};
pub use post_service::{CreateOutcome, EditAccess, EditOutcome, PostDetail, PostService};
