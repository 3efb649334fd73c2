use crate::models::{Author, AuthorId};

/// Who a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerType {
    Anonymous,
    Author { author_id: AuthorId, username: String },
}

/// Request-scoped identity passed explicitly into policy checks and mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerContext {
    pub viewer_type: ViewerType,
    pub request_id: String,
}

impl ViewerContext {
    pub fn anonymous(request_id: String) -> Self {
        ViewerContext {
            viewer_type: ViewerType::Anonymous,
            request_id,
        }
    }

    pub fn authenticated_user(author_id: AuthorId, username: String, request_id: String) -> Self {
        ViewerContext {
            viewer_type: ViewerType::Author {
                author_id,
                username,
            },
            request_id,
        }
    }

    pub fn for_author(author: &Author, request_id: String) -> Self {
        Self::authenticated_user(author.id, author.username.clone(), request_id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.viewer_type, ViewerType::Author { .. })
    }

    pub fn author_id(&self) -> Option<AuthorId> {
        match &self.viewer_type {
            ViewerType::Author { author_id, .. } => Some(*author_id),
            ViewerType::Anonymous => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.viewer_type {
            ViewerType::Author { username, .. } => Some(username),
            ViewerType::Anonymous => None,
        }
    }

    pub fn is_author(&self, author_id: AuthorId) -> bool {
        self.author_id() == Some(author_id)
    }

    /// Stable per-identity component for cache keys.
    pub fn cache_identity(&self) -> String {
        match &self.viewer_type {
            ViewerType::Author { author_id, .. } => format!("author:{}", author_id),
            ViewerType::Anonymous => "anonymous".to_string(),
        }
    }
}
