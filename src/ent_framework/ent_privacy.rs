// Privacy System - who may view, create, edit and follow
// Ordered rules; the first rule that does not skip decides, and the default is deny

use once_cell::sync::Lazy;

use crate::{infrastructure::viewer::ViewerContext, models::AuthorId};

/// Operations that can be controlled by privacy policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyOperation {
    View,
    Create,
    Edit,
    Follow,
    Unfollow,
}

/// What the operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyTarget {
    Feed,
    Post { author_id: AuthorId },
    Comment { author_id: AuthorId },
    /// An author as the object of a follow edge.
    Author { author_id: AuthorId },
}

impl PrivacyTarget {
    fn owner(&self) -> Option<AuthorId> {
        match self {
            PrivacyTarget::Feed => None,
            PrivacyTarget::Post { author_id }
            | PrivacyTarget::Comment { author_id }
            | PrivacyTarget::Author { author_id } => Some(*author_id),
        }
    }
}

/// Privacy rule context for access control decisions
#[derive(Debug, Clone, Copy)]
pub struct PrivacyContext<'a> {
    pub viewer: &'a ViewerContext,
    pub operation: PrivacyOperation,
    pub target: PrivacyTarget,
}

/// Privacy rule result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyResult {
    Allow,
    Deny,
    Skip, // Skip this rule, continue to next
}

pub trait PrivacyRule: Send + Sync {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult;

    fn name(&self) -> &str;

    fn operations(&self) -> &'static [PrivacyOperation];
}

/// Reading posts, comments and feeds is open to everyone, anonymous included.
pub struct PublicReadRule;

impl PrivacyRule for PublicReadRule {
    fn evaluate(&self, _ctx: &PrivacyContext<'_>) -> PrivacyResult {
        PrivacyResult::Allow
    }

    fn name(&self) -> &str {
        "public_read"
    }

    fn operations(&self) -> &'static [PrivacyOperation] {
        &[PrivacyOperation::View]
    }
}

/// Every mutation needs a logged-in author.
pub struct AuthenticatedOnlyRule;

impl PrivacyRule for AuthenticatedOnlyRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        if ctx.viewer.is_authenticated() {
            PrivacyResult::Skip
        } else {
            PrivacyResult::Deny
        }
    }

    fn name(&self) -> &str {
        "authenticated_only"
    }

    fn operations(&self) -> &'static [PrivacyOperation] {
        &[
            PrivacyOperation::Create,
            PrivacyOperation::Edit,
            PrivacyOperation::Follow,
            PrivacyOperation::Unfollow,
        ]
    }
}

/// Only the owning author may edit.
pub struct OwnerOnlyRule;

impl PrivacyRule for OwnerOnlyRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        match (ctx.viewer.author_id(), ctx.target.owner()) {
            (Some(viewer), Some(owner)) if viewer == owner => PrivacyResult::Allow,
            _ => PrivacyResult::Deny,
        }
    }

    fn name(&self) -> &str {
        "owner_only"
    }

    fn operations(&self) -> &'static [PrivacyOperation] {
        &[PrivacyOperation::Edit]
    }
}

/// An author cannot follow themselves.
pub struct NoSelfFollowRule;

impl PrivacyRule for NoSelfFollowRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        match (ctx.viewer.author_id(), ctx.target.owner()) {
            (Some(viewer), Some(target)) if viewer == target => PrivacyResult::Deny,
            _ => PrivacyResult::Skip,
        }
    }

    fn name(&self) -> &str {
        "no_self_follow"
    }

    fn operations(&self) -> &'static [PrivacyOperation] {
        &[PrivacyOperation::Follow]
    }
}

/// Whatever survived the earlier rules is allowed for authenticated viewers.
pub struct AuthenticatedAllowRule;

impl PrivacyRule for AuthenticatedAllowRule {
    fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        if ctx.viewer.is_authenticated() {
            PrivacyResult::Allow
        } else {
            PrivacyResult::Skip
        }
    }

    fn name(&self) -> &str {
        "authenticated_allow"
    }

    fn operations(&self) -> &'static [PrivacyOperation] {
        &[
            PrivacyOperation::Create,
            PrivacyOperation::Follow,
            PrivacyOperation::Unfollow,
        ]
    }
}

/// Rules in evaluation order.
#[derive(Default)]
pub struct PrivacyPolicy {
    rules: Vec<Box<dyn PrivacyRule>>,
}

impl PrivacyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: Box<dyn PrivacyRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn evaluate(&self, ctx: &PrivacyContext<'_>) -> PrivacyResult {
        for rule in &self.rules {
            if !rule.operations().contains(&ctx.operation) {
                continue;
            }
            match rule.evaluate(ctx) {
                PrivacyResult::Skip => continue,
                decision => {
                    tracing::trace!(
                        rule = rule.name(),
                        request_id = %ctx.viewer.request_id,
                        "privacy decision {:?} for {:?}",
                        decision,
                        ctx.operation
                    );
                    return decision;
                }
            }
        }

        PrivacyResult::Deny
    }

    pub fn allows(&self, viewer: &ViewerContext, operation: PrivacyOperation, target: PrivacyTarget) -> bool {
        let ctx = PrivacyContext {
            viewer,
            operation,
            target,
        };
        self.evaluate(&ctx) == PrivacyResult::Allow
    }
}

pub fn create_default_privacy_policy() -> PrivacyPolicy {
    PrivacyPolicy::new()
        .with_rule(Box::new(PublicReadRule))
        .with_rule(Box::new(AuthenticatedOnlyRule))
        .with_rule(Box::new(OwnerOnlyRule))
        .with_rule(Box::new(NoSelfFollowRule))
        .with_rule(Box::new(AuthenticatedAllowRule))
}

static DEFAULT_POLICY: Lazy<PrivacyPolicy> = Lazy::new(create_default_privacy_policy);

pub fn default_policy() -> &'static PrivacyPolicy {
    &DEFAULT_POLICY
}

pub fn can_view(viewer: &ViewerContext, target: PrivacyTarget) -> bool {
    default_policy().allows(viewer, PrivacyOperation::View, target)
}

/// Creating a post or comment. The new resource's author is always the viewer.
pub fn can_create(viewer: &ViewerContext) -> bool {
    default_policy().allows(viewer, PrivacyOperation::Create, PrivacyTarget::Feed)
}

pub fn can_edit_post(viewer: &ViewerContext, post_author_id: AuthorId) -> bool {
    default_policy().allows(
        viewer,
        PrivacyOperation::Edit,
        PrivacyTarget::Post {
            author_id: post_author_id,
        },
    )
}

pub fn can_follow(viewer: &ViewerContext, author_id: AuthorId) -> bool {
    default_policy().allows(viewer, PrivacyOperation::Follow, PrivacyTarget::Author { author_id })
}

pub fn can_unfollow(viewer: &ViewerContext, author_id: AuthorId) -> bool {
    default_policy().allows(viewer, PrivacyOperation::Unfollow, PrivacyTarget::Author { author_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anon() -> ViewerContext {
        ViewerContext::anonymous("req".to_string())
    }

    fn author(id: AuthorId) -> ViewerContext {
        ViewerContext::authenticated_user(id, format!("user{}", id), "req".to_string())
    }

    #[test]
    fn everyone_can_view() {
        for viewer in [anon(), author(1)] {
            assert!(can_view(&viewer, PrivacyTarget::Feed));
            assert!(can_view(&viewer, PrivacyTarget::Post { author_id: 2 }));
            assert!(can_view(&viewer, PrivacyTarget::Comment { author_id: 2 }));
        }
    }

    #[test]
    fn only_authenticated_can_create() {
        assert!(!can_create(&anon()));
        assert!(can_create(&author(1)));
    }

    #[test]
    fn only_owner_can_edit() {
        assert!(can_edit_post(&author(1), 1));
        assert!(!can_edit_post(&author(2), 1));
        assert!(!can_edit_post(&anon(), 1));
    }

    #[test]
    fn self_follow_is_denied() {
        assert!(can_follow(&author(1), 2));
        assert!(!can_follow(&author(1), 1));
        assert!(!can_follow(&anon(), 1));
    }

    #[test]
    fn unfollow_requires_login_only() {
        assert!(can_unfollow(&author(1), 2));
        assert!(can_unfollow(&author(1), 1));
        assert!(!can_unfollow(&anon(), 2));
    }

    #[test]
    fn empty_policy_denies() {
        let policy = PrivacyPolicy::new();
        assert!(!policy.allows(&author(1), PrivacyOperation::View, PrivacyTarget::Feed));
    }
}
