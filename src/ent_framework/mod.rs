// Ent Framework - access control over blog entities

pub mod ent_privacy;

pub use ent_privacy::{
    can_create, can_edit_post, can_follow, can_unfollow, can_view, create_default_privacy_policy,
    default_policy, PrivacyContext, PrivacyOperation, PrivacyPolicy, PrivacyResult, PrivacyRule,
    PrivacyTarget,
};
