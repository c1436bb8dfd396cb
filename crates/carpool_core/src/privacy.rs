//! Participant visibility: an ordered chain of rule evaluators.
//!
//! Each rule either decides (`Allow`/`Deny`) or defers to the next one; the
//! chain falls back to deny when every rule defers. The HTTP layer runs the
//! chain per participant before exposing carpool rosters.

use crate::model::{Event, PrivacySettings, User, UserId};

const ANONYMOUS_FALLBACK_NAME: &str = "Anonymous User";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Allow,
    Deny,
}

/// Everything a rule may inspect about one viewer/participant pair.
pub struct ViewContext<'a> {
    pub viewer_id: UserId,
    pub target_user_id: UserId,
    pub event: &'a Event,
    /// Whether the viewer holds an attended record for the event.
    pub viewer_attended: bool,
    pub target_privacy: Option<&'a PrivacySettings>,
}

/// One link in the chain: decide, or defer by returning `None`.
pub trait VisibilityRule: Send + Sync {
    fn evaluate(&self, ctx: &ViewContext<'_>) -> Option<Visibility>;
}

/// Users always see themselves.
pub struct SelfViewRule;

impl VisibilityRule for SelfViewRule {
    fn evaluate(&self, ctx: &ViewContext<'_>) -> Option<Visibility> {
        (ctx.viewer_id == ctx.target_user_id).then_some(Visibility::Allow)
    }
}

/// Anonymous participants are hidden from everyone else.
pub struct AnonymousTargetRule;

impl VisibilityRule for AnonymousTargetRule {
    fn evaluate(&self, ctx: &ViewContext<'_>) -> Option<Visibility> {
        match ctx.target_privacy {
            Some(privacy) if privacy.is_anonymous => Some(Visibility::Deny),
            _ => None,
        }
    }
}

/// The event creator sees every (non-anonymous) participant.
pub struct EventOwnerRule;

impl VisibilityRule for EventOwnerRule {
    fn evaluate(&self, ctx: &ViewContext<'_>) -> Option<Visibility> {
        (ctx.viewer_id == ctx.event.creator_id).then_some(Visibility::Allow)
    }
}

/// Public events expose their roster to any viewer.
pub struct PublicEventRule;

impl VisibilityRule for PublicEventRule {
    fn evaluate(&self, ctx: &ViewContext<'_>) -> Option<Visibility> {
        ctx.event.is_public.then_some(Visibility::Allow)
    }
}

/// Fellow attendees of a private event see each other.
pub struct AttendeeRule;

impl VisibilityRule for AttendeeRule {
    fn evaluate(&self, ctx: &ViewContext<'_>) -> Option<Visibility> {
        ctx.viewer_attended.then_some(Visibility::Allow)
    }
}

/// An ordered rule chain with a deny fallback.
pub struct VisibilityChain {
    rules: Vec<Box<dyn VisibilityRule>>,
}

impl VisibilityChain {
    pub fn new(rules: Vec<Box<dyn VisibilityRule>>) -> Self {
        Self { rules }
    }

    /// The standard chain for carpool participant rosters.
    pub fn participants() -> Self {
        Self::new(vec![
            Box::new(SelfViewRule),
            Box::new(AnonymousTargetRule),
            Box::new(EventOwnerRule),
            Box::new(PublicEventRule),
            Box::new(AttendeeRule),
        ])
    }

    pub fn evaluate(&self, ctx: &ViewContext<'_>) -> Visibility {
        for rule in &self.rules {
            if let Some(decision) = rule.evaluate(ctx) {
                return decision;
            }
        }
        Visibility::Deny
    }

    pub fn allows(&self, ctx: &ViewContext<'_>) -> bool {
        self.evaluate(ctx) == Visibility::Allow
    }
}

impl Default for VisibilityChain {
    fn default() -> Self {
        Self::participants()
    }
}

/// The name a participant shows up under: their chosen anonymous handle (or
/// a generic fallback) when anonymous, their username otherwise.
pub fn display_name(user: &User, privacy: Option<&PrivacySettings>) -> String {
    match privacy {
        Some(settings) if settings.is_anonymous => settings
            .anonymous_name
            .clone()
            .unwrap_or_else(|| ANONYMOUS_FALLBACK_NAME.to_string()),
        _ => user.username.clone(),
    }
}
