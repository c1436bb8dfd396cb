use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::task;
use tower_http::cors::CorsLayer;

use carpool_core::model::{CarpoolPlan, EventId, UserId};
use carpool_core::privacy::{display_name, ViewContext, VisibilityChain};
use carpool_core::store::{EventStore, StoreError};

use super::error::AppError;
use super::state::AppState;

const UNKNOWN_USER_NAME: &str = "Unknown User";

/// Uniform response envelope: every successful endpoint answers `{ data }`.
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/carpool/routes/:event_id/:user_id", get(carpool_routes))
        .route(
            "/carpool/optimization/:event_id/:user_id",
            get(carpool_optimization),
        )
        .route("/carpool/cache/clear", post(cache_clear))
        .route(
            "/carpool/event/:event_id/participants",
            get(event_participants),
        )
        .route("/carpool/user/:user_id/display-name", get(user_display_name))
        .layer(cors)
        .with_state(state)
}

/// Ranked carpool plans for an event, requested by one of its attendees.
async fn carpool_routes(
    State(state): State<Arc<AppState>>,
    Path((event_id, user_id)): Path<(EventId, UserId)>,
) -> Result<Json<DataResponse<Vec<CarpoolPlan>>>, AppError> {
    let max_results = state.optimizer.config().max_results;
    let worker = state.clone();
    // The optimizer is synchronous (blocking routing calls), so it runs off
    // the async workers.
    let plans = task::spawn_blocking(move || {
        worker.optimizer.optimize(event_id, user_id, max_results)
    })
    .await??;
    Ok(Json(DataResponse { data: plans }))
}

/// The single best plan, or null when none exists.
async fn carpool_optimization(
    State(state): State<Arc<AppState>>,
    Path((event_id, user_id)): Path<(EventId, UserId)>,
) -> Result<Json<DataResponse<Option<CarpoolPlan>>>, AppError> {
    let worker = state.clone();
    let plan =
        task::spawn_blocking(move || worker.optimizer.optimal_route(event_id, user_id)).await??;
    Ok(Json(DataResponse { data: plan }))
}

/// Force a sweep of expired entries in every optimizer cache.
async fn cache_clear(
    State(state): State<Arc<AppState>>,
) -> Json<DataResponse<&'static str>> {
    state.optimizer.caches().sweep_all();
    Json(DataResponse { data: "swept" })
}

#[derive(Deserialize)]
struct ParticipantsQuery {
    viewer_id: UserId,
}

/// One visible roster entry.
#[derive(Debug, Serialize, PartialEq)]
pub struct ParticipantView {
    pub user_id: UserId,
    pub display_name: String,
}

/// The event's carpool roster, filtered through the visibility chain for
/// the given viewer.
async fn event_participants(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<EventId>,
    Query(query): Query<ParticipantsQuery>,
) -> Result<Json<DataResponse<Vec<ParticipantView>>>, AppError> {
    let roster = build_roster(
        state.store.as_ref(),
        &state.privacy,
        event_id,
        query.viewer_id,
    )?;
    Ok(Json(DataResponse { data: roster }))
}

/// Anonymous-aware display name for a user.
async fn user_display_name(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<DataResponse<String>>, AppError> {
    let name = match state.store.find_user(user_id)? {
        Some(user) => {
            let privacy = state.store.find_privacy(user_id)?;
            display_name(&user, privacy.as_ref())
        }
        None => UNKNOWN_USER_NAME.to_string(),
    };
    Ok(Json(DataResponse { data: name }))
}

fn build_roster(
    store: &dyn EventStore,
    chain: &VisibilityChain,
    event_id: EventId,
    viewer_id: UserId,
) -> Result<Vec<ParticipantView>, StoreError> {
    let Some(event) = store.find_event(event_id)? else {
        return Ok(Vec::new());
    };

    let attendance = store.list_attendees(event_id)?;
    let viewer_attended = attendance.iter().any(|record| record.user_id == viewer_id);

    let mut roster = Vec::new();
    for record in &attendance {
        let Some(user) = store.find_user(record.user_id)? else {
            continue;
        };
        let privacy = store.find_privacy(user.id)?;
        let ctx = ViewContext {
            viewer_id,
            target_user_id: user.id,
            event: &event,
            viewer_attended,
            target_privacy: privacy.as_ref(),
        };
        if chain.allows(&ctx) {
            roster.push(ParticipantView {
                user_id: user.id,
                display_name: display_name(&user, privacy.as_ref()),
            });
        }
    }
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carpool_core::model::{AttendanceRecord, Event, PrivacySettings, User};
    use carpool_core::store::InMemoryStore;

    fn roster_store(is_public: bool) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        store.insert_event(Event {
            id: 1,
            title: "Potluck".to_string(),
            coordinate: None,
            creator_id: 10,
            is_public,
        });
        for id in [10, 11, 12] {
            store.insert_user(User::new(id, format!("user{}", id), None));
            store.record_attendance(AttendanceRecord {
                user_id: id,
                event_id: 1,
                attended: true,
            });
        }
        store.set_privacy(PrivacySettings {
            user_id: 12,
            is_anonymous: true,
            anonymous_name: Some("Ghost".to_string()),
        });
        store
    }

    #[test]
    fn anonymous_participants_are_hidden_from_other_viewers() {
        let store = roster_store(true);
        let chain = VisibilityChain::participants();
        let roster = build_roster(&store, &chain, 1, 11).expect("store is healthy");

        let ids: Vec<UserId> = roster.iter().map(|p| p.user_id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn anonymous_participants_see_themselves() {
        let store = roster_store(true);
        let chain = VisibilityChain::participants();
        let roster = build_roster(&store, &chain, 1, 12).expect("store is healthy");

        assert!(roster.iter().any(|p| p.user_id == 12));
        let own = roster.iter().find(|p| p.user_id == 12).unwrap();
        assert_eq!(own.display_name, "Ghost");
    }

    #[test]
    fn private_event_roster_is_hidden_from_strangers() {
        let store = roster_store(false);
        let chain = VisibilityChain::participants();
        let roster = build_roster(&store, &chain, 1, 99).expect("store is healthy");
        assert!(roster.is_empty());
    }

    #[test]
    fn missing_event_yields_empty_roster() {
        let store = roster_store(true);
        let chain = VisibilityChain::participants();
        let roster = build_roster(&store, &chain, 42, 10).expect("store is healthy");
        assert!(roster.is_empty());
    }
}
