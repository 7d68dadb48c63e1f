use crate::errors::{AppError, BackendError};
use crate::format::{action_label, employee_name, status_badge};
use crate::models::{
    DetailQuery, NotificationDetail, NotificationRecord, NotificationView, NotificationsResponse,
};
use crate::reconcile::build_diff;
use crate::state::{AppState, Snapshot};
use crate::ui::{render_detail, render_index};
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Json,
};
use tracing::{error, info};

#[derive(Debug, Clone, Copy)]
enum Review {
    Approve,
    Decline,
    Delete,
}

impl Review {
    fn as_str(self) -> &'static str {
        match self {
            Review::Approve => "approve",
            Review::Decline => "decline",
            Review::Delete => "delete",
        }
    }
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.refresh().await;
    let views: Vec<NotificationView> = snapshot.notifications.into_iter().map(to_view).collect();
    Html(render_index(&views, state.user.as_deref()))
}

pub async fn detail_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DetailQuery>,
) -> Result<Html<String>, AppError> {
    let detail = find_detail(&state.store.snapshot(), id)?;
    Ok(Html(render_detail(
        &detail.view,
        detail.diff.as_deref(),
        query.error.as_deref(),
        state.user.as_deref(),
    )))
}

pub async fn approve_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    review_form(&state, id, Review::Approve).await
}

pub async fn decline_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    review_form(&state, id, Review::Decline).await
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    review_form(&state, id, Review::Delete).await
}

pub async fn list_notifications(State(state): State<AppState>) -> Json<NotificationsResponse> {
    Json(to_response(state.refresh().await))
}

pub async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationDetail>, AppError> {
    Ok(Json(find_detail(&state.store.snapshot(), id)?))
}

pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationsResponse>, AppError> {
    review_json(&state, id, Review::Approve).await
}

pub async fn decline(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationsResponse>, AppError> {
    review_json(&state, id, Review::Decline).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NotificationsResponse>, AppError> {
    review_json(&state, id, Review::Delete).await
}

/// Failed actions send the admin back to the detail view instead of the
/// list, so nothing looks resolved that is not.
async fn review_form(state: &AppState, id: i64, review: Review) -> Result<Redirect, AppError> {
    match apply_review(state, id, review).await {
        Ok(_) => Ok(Redirect::to("/")),
        Err(ReviewError::Rejected(err)) => Err(err),
        Err(ReviewError::Backend(err)) => {
            let message = err.to_string();
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("error", &message)
                .finish();
            Ok(Redirect::to(&format!("/notifications/{id}?{query}")))
        }
    }
}

async fn review_json(
    state: &AppState,
    id: i64,
    review: Review,
) -> Result<Json<NotificationsResponse>, AppError> {
    match apply_review(state, id, review).await {
        Ok(snapshot) => Ok(Json(to_response(snapshot))),
        Err(ReviewError::Rejected(err)) => Err(err),
        Err(ReviewError::Backend(err)) => Err(err.into()),
    }
}

enum ReviewError {
    Rejected(AppError),
    Backend(BackendError),
}

async fn apply_review(state: &AppState, id: i64, review: Review) -> Result<Snapshot, ReviewError> {
    let snapshot = state.store.snapshot();
    let record = snapshot
        .find(id)
        .ok_or_else(|| ReviewError::Rejected(not_found(id)))?;

    if !matches!(review, Review::Delete) && !record.is_reviewable() {
        return Err(ReviewError::Rejected(AppError::conflict(format!(
            "notification {id} is {} and cannot be {}d",
            record.status.as_str(),
            review.as_str()
        ))));
    }

    let result = match review {
        Review::Approve => state.backend.approve(id).await,
        Review::Decline => state.backend.decline(id).await,
        Review::Delete => state.backend.delete(id).await,
    };

    if let Err(err) = result {
        error!("failed to {} notification {id}: {err}", review.as_str());
        return Err(ReviewError::Backend(err));
    }

    info!("notification {id}: {}", review.as_str());
    Ok(state.refresh().await)
}

fn find_detail(snapshot: &Snapshot, id: i64) -> Result<NotificationDetail, AppError> {
    let record = snapshot.find(id).cloned().ok_or_else(|| not_found(id))?;
    let diff = build_diff(&record);
    Ok(NotificationDetail {
        view: to_view(record),
        diff,
    })
}

fn to_view(record: NotificationRecord) -> NotificationView {
    NotificationView {
        employee_name: employee_name(record.employee.as_ref()),
        action_label: action_label(&record.action),
        status_badge: status_badge(&record.status),
        reviewable: record.is_reviewable(),
        record,
    }
}

fn to_response(snapshot: Snapshot) -> NotificationsResponse {
    NotificationsResponse {
        notifications: snapshot.notifications.into_iter().map(to_view).collect(),
        fetched_at: snapshot.fetched_at,
    }
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("notification {id} not found"))
}
