use crate::error::ApiError;
use crate::interval::{Step, TimeSteps};
use crate::range::{epoch_millis, parse_range, RawRange};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Hour count carried in `annotation.query`; the frontend may send it as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HourCount {
    Int(i64),
    Text(String),
}

impl HourCount {
    pub fn step(&self) -> Result<Step, ApiError> {
        let hours = match self {
            HourCount::Int(n) => *n,
            HourCount::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ApiError::InvalidStep(s.clone()))?,
        };
        Step::hours(hours)
    }
}

#[derive(Debug, Deserialize)]
pub struct AnnotationQuery {
    pub query: HourCount,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationRequest {
    pub annotation: AnnotationQuery,
    pub range: RawRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationInfo {
    pub name: String,
    pub enabled: bool,
    pub datasource: String,
    pub show_line: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRecord {
    pub annotation: AnnotationInfo,
    pub title: String,
    pub time: i64,
    pub text: String,
}

/// One record per generated point, titled with the point's local hour.
pub fn annotations<T: TimeZone>(
    points: &TimeSteps<T>,
    datasource: &str,
    text: &str,
) -> Vec<AnnotationRecord> {
    let info = AnnotationInfo {
        name: points.step().name(),
        enabled: true,
        datasource: datasource.to_string(),
        show_line: true,
    };
    points
        .iter()
        .map(|t| AnnotationRecord {
            annotation: info.clone(),
            title: format!("H {}", t.hour()),
            time: epoch_millis(&t),
            text: text.to_string(),
        })
        .collect()
}

fn respond(state: &AppState, req: AnnotationRequest) -> Result<Vec<AnnotationRecord>, ApiError> {
    let range = parse_range(&req.range, state.timezone)?;
    let step = req.annotation.query.step()?;
    let points = TimeSteps::new(range.from, range.to, step);
    points.check_limit(state.max_points)?;
    let records = annotations(
        &points,
        &state.annotation_datasource,
        &state.annotation_text,
    );
    debug!("Generated {} annotation(s) every {}", records.len(), step.name());
    Ok(records)
}

pub async fn annotations_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnnotationRequest>, JsonRejection>,
) -> Result<Json<Vec<AnnotationRecord>>, ApiError> {
    let Json(req) = payload?;
    debug!("Received annotations request for range {:?}", req.range);
    respond(&state, req).map(Json)
}
