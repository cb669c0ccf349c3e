use crate::error::ApiError;
use crate::interval::{Step, TimeSteps};
use crate::range::{epoch_millis, parse_range, RawRange};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::TimeZone;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::sync::Arc;
use tracing::debug;

/// Targets at or below this value are echoed back; above it each point is random.
pub const CONSTANT_TARGET_MAX: f64 = 50.0;
pub const RANDOM_VALUE_MAX: u32 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Target {
    Number(Number),
    Text(String),
}

impl Target {
    pub fn as_number(&self) -> Result<Number, ApiError> {
        match self {
            Target::Number(n) => Ok(n.clone()),
            Target::Text(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Number::from(i));
                }
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| ApiError::InvalidTarget(s.to_string()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub target: Target,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub range: RawRange,
    pub targets: Vec<TargetRequest>,
}

/// Serialized as `[value, epoch_millis]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint(pub Number, pub i64);

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub target: Target,
    pub datapoints: Vec<DataPoint>,
}

/// One datapoint per generated time point. Values above `CONSTANT_TARGET_MAX`
/// are replaced by an independent draw from `[0, RANDOM_VALUE_MAX]` per point.
pub fn datapoints<T, R>(points: &TimeSteps<T>, target: &Number, rng: &mut R) -> Vec<DataPoint>
where
    T: TimeZone,
    R: Rng + ?Sized,
{
    let constant = target
        .as_f64()
        .map_or(true, |t| t <= CONSTANT_TARGET_MAX);
    points
        .iter()
        .map(|t| {
            let value = if constant {
                target.clone()
            } else {
                Number::from(rng.gen_range(0..=RANDOM_VALUE_MAX))
            };
            DataPoint(value, epoch_millis(&t))
        })
        .collect()
}

fn respond(state: &AppState, req: QueryRequest) -> Result<QueryResponse, ApiError> {
    let range = parse_range(&req.range, state.timezone)?;
    // Only the first target is answered
    let target = req
        .targets
        .into_iter()
        .next()
        .ok_or(ApiError::MissingTarget)?
        .target;
    let value = target.as_number()?;

    let points = TimeSteps::new(range.from, range.to, Step::hours(1)?);
    points.check_limit(state.max_points)?;
    let datapoints = datapoints(&points, &value, &mut rand::thread_rng());
    debug!(
        "Generated {} datapoint(s) for target {}",
        datapoints.len(),
        value
    );
    Ok(QueryResponse { target, datapoints })
}

pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(req) = payload?;
    debug!("Received query request for range {:?}", req.range);
    respond(&state, req).map(Json)
}
