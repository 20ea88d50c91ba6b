//! Derived bootcamp fields, recomputed after course and review writes

use crate::core::{ApiResult, FilterClause, StoreQuery};
use crate::server::state::AppState;
use uuid::Uuid;

/// Mean tuition rounded up to the next multiple of ten
pub fn average_cost(tuitions: &[f64]) -> Option<f64> {
    if tuitions.is_empty() {
        return None;
    }
    let mean = tuitions.iter().sum::<f64>() / tuitions.len() as f64;
    Some((mean / 10.0).ceil() * 10.0)
}

pub fn average_rating(ratings: &[u8]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: f64 = ratings.iter().map(|r| f64::from(*r)).sum();
    Some(sum / ratings.len() as f64)
}

/// Recompute `averageCost` from the bootcamp's current courses.
///
/// A bootcamp that no longer exists is skipped.
pub async fn refresh_average_cost(state: &AppState, bootcamp_id: Uuid) -> ApiResult<()> {
    let courses = state
        .courses
        .find(&StoreQuery::filtered(vec![FilterClause::eq("bootcamp", bootcamp_id)]))
        .await?;
    let tuitions: Vec<f64> = courses.iter().map(|c| c.tuition).collect();

    let Some(mut bootcamp) = state.bootcamps.get(&bootcamp_id).await? else {
        return Ok(());
    };
    bootcamp.average_cost = average_cost(&tuitions);
    tracing::debug!(%bootcamp_id, average_cost = ?bootcamp.average_cost, "average cost refreshed");
    state.bootcamps.update(&bootcamp_id, bootcamp).await?;
    Ok(())
}

/// Recompute `averageRating` from the bootcamp's current reviews
pub async fn refresh_average_rating(state: &AppState, bootcamp_id: Uuid) -> ApiResult<()> {
    let reviews = state
        .reviews
        .find(&StoreQuery::filtered(vec![FilterClause::eq("bootcamp", bootcamp_id)]))
        .await?;
    let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();

    let Some(mut bootcamp) = state.bootcamps.get(&bootcamp_id).await? else {
        return Ok(());
    };
    bootcamp.average_rating = average_rating(&ratings);
    tracing::debug!(%bootcamp_id, average_rating = ?bootcamp.average_rating, "average rating refreshed");
    state.bootcamps.update(&bootcamp_id, bootcamp).await?;
    Ok(())
}
