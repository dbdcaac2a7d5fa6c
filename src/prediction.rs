//! Read-only station and prediction lookups.
//!
//! One request per call; no retry and no caching. The prediction payload is
//! computed by the backend and returned exactly as received.

#[cfg(test)]
#[path = "prediction_test.rs"]
mod prediction_test;

use crate::error::ApiError;
use crate::http::ApiHttp;
use crate::model::{Prediction, Station};

#[derive(Clone, Debug)]
pub struct PredictionClient {
    http: ApiHttp,
}

impl PredictionClient {
    #[must_use]
    pub fn new(http: ApiHttp) -> Self {
        Self { http }
    }

    /// Fetch the prediction for `station_id`, `minutes_ahead` from now
    /// (`GET /predict?stationId&minutesAhead`).
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error without sending anything when
    /// `station_id` is zero, otherwise the normalized `ApiError`.
    pub async fn get_prediction(&self, station_id: u64, minutes_ahead: u32) -> Result<Prediction, ApiError> {
        if station_id == 0 {
            return Err(ApiError::validation("Station id must be a positive number."));
        }
        let query = [
            ("stationId", station_id.to_string()),
            ("minutesAhead", minutes_ahead.to_string()),
        ];
        let prediction: Prediction = self.http.get_json("/predict", &query).await?;
        tracing::debug!(station_id, minutes_ahead, "prediction received");
        Ok(prediction)
    }

    /// List stations in route order (ascending id), `GET /stations`.
    ///
    /// # Errors
    ///
    /// Returns the normalized `ApiError` on any failure.
    pub async fn stations(&self) -> Result<Vec<Station>, ApiError> {
        let mut stations: Vec<Station> = self.http.get_json("/stations", &[]).await?;
        stations.sort_by_key(|s| s.id);
        Ok(stations)
    }
}
