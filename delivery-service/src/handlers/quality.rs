/// Quality recommendation endpoint
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::{QualityRecommendationRequest, QualityRecommendations};
use crate::services::abr::{recommend, RecommendationScorer};

/// POST /quality/recommend
pub async fn recommend_quality(
    body: web::Json<QualityRecommendationRequest>,
    scorer: web::Data<Arc<dyn RecommendationScorer>>,
) -> Result<HttpResponse> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let recommendation = recommend(
        body.bandwidth_estimate_bps,
        body.buffer_level_seconds,
        scorer.get_ref().as_ref(),
    );

    Ok(HttpResponse::Ok().json(QualityRecommendations {
        recommended_quality: recommendation.quality,
        alternatives: recommendation.alternatives,
        confidence: recommendation.confidence,
        reason_code: recommendation.reason_code,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    use crate::services::abr::DefaultScorer;

    #[actix_web::test]
    async fn test_recommend_endpoint() {
        let scorer: Arc<dyn RecommendationScorer> = Arc::new(DefaultScorer);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(scorer))
                .route("/quality/recommend", web::post().to(recommend_quality)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/quality/recommend")
            .set_json(serde_json::json!({
                "bandwidth_estimate_bps": 3_000_000u64,
                "buffer_level_seconds": 30.0
            }))
            .to_request();

        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["recommended_quality"], "720p");
        assert_eq!(body["reason_code"], "bandwidth_buffer_heuristic");
        assert_eq!(
            body["alternatives"],
            serde_json::json!(["360p", "480p", "720p", "1080p"])
        );
    }

    #[actix_web::test]
    async fn test_empty_session_id_is_rejected() {
        let scorer: Arc<dyn RecommendationScorer> = Arc::new(DefaultScorer);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(scorer))
                .route("/quality/recommend", web::post().to(recommend_quality)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/quality/recommend")
            .set_json(serde_json::json!({
                "session_id": "",
                "bandwidth_estimate_bps": 3_000_000u64,
                "buffer_level_seconds": 30.0
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
