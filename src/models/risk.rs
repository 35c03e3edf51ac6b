use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const RISK_LEVEL_HIGH: &str = "HIGH";
pub const RISK_LEVEL_LOW: &str = "LOW";

pub const FALLBACK_ADVISORY: &str =
    "Analysis performed in degraded mode (risk predictor unavailable)";

const PREDICTOR_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize, Serialize)]
pub struct RiskReading {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub epi_compliance: Option<f64>,
    pub fatigue: Option<f64>,
    pub working_hours: Option<f64>,
    pub workers_count: Option<i32>,
    pub hazardous_materials: Option<bool>,
    pub weather_conditions: Option<String>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct RiskFeatures {
    pub temperature: f64,
    pub humidity: f64,
    pub epi_compliance: f64,
    pub fatigue: f64,
    pub working_hours: f64,
    pub workers_count: i32,
    pub hazardous_materials: bool,
    pub weather_conditions: String,
}
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RiskResult {
    #[serde(rename = "riskScore")]
    pub risk_score: i32,
    #[serde(rename = "riskLevel")]
    pub risk_level: String,
    pub recommendations: Vec<String>,
}

impl RiskReading {
    pub fn features(&self) -> RiskFeatures {
        RiskFeatures {
            temperature: self.temperature.unwrap_or(25.0),
            humidity: self.humidity.unwrap_or(50.0),
            epi_compliance: self.epi_compliance.unwrap_or(100.0),
            fatigue: self.fatigue.unwrap_or(3.0),
            working_hours: self.working_hours.unwrap_or(8.0),
            workers_count: self.workers_count.unwrap_or(10),
            hazardous_materials: self.hazardous_materials.unwrap_or(false),
            weather_conditions: match &self.weather_conditions {
                Some(weather_conditions) => weather_conditions.clone(),
                None => String::from("normal"),
            },
        }
    }
    pub async fn analyze(&self, predictor_url: &str) -> RiskResult {
        let features: RiskFeatures = self.features();

        info!("Sending risk analysis request to {predictor_url}/predict: {features:?}");

        match self.predict(predictor_url, &features).await {
            Ok(result) => {
                info!("Received risk analysis response: {result:?}");
                result
            }
            Err(error) => {
                error!("Error calling risk predictor: {error}");
                warn!("Risk predictor unavailable, calculating risk locally");
                estimate_local(self.epi_compliance, self.fatigue)
            }
        }
    }
    async fn predict(
        &self,
        predictor_url: &str,
        features: &RiskFeatures,
    ) -> Result<RiskResult, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(PREDICTOR_TIMEOUT)
            .build()?;

        client
            .post(format!("{predictor_url}/predict"))
            .json(features)
            .send()
            .await?
            .error_for_status()?
            .json::<RiskResult>()
            .await
    }
}

pub fn estimate_local(epi_compliance: Option<f64>, fatigue: Option<f64>) -> RiskResult {
    let violation = matches!(epi_compliance, Some(epi_compliance) if epi_compliance < 85.0)
        || matches!(fatigue, Some(fatigue) if fatigue > 6.0);

    if violation {
        RiskResult {
            risk_score: 75,
            risk_level: RISK_LEVEL_HIGH.to_string(),
            recommendations: vec![FALLBACK_ADVISORY.to_string()],
        }
    } else {
        RiskResult {
            risk_score: 25,
            risk_level: RISK_LEVEL_LOW.to_string(),
            recommendations: vec![FALLBACK_ADVISORY.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn empty_reading() -> RiskReading {
        RiskReading {
            temperature: None,
            humidity: None,
            epi_compliance: None,
            fatigue: None,
            working_hours: None,
            workers_count: None,
            hazardous_materials: None,
            weather_conditions: None,
        }
    }

    #[test]
    fn features_substitute_defaults_for_missing_fields() {
        let features = empty_reading().features();

        assert_eq!(features.temperature, 25.0);
        assert_eq!(features.humidity, 50.0);
        assert_eq!(features.epi_compliance, 100.0);
        assert_eq!(features.fatigue, 3.0);
        assert_eq!(features.working_hours, 8.0);
        assert_eq!(features.workers_count, 10);
        assert!(!features.hazardous_materials);
        assert_eq!(features.weather_conditions, "normal");
    }
    #[test]
    fn features_keep_provided_values() {
        let reading = RiskReading {
            temperature: Some(38.5),
            humidity: Some(20.0),
            epi_compliance: Some(60.0),
            fatigue: Some(9.0),
            working_hours: Some(12.0),
            workers_count: Some(42),
            hazardous_materials: Some(true),
            weather_conditions: Some("storm".to_string()),
        };
        let features = reading.features();

        assert_eq!(features.temperature, 38.5);
        assert_eq!(features.epi_compliance, 60.0);
        assert_eq!(features.fatigue, 9.0);
        assert_eq!(features.workers_count, 42);
        assert!(features.hazardous_materials);
        assert_eq!(features.weather_conditions, "storm");
    }
    #[test]
    fn features_serialize_with_snake_case_keys() {
        let value = serde_json::to_value(empty_reading().features()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "temperature",
            "humidity",
            "epi_compliance",
            "fatigue",
            "working_hours",
            "workers_count",
            "hazardous_materials",
            "weather_conditions",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 8);
    }
    #[test]
    fn risk_result_deserializes_from_predictor_payload() {
        let result: RiskResult = serde_json::from_value(json!({
            "riskScore": 70,
            "riskLevel": "HIGH",
            "recommendations": ["wear helmets", "rotate teams"]
        }))
        .unwrap();

        assert_eq!(result.risk_score, 70);
        assert_eq!(result.risk_level, "HIGH");
        assert_eq!(result.recommendations.len(), 2);
    }

    #[test]
    fn low_epi_compliance_triggers_high_risk() {
        let result = estimate_local(Some(80.0), Some(3.0));

        assert_eq!(result.risk_score, 75);
        assert_eq!(result.risk_level, RISK_LEVEL_HIGH);
        assert_eq!(result.recommendations, vec![FALLBACK_ADVISORY.to_string()]);
    }
    #[test]
    fn high_fatigue_triggers_high_risk() {
        let result = estimate_local(Some(90.0), Some(7.0));

        assert_eq!(result.risk_score, 75);
        assert_eq!(result.risk_level, RISK_LEVEL_HIGH);
    }
    #[test]
    fn compliant_reading_is_low_risk() {
        let result = estimate_local(Some(95.0), Some(2.0));

        assert_eq!(result.risk_score, 25);
        assert_eq!(result.risk_level, RISK_LEVEL_LOW);
        assert_eq!(result.recommendations, vec![FALLBACK_ADVISORY.to_string()]);
    }
    #[test]
    fn absent_values_never_trigger_high_risk() {
        let result = estimate_local(None, None);

        assert_eq!(result.risk_score, 25);
        assert_eq!(result.risk_level, RISK_LEVEL_LOW);
    }
    #[test]
    fn boundary_values_are_low_risk() {
        let result = estimate_local(Some(85.0), Some(6.0));

        assert_eq!(result.risk_score, 25);
        assert_eq!(result.risk_level, RISK_LEVEL_LOW);
    }

    #[actix_web::test]
    async fn analyze_returns_predictor_result_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_json(json!({
                "temperature": 25.0,
                "humidity": 50.0,
                "epi_compliance": 100.0,
                "fatigue": 3.0,
                "working_hours": 8.0,
                "workers_count": 10,
                "hazardous_materials": false,
                "weather_conditions": "normal"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "riskScore": 110,
                "riskLevel": "ÉLEVÉ",
                "recommendations": ["a", "b"]
            })))
            .mount(&server)
            .await;

        let result = empty_reading().analyze(&server.uri()).await;

        // Trusted verbatim, even out-of-range scores and foreign labels
        assert_eq!(result.risk_score, 110);
        assert_eq!(result.risk_level, "ÉLEVÉ");
        assert_eq!(result.recommendations, vec!["a".to_string(), "b".to_string()]);
    }
    #[actix_web::test]
    async fn analyze_falls_back_on_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reading = RiskReading {
            epi_compliance: Some(80.0),
            fatigue: Some(2.0),
            ..empty_reading()
        };
        let result = reading.analyze(&server.uri()).await;

        assert_eq!(result, estimate_local(Some(80.0), Some(2.0)));
        assert_eq!(result.risk_level, RISK_LEVEL_HIGH);
    }
    #[actix_web::test]
    async fn analyze_falls_back_on_malformed_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = empty_reading().analyze(&server.uri()).await;

        assert_eq!(result, estimate_local(None, None));
    }
    #[actix_web::test]
    async fn analyze_falls_back_when_predictor_is_unreachable() {
        let result = empty_reading().analyze("http://127.0.0.1:9").await;

        assert_eq!(result.risk_score, 25);
        assert_eq!(result.risk_level, RISK_LEVEL_LOW);
        assert_eq!(result.recommendations, vec![FALLBACK_ADVISORY.to_string()]);
    }
}
