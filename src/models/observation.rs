use crate::database::get_db;
use futures::stream::StreamExt;
use mongodb::{
    bson::{doc, from_document, oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::risk::{RiskReading, RiskResult, RISK_LEVEL_HIGH};
use super::site::Site;

// Recommendations are persisted as a single delimited string, carried over from
// the data format of the previous relational store. The separator must never
// appear in recommendation text.
pub const RECOMMENDATION_SEPARATOR: &str = "|||";

// Legacy rows written by the previous system carry French labels.
pub const ALERT_RISK_LEVELS: [&str; 2] = [RISK_LEVEL_HIGH, "ÉLEVÉ"];

#[derive(Debug, Deserialize, Serialize)]
pub struct Observation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub site_id: ObjectId,
    pub created_by: Option<ObjectId>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub epi_compliance: Option<f64>,
    pub fatigue: Option<f64>,
    pub working_hours: Option<f64>,
    pub workers_count: Option<i32>,
    pub hazardous_materials: Option<bool>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
    pub risk_score: i32,
    pub risk_level: String,
    pub recommendations: String,
    pub created_at: DateTime,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct ObservationRequest {
    pub site_id: ObjectId,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub epi_compliance: Option<f64>,
    pub fatigue: Option<f64>,
    pub working_hours: Option<f64>,
    pub workers_count: Option<i32>,
    pub hazardous_materials: Option<bool>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
}
#[derive(Debug)]
pub struct ObservationQuery {
    pub site_id: Option<ObjectId>,
    pub limit: Option<usize>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct ObservationResponse {
    pub _id: String,
    pub site_id: String,
    pub site_name: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub epi_compliance: Option<f64>,
    pub fatigue: Option<f64>,
    pub working_hours: Option<f64>,
    pub workers_count: Option<i32>,
    pub hazardous_materials: Option<bool>,
    pub weather_conditions: Option<String>,
    pub notes: Option<String>,
    pub risk_score: i32,
    pub risk_level: String,
    pub recommendations: Vec<String>,
    pub created_at: String,
}

pub fn join_recommendations(recommendations: &[String]) -> String {
    recommendations.join(RECOMMENDATION_SEPARATOR)
}
pub fn split_recommendations(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        Vec::new()
    } else {
        stored
            .split(RECOMMENDATION_SEPARATOR)
            .map(String::from)
            .collect()
    }
}

impl Observation {
    pub async fn create(
        request: ObservationRequest,
        created_by: Option<ObjectId>,
    ) -> Result<ObservationResponse, String> {
        let site: Site = match Site::find_by_id(&request.site_id).await? {
            Some(site) => site,
            None => return Err("SITE_NOT_FOUND".to_string()),
        };

        let predictor_url: String = std::env::var("ML_SERVICE_URL")
            .unwrap_or_else(|_| String::from("http://localhost:8000"));
        let reading: RiskReading = RiskReading {
            temperature: request.temperature,
            humidity: request.humidity,
            epi_compliance: request.epi_compliance,
            fatigue: request.fatigue,
            working_hours: request.working_hours,
            workers_count: request.workers_count,
            hazardous_materials: request.hazardous_materials,
            weather_conditions: request.weather_conditions.clone(),
        };
        let result: RiskResult = reading.analyze(&predictor_url).await;

        let mut observation: Observation = Observation {
            _id: None,
            site_id: request.site_id,
            created_by,
            temperature: request.temperature,
            humidity: request.humidity,
            epi_compliance: request.epi_compliance,
            fatigue: request.fatigue,
            working_hours: request.working_hours,
            workers_count: request.workers_count,
            hazardous_materials: request.hazardous_materials,
            weather_conditions: request.weather_conditions,
            notes: request.notes,
            risk_score: result.risk_score,
            risk_level: result.risk_level,
            recommendations: join_recommendations(&result.recommendations),
            created_at: DateTime::now(),
        };
        observation.save().await?;

        Ok(observation.to_response(site.name))
    }
    pub async fn save(&mut self) -> Result<ObjectId, String> {
        let db: Database = get_db();
        let collection: Collection<Observation> = db.collection::<Observation>("observations");

        self._id = Some(ObjectId::new());

        collection
            .insert_one(&*self, None)
            .await
            .map_err(|_| "INSERTING_FAILED".to_string())
            .map(|result| result.inserted_id.as_object_id().unwrap())
    }
    pub async fn find_by_id(_id: &ObjectId) -> Result<Option<Observation>, String> {
        let db: Database = get_db();
        let collection: Collection<Observation> = db.collection::<Observation>("observations");

        collection
            .find_one(doc! { "_id": _id }, None)
            .await
            .map_err(|_| "OBSERVATION_NOT_FOUND".to_string())
    }
    pub async fn find_detail_by_id(_id: &ObjectId) -> Result<Option<ObservationResponse>, String> {
        let observation: Observation = match Observation::find_by_id(_id).await? {
            Some(observation) => observation,
            None => return Ok(None),
        };
        let site: Site = match Site::find_by_id(&observation.site_id).await? {
            Some(site) => site,
            None => return Err("SITE_NOT_FOUND".to_string()),
        };

        Ok(Some(observation.to_response(site.name)))
    }
    pub async fn find_many(query: &ObservationQuery) -> Result<Vec<ObservationResponse>, String> {
        let db: Database = get_db();
        let collection: Collection<Observation> = db.collection::<Observation>("observations");

        let mut pipeline: Vec<mongodb::bson::Document> = Vec::new();
        let mut observations: Vec<ObservationResponse> = Vec::new();

        if let Some(site_id) = query.site_id {
            pipeline.push(doc! {
                "$match": {
                    "site_id": site_id
                }
            })
        }
        if let Some(limit) = query.limit {
            pipeline.push(doc! {
                "$limit": limit as i64
            })
        }

        pipeline.push(doc! {
            "$lookup": {
                "from": "sites",
                "localField": "site_id",
                "foreignField": "_id",
                "as": "site"
            }
        });
        pipeline.push(doc! {
            "$unwind": "$site"
        });
        pipeline.push(doc! {
            "$project": {
                "_id": {
                    "$toString": "$_id"
                },
                "site_id": {
                    "$toString": "$site_id"
                },
                "site_name": "$site.name",
                "temperature": "$temperature",
                "humidity": "$humidity",
                "epi_compliance": "$epi_compliance",
                "fatigue": "$fatigue",
                "working_hours": "$working_hours",
                "workers_count": "$workers_count",
                "hazardous_materials": "$hazardous_materials",
                "weather_conditions": "$weather_conditions",
                "notes": "$notes",
                "risk_score": "$risk_score",
                "risk_level": "$risk_level",
                "recommendations": {
                    "$cond": [
                        { "$eq": ["$recommendations", ""] },
                        [],
                        { "$split": ["$recommendations", RECOMMENDATION_SEPARATOR] }
                    ]
                },
                "created_at": {
                    "$toString": "$created_at"
                },
            }
        });

        if let Ok(mut cursor) = collection.aggregate(pipeline, None).await {
            while let Some(Ok(doc)) = cursor.next().await {
                let observation: ObservationResponse =
                    from_document::<ObservationResponse>(doc).unwrap();
                observations.push(observation);
            }
            Ok(observations)
        } else {
            Err("OBSERVATION_NOT_FOUND".to_string())
        }
    }
    pub async fn delete_by_site_id(site_id: &ObjectId) -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Observation> = db.collection::<Observation>("observations");

        collection
            .delete_many(doc! { "site_id": site_id }, None)
            .await
            .map_err(|_| "DELETING_FAILED".to_string())
            .map(|result| result.deleted_count)
    }
    pub async fn count() -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Observation> = db.collection::<Observation>("observations");

        collection
            .count_documents(doc! {}, None)
            .await
            .map_err(|_| "COUNTING_FAILED".to_string())
    }
    pub async fn count_alerts() -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Observation> = db.collection::<Observation>("observations");

        collection
            .count_documents(
                doc! { "risk_level": { "$in": ALERT_RISK_LEVELS.to_vec() } },
                None,
            )
            .await
            .map_err(|_| "COUNTING_FAILED".to_string())
    }
    pub fn to_response(&self, site_name: String) -> ObservationResponse {
        ObservationResponse {
            _id: self._id.unwrap().to_string(),
            site_id: self.site_id.to_string(),
            site_name,
            temperature: self.temperature,
            humidity: self.humidity,
            epi_compliance: self.epi_compliance,
            fatigue: self.fatigue,
            working_hours: self.working_hours,
            workers_count: self.workers_count,
            hazardous_materials: self.hazardous_materials,
            weather_conditions: self.weather_conditions.clone(),
            notes: self.notes.clone(),
            risk_score: self.risk_score,
            risk_level: self.risk_level.clone(),
            recommendations: split_recommendations(&self.recommendations),
            created_at: self
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendations_round_trip_preserves_order() {
        let recommendations = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let stored = join_recommendations(&recommendations);

        assert_eq!(stored, "a|||b|||c");
        assert_eq!(split_recommendations(&stored), recommendations);
    }
    #[test]
    fn empty_stored_string_yields_empty_sequence() {
        assert_eq!(split_recommendations(""), Vec::<String>::new());
    }
    #[test]
    fn no_recommendations_store_as_empty_string() {
        assert_eq!(join_recommendations(&[]), "");
    }
    #[test]
    fn single_recommendation_needs_no_separator() {
        let recommendations = vec!["wear a helmet".to_string()];
        let stored = join_recommendations(&recommendations);

        assert_eq!(stored, "wear a helmet");
        assert_eq!(split_recommendations(&stored), recommendations);
    }
    #[test]
    fn recommendations_containing_pipes_survive_the_round_trip() {
        let recommendations = vec!["a | b".to_string(), "c || d".to_string()];
        let stored = join_recommendations(&recommendations);

        assert_eq!(split_recommendations(&stored), recommendations);
    }
    #[test]
    fn observation_view_splits_stored_recommendations() {
        let observation = Observation {
            _id: Some(ObjectId::new()),
            site_id: ObjectId::new(),
            created_by: None,
            temperature: Some(30.0),
            humidity: None,
            epi_compliance: Some(90.0),
            fatigue: Some(4.0),
            working_hours: None,
            workers_count: Some(12),
            hazardous_materials: Some(false),
            weather_conditions: Some("clear".to_string()),
            notes: None,
            risk_score: 25,
            risk_level: "LOW".to_string(),
            recommendations: "a|||b".to_string(),
            created_at: DateTime::now(),
        };

        let response = observation.to_response("Tunnel North".to_string());

        assert_eq!(response.site_name, "Tunnel North");
        assert_eq!(response.recommendations, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(response.risk_level, "LOW");
        assert_eq!(response.site_id, observation.site_id.to_string());
    }
}
