use crate::database::get_db;
use futures::stream::StreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::site::{Site, SiteQuery, SiteResponse};

#[derive(Debug, Deserialize, Serialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub name: String,
    pub location: Option<String>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct ProjectRequest {
    pub name: String,
    pub location: Option<String>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct ProjectResponse {
    pub _id: String,
    pub name: String,
    pub location: Option<String>,
    pub sites: Vec<SiteResponse>,
}

impl Project {
    pub async fn save(&mut self) -> Result<ObjectId, String> {
        let db: Database = get_db();
        let collection: Collection<Project> = db.collection::<Project>("projects");

        self._id = Some(ObjectId::new());

        collection
            .insert_one(&*self, None)
            .await
            .map_err(|_| "INSERTING_FAILED".to_string())
            .map(|result| result.inserted_id.as_object_id().unwrap())
    }
    pub async fn find_by_id(_id: &ObjectId) -> Result<Option<Project>, String> {
        let db: Database = get_db();
        let collection: Collection<Project> = db.collection::<Project>("projects");

        collection
            .find_one(doc! { "_id": _id }, None)
            .await
            .map_err(|_| "PROJECT_NOT_FOUND".to_string())
    }
    pub async fn find_detail_by_id(_id: &ObjectId) -> Result<Option<ProjectResponse>, String> {
        let project: Project = match Project::find_by_id(_id).await? {
            Some(project) => project,
            None => return Ok(None),
        };

        Ok(Some(project.to_response().await?))
    }
    pub async fn find_many() -> Result<Vec<ProjectResponse>, String> {
        let db: Database = get_db();
        let collection: Collection<Project> = db.collection::<Project>("projects");

        let mut projects: Vec<ProjectResponse> = Vec::new();

        if let Ok(mut cursor) = collection.find(doc! {}, None).await {
            while let Some(Ok(project)) = cursor.next().await {
                projects.push(project.to_response().await?);
            }
            Ok(projects)
        } else {
            Err("PROJECT_NOT_FOUND".to_string())
        }
    }
    pub async fn delete_by_id(_id: &ObjectId) -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Project> = db.collection::<Project>("projects");

        // Sites (and their observations) are owned by the project
        Site::delete_by_project_id(_id).await?;

        collection
            .delete_one(doc! { "_id": _id }, None)
            .await
            .map_err(|_| "DELETING_FAILED".to_string())
            .map(|result| result.deleted_count)
    }
    pub async fn count() -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Project> = db.collection::<Project>("projects");

        collection
            .count_documents(doc! {}, None)
            .await
            .map_err(|_| "COUNTING_FAILED".to_string())
    }
    async fn to_response(&self) -> Result<ProjectResponse, String> {
        let sites: Vec<SiteResponse> = Site::find_many(&SiteQuery {
            project_id: self._id,
            limit: None,
        })
        .await?;

        Ok(ProjectResponse {
            _id: self._id.unwrap().to_string(),
            name: self.name.clone(),
            location: self.location.clone(),
            sites,
        })
    }
}
