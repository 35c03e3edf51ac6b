use crate::database::get_db;
use futures::stream::StreamExt;
use mongodb::{
    bson::{doc, from_document, oid::ObjectId, to_bson},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use super::{observation::Observation, project::Project};

#[derive(Debug, Deserialize, Serialize)]
pub struct Site {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub project_id: ObjectId,
    pub name: String,
    pub kind: Option<String>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct SiteRequest {
    pub name: String,
    pub kind: Option<String>,
}
#[derive(Debug)]
pub struct SiteQuery {
    pub project_id: Option<ObjectId>,
    pub limit: Option<usize>,
}
#[derive(Debug, Deserialize, Serialize)]
pub struct SiteResponse {
    pub _id: String,
    pub project_id: String,
    pub project_name: String,
    pub name: String,
    pub kind: Option<String>,
}

impl Site {
    pub async fn save(&mut self) -> Result<ObjectId, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        self._id = Some(ObjectId::new());

        if let Ok(Some(_)) = Project::find_by_id(&self.project_id).await {
            collection
                .insert_one(&*self, None)
                .await
                .map_err(|_| "INSERTING_FAILED".to_string())
                .map(|result| result.inserted_id.as_object_id().unwrap())
        } else {
            Err("PROJECT_NOT_FOUND".to_string())
        }
    }
    pub async fn update(&self) -> Result<ObjectId, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        collection
            .update_one(
                doc! { "_id": self._id.unwrap() },
                doc! { "$set": to_bson::<Site>(self).unwrap() },
                None,
            )
            .await
            .map_err(|_| "UPDATE_FAILED".to_string())
            .map(|_| self._id.unwrap())
    }
    pub async fn find_by_id(_id: &ObjectId) -> Result<Option<Site>, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        collection
            .find_one(doc! { "_id": _id }, None)
            .await
            .map_err(|_| "SITE_NOT_FOUND".to_string())
    }
    pub async fn find_detail_by_id(_id: &ObjectId) -> Result<Option<SiteResponse>, String> {
        let site: Site = match Site::find_by_id(_id).await? {
            Some(site) => site,
            None => return Ok(None),
        };
        let project: Project = match Project::find_by_id(&site.project_id).await? {
            Some(project) => project,
            None => return Err("PROJECT_NOT_FOUND".to_string()),
        };

        Ok(Some(SiteResponse {
            _id: site._id.unwrap().to_string(),
            project_id: site.project_id.to_string(),
            project_name: project.name,
            name: site.name,
            kind: site.kind,
        }))
    }
    pub async fn find_many(query: &SiteQuery) -> Result<Vec<SiteResponse>, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        let mut pipeline: Vec<mongodb::bson::Document> = Vec::new();
        let mut sites: Vec<SiteResponse> = Vec::new();

        if let Some(project_id) = query.project_id {
            pipeline.push(doc! {
                "$match": {
                    "project_id": project_id
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
                "from": "projects",
                "localField": "project_id",
                "foreignField": "_id",
                "as": "project"
            }
        });
        pipeline.push(doc! {
            "$unwind": "$project"
        });
        pipeline.push(doc! {
            "$project": {
                "_id": {
                    "$toString": "$_id"
                },
                "project_id": {
                    "$toString": "$project_id"
                },
                "project_name": "$project.name",
                "name": "$name",
                "kind": "$kind",
            }
        });

        if let Ok(mut cursor) = collection.aggregate(pipeline, None).await {
            while let Some(Ok(doc)) = cursor.next().await {
                let site: SiteResponse = from_document::<SiteResponse>(doc).unwrap();
                sites.push(site);
            }
            Ok(sites)
        } else {
            Err("SITE_NOT_FOUND".to_string())
        }
    }
    pub async fn delete_by_id(_id: &ObjectId) -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        // Observations are owned by their site and go with it
        Observation::delete_by_site_id(_id).await?;

        collection
            .delete_one(doc! { "_id": _id }, None)
            .await
            .map_err(|_| "DELETING_FAILED".to_string())
            .map(|result| result.deleted_count)
    }
    pub async fn delete_by_project_id(project_id: &ObjectId) -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        let mut deleted: u64 = 0;

        if let Ok(mut cursor) = collection
            .find(doc! { "project_id": project_id }, None)
            .await
        {
            while let Some(Ok(site)) = cursor.next().await {
                deleted += Site::delete_by_id(&site._id.unwrap()).await?;
            }
            Ok(deleted)
        } else {
            Err("DELETING_FAILED".to_string())
        }
    }
    pub async fn count() -> Result<u64, String> {
        let db: Database = get_db();
        let collection: Collection<Site> = db.collection::<Site>("sites");

        collection
            .count_documents(doc! {}, None)
            .await
            .map_err(|_| "COUNTING_FAILED".to_string())
    }
}
