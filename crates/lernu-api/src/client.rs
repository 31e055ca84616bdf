use std::time::Duration;

use lernu_types::{
    Language, Learner, Lesson, LessonProgress, ProgressStatus, QuestionDto, UnitResources,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{ApiError, MediaSource};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { base_url, client })
    }

    pub async fn languages(&self) -> Result<Vec<Language>, ApiError> {
        self.get_json("/api/languages").await
    }

    pub async fn lessons(&self, language: &str) -> Result<Vec<Lesson>, ApiError> {
        self.get_json(&format!("/api/lessons?language={language}"))
            .await
    }

    pub async fn learner_by_uid(&self, uid: &str) -> Result<Learner, ApiError> {
        self.get_json(&format!("/api/language-learners/uid/{uid}"))
            .await
    }

    /// Progress records for one learner and language. A 404 means the learner
    /// has not started anything yet and reads as an empty list.
    pub async fn progress(
        &self,
        uid: &str,
        language: &str,
    ) -> Result<Vec<LessonProgress>, ApiError> {
        let response = self
            .client
            .get(format!(
                "{}/api/language-learners/{uid}/progress/{language}",
                self.base_url
            ))
            .send()
            .await?;

        if response.status() == 404 {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(ApiError::Api(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    pub async fn post_progress(
        &self,
        uid: &str,
        lesson_id: &str,
        language: &str,
        status: ProgressStatus,
    ) -> Result<LessonProgress, ApiError> {
        self.post_json(
            &format!("/api/language-learners/{uid}/progress"),
            &ProgressBody {
                lesson_id,
                language,
                status,
            },
        )
        .await
    }

    pub async fn increment_points(
        &self,
        uid: &str,
        points: i64,
        lesson_id: &str,
        streak: Option<u32>,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(format!(
                "{}/api/language-learners/{uid}/increment-points",
                self.base_url
            ))
            .json(&PointsBody {
                points,
                lesson_id,
                streak,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Api(response.status().as_u16()));
        }
        Ok(())
    }

    pub async fn questions(
        &self,
        lesson_id: &str,
        language: &str,
    ) -> Result<Vec<QuestionDto>, ApiError> {
        self.get_json(&format!(
            "/api/language-questions/lesson/{lesson_id}/language/{language}"
        ))
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Api(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Api(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Api(response.status().as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl MediaSource for ApiClient {
    async fn unit_resources(
        &self,
        unit_id: &str,
        language: &str,
    ) -> Result<UnitResources, ApiError> {
        self.get_json(&format!("/api/unit-resources/{unit_id}/{language}"))
            .await
    }

    async fn audio(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/api/word/audio/get/{filename}"))
            .await
    }

    async fn image(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(&format!("/api/word/image/get/{filename}"))
            .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressBody<'a> {
    lesson_id: &'a str,
    language: &'a str,
    status: ProgressStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PointsBody<'a> {
    points: i64,
    lesson_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    streak: Option<u32>,
}
