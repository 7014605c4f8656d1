//! REST backend implementation over `reqwest`.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use studydesk_core::error::ApiError;
use studydesk_core::model::{
    Course, CourseForm, CourseId, Note, NoteDraft, NoteId, Question, QuizOptions, QuizResult,
    QuizSubmission, SubmissionResponse,
};
use studydesk_core::traits::StudyApi;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the study backend's REST API.
pub struct HttpApi {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ApiError::NotFound(response.url().path().to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status,
                message: body,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> anyhow::Result<T> {
        let response = self.send(request).await?;
        let body = response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body)
    }

    async fn send_empty(&self, request: RequestBuilder) -> anyhow::Result<()> {
        self.send(request).await?;
        Ok(())
    }
}

fn course_form(form: &CourseForm) -> anyhow::Result<Form> {
    let mut multipart = Form::new()
        .text("name", form.name.clone())
        .text("instructor", form.instructor.clone());
    if let Some(syllabus) = &form.syllabus {
        let part = Part::bytes(syllabus.bytes.clone())
            .file_name(syllabus.file_name.clone())
            .mime_str(&syllabus.mime_type)
            .with_context(|| format!("invalid MIME type: {}", syllabus.mime_type))?;
        multipart = multipart.part("syllabus", part);
    }
    Ok(multipart)
}

#[async_trait]
impl StudyApi for HttpApi {
    #[instrument(skip(self))]
    async fn list_courses(&self) -> anyhow::Result<Vec<Course>> {
        debug!("GET /api/course/");
        self.send_json(self.client.get(self.url("/api/course/")))
            .await
    }

    #[instrument(skip(self))]
    async fn get_course(&self, id: CourseId) -> anyhow::Result<Course> {
        self.send_json(self.client.get(self.url(&format!("/api/course/{id}/"))))
            .await
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    async fn create_course(&self, form: &CourseForm) -> anyhow::Result<Course> {
        let request = self
            .client
            .post(self.url("/api/course/"))
            .multipart(course_form(form)?);
        self.send_json(request).await
    }

    #[instrument(skip(self, form))]
    async fn update_course(&self, id: CourseId, form: &CourseForm) -> anyhow::Result<()> {
        let request = self
            .client
            .put(self.url(&format!("/api/course/{id}/")))
            .multipart(course_form(form)?);
        self.send_empty(request).await
    }

    #[instrument(skip(self))]
    async fn delete_course(&self, id: CourseId) -> anyhow::Result<()> {
        self.send_empty(self.client.delete(self.url(&format!("/api/course/{id}/"))))
            .await
    }

    #[instrument(skip(self))]
    async fn list_notes(&self) -> anyhow::Result<Vec<Note>> {
        debug!("GET /api/note/");
        self.send_json(self.client.get(self.url("/api/note/"))).await
    }

    #[instrument(skip(self))]
    async fn get_note(&self, id: NoteId) -> anyhow::Result<Note> {
        self.send_json(self.client.get(self.url(&format!("/api/note/{id}/"))))
            .await
    }

    #[instrument(skip(self, draft), fields(course = %draft.course))]
    async fn create_note(&self, draft: &NoteDraft) -> anyhow::Result<Note> {
        self.send_json(self.client.post(self.url("/api/note/")).json(draft))
            .await
    }

    #[instrument(skip(self, draft))]
    async fn update_note(&self, id: NoteId, draft: &NoteDraft) -> anyhow::Result<()> {
        self.send_empty(
            self.client
                .put(self.url(&format!("/api/note/{id}/")))
                .json(draft),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_note(&self, id: NoteId) -> anyhow::Result<()> {
        self.send_empty(self.client.delete(self.url(&format!("/api/note/{id}/"))))
            .await
    }

    #[instrument(skip(self, options))]
    async fn generate_quiz(
        &self,
        course: CourseId,
        options: &QuizOptions,
    ) -> anyhow::Result<Vec<Question>> {
        let request = self
            .client
            .post(self.url(&format!("/api/course/{course}/generate_quiz/")))
            .json(options);
        self.send_json(request).await
    }

    #[instrument(skip(self, answers), fields(answers = answers.len()))]
    async fn submit_quiz(
        &self,
        course: CourseId,
        answers: &[String],
    ) -> anyhow::Result<Vec<QuizResult>> {
        let request = self
            .client
            .post(self.url(&format!("/api/course/{course}/submit_quiz/")))
            .json(&QuizSubmission::from_answers(answers));
        let response: SubmissionResponse = self.send_json(request).await?;
        Ok(response.results)
    }
}
