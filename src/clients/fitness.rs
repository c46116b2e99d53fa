use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::clients::error::ApiError;
use crate::clients::models::requests::{
    ContactRequest, LoginRequest, RefreshRequest, SessionCompletionRecord,
};
use crate::clients::models::responses::{
    CompletionAck, ContactAck, CurrentProgramResponse, HistoryEntry, HistoryListResponse,
    LoginResponse, ProgramDetail, ProgramListResponse, ProgramSummary, RefreshResponse, Streak,
    TodayWorkoutResponse, User, UserStats, WeeklyEntry,
};
use crate::config::Config;
use crate::context::SessionContext;

const LOGIN_ENDPOINT: &str = "auth/login/";
const REFRESH_ENDPOINT: &str = "auth/refresh/";
const PROFILE_ENDPOINT: &str = "profile/";
const PROGRAMS_ENDPOINT: &str = "programs/";
const CURRENT_PROGRAM_ENDPOINT: &str = "programs/current/";
const TODAY_ENDPOINT: &str = "programs/today/";
const COMPLETE_WORKOUT_ENDPOINT: &str = "progress/complete-workout/";
const HISTORY_ENDPOINT: &str = "progress/history/";
const STATS_ENDPOINT: &str = "progress/stats/";
const STREAK_ENDPOINT: &str = "progress/streak/";
const WEEKLY_ENDPOINT: &str = "progress/weekly/";
const CONTACT_ENDPOINT: &str = "contact/";

/// Thin client for the upstream fitness REST API.
#[derive(Clone)]
pub struct FitnessClient {
    http: Client,
    base: Url,
}

impl FitnessClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
                .build()?,
            base: Url::parse(&config.fitness_api_url)?,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email, password };
        self.post_json(None, LOGIN_ENDPOINT, &body).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let body = RefreshRequest {
            refresh: refresh_token,
        };
        self.post_json(None, REFRESH_ENDPOINT, &body).await
    }

    pub async fn profile(&self, ctx: &SessionContext) -> Result<User, ApiError> {
        self.get_json(ctx, PROFILE_ENDPOINT).await
    }

    pub async fn list_programs(&self, ctx: &SessionContext) -> Result<Vec<ProgramSummary>, ApiError> {
        let response: ProgramListResponse = self.get_json(ctx, PROGRAMS_ENDPOINT).await?;
        Ok(response.into_programs())
    }

    pub async fn get_program(
        &self,
        ctx: &SessionContext,
        program_id: &str,
    ) -> Result<ProgramDetail, ApiError> {
        self.get_json(ctx, &format!("{}{}/", PROGRAMS_ENDPOINT, program_id))
            .await
    }

    pub async fn enroll(
        &self,
        ctx: &SessionContext,
        program_id: &str,
    ) -> Result<serde_json::Value, ApiError> {
        let path = format!("{}{}/enroll/", PROGRAMS_ENDPOINT, program_id);
        self.post_ack(Some(ctx), &path, &serde_json::json!({})).await
    }

    pub async fn current_program(
        &self,
        ctx: &SessionContext,
    ) -> Result<CurrentProgramResponse, ApiError> {
        self.get_json(ctx, CURRENT_PROGRAM_ENDPOINT).await
    }

    pub async fn today_workout(
        &self,
        ctx: &SessionContext,
    ) -> Result<TodayWorkoutResponse, ApiError> {
        self.get_json(ctx, TODAY_ENDPOINT).await
    }

    pub async fn complete_workout(
        &self,
        ctx: &SessionContext,
        record: &SessionCompletionRecord,
    ) -> Result<CompletionAck, ApiError> {
        tracing::debug!(
            program_id = %record.program,
            day_id = %record.day,
            completion_count = record.exercise_completions.len(),
            "fitness.complete_workout.request"
        );

        self.post_ack(Some(ctx), COMPLETE_WORKOUT_ENDPOINT, record)
            .await
    }

    pub async fn history(&self, ctx: &SessionContext) -> Result<Vec<HistoryEntry>, ApiError> {
        let response: HistoryListResponse = self.get_json(ctx, HISTORY_ENDPOINT).await?;
        Ok(response.into_entries())
    }

    pub async fn stats(&self, ctx: &SessionContext) -> Result<UserStats, ApiError> {
        self.get_json(ctx, STATS_ENDPOINT).await
    }

    pub async fn streak(&self, ctx: &SessionContext) -> Result<Streak, ApiError> {
        self.get_json(ctx, STREAK_ENDPOINT).await
    }

    pub async fn weekly(&self, ctx: &SessionContext) -> Result<Vec<WeeklyEntry>, ApiError> {
        self.get_json(ctx, WEEKLY_ENDPOINT).await
    }

    /// Contact messages may be sent anonymously.
    pub async fn submit_contact(
        &self,
        ctx: Option<&SessionContext>,
        message: &ContactRequest,
    ) -> Result<ContactAck, ApiError> {
        self.post_ack(ctx, CONTACT_ENDPOINT, message).await
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::Url(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &SessionContext,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let request = self.http.get(url).header("Authorization", ctx.bearer());
        Self::send(request, path).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        ctx: Option<&SessionContext>,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.post_request(ctx, path, body)?;
        Self::send(request, path).await
    }

    // Write endpoints may answer 201/204 with nothing to parse.
    async fn post_ack<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        ctx: Option<&SessionContext>,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.post_request(ctx, path, body)?;
        let body = Self::read_body(request.send().await?, path).await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn post_request<B: Serialize>(
        &self,
        ctx: Option<&SessionContext>,
        path: &str,
        body: &B,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let json_body = serde_json::to_string(body)?;

        let mut request = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .body(json_body);

        if let Some(ctx) = ctx {
            request = request.header("Authorization", ctx.bearer());
        }

        Ok(request)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder, path: &str) -> Result<T, ApiError> {
        let body = Self::read_body(request.send().await?, path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn read_body(response: Response, path: &str) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                path,
                status = status.as_u16(),
                "fitness.request_failed"
            );
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        Ok(body)
    }
}
