use crate::dto::portal_dto::CreateStoryPayload;
use crate::error::Result;
use crate::models::success_story::SuccessStory;
use crate::utils::validation::validate;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct StoryService {
    pool: PgPool,
}

impl StoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Without an explicit name the story is credited to the author's username.
    pub async fn share(
        &self,
        author: Option<(Uuid, String)>,
        payload: CreateStoryPayload,
    ) -> Result<SuccessStory> {
        validate(&payload)?;
        let student_name = payload
            .student_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| author.as_ref().map(|(_, name)| name.clone()))
            .unwrap_or_else(|| "Anonymous".to_string());

        let story = sqlx::query_as::<_, SuccessStory>(
            r#"
            INSERT INTO success_stories (user_id, student_name, company_name, story)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, student_name, company_name, story, created_at
            "#,
        )
        .bind(author.map(|(id, _)| id))
        .bind(&student_name)
        .bind(&payload.company_name)
        .bind(&payload.story)
        .fetch_one(&self.pool)
        .await?;
        Ok(story)
    }

    pub async fn list(&self) -> Result<Vec<SuccessStory>> {
        let items = sqlx::query_as::<_, SuccessStory>(
            "SELECT id, user_id, student_name, company_name, story, created_at \
             FROM success_stories ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
