// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! One document per user in `users`, keyed by the URL-encoded email. Updates
//! name the fields they change so concurrent writers to other fields are not
//! clobbered.

use std::future::Future;
use std::time::Duration;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    GroceryList, InstructionSet, MealHistory, QuizProfile, User, WeeklyPlan,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
    timeout: Duration,
}

/// Subset of user fields written after a generation.
#[derive(Debug, Clone, Default)]
pub struct GeneratedFields<'a> {
    pub meal_plan: Option<&'a WeeklyPlan>,
    pub instructions: Option<&'a InstructionSet>,
    pub grocery_list: Option<&'a GroceryList>,
    pub meal_history: Option<&'a MealHistory>,
}

impl GeneratedFields<'_> {
    fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.meal_plan.is_some() {
            names.push("mealPlan");
        }
        if self.instructions.is_some() {
            names.push("instructions");
        }
        if self.grocery_list.is_some() {
            names.push("groceryList");
        }
        if self.meal_history.is_some() {
            names.push("mealHistory");
        }
        names
    }
}

/// Firestore document id for a user.
pub fn user_doc_id(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str, timeout: Duration) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id, timeout).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
            timeout,
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str, timeout: Duration) -> Result<Self, AppError> {
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore Emulator");

        Ok(Self {
            client: Some(client),
            timeout,
        })
    }

    /// Offline client for tests. Every operation returns a database error.
    pub fn new_mock() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Run a Firestore call under the configured deadline.
    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, firestore::errors::FirestoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| AppError::Database(format!("{}: {}", op, e))),
            Err(_) => {
                tracing::warn!(op, timeout_secs = self.timeout.as_secs(), "Firestore call timed out");
                Err(AppError::Database(format!("{}: timed out", op)))
            }
        }
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by email.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, AppError> {
        let client = self.get_client()?;
        let doc_id = user_doc_id(email);
        self.bounded(
            "get_user",
            client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(&doc_id),
        )
        .await
    }

    /// Store a new user. Fails with `Conflict` if the email is taken.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        if self.get_user(&user.email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let client = self.get_client()?;
        let doc_id = user_doc_id(&user.email);
        let result: Result<(), _> = tokio::time::timeout(
            self.timeout,
            client
                .fluent()
                .insert()
                .into(collections::USERS)
                .document_id(&doc_id)
                .object(user)
                .execute(),
        )
        .await
        .map_err(|_| AppError::Database("create_user: timed out".to_string()))?;

        match result {
            Ok(()) => Ok(()),
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                Err(AppError::Conflict("email already registered".to_string()))
            }
            Err(e) => Err(AppError::Database(format!("create_user: {}", e))),
        }
    }

    /// Overwrite only the named fields of a user document.
    async fn update_fields(
        &self,
        op: &'static str,
        user: &User,
        fields: &[&str],
    ) -> Result<(), AppError> {
        if fields.is_empty() {
            return Ok(());
        }
        let client = self.get_client()?;
        let doc_id = user_doc_id(&user.email);
        let _: () = self
            .bounded(
                op,
                client
                    .fluent()
                    .update()
                    .fields(fields.iter().copied())
                    .in_col(collections::USERS)
                    .document_id(&doc_id)
                    .object(user)
                    .execute(),
            )
            .await?;
        Ok(())
    }

    pub async fn set_quiz(&self, email: &str, quiz: &QuizProfile) -> Result<(), AppError> {
        let mut user = self.require_user(email).await?;
        user.quiz_data = Some(quiz.clone());
        self.update_fields("set_quiz", &user, &["quizData"]).await
    }

    pub async fn set_name(&self, email: &str, name: &str) -> Result<(), AppError> {
        let mut user = self.require_user(email).await?;
        user.name = name.to_string();
        self.update_fields("set_name", &user, &["name"]).await
    }

    pub async fn set_subscription(&self, email: &str, subscription: &str) -> Result<(), AppError> {
        let mut user = self.require_user(email).await?;
        user.subscription = subscription.to_string();
        self.update_fields("set_subscription", &user, &["subscription"])
            .await
    }

    /// Write the generated value and history changed by one generation.
    pub async fn save_generated(
        &self,
        email: &str,
        fields: GeneratedFields<'_>,
    ) -> Result<(), AppError> {
        let names = fields.field_names();
        if names.is_empty() {
            return Ok(());
        }

        // Only the masked fields are sent; the rest of this record is ignored.
        let mut user = User::new(String::new(), email.to_string(), String::new(), "");
        if let Some(plan) = fields.meal_plan {
            user.meal_plan = Some(plan.clone());
        }
        if let Some(instructions) = fields.instructions {
            user.instructions = Some(instructions.clone());
        }
        if let Some(grocery_list) = fields.grocery_list {
            user.grocery_list = Some(grocery_list.clone());
        }
        if let Some(history) = fields.meal_history {
            user.meal_history = history.clone();
        }

        tracing::debug!(email, fields = ?names, "Saving generated fields");
        self.update_fields("save_generated", &user, &names).await
    }

    async fn require_user(&self, email: &str) -> Result<User, AppError> {
        self.get_user(email)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    /// Delete a user document (test cleanup and account removal).
    pub async fn delete_user(&self, email: &str) -> Result<(), AppError> {
        let client = self.get_client()?;
        let doc_id = user_doc_id(email);
        self.bounded(
            "delete_user",
            client
                .fluent()
                .delete()
                .from(collections::USERS)
                .document_id(&doc_id)
                .execute(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_doc_id_encodes_email() {
        assert_eq!(user_doc_id("ana@example.com"), "ana%40example.com");
        assert_eq!(user_doc_id("a+b@x.io"), "a%2Bb%40x.io");
    }

    #[test]
    fn test_generated_field_names() {
        let plan = WeeklyPlan(vec![]);
        let history = MealHistory::default();
        let fields = GeneratedFields {
            meal_plan: Some(&plan),
            meal_history: Some(&history),
            ..Default::default()
        };
        assert_eq!(fields.field_names(), vec!["mealPlan", "mealHistory"]);
        assert!(GeneratedFields::default().field_names().is_empty());
    }

    #[tokio::test]
    async fn test_offline_mock_returns_database_error() {
        let db = FirestoreDb::new_mock();
        let err = db.get_user("ana@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
