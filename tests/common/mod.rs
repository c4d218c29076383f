#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use taskvault::auth::{AuthService, PasswordHasher, TokenService};
use taskvault::config::MIN_BCRYPT_COST;
use taskvault::error::{AppError, AppResult};
use taskvault::models::{SignInResponse, Task, TaskFilter, TaskStatus, User};
use taskvault::routes::{self, health};
use taskvault::store::{TaskStore, UserStore};
use taskvault::tasks::TaskService;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Users keyed by username; the write lock makes check-and-insert atomic.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(AppError::DuplicateUsername);
        }
        let user = User::new(username, password_hash);
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }
}

/// Every present condition must hold; search is a case-insensitive substring
/// of the title or description, as with `ILIKE` in Postgres.
fn matches_filter(filter: &TaskFilter, task: &Task) -> bool {
    let status_ok = filter.status.map_or(true, |status| task.status == status);
    let search_ok = filter.search_term().map_or(true, |term| {
        let term = term.to_lowercase();
        task.title.to_lowercase().contains(&term) || task.description.to_lowercase().contains(&term)
    });
    status_ok && search_ok
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_task(&self, title: &str, description: &str, owner: &User) -> AppResult<Task> {
        let task = Task::new(title, description, owner.id);
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn get_tasks(&self, filter: &TaskFilter, owner: &User) -> AppResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .rev()
            .filter(|task| task.user_id == owner.id && matches_filter(filter, task))
            .cloned()
            .collect())
    }

    async fn get_task_by_id(&self, id: Uuid, owner: &User) -> AppResult<Task> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|task| task.id == id && task.user_id == owner.id)
            .cloned()
            .ok_or(AppError::TaskNotFound(id))
    }

    async fn delete_task(&self, id: Uuid, owner: &User) -> AppResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|task| !(task.id == id && task.user_id == owner.id));
        Ok((before - tasks.len()) as u64)
    }

    async fn update_task_status(
        &self,
        id: Uuid,
        status: TaskStatus,
        owner: &User,
    ) -> AppResult<Task> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id && task.user_id == owner.id)
            .ok_or(AppError::TaskNotFound(id))?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }
}

/// Services wired over in-memory stores, the way `main` wires them over Postgres.
pub struct TestContext {
    pub users: Arc<InMemoryUserStore>,
    pub task_store: Arc<InMemoryTaskStore>,
    pub auth: web::Data<AuthService>,
    pub tasks: web::Data<TaskService>,
}

impl TestContext {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserStore::default());
        let task_store = Arc::new(InMemoryTaskStore::default());

        let auth = AuthService::new(
            users.clone(),
            PasswordHasher::new(MIN_BCRYPT_COST).expect("valid bcrypt cost"),
            TokenService::new(TEST_SECRET, Duration::hours(1)),
        )
        .expect("auth service");
        let tasks = TaskService::new(task_store.clone());

        Self {
            users,
            task_store,
            auth: web::Data::new(auth),
            tasks: web::Data::new(tasks),
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.auth.clone())
            .app_data(self.tasks.clone())
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config)
    }

    /// Signs a user up through the service and returns the stored record.
    pub async fn user(&self, username: &str, password: &str) -> User {
        self.auth
            .sign_up(username, password)
            .await
            .expect("sign up test user")
    }
}

/// Registers and signs in over HTTP, returning the bearer token.
pub async fn sign_up_and_in<S, B>(app: &S, username: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let credentials = json!({ "username": username, "password": password });

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::CREATED,
        "sign up of {} failed",
        username
    );

    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(
        resp.status(),
        actix_web::http::StatusCode::OK,
        "sign in of {} failed",
        username
    );

    let body: SignInResponse = test::read_body_json(resp).await;
    body.access_token
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
