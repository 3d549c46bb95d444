use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{FromRef, State},
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use common_auth::{JwtVerifier, TokenSigner};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, warn};

use crate::auth_handlers::{bypass_login, login};
use crate::config::ServiceConfig;
use crate::meal_plan_handlers::{create_meal_plan, list_meal_plans, list_student_meal_plans};
use crate::metrics::{track_http_errors, ServiceMetrics};
use crate::store::RecordStore;
use crate::student_handlers::{create_student, delete_student, list_students, update_student};
use crate::user_handlers::{create_user, delete_user, list_users, update_user};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub jwt_verifier: Arc<JwtVerifier>,
    pub token_signer: Arc<TokenSigner>,
    pub config: Arc<ServiceConfig>,
    pub metrics: Arc<ServiceMetrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: ServiceConfig) -> Result<Self> {
        let jwt_config = config.jwt_config();
        Ok(Self {
            store,
            jwt_verifier: Arc::new(JwtVerifier::new(jwt_config.clone())),
            token_signer: Arc::new(TokenSigner::new(&jwt_config)),
            config: Arc::new(config),
            metrics: Arc::new(ServiceMetrics::new()?),
        })
    }

    pub fn record_login_metric(&self, outcome: &str) {
        self.metrics.login_attempt(outcome);
    }
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_verifier.clone()
    }
}

impl FromRef<AppState> for Arc<TokenSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.token_signer.clone()
    }
}

impl FromRef<AppState> for Arc<ServiceMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn render_metrics(State(metrics): State<Arc<ServiceMetrics>>) -> Response {
    match metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "Unable to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn cors_layer(config: &ServiceConfig) -> CorsLayer {
    let origins = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(render_metrics))
        .route("/login", post(login))
        .route("/students", get(list_students).post(create_student))
        .route("/students/:id", put(update_student).delete(delete_student))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/mealPlans", get(list_meal_plans).post(create_meal_plan))
        .route("/mealPlans/:studentID", get(list_student_meal_plans));

    if state.config.allow_bypass_login {
        warn!("ALLOW_BYPASS_LOGIN is enabled: /bypass-login issues tokens without a password");
        app = app.route("/bypass-login", post(bypass_login));
    }

    let cors = cors_layer(&state.config);
    app.layer(axum::middleware::from_fn_with_state(
        state.metrics.clone(),
        track_http_errors,
    ))
    .with_state(state)
    .layer(cors)
}
