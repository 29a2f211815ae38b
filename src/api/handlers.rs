use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::LedgerError,
        models::{
            category::Category,
            friend::{FriendRequestView, FriendSummary},
            settlement::{BreakupEntry, ClaimOutcome, ConfirmOutcome, NetPosition, PendingConfirmation},
            transaction::TransactionView,
        },
        service::{BankDetailsView, CreateTransactionInput, LedgerService, ProfileView, ScholarshipView},
    },
    infrastructure::{cache::in_memory::InMemoryCache, storage::in_memory::InMemoryStore},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;

use std::sync::Arc;

type SharedService = Arc<LedgerService<InMemoryStore, InMemoryCache>>;

// Middleware to validate the bearer token and stash the claims for handlers
async fn auth_middleware(
    State(service): State<SharedService>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| LedgerError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| LedgerError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: SharedService) -> Router {
    let protected_routes = Router::new()
        .route("/profile", axum::routing::get(get_profile).put(update_profile))
        .route("/bank", axum::routing::post(save_bank_details).get(get_bank_details))
        .route("/categories", axum::routing::get(get_categories))
        .route(
            "/transactions",
            axum::routing::post(create_transaction).get(get_transactions),
        )
        .route("/scholarships", axum::routing::get(get_scholarships))
        .route("/settlements/summary", axum::routing::get(get_settlement_summary))
        .route(
            "/settlements/breakup/{friend_id}",
            axum::routing::get(get_settlement_breakup),
        )
        .route("/settlements/settle", axum::routing::post(settle_obligation))
        .route("/settlements/claim", axum::routing::post(claim_payments))
        .route("/settlements/cancel", axum::routing::post(cancel_settlement_claim))
        .route("/settlements/confirm", axum::routing::post(confirm_settlements))
        .route("/settlements/pending", axum::routing::get(get_pending_confirmations))
        .route("/friends/request", axum::routing::post(send_friend_request))
        .route("/friends/respond", axum::routing::post(respond_friend_request))
        .route("/friends", axum::routing::get(get_friends))
        .route("/friends/requests", axum::routing::get(get_friend_requests))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/auth/register", axum::routing::post(register))
        .route("/auth/login", axum::routing::post(login))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn register(
    State(service): State<SharedService>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    service
        .register(req.name, req.email, req.password, req.mobile_no)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(service): State<SharedService>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (token, user) = service.authenticate(&req.email, &req.password).await?;
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserView {
            id: user.id,
            name: user.name,
            email: user.email,
            mobile_no: user.mobile_no,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ProfileView),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_profile(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileView>, ApiError> {
    let profile = service.profile(&claims.sub).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = MessageResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn update_profile(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.update_profile(&claims.sub, req.name, req.mobile_no).await?;
    Ok(Json(MessageResponse {
        message: "Profile updated successfully".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/bank",
    request_body = BankDetailsRequest,
    responses(
        (status = 200, description = "Bank details updated successfully", body = MessageResponse),
        (status = 400, description = "Invalid balance", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn save_bank_details(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BankDetailsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let initial_balance = req
        .initial_balance
        .ok_or(LedgerError::MissingField("initial_balance"))?;
    service
        .save_bank_details(&claims.sub, req.bank_name, req.upi_id, initial_balance)
        .await?;
    Ok(Json(MessageResponse {
        message: "Bank details updated successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/bank",
    responses(
        (status = 200, description = "Bank details retrieved successfully", body = BankDetailsView),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_bank_details(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<BankDetailsView>, ApiError> {
    let details = service.bank_details(&claims.sub).await?;
    Ok(Json(details))
}

#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Categories retrieved successfully", body = Vec<Category>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_categories(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = service.categories(&claims.sub).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    post,
    path = "/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = MessageResponse),
        (status = 400, description = "Invalid amount, type, date or split", body = ErrorResponse),
        (status = 404, description = "Payer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn create_transaction(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    service
        .create_transaction(
            &claims.sub,
            CreateTransactionInput {
                amount: req.amount,
                kind: req.kind,
                category_name: req.category_name,
                transaction_date: req.transaction_date,
                description: req.description,
                is_shared: req.is_shared,
                shared_with: req.shared_with,
                shared_amount: req.shared_amount,
                paid_by: req.paid_by,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Transaction created successfully".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/transactions",
    params(TransactionQuery),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = Vec<TransactionView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_transactions(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TransactionQuery>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let transactions = service.transactions(&claims.sub, query.kind, query.category).await?;
    Ok(Json(transactions))
}

#[utoipa::path(
    get,
    path = "/scholarships",
    responses(
        (status = 200, description = "Scholarships retrieved successfully", body = Vec<ScholarshipView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_scholarships(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ScholarshipView>>, ApiError> {
    let scholarships = service.scholarships(&claims.sub).await?;
    Ok(Json(scholarships))
}

#[utoipa::path(
    get,
    path = "/settlements/summary",
    responses(
        (status = 200, description = "Net settlement summary per friend", body = Vec<NetPosition>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_settlement_summary(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<NetPosition>>, ApiError> {
    let summary = service.net_summary(&claims.sub).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/settlements/breakup/{friend_id}",
    params(
        ("friend_id" = String, Path, description = "ID of the friend to break down settlements with")
    ),
    responses(
        (status = 200, description = "Settlement breakup retrieved successfully", body = Vec<BreakupEntry>),
        (status = 404, description = "Friend not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_settlement_breakup(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Path(friend_id): Path<String>,
) -> Result<Json<Vec<BreakupEntry>>, ApiError> {
    let breakup = service.breakup(&claims.sub, &friend_id).await?;
    Ok(Json(breakup))
}

#[utoipa::path(
    post,
    path = "/settlements/settle",
    request_body = SettleRequest,
    responses(
        (status = 200, description = "Claim recorded", body = MessageResponse),
        (status = 400, description = "Invalid id or not open", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn settle_obligation(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SettleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.settle(&claims.sub, &req.settlement_id).await?;
    Ok(Json(MessageResponse {
        message: "Marked as paid (claim recorded). Waiting for receiver confirmation.".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/settlements/claim",
    request_body = ClaimPaymentsRequest,
    responses(
        (status = 200, description = "Per-id claim outcome", body = ClaimOutcome),
        (status = 400, description = "Empty id list", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn claim_payments(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ClaimPaymentsRequest>,
) -> Result<Json<ClaimOutcome>, ApiError> {
    let outcome = service.claim_payments(&claims.sub, req.settlement_ids).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/settlements/cancel",
    request_body = CancelClaimRequest,
    responses(
        (status = 200, description = "Claim cancelled", body = MessageResponse),
        (status = 400, description = "Invalid id or not claimed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn cancel_settlement_claim(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CancelClaimRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.cancel_claim(&claims.sub, &req.settlement_id).await?;
    Ok(Json(MessageResponse {
        message: "Claim cancelled".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/settlements/confirm",
    request_body = ConfirmSettlementsRequest,
    responses(
        (status = 200, description = "Per-id confirmation outcome", body = ConfirmOutcome),
        (status = 400, description = "Empty id list", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn confirm_settlements(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ConfirmSettlementsRequest>,
) -> Result<Json<ConfirmOutcome>, ApiError> {
    let outcome = service.confirm_settlements(&claims.sub, req.settlement_ids).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/settlements/pending",
    responses(
        (status = 200, description = "Claims awaiting the caller's confirmation", body = Vec<PendingConfirmation>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_pending_confirmations(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PendingConfirmation>>, ApiError> {
    let pending = service.pending_confirmations(&claims.sub).await?;
    Ok(Json(pending))
}

#[utoipa::path(
    post,
    path = "/friends/request",
    request_body = SendFriendRequestRequest,
    responses(
        (status = 201, description = "Friend request sent", body = MessageResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Request already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn send_friend_request(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendFriendRequestRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    service.send_friend_request(&claims.sub, &req.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Friend request sent".to_string(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/friends/respond",
    request_body = RespondFriendRequestRequest,
    responses(
        (status = 200, description = "Friend request answered", body = MessageResponse),
        (status = 400, description = "Invalid action", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn respond_friend_request(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RespondFriendRequestRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    service
        .respond_friend_request(&claims.sub, &req.request_id, &req.action)
        .await?;
    Ok(Json(MessageResponse {
        message: "Friend request updated".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/friends",
    responses(
        (status = 200, description = "Accepted friends", body = Vec<FriendSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_friends(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<FriendSummary>>, ApiError> {
    let friends = service.friends(&claims.sub).await?;
    Ok(Json(friends))
}

#[utoipa::path(
    get,
    path = "/friends/requests",
    responses(
        (status = 200, description = "Incoming pending friend requests", body = Vec<FriendRequestView>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub async fn get_friend_requests(
    State(service): State<SharedService>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<FriendRequestView>>, ApiError> {
    let requests = service.incoming_friend_requests(&claims.sub).await?;
    Ok(Json(requests))
}
