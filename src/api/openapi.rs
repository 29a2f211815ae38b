use utoipa::OpenApi;

use crate::{
    api::models::{
        BankDetailsRequest, CancelClaimRequest, ClaimPaymentsRequest, ConfirmSettlementsRequest,
        CreateTransactionRequest, ErrorResponse, LoginRequest, LoginResponse, MessageResponse,
        RegisterRequest, RespondFriendRequestRequest, SendFriendRequestRequest, SettleRequest,
        UpdateProfileRequest, UserView,
    },
    core::{
        models::{
            category::Category,
            friend::{FriendRequestView, FriendSummary},
            settlement::{BreakupEntry, ClaimOutcome, ConfirmOutcome, NetPosition, PendingConfirmation},
            transaction::{SharedWith, TransactionView},
        },
        service::{BankDetailsView, ProfileView, ScholarshipView},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::register,
        super::handlers::login,
        super::handlers::get_profile,
        super::handlers::update_profile,
        super::handlers::save_bank_details,
        super::handlers::get_bank_details,
        super::handlers::get_categories,
        super::handlers::create_transaction,
        super::handlers::get_transactions,
        super::handlers::get_scholarships,
        super::handlers::get_settlement_summary,
        super::handlers::get_settlement_breakup,
        super::handlers::settle_obligation,
        super::handlers::claim_payments,
        super::handlers::cancel_settlement_claim,
        super::handlers::confirm_settlements,
        super::handlers::get_pending_confirmations,
        super::handlers::send_friend_request,
        super::handlers::respond_friend_request,
        super::handlers::get_friends,
        super::handlers::get_friend_requests
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        UserView,
        UpdateProfileRequest,
        BankDetailsRequest,
        CreateTransactionRequest,
        SettleRequest,
        ClaimPaymentsRequest,
        CancelClaimRequest,
        ConfirmSettlementsRequest,
        SendFriendRequestRequest,
        RespondFriendRequestRequest,
        MessageResponse,
        ErrorResponse,
        ProfileView,
        BankDetailsView,
        ScholarshipView,
        Category,
        SharedWith,
        TransactionView,
        NetPosition,
        BreakupEntry,
        PendingConfirmation,
        ClaimOutcome,
        ConfirmOutcome,
        FriendSummary,
        FriendRequestView
    )),
    info(
        title = "Ledgerly API",
        description = "API for tracking personal finances, shared expenses and settlements",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
