// src/services/api_server.rs
//! API Server for the DID registry and signed NFT minter
//!
//! This module exposes the [`IdentityLedger`] over HTTP. The API is built
//! using Axum and includes endpoints for:
//! - DID creation, update, deletion and lookup
//! - Identity-gated NFT minting and token queries
//! - Development helpers to create a key and sign a mint message
//!
//! The caller identity for DID mutations is taken from the
//! `X-Caller-Address` header. Failures are returned as
//! `{ "code": ..., "error": ... }` with the stable reason string.

use crate::error::Error;
use crate::models::did::{DIDDocument, DIDMetadata};
use crate::services::identity_ledger::IdentityLedger;
use crate::utils::crypto::{format_address, parse_address};
use crate::wallet::key_management::KeyManager;
use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use ethers::types::Address;
use ethers::utils::hex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

/// Header carrying the address of the account making a DID mutation.
pub const CALLER_HEADER: &str = "x-caller-address";

// API request and response structures

/// Request payload for creating or updating a DID
#[derive(Serialize, Deserialize)]
pub struct DIDRequest {
    pub did: String,
    pub public_key: String,
    pub authentication: String,
    pub service_endpoint: String,
}

impl DIDRequest {
    fn metadata(self) -> (String, DIDMetadata) {
        (
            self.did,
            DIDMetadata::new(self.public_key, self.authentication, self.service_endpoint),
        )
    }
}

/// Response for DID creation operation
#[derive(Serialize, Deserialize)]
pub struct CreateDIDResponse {
    pub id: u64,
}

/// Response for DID update and delete operations
#[derive(Serialize, Deserialize)]
pub struct DIDChangeResponse {
    pub did: String,
}

/// Response for reverse DID lookup
#[derive(Serialize, Deserialize)]
pub struct DIDByIdResponse {
    pub did: String,
}

/// DID document as returned by lookups; the zero document for unknown DIDs
#[derive(Serialize, Deserialize)]
pub struct DIDDocumentResponse {
    pub id: u64,
    pub owner: String,
    pub public_key: String,
    pub authentication: String,
    pub service_endpoint: String,
}

impl From<DIDDocument> for DIDDocumentResponse {
    fn from(document: DIDDocument) -> Self {
        DIDDocumentResponse {
            id: document.id,
            owner: format_address(&document.owner),
            public_key: document.public_key,
            authentication: document.authentication,
            service_endpoint: document.service_endpoint,
        }
    }
}

/// Request payload for minting; `did_id` selects the DID-bound entry point
#[derive(Serialize, Deserialize)]
pub struct MintNFTRequest {
    #[serde(default)]
    pub did_id: Option<u64>,
    pub message: String,
    /// Hex-encoded 65-byte signature, 0x prefix optional
    pub signature: String,
    pub to: String,
}

/// Response for a successful mint
#[derive(Serialize, Deserialize)]
pub struct MintNFTResponse {
    pub token_id: u64,
}

#[derive(Serialize, Deserialize)]
pub struct TokenURIResponse {
    pub token_uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct OwnerOfResponse {
    pub owner: String,
}

/// Response containing a newly created development key
#[derive(Serialize, Deserialize)]
pub struct CreateWalletResponse {
    pub address: String,
    pub private_key: String,
}

/// Request payload for signing a mint message
#[derive(Serialize, Deserialize)]
pub struct SignMessageRequest {
    pub private_key: String,
    pub message: String,
}

/// Response containing a message signature
#[derive(Serialize, Deserialize)]
pub struct SignMessageResponse {
    pub signature: String,
}

/// Error body for every failed request
#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

/// Failure of an API call: either a ledger error or a malformed request.
#[derive(Debug)]
pub enum ApiError {
    Ledger(Error),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Ledger(err)
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound => StatusCode::NOT_FOUND,
        Error::NotAuthorized => StatusCode::FORBIDDEN,
        Error::AlreadyExists => StatusCode::CONFLICT,
        Error::InvalidSignature => StatusCode::UNAUTHORIZED,
        Error::InvalidCaller
        | Error::InvalidDid
        | Error::InvalidPublicKey
        | Error::InvalidRecipient
        | Error::AuthorityMismatch => StatusCode::BAD_REQUEST,
        Error::StateUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Ledger(err) => (
                status_for(&err),
                ErrorResponse {
                    code: err.code().to_string(),
                    error: err.reason(),
                },
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    code: "BAD_REQUEST".to_string(),
                    error: message,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Reads the caller identity supplied by the client. The zero address is
/// refused.
fn caller_address(headers: &HeaderMap) -> Result<Address, ApiError> {
    let value = headers
        .get(CALLER_HEADER)
        .ok_or_else(|| ApiError::BadRequest(format!("missing {} header", CALLER_HEADER)))?;
    let caller = value
        .to_str()
        .ok()
        .and_then(parse_address)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid {} header", CALLER_HEADER)))?;
    if caller.is_zero() {
        return Err(Error::InvalidCaller.into());
    }
    Ok(caller)
}

/// API server state containing the shared ledger
#[derive(Clone)]
pub struct ApiServer {
    /// DID registry and minter
    ledger: IdentityLedger,
}

impl ApiServer {
    /// Creates a new instance of the API server
    pub fn new(ledger: IdentityLedger) -> Self {
        ApiServer { ledger }
    }

    /// Builds the router with all API routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/create-did", post(Self::create_did_handler))
            .route("/update-did", put(Self::update_did_handler))
            .route("/delete-did/:did", delete(Self::delete_did_handler))
            .route("/did-documents/:did", get(Self::did_documents_handler))
            .route("/did/:id", get(Self::did_by_id_handler))
            .route("/did-document/:id", get(Self::did_document_by_id_handler))
            .route("/mint-nft", post(Self::mint_nft_handler))
            .route("/token-uri/:token_id", get(Self::token_uri_handler))
            .route("/owner-of/:token_id", get(Self::owner_of_handler))
            .route("/create-wallet", post(Self::create_wallet_handler))
            .route("/sign-message", post(Self::sign_message_handler))
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("API server listening on http://{}", addr);
        axum::serve(listener, self.router()).await
    }

    // =====================
    // DID Management Handlers
    // =====================

    /// Creates a new DID owned by the caller
    ///
    /// # Endpoint
    /// POST /create-did
    ///
    /// # Responses
    /// - 200 OK: Returns the assigned id
    /// - 400 Bad Request: Missing caller, empty DID or non-address key
    /// - 409 Conflict: DID already exists
    async fn create_did_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<DIDRequest>,
    ) -> ApiResult<CreateDIDResponse> {
        let caller = caller_address(&headers)?;
        let (did, metadata) = payload.metadata();
        let id = state.ledger.create_did(caller, &did, metadata)?;
        Ok(Json(CreateDIDResponse { id }))
    }

    /// Replaces the metadata of a DID owned by the caller
    ///
    /// # Endpoint
    /// PUT /update-did
    ///
    /// # Responses
    /// - 200 OK
    /// - 403 Forbidden: Caller is not the owner
    /// - 404 Not Found: No live document for the DID
    async fn update_did_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<DIDRequest>,
    ) -> ApiResult<DIDChangeResponse> {
        let caller = caller_address(&headers)?;
        let (did, metadata) = payload.metadata();
        state.ledger.update_did(caller, &did, metadata)?;
        Ok(Json(DIDChangeResponse { did }))
    }

    /// Deletes a DID owned by the caller
    ///
    /// # Endpoint
    /// DELETE /delete-did/:did
    async fn delete_did_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Path(did): Path<String>,
    ) -> ApiResult<DIDChangeResponse> {
        let caller = caller_address(&headers)?;
        state.ledger.delete_did(caller, &did)?;
        Ok(Json(DIDChangeResponse { did }))
    }

    /// GET /did-documents/:did
    async fn did_documents_handler(
        State(state): State<Arc<ApiServer>>,
        Path(did): Path<String>,
    ) -> ApiResult<DIDDocumentResponse> {
        Ok(Json(state.ledger.did_documents(&did)?.into()))
    }

    /// GET /did/:id
    async fn did_by_id_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<u64>,
    ) -> ApiResult<DIDByIdResponse> {
        let did = state.ledger.get_did_by_id(id)?;
        Ok(Json(DIDByIdResponse { did }))
    }

    /// GET /did-document/:id
    async fn did_document_by_id_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<u64>,
    ) -> ApiResult<DIDDocumentResponse> {
        Ok(Json(state.ledger.get_did_document_by_id(id)?.into()))
    }

    // =====================
    // Minting Handlers
    // =====================

    /// Mints a token if the signature matches the configured authority
    ///
    /// # Endpoint
    /// POST /mint-nft
    ///
    /// # Responses
    /// - 200 OK: Returns the token id
    /// - 400 Bad Request: Invalid recipient or wrong entry point
    /// - 401 Unauthorized: Invalid signature
    async fn mint_nft_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<MintNFTRequest>,
    ) -> ApiResult<MintNFTResponse> {
        let to = parse_address(&payload.to)
            .ok_or_else(|| ApiError::BadRequest("invalid recipient address".into()))?;
        let digits = payload
            .signature
            .strip_prefix("0x")
            .unwrap_or(&payload.signature);
        let signature = hex::decode(digits).map_err(|_| Error::InvalidSignature)?;

        let token_id = state
            .ledger
            .mint_nft(payload.did_id, &payload.message, &signature, to)?;
        Ok(Json(MintNFTResponse { token_id }))
    }

    /// GET /token-uri/:token_id
    async fn token_uri_handler(
        State(state): State<Arc<ApiServer>>,
        Path(token_id): Path<u64>,
    ) -> ApiResult<TokenURIResponse> {
        let token_uri = state.ledger.token_uri(token_id)?;
        Ok(Json(TokenURIResponse { token_uri }))
    }

    /// GET /owner-of/:token_id
    async fn owner_of_handler(
        State(state): State<Arc<ApiServer>>,
        Path(token_id): Path<u64>,
    ) -> ApiResult<OwnerOfResponse> {
        let owner = state.ledger.owner_of(token_id)?;
        Ok(Json(OwnerOfResponse {
            owner: format_address(&owner),
        }))
    }

    // =====================
    // Wallet Handlers
    // =====================

    /// Generates a development key pair
    ///
    /// # Endpoint
    /// POST /create-wallet
    async fn create_wallet_handler() -> impl IntoResponse {
        let keys = KeyManager::new();
        Json(CreateWalletResponse {
            address: keys.address_string(),
            private_key: keys.private_key_hex(),
        })
    }

    /// Signs a message the way the minter expects
    ///
    /// # Endpoint
    /// POST /sign-message
    async fn sign_message_handler(
        Json(payload): Json<SignMessageRequest>,
    ) -> ApiResult<SignMessageResponse> {
        let keys = KeyManager::from_private_key(&payload.private_key)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let signature = keys.sign_message(payload.message.as_bytes()).map_err(|e| {
            log::error!("message signing failed: {}", e);
            ApiError::BadRequest(e.to_string())
        })?;
        Ok(Json(SignMessageResponse {
            signature: format!("0x{}", hex::encode(signature)),
        }))
    }
}
