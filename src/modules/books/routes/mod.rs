//! HTTP handlers for the books collection.

mod resolve;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use biblio_db::DocumentStore;
use biblio_http::AppError;
use serde::Serialize;
use serde_json::json;

use super::models::{Book, BookPayload, BOOK_FIELDS};

pub use resolve::{ResolvedBook, INVALID_ID_MESSAGE, NOT_FOUND_MESSAGE};

pub const MISSING_FIELDS_MESSAGE: &str = "Todos los campos son obligatorios";

/// Shared state for the books router
#[derive(Clone)]
pub struct BooksState {
    pub store: Arc<dyn DocumentStore<Book>>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Build the books router over the given store. Paths are relative to the
/// mount point.
pub fn router(store: Arc<dyn DocumentStore<Book>>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{id}",
            get(get_book)
                .put(update_book)
                .patch(patch_book)
                .delete(delete_book),
        )
        .with_state(BooksState { store })
}

fn empty_patch_message() -> String {
    format!(
        "Debe proporcionar al menos uno de los campos: {}",
        BOOK_FIELDS.join(", ")
    )
}

fn deleted_message(title: &str) -> String {
    format!("El libro {} fue eliminado correctamente", title)
}

fn parse_body(body: Result<Json<BookPayload>, JsonRejection>) -> Result<BookPayload, AppError> {
    body.map(|Json(payload)| payload)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Update bodies may be omitted entirely; an empty body is an empty payload.
fn parse_update_body(bytes: &Bytes) -> Result<BookPayload, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BookPayload::default());
    }
    parse_body(Json::from_bytes(bytes))
}

async fn list_books(State(state): State<BooksState>) -> Result<Response, AppError> {
    let books = state.store.find_all().await.map_err(AppError::internal)?;

    if books.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    Ok(Json(books).into_response())
}

async fn create_book(
    State(state): State<BooksState>,
    body: Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let payload = parse_body(body)?;

    let missing = payload.missing_fields();
    if !missing.is_empty() {
        let details = missing
            .iter()
            .map(|field| json!({"field": field, "error": "required"}))
            .collect();
        return Err(AppError::validation(details, MISSING_FIELDS_MESSAGE));
    }

    let book = payload
        .into_patch()
        .map_err(|e| AppError::bad_request(e.to_string()))?
        .into_new_book()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let created = state
        .store
        .insert(book)
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    tracing::info!(id = ?created.id, title = %created.title, "book created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_book(ResolvedBook(book): ResolvedBook) -> Json<Book> {
    Json(book)
}

async fn update_book(
    State(state): State<BooksState>,
    ResolvedBook(book): ResolvedBook,
    body: Bytes,
) -> Result<Json<Book>, AppError> {
    let patch = parse_update_body(&body)?
        .into_patch()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    save(&state, patch.apply_to(book)).await
}

async fn patch_book(
    State(state): State<BooksState>,
    ResolvedBook(book): ResolvedBook,
    body: Bytes,
) -> Result<Json<Book>, AppError> {
    let patch = parse_update_body(&body)?
        .into_patch()
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    if patch.is_empty() {
        return Err(AppError::bad_request(empty_patch_message()));
    }

    save(&state, patch.apply_to(book)).await
}

async fn save(state: &BooksState, book: Book) -> Result<Json<Book>, AppError> {
    let saved = state
        .store
        .save(book)
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    tracing::info!(id = ?saved.id, "book updated");
    Ok(Json(saved))
}

async fn delete_book(
    State(state): State<BooksState>,
    ResolvedBook(book): ResolvedBook,
) -> Result<Json<DeleteResponse>, AppError> {
    let Some(id) = book.id else {
        return Err(AppError::not_found(NOT_FOUND_MESSAGE));
    };

    let removed = state.store.delete(&id).await.map_err(AppError::internal)?;
    if !removed {
        // Deleted by a concurrent request between lookup and removal.
        return Err(AppError::not_found(NOT_FOUND_MESSAGE));
    }

    tracing::info!(id = %id, title = %book.title, "book deleted");
    Ok(Json(DeleteResponse {
        message: deleted_message(&book.title),
    }))
}
