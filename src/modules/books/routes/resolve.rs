use axum::{
    extract::{FromRef, FromRequestParts, Path},
    http::request::Parts,
};
use biblio_db::ObjectId;
use biblio_http::AppError;

use super::BooksState;
use crate::modules::books::models::Book;

pub const INVALID_ID_MESSAGE: &str = "ID de libro no válido";
pub const NOT_FOUND_MESSAGE: &str = "Libro no encontrado";

/// The book named by the `{id}` path segment.
///
/// Malformed ids are rejected before the store is touched; both malformed
/// and unknown ids answer 404.
#[derive(Debug, Clone)]
pub struct ResolvedBook(pub Book);

impl<S> FromRequestParts<S> for ResolvedBook
where
    BooksState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found(INVALID_ID_MESSAGE))?;

        let id: ObjectId = raw_id.parse().map_err(|_| {
            tracing::debug!(id = %raw_id, "rejecting malformed book id");
            AppError::not_found(INVALID_ID_MESSAGE)
        })?;

        let state = BooksState::from_ref(state);
        match state.store.find_by_id(&id).await {
            Ok(Some(book)) => Ok(ResolvedBook(book)),
            Ok(None) => Err(AppError::not_found(NOT_FOUND_MESSAGE)),
            Err(e) => Err(AppError::internal(e)),
        }
    }
}
