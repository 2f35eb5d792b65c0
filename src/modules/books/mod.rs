pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use biblio_db::{Database, DocumentStore};
use biblio_kernel::{InitCtx, Module};
use serde_json::json;

use models::Book;

/// Collection backing the books module
pub const COLLECTION: &str = "books";

/// Books module: CRUD over the `books` collection
pub struct BooksModule {
    store: Arc<dyn DocumentStore<Book>>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn DocumentStore<Book>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let existing = self.store.find_all().await?.len();
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.db.backend(),
            books = existing,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn book_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let id_param = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": "24 character hexadecimal book id",
        "schema": { "type": "string", "pattern": "^[0-9a-fA-F]{24}$" }
    });

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "List of books",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "204": { "description": "The collection is empty" },
                        "500": error_response("Storage failure")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_body(),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("Missing fields or rejected by storage")
                    }
                }
            },
            "/{id}": {
                "parameters": [id_param],
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("Malformed id or unknown book"),
                        "500": error_response("Storage failure")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "requestBody": book_body(),
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Rejected by storage"),
                        "404": error_response("Malformed id or unknown book")
                    }
                },
                "patch": {
                    "summary": "Partially update a book",
                    "tags": ["Books"],
                    "requestBody": book_body(),
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("No field supplied or rejected by storage"),
                        "404": error_response("Malformed id or unknown book")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Confirmation message",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "message": { "type": "string" } },
                                        "required": ["message"]
                                    }
                                }
                            }
                        },
                        "404": error_response("Malformed id or unknown book"),
                        "500": error_response("Storage failure")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "_id": {
                            "type": "string",
                            "description": "Unique identifier for the book"
                        },
                        "title": { "type": "string", "description": "Title of the book" },
                        "author": { "type": "string", "description": "Author of the book" },
                        "genre": { "type": "string", "description": "Literary genre" },
                        "publication_date": {
                            "type": "string",
                            "format": "date",
                            "description": "Date of first publication"
                        }
                    },
                    "required": ["_id", "title", "author", "genre", "publication_date"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "genre": { "type": "string" },
                        "publication_date": { "type": "string", "format": "date" }
                    }
                }
            }
        }
    })
}

/// Open the books collection and build the module
pub async fn create_module(db: &Database) -> anyhow::Result<Arc<dyn Module>> {
    let store = db.collection::<Book>(COLLECTION).await?;
    Ok(Arc::new(BooksModule::new(store)))
}
