//! # billbook-db: Storage and Workflow for Billbook
//!
//! SQLite persistence for invoices and quotations, the document store
//! abstraction, configuration loading and the [`DocumentService`] that runs
//! the invoice/quotation workflow on top of billbook-core.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Data Flow                               │
//! │                                                                         │
//! │  Web handler (create invoice, mark paid, convert quote...)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   billbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │DocumentService│    │ DocumentStore │    │   Database   │  │   │
//! │  │   │ (service.rs)  │───►│ (repository/) │───►│  (pool.rs)   │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ ownership     │    │ SQLite        │    │ SqlitePool   │  │   │
//! │  │   │ lifecycle     │    │ in-memory     │    │ migrations   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           ▲                                                     │   │
//! │  │           │ BillingConfig (config.rs): db path, discount bands  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/billbook/billbook.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - `billbook.toml` + environment overrides
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage, config and service error types
//! - [`repository`] - `DocumentStore` trait, SQLite and in-memory stores
//! - [`service`] - `DocumentService` workflow
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use billbook_core::{DocumentCalculator, InvoiceStatus};
//! use billbook_db::{BillingConfig, Database, DocumentService};
//!
//! let config = BillingConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let service = DocumentService::new(
//!     Arc::new(db.documents()),
//!     DocumentCalculator::new(config.discount_policy()),
//! );
//!
//! let invoice = service.create_invoice("user-1", draft, InvoiceStatus::Pending).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::BillingConfig;
pub use error::{ConfigError, DbError, DbResult, ServiceError, ServiceResult};
pub use pool::{Database, DbConfig, DbLocation};
pub use repository::{
    DocumentRecord, DocumentStore, InMemoryDocumentStore, SqliteDocumentStore,
};
pub use service::DocumentService;
