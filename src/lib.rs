//! # SwiftShip Timeline
//!
//! Client-side reconciliation of the SwiftShip activity feed: payment
//! transactions, wallet top-ups and shipping orders are fetched from the
//! backend, normalized into one display shape and merged newest first.
//!
//! ## Features
//!
//! - **Normalization**: ordered title rules, descriptions with safe defaults, relative ages
//! - **Merging**: newest-first ordering across sources, truncation for previews
//! - **Partial degradation**: a failed source becomes a notice instead of an error
//! - **View model**: refresh cycles that can be superseded or cancelled
//! - **Checkout helpers**: order quotes and the payment records posted after checkout
//!
//! ## Quick Start
//!
//! ```rust
//! use swiftship_timeline::utils::MemorySource;
//! use swiftship_timeline::TimelineService;
//! use bigdecimal::BigDecimal;
//! use chrono::Utc;
//!
//! # tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .build()
//! #     .unwrap()
//! #     .block_on(async {
//! let source = MemorySource::new();
//! source.push_top_up(BigDecimal::from(100), Utc::now());
//!
//! let service = TimelineService::new(source);
//! let snapshot = service.load().await;
//! assert_eq!(snapshot.entries[0].title, "Top Up Successful");
//! # });
//! ```

pub mod checkout;
pub mod client;
pub mod timeline;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use checkout::*;
pub use client::*;
pub use timeline::*;
pub use traits::*;
pub use types::*;

// Re-export payment record builders for convenience
pub use checkout::payment::patterns;
