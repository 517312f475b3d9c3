//! # Resourceful Test
//!
//! In-memory HTTP testing for Resourceful applications: requests go through
//! the full [`App`](resourceful_server::App) dispatch (body parsing,
//! authentication, routing, the pipeline) without binding a port.
//!
//! ## Example
//!
//! ```ignore
//! use resourceful_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_a_post() {
//!     let client = TestClient::new(app());
//!
//!     let response = client
//!         .post("/posts")
//!         .bearer(&token)
//!         .json(&json!({ "title": "hello" }))
//!         .send()
//!         .await;
//!
//!     response.assert_success();
//!     assert_eq!(response.data_at("post.title"), Some(&json!("hello")));
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/resourceful-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use response::TestResponse;
