//! Email delivery for stardigest.
//!
//! Summaries are rendered from markdown into a styled HTML page with a
//! plain-text alternative and submitted over authenticated SMTP with
//! STARTTLS.

pub mod error;
pub mod render;
pub mod transport;

pub use error::{EmailError, Result};
pub use render::{markdown_to_html, render_email, RenderedEmail};
pub use transport::EmailTransport;
