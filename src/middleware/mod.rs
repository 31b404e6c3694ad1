//! Cross-cutting middleware
//!
//! Applied in the router before a handler runs: body parsing into request
//! DTOs, session cookie resolution and flash message propagation. Static
//! files are answered earlier, in `handler::static_files`.

pub mod body;
pub mod flash;
pub mod session;

pub use body::{ArticleForm, BodyError, FieldError, FormFields};
pub use flash::{FlashKind, FlashMessage, FlashStore};
pub use session::{Session, SessionId};
