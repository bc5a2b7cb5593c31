pub mod backend;
pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod persona;

pub use backend::{ChatBackend, HttpBackend};
pub use chat::{ChatSession, Message, Role, Transcript};
pub use config::Config;
pub use persona::{Persona, PersonaTable};
