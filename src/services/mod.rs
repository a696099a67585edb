/// Account registration, login, and token management.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Player join, submissions, results, and chat.
pub mod player_service;
/// Quiz and question management for owners.
pub mod quiz_service;
/// The per-question and session-wide scoring engine.
pub mod scoring;
/// The live session engine: lifecycle, timers, results, export.
pub mod session_service;
