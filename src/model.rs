//! Records as they are persisted, plus the request and view objects exchanged with the frontend.

pub mod answer_set;
pub mod evaluation;
pub mod person;
pub mod question_set;
pub mod request;
pub mod views;
