//! Client core for collaborative note classification: submits votes to the
//! voting service and keeps each note card's consensus display in step with
//! the server's answer.

pub mod cards;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod page;
pub mod tasks;
pub mod voting;
