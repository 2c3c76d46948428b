// Composition root for the fundraiser store.
//
// Responsibilities
// - Read config from the command line and environment.
// - Choose the session's persistence target from the credentials that were supplied.
// - Wire the sync engine into the HTTP router.

pub mod config;
pub mod http;
pub mod state;
