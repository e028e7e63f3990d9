//! Library side of the `quire` binary: inspect transforms and the session
//! replay runner, kept here so integration tests can reach them.

pub mod replay;
pub mod transforms;
