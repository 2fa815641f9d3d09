// handlers/protected - endpoints behind `require_caller`
//
// Every handler receives the resolved `Caller` through `Extension` and passes
// its user id down as the owner of whatever it touches.

pub mod auth;
pub mod chapters;
pub mod characters;
pub mod miscs;
pub mod novels;
pub mod snapshots;
pub mod world_events;
pub mod world_views;
