// handlers/mod.rs - Route handlers grouped by access tier
//
// Public handlers need no caller identity. Protected handlers run behind the
// authentication middleware and, for article mutations, the ownership check.

pub mod protected;
pub mod public;
