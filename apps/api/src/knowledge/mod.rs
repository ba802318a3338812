// Knowledge base: user-supplied reference documents that are concatenated into
// the generation context.

pub mod context;
pub mod extract;
pub mod handlers;
