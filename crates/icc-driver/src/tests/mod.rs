//! Tests exercising the dispatcher against scripted channels.

mod support;
