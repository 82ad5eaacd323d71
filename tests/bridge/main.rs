//! Bridge integration tests.

mod support;
mod scenarios;
mod concurrency;
