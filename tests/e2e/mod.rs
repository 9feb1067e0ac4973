// End-to-end tests for the token service
//
// Most tests run against the in-memory refresh token store:
// - HTTP tests spin the real router on an ephemeral port per test
//   via test-context lifecycle hooks
// - Lifecycle and codec tests call the library directly
//
// PostgreSQL store tests share one testcontainers instance and give each
// test its own database. They need Docker and are ignored by default:
//
//     cargo test -- --ignored

mod helpers;
