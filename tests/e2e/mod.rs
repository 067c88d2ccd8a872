// End-to-end tests for the Assistant Gateway HTTP API
//
// A single testcontainers PostgreSQL instance backs the whole suite. Each test
// leases its own database from a pool (test_db_<uuid>), so tests run in
// parallel without sharing usage counters.
//
// Vendors are never called: every TestContext wires scripted chat and image
// providers into the real router, so failover, quota and fallback behavior is
// exercised exactly as in production.

mod helpers;
mod test_image;
mod test_usage;
