// =============================================================================
// API Module
// =============================================================================
//
// Read-only HTTP and WebSocket surface consumed by the dashboard page.

pub mod rest;
pub mod ws;
