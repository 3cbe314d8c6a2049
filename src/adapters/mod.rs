// Adapters layer: concrete implementations for external systems (sources over HTTP, local storage).

pub mod sources;
pub mod storage;
