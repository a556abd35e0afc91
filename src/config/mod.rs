//! Configuration models for admission controllers.

pub mod controller;

pub use controller::{
    ControllerConfig, ENV_CEILING, ENV_CEILING_REFRESH_SECS, ENV_CONTROLLER_NAME,
    ENV_COUNT_STATUSES, ENV_MAX_PAGES, ENV_PAGE_SIZE, ENV_QUERY_TIMEOUT_MS, parse_ceiling,
};
