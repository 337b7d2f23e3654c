use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::source::mapping::FlowMapping;
use crate::source::RecordSource;

/// Immutable state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub source: Arc<dyn RecordSource>,
    pub mapping: Arc<FlowMapping>,
}

impl AppState {
    pub fn new(config: DashboardConfig, source: Arc<dyn RecordSource>, mapping: FlowMapping) -> Self {
        Self {
            config: Arc::new(config),
            source,
            mapping: Arc::new(mapping),
        }
    }
}
