pub mod compute;
pub mod model;
pub mod scheduler;
pub mod view;

pub use model::{AsOf, RefreshReport, RegionSummaryDto, SummaryError, SummarySnapshot};
pub use scheduler::{RefreshScheduler, SchedulerHandle, DEFAULT_REFRESH_INTERVAL};
pub use view::RegionSummaryView;
