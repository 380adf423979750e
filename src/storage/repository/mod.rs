pub mod alert_repo;
pub mod distribution_repo;
pub mod rainfall_repo;
pub mod region_repo;
pub mod resource_repo;
pub mod summary_repo;

pub use alert_repo::{AlertRepository, NewAlert};
pub use distribution_repo::{DistributionReceipt, DistributionRepository, NewDistribution};
pub use rainfall_repo::{NewRainfall, RainfallRepository};
pub use region_repo::{NewRegion, RegionRepository};
pub use resource_repo::{NewResource, ResourceRepository};
pub use summary_repo::SummaryRepository;
